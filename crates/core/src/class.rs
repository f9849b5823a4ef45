//! Class registry
//!
//! Maps a type identifier to a factory that builds an empty instance. This is
//! what lets [`Bundle::get_object`](crate::Bundle::get_object) rebuild a value
//! from the `__className` tag alone.
//!
//! ## Registration
//!
//! Every bundlable type registers once at startup:
//!
//! ```ignore
//! use keepsake_core::class::{register, register_class, BundlableClass};
//!
//! register::<Torch>();
//! // or, with an explicit factory
//! register_class(BundlableClass::new("items.Torch", || Box::new(Torch::lit())));
//! ```
//!
//! Lookups by stored tag go through [`resolve_class`], which applies the
//! [alias registry](crate::alias) first.

use crate::alias;
use crate::bundlable::Bundlable;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Prefix some legacy saves carry in front of the identifier
const LEGACY_CLASS_PREFIX: &str = "class ";

/// Function that builds an empty instance
pub type BundlableFactory = fn() -> Box<dyn Bundlable>;

/// A registered bundlable type: its identifier plus a zero-argument factory
#[derive(Clone, Copy)]
pub struct BundlableClass {
    name: &'static str,
    factory: BundlableFactory,
}

impl BundlableClass {
    /// Create a class entry from an explicit factory
    pub const fn new(name: &'static str, factory: BundlableFactory) -> Self {
        Self { name, factory }
    }

    /// Create a class entry for a `Default`-constructible type
    ///
    /// The identifier is taken from a default instance's
    /// [`class_name`](Bundlable::class_name).
    pub fn of<T: Bundlable + Default>() -> Self {
        Self {
            name: T::default().class_name(),
            factory: make_default::<T>,
        }
    }

    /// Identifier this class is stored under
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Build an empty instance
    pub fn instantiate(&self) -> Box<dyn Bundlable> {
        (self.factory)()
    }
}

fn make_default<T: Bundlable + Default>() -> Box<dyn Bundlable> {
    Box::new(T::default())
}

impl PartialEq for BundlableClass {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for BundlableClass {}

impl fmt::Debug for BundlableClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundlableClass")
            .field("name", &self.name)
            .finish()
    }
}

/// Global class table, keyed by identifier
static CLASS_REGISTRY: Lazy<RwLock<HashMap<&'static str, BundlableClass>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a class, replacing any previous entry with the same identifier
pub fn register_class(class: BundlableClass) {
    debug!(class = class.name, "Registered bundlable class");
    CLASS_REGISTRY.write().insert(class.name, class);
}

/// Register a `Default`-constructible type and return its class entry
pub fn register<T: Bundlable + Default>() -> BundlableClass {
    let class = BundlableClass::of::<T>();
    register_class(class);
    class
}

/// Exact lookup, without alias resolution
pub fn class_for_name(name: &str) -> Option<BundlableClass> {
    CLASS_REGISTRY.read().get(name).copied()
}

/// Resolve a stored type tag to a registered class
///
/// Strips the legacy `"class "` prefix, applies the alias registry, then
/// looks the result up. Empty tags resolve to nothing.
pub fn resolve_class(tag: &str) -> Option<BundlableClass> {
    let tag = tag.strip_prefix(LEGACY_CLASS_PREFIX).unwrap_or(tag);
    if tag.is_empty() {
        return None;
    }
    class_for_name(&alias::resolve(tag))
}

/// Apply prefix stripping and aliasing to a stored tag without looking it up
pub fn resolve_class_name(tag: &str) -> String {
    let tag = tag.strip_prefix(LEGACY_CLASS_PREFIX).unwrap_or(tag);
    alias::resolve(tag)
}

/// Identifiers of every registered class, sorted
pub fn registered_classes() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = CLASS_REGISTRY.read().keys().copied().collect();
    names.sort_unstable();
    names
}
