//! Alias registry
//!
//! Maps legacy type identifiers found in old save files to the identifiers of
//! the types that replaced them. Every type-directed read resolves its tag
//! through here before looking up a factory, so renaming, merging or removing
//! a domain type does not invalidate saves written before the change.
//!
//! ## Registration
//!
//! Register aliases at startup, before any save that may contain the old
//! identifier is loaded:
//!
//! ```
//! use keepsake_core::alias::{add_alias, resolve};
//!
//! add_alias("items.RingOfForce", "items.RingOfStrength");
//! assert_eq!(resolve("items.RingOfStrength"), "items.RingOfForce");
//! assert_eq!(resolve("items.Unrelated"), "items.Unrelated");
//! ```
//!
//! The table starts empty, lives for the whole process and is never torn
//! down. Registering the same legacy identifier twice keeps the last mapping.
//! Resolution is a single hop.

use crate::class::BundlableClass;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// Global alias table: legacy identifier -> current identifier
static ALIASES: Lazy<Mutex<HashMap<String, String>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Register `legacy` as an old name for `current`
///
/// # Thread Safety
///
/// Safe to call from any thread. Registration and resolution are serialized
/// by a single mutex.
pub fn add_alias(current: impl Into<String>, legacy: impl Into<String>) {
    let current = current.into();
    let legacy = legacy.into();
    debug!(legacy = %legacy, current = %current, "Registered type alias");
    ALIASES.lock().insert(legacy, current);
}

/// Register `legacy` as an old name for a registered class
pub fn add_class_alias(class: &BundlableClass, legacy: impl Into<String>) {
    add_alias(class.name(), legacy);
}

/// Resolve an identifier to its current name
///
/// Unregistered identifiers come back unchanged.
pub fn resolve(identifier: &str) -> String {
    ALIASES
        .lock()
        .get(identifier)
        .cloned()
        .unwrap_or_else(|| identifier.to_string())
}

/// Number of registered aliases
pub fn alias_count() -> usize {
    ALIASES.lock().len()
}
