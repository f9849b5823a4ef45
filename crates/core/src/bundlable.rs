//! The capability a domain type implements to be stored in a bundle
//!
//! A `Bundlable` writes its fields into a [`Bundle`] and reads them back.
//! The bundle's object path tags the stored sub-tree with
//! [`class_name`](Bundlable::class_name) so the loader can pick the right
//! factory from the [class registry](crate::class) without the caller naming
//! the type.
//!
//! ```
//! use keepsake_core::{Bundle, Bundlable, BundleResult};
//!
//! #[derive(Default)]
//! struct Torch {
//!     charge: i32,
//! }
//!
//! impl Bundlable for Torch {
//!     fn class_name(&self) -> &'static str {
//!         "items.Torch"
//!     }
//!
//!     fn store_in_bundle(&self, bundle: &Bundle) {
//!         bundle.put("charge", self.charge);
//!     }
//!
//!     fn restore_from_bundle(&mut self, bundle: &Bundle) -> BundleResult<()> {
//!         self.charge = bundle.get_int("charge");
//!         Ok(())
//!     }
//! }
//! ```

use crate::bundle::Bundle;
use crate::error::BundleResult;
use std::any::Any;

/// Upcast helper so trait objects can be downcast to their concrete type
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Convert a box into `Box<dyn Any>`
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A domain type that can be saved into and restored from a [`Bundle`]
///
/// Reconstruction needs a zero-argument constructor, supplied by registering
/// the type with [`register`](crate::class::register) (usually via `Default`).
pub trait Bundlable: AsAny + Send {
    /// Stable identifier written under the reserved `__className` key
    ///
    /// Renaming a type means choosing a new identifier and registering the old
    /// one as an alias with [`add_alias`](crate::alias::add_alias).
    fn class_name(&self) -> &'static str;

    /// Write this object's state
    fn store_in_bundle(&self, bundle: &Bundle);

    /// Populate a freshly constructed object from `bundle`
    ///
    /// Errors from structural getters should be propagated with `?`.
    fn restore_from_bundle(&mut self, bundle: &Bundle) -> BundleResult<()>;

    /// Whether the loader can rebuild this object from its factory alone
    ///
    /// Objects that only make sense attached to an owner (they borrow its
    /// state instead of storing their own) return `false`. The polymorphic
    /// store path silently skips them, and the owner must persist them itself
    /// under a different key.
    fn is_reconstructible(&self) -> bool {
        true
    }
}

impl dyn Bundlable {
    /// Check the concrete type
    pub fn is<T: Bundlable>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow as the concrete type
    pub fn downcast_ref<T: Bundlable>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow as the concrete type
    pub fn downcast_mut<T: Bundlable>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Take ownership as the concrete type
    pub fn downcast<T: Bundlable>(self: Box<Self>) -> Option<Box<T>> {
        self.into_any().downcast::<T>().ok()
    }
}

impl std::fmt::Debug for dyn Bundlable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundlable")
            .field("class_name", &self.class_name())
            .finish()
    }
}
