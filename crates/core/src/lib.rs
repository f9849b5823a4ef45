//! Core types and traits for Keepsake
//!
//! This crate defines the in-memory side of the persistence engine:
//! - DocValue: the document tree every save is built from
//! - Bundle: keyed, typed view over one object node of that tree
//! - Bundlable: capability a domain type implements to be saved and restored
//! - Class registry: identifier to factory lookup for polymorphic restore
//! - Alias registry: legacy identifier rewriting for old saves
//! - Error: error type for structural reads
//!
//! Byte streams (gzip detection, files) live in `keepsake-durability`.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod alias;
pub mod bundlable;
pub mod bundle;
pub mod class;
pub mod document;
pub mod error;

// Re-export commonly used types and traits
pub use alias::{add_alias, add_class_alias, alias_count};
pub use bundlable::{AsAny, Bundlable};
pub use bundle::{Bundle, CLASS_NAME_KEY, DEFAULT_KEY};
pub use class::{
    class_for_name, register, register_class, registered_classes, resolve_class, BundlableClass,
    BundlableFactory,
};
pub use document::{DocPath, DocPathError, DocValue, PathSegment};
pub use error::{BundleError, BundleResult};
