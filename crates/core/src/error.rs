//! Error types for bundle access
//!
//! Reads split into two families:
//! - Optional fields (scalars, nested bundles, single objects that are absent)
//!   resolve to defaults and never produce an error.
//! - Structural reads (arrays, enums, collections, and objects whose type
//!   cannot be resolved) fail with a [`BundleError`].
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Result type alias for bundle operations
pub type BundleResult<T> = std::result::Result<T, BundleError>;

/// Error types for bundle access
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BundleError {
    /// A structurally required key (array, enum, collection) is absent or null
    #[error("Required key not found: {key}")]
    MissingKey {
        /// Key that was read
        key: String,
    },

    /// The stored value has the wrong shape for a structural accessor
    #[error("Type mismatch at '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Key (or `key[index]`) that was read
        key: String,
        /// Shape the accessor needed
        expected: &'static str,
        /// Shape actually stored
        found: &'static str,
    },

    /// A stored type identifier names no registered class, even after aliasing
    #[error("Unresolvable type: '{name}'")]
    UnresolvableType {
        /// Identifier as resolved through the alias registry
        name: String,
    },

    /// A stored enumeration name matches no member
    #[error("Invalid enum value '{value}' at '{key}': {reason}")]
    EnumParse {
        /// Key that was read
        key: String,
        /// Stored text
        value: String,
        /// Parser message
        reason: String,
    },

    /// A bundle can only wrap an object node
    #[error("Bundle root must be an object, found {found}")]
    NotAnObject {
        /// Shape that was offered
        found: &'static str,
    },
}

impl BundleError {
    /// Create a missing key error
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(key: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch {
            key: key.into(),
            expected,
            found,
        }
    }

    /// Create an unresolvable type error
    pub fn unresolvable_type(name: impl Into<String>) -> Self {
        Self::UnresolvableType { name: name.into() }
    }

    /// Whether this error came from a type tag that could not be resolved
    pub fn is_unresolvable_type(&self) -> bool {
        matches!(self, Self::UnresolvableType { .. })
    }
}
