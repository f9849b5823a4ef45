//! Durability layer for Keepsake
//!
//! This crate handles everything that turns a bundle into bytes and back:
//!
//! - Encoding detection: plain JSON text or gzip, told apart by the magic bytes
//! - Writer: compact JSON, optional gzip, atomic file writes
//! - Reader: auto-detecting decoder, top-level array wrapping
//! - Stream configuration loaded from `keepsake.toml`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compression; // Gzip marker detection
pub mod config; // StreamConfig and keepsake.toml
pub mod error; // StreamError
pub mod reader; // BundleReader
pub mod writer; // BundleWriter

// === Re-exports ===
pub use compression::{Encoding, GZIP_MAGIC};
pub use config::{StreamConfig, CONFIG_FILE_NAME};
pub use error::{StreamError, StreamResult};
pub use reader::{read_bundle, BundleReader};
pub use writer::{write_bundle, BundleWriter};
