//! Stream configuration via `keepsake.toml`
//!
//! Controls how bundles are written. Reading never needs configuration beyond
//! the buffer size, since the encoding is detected from the stream itself.

use crate::error::{StreamError, StreamResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Conventional config file name
pub const CONFIG_FILE_NAME: &str = "keepsake.toml";

/// Highest gzip compression level
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Stream configuration loaded from `keepsake.toml`.
///
/// # Example
///
/// ```toml
/// # Gzip saves (default: true). Turn off to inspect saves by hand.
/// compression = true
/// # 0 (store) to 9 (smallest)
/// compression_level = 6
/// buffer_size = 4096
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Gzip the output of writes that do not override it
    #[serde(default = "default_compression")]
    pub compression: bool,
    /// Gzip level, clamped to `0..=9`
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
    /// Buffer size for the stream side of the codec, in bytes
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_compression() -> bool {
    true
}

fn default_compression_level() -> u32 {
    6
}

fn default_buffer_size() -> usize {
    4096
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            compression: default_compression(),
            compression_level: default_compression_level(),
            buffer_size: default_buffer_size(),
        }
    }
}

impl StreamConfig {
    /// Defaults with compression turned off
    pub fn uncompressed() -> Self {
        Self {
            compression: false,
            ..Self::default()
        }
    }

    /// Set whether writes compress
    pub fn with_compression(mut self, compression: bool) -> Self {
        self.compression = compression;
        self
    }

    /// Set the gzip level
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// Set the buffer size
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Gzip level actually used
    pub fn effective_level(&self) -> u32 {
        self.compression_level.min(MAX_COMPRESSION_LEVEL)
    }

    /// Buffer size actually used (never zero)
    pub fn effective_buffer_size(&self) -> usize {
        self.buffer_size.max(1)
    }

    /// Parse config from TOML text.
    ///
    /// Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> StreamResult<Self> {
        toml::from_str(content)
            .map_err(|e| StreamError::config(format!("Failed to parse stream config: {}", e)))
    }

    /// Read config from a file path.
    ///
    /// A missing file yields the defaults. An unreadable or malformed file is
    /// an error.
    pub fn load(path: &Path) -> StreamResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            StreamError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Keepsake stream configuration
#
# Gzip saves (default: true). Turn off to read saves in a text editor.
# Reading detects the encoding, so both kinds of file always load.
compression = true

# Gzip level from 0 (store) to 9 (smallest), default 6
compression_level = 6

# Stream buffer size in bytes (default: 4096)
buffer_size = 4096
"#
    }
}
