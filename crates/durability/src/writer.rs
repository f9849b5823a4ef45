//! Bundle stream writer
//!
//! Serializes a bundle as compact JSON text, optionally gzip-compressed.

use crate::compression::Encoding;
use crate::config::StreamConfig;
use crate::error::StreamResult;
use flate2::write::GzEncoder;
use flate2::Compression;
use keepsake_core::Bundle;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writer for bundle streams
///
/// Every write takes ownership of its stream and drops it before returning,
/// whether the write succeeded or not.
#[derive(Debug, Clone, Default)]
pub struct BundleWriter {
    config: StreamConfig,
}

impl BundleWriter {
    /// Create a new writer with the given config
    pub fn new(config: StreamConfig) -> Self {
        Self { config }
    }

    /// Create a new writer with default config
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Config this writer was built with
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Write `bundle` to `stream`, compressing if the config says so
    pub fn write<W: Write>(&self, bundle: &Bundle, stream: W) -> StreamResult<()> {
        self.write_with(bundle, stream, self.config.compression)
    }

    /// Write `bundle` to `stream` with an explicit compression choice
    pub fn write_with<W: Write>(
        &self,
        bundle: &Bundle,
        stream: W,
        compressed: bool,
    ) -> StreamResult<()> {
        let text = serde_json::to_vec(bundle.to_value().as_inner())?;
        let encoding = Encoding::for_output(compressed);

        let sink = BufWriter::with_capacity(self.config.effective_buffer_size(), stream);
        let mut sink = match encoding {
            Encoding::Gzip => {
                let level = Compression::new(self.config.effective_level());
                let mut encoder = GzEncoder::new(sink, level);
                encoder.write_all(&text)?;
                encoder.finish()?
            }
            Encoding::Plain => {
                let mut sink = sink;
                sink.write_all(&text)?;
                sink
            }
        };
        sink.flush()?;

        debug!(bytes = text.len(), compressed, "Wrote bundle");
        Ok(())
    }

    /// Write a bundle to a `Vec<u8>`
    pub fn write_to_vec(&self, bundle: &Bundle) -> StreamResult<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(bundle, &mut buffer)?;
        Ok(buffer)
    }

    /// Write a bundle to a file
    ///
    /// This is an atomic operation - either the complete file is written
    /// or the previous contents (if any) are left untouched.
    pub fn write_to_file(&self, bundle: &Bundle, path: &Path) -> StreamResult<()> {
        let temp_path = temp_path_for(path);

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        // Try to write, clean up on failure
        match self.write_file_inner(bundle, &temp_path) {
            Ok(()) => {
                // Atomic rename
                fs::rename(&temp_path, path)?;
                Ok(())
            }
            Err(e) => {
                // Clean up temp file
                let _ = fs::remove_file(&temp_path);
                Err(e)
            }
        }
    }

    fn write_file_inner(&self, bundle: &Bundle, path: &Path) -> StreamResult<()> {
        let file = File::create(path)?;
        self.write(bundle, &file)?;
        file.sync_all()?;
        Ok(())
    }
}

/// Sibling path a file is staged at before the rename: the full name plus `.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `bundle` to `stream` with default settings
pub fn write_bundle<W: Write>(bundle: &Bundle, stream: W, compressed: bool) -> StreamResult<()> {
    BundleWriter::with_defaults().write_with(bundle, stream, compressed)
}
