//! Bundle stream reader
//!
//! Reads plain or gzip-compressed JSON text into a bundle. The encoding is
//! detected from the first two bytes, which are put back in front of the
//! stream before decoding.

use crate::compression::Encoding;
use crate::config::StreamConfig;
use crate::error::{StreamError, StreamResult};
use flate2::read::MultiGzDecoder;
use keepsake_core::document::value_type_name;
use keepsake_core::{Bundle, DocValue, DEFAULT_KEY};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Reader for bundle streams
#[derive(Debug, Clone, Default)]
pub struct BundleReader {
    config: StreamConfig,
}

impl BundleReader {
    /// Create a new reader with the given config
    pub fn new(config: StreamConfig) -> Self {
        Self { config }
    }

    /// Read a bundle from `stream`, consuming it
    ///
    /// A top-level array is wrapped under [`DEFAULT_KEY`]. Any other non-object
    /// top level is rejected.
    pub fn read<R: Read>(&self, mut stream: R) -> StreamResult<Bundle> {
        let mut header = [0u8; 2];
        let filled = read_prefix(&mut stream, &mut header)?;
        let prefix = &header[..filled];
        let encoding = Encoding::detect(prefix);

        let source = BufReader::with_capacity(
            self.config.effective_buffer_size(),
            prefix.chain(stream),
        );

        let mut text = Vec::new();
        match encoding {
            Encoding::Gzip => {
                MultiGzDecoder::new(source)
                    .read_to_end(&mut text)
                    .map_err(|e| StreamError::compression(format!("gzip decode: {}", e)))?;
            }
            Encoding::Plain => {
                let mut source = source;
                source.read_to_end(&mut text)?;
            }
        }

        let value: Value = serde_json::from_slice(&text)?;
        let bundle = into_bundle(value)?;

        debug!(
            bytes = text.len(),
            compressed = encoding.is_compressed(),
            "Read bundle"
        );
        Ok(bundle)
    }

    /// Read a bundle from a byte slice
    pub fn read_slice(&self, data: &[u8]) -> StreamResult<Bundle> {
        self.read(data)
    }

    /// Read a bundle from a file
    pub fn read_file(&self, path: &Path) -> StreamResult<Bundle> {
        let file = File::open(path)?;
        self.read(file)
    }
}

/// Read a bundle from `stream` with default settings
pub fn read_bundle<R: Read>(stream: R) -> StreamResult<Bundle> {
    BundleReader::default().read(stream)
}

/// Fill `buf` from the start of `stream`, stopping early only at end of input
fn read_prefix<R: Read>(stream: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn into_bundle(value: Value) -> StreamResult<Bundle> {
    match value {
        Value::Object(_) => Ok(Bundle::from_value(DocValue::from_value(value))?),
        Value::Array(_) => {
            let bundle = Bundle::new();
            bundle.put(DEFAULT_KEY, DocValue::from_value(value));
            Ok(bundle)
        }
        other => Err(StreamError::invalid_document(format!(
            "top level must be an object or array, found {}",
            value_type_name(&other)
        ))),
    }
}
