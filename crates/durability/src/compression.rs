//! Stream encoding detection
//!
//! A saved stream is either plain UTF-8 JSON text or the same text wrapped in
//! gzip. Gzip streams always start with the two magic bytes `1F 8B`, which no
//! JSON document can start with, so two bytes are enough to tell them apart.

/// Leading bytes of every gzip member
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// How the bytes of a bundle stream are encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Raw JSON text
    Plain,
    /// Gzip-compressed JSON text
    Gzip,
}

impl Encoding {
    /// Detect the encoding from the first bytes of a stream
    ///
    /// Anything shorter than the gzip marker, or not starting with it, is
    /// treated as plain text.
    pub fn detect(header: &[u8]) -> Self {
        if header.starts_with(&GZIP_MAGIC) {
            Encoding::Gzip
        } else {
            Encoding::Plain
        }
    }

    /// Encoding to write, given whether compression is wanted
    pub fn for_output(compressed: bool) -> Self {
        if compressed {
            Encoding::Gzip
        } else {
            Encoding::Plain
        }
    }

    /// Whether this encoding compresses
    pub fn is_compressed(self) -> bool {
        self == Encoding::Gzip
    }
}
