//! Literal and compressed data packet bodies.

use std::fmt;

use crate::types::{CompressionAlgorithm, DataFormat};

/// A literal data packet body.
#[derive(Clone, PartialEq, Eq)]
pub struct Plaintext {
    /// The declared data format.
    pub format: DataFormat,
    /// The suggested file name, at most 255 bytes.
    pub name: Vec<u8>,
    /// Modification time of the file, or the time of creation, or zero.
    pub timestamp: u32,
    /// The literal bytes.
    pub body: Vec<u8>,
}

impl Plaintext {
    /// Whether this is the synthesized carrier of clearsigned text: text
    /// format, no name, no timestamp.
    pub fn is_clearsig(&self) -> bool {
        self.format == DataFormat::Text
            && self.name.is_empty()
            && self.timestamp == 0
    }
}

impl fmt::Debug for Plaintext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Plaintext")
            .field("format", &self.format)
            .field("name", &String::from_utf8_lossy(&self.name))
            .field("timestamp", &self.timestamp)
            .field("body", &format_args!("{} bytes", self.body.len()))
            .finish()
    }
}

/// A compressed data packet body.
///
/// The contained stream is itself a packet sequence; the sequencer hands
/// the body to the decompression collaborator and recurses over what comes
/// back.
#[derive(Clone, PartialEq, Eq)]
pub struct Compressed {
    /// The compression algorithm.
    pub algo: CompressionAlgorithm,
    /// The compressed packet stream.
    pub body: Vec<u8>,
}

impl fmt::Debug for Compressed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Compressed({}, {} bytes)", self.algo, self.body.len())
    }
}
