use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::codec::encoder::Encoder;

pub mod encoder;
pub mod escape;
pub mod hex;
pub mod line;
pub mod literal;

pub trait Encodable {
    fn encode<B: BufMut>(&self, encoder: &mut Encoder<B>);

    fn encode_to_bytes(&self) -> Bytes {
        let mut encoder = Encoder::new(BytesMut::new());
        self.encode(&mut encoder);
        encoder.into_inner().freeze()
    }
}

/// Errors raised while decoding a serialized trie.
///
/// Every variant carries the byte offset of the line being decoded.
#[derive(Debug, Error)]
pub enum DecodeErr {
    #[error("malformed line at offset {offset}")]
    MalformedLine { offset: usize },

    #[error("invalid escape sequence in line at offset {offset}")]
    InvalidEscape { offset: usize },

    #[error("truncated or invalid hex offset in line at offset {offset}")]
    TruncatedNumber { offset: usize },

    #[error("dangling reference to offset {offset}")]
    DanglingReference { offset: usize },

    #[error("invalid literal at offset {offset}: {source}")]
    InvalidLiteral {
        offset: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl DecodeErr {
    /// The byte offset of the line that failed to decode.
    pub fn offset(&self) -> usize {
        match self {
            Self::MalformedLine { offset }
            | Self::InvalidEscape { offset }
            | Self::TruncatedNumber { offset }
            | Self::DanglingReference { offset }
            | Self::InvalidLiteral { offset, .. } => *offset,
        }
    }
}
