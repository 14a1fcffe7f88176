//! Linetrie is a compact, line-oriented serialization format for mappings
//! from path strings to JSON values, built on a compressed (radix) trie.
//!
//! ## Key Features:
//!
//! - **Radix Trie Encoding**: paths are stored in a compressed trie whose
//!   edges carry arbitrary runs of path chars. Every node becomes one line of
//!   text, and lines refer to earlier lines by byte offset.
//!
//! - **Deduplication**: identical lines, whether leaf values or whole
//!   subtrees, are written once and shared. The boolean `true` is written
//!   inline and never takes a line of its own.
//!
//! - **Seek-based Lookup**: the `TrieReader` type answers exact-path queries
//!   directly over any type implementing `AsRef<[u8]>`, decoding only the
//!   lines on the way from the root to the target.
//!
//! ## Format
//!
//! ```text
//! "f"          <- literal line, offset 0
//! "/"          <- literal line, offset 4
//! "b"          <- literal line, offset 8
//! :4/bar:8     <- node line: own value at 4, edge "bar" to 8
//! :/\/:c       <- node line: own value at 0, edge "/" to 0xc
//! /\/foo:15    <- root, always the last line: edge "/foo" to 0x15
//! ```

mod codec;
mod reader;
mod util;
mod writer;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use codec::{
    DecodeErr, Encodable,
    encoder::Encoder,
    line::{Line, NodeLine, Reference},
};
pub use reader::TrieReader;
pub use serde_json::Value;
pub use writer::{EdgeOrder, TrieWriter};
