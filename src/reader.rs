use std::fmt::Debug;

use bytes::BufMut;
use serde_json::Value;

use crate::{
    Encodable, TrieWriter,
    codec::{
        DecodeErr,
        encoder::Encoder,
        line::{Line, NodeLine, Reference},
    },
};

/// Seek-based lookups over a serialized trie.
///
/// `TrieReader` wraps any byte container implementing `AsRef<[u8]>` and
/// performs no upfront parsing. Each lookup decodes only the lines on the
/// path from the root to its target, jumping directly to their offsets.
///
/// The reader never mutates its buffer, so it may be shared between threads
/// whenever the buffer can be.
///
/// # Examples
///
/// ```
/// use linetrie::TrieReader;
/// use serde_json::json;
///
/// let reader = TrieReader::new("\"b\"\n!/bar:\n/\\/foo:4\n");
/// assert_eq!(reader.find("/foo").unwrap(), Some(json!(true)));
/// assert_eq!(reader.find("/foobar").unwrap(), Some(json!("b")));
/// assert_eq!(reader.find("/foob").unwrap(), None);
/// ```
#[derive(Clone)]
pub struct TrieReader<B> {
    data: B,
}

impl<B: AsRef<[u8]>> Debug for TrieReader<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrieReader")
            .field("len", &self.data.as_ref().len())
            .field("root", &self.root_offset().ok())
            .finish()
    }
}

impl<B> TrieReader<B> {
    #[inline]
    pub fn inner(&self) -> &B {
        &self.data
    }

    #[inline]
    pub fn into_inner(self) -> B {
        self.data
    }
}

impl<B: AsRef<[u8]>> Encodable for TrieReader<B> {
    #[inline]
    fn encode<T: BufMut>(&self, encoder: &mut Encoder<T>) {
        encoder.write_trie(self.data.as_ref());
    }
}

impl<B: AsRef<[u8]>> TrieReader<B> {
    pub fn new(data: B) -> Self {
        Self { data }
    }

    /// Returns the offset of the root line: the start of the last line.
    pub fn root_offset(&self) -> Result<usize, DecodeErr> {
        let data = self.data.as_ref();
        let body = data
            .strip_suffix(b"\n")
            .ok_or_else(|| DecodeErr::MalformedLine {
                offset: data.iter().rposition(|&b| b == b'\n').map_or(0, |p| p + 1),
            })?;
        Ok(body.iter().rposition(|&b| b == b'\n').map_or(0, |p| p + 1))
    }

    /// Returns the value stored at exactly `path`, or `None` if no value is
    /// stored there.
    ///
    /// Fails if any line on the way to the value is malformed.
    pub fn find(&self, path: &str) -> Result<Option<Value>, DecodeErr> {
        let (mut offset, mut node) = self.load_root()?;
        let mut rest = path;
        loop {
            if rest.is_empty() {
                return match node.terminal() {
                    Some(reference) => self.resolve(offset, reference),
                    None => Ok(None),
                };
            }

            let Some((label, reference)) = node.child_for(rest) else {
                return Ok(None);
            };
            rest = &rest[label.len()..];

            match reference {
                Reference::True => return Ok(rest.is_empty().then_some(Value::Bool(true))),
                Reference::Offset(target) => match self.load(offset, target)? {
                    Line::Literal(value) => return Ok(rest.is_empty().then_some(value)),
                    Line::Node(next) => {
                        offset = target;
                        node = next;
                    }
                },
            }
        }
    }

    /// Decodes every path and value reachable from the root, depth first in
    /// the order edges are written.
    pub fn entries(&self) -> Result<Vec<(String, Value)>, DecodeErr> {
        let (offset, root) = self.load_root()?;
        let mut out = Vec::new();
        self.collect(&mut String::new(), offset, &root, &mut out)?;
        Ok(out)
    }

    /// Decodes the whole buffer into an owned [`TrieWriter`].
    pub fn decode_to_writer(&self) -> Result<TrieWriter, DecodeErr> {
        Ok(TrieWriter::from_iter(self.entries()?))
    }

    fn load_root(&self) -> Result<(usize, NodeLine<'_>), DecodeErr> {
        let offset = self.root_offset()?;
        match Line::decode(self.data.as_ref(), offset)? {
            Line::Node(node) => Ok((offset, node)),
            Line::Literal(_) => Err(DecodeErr::DanglingReference { offset }),
        }
    }

    /// Loads the line at `target`, referenced from the line at `from`.
    /// References must point backwards, at the start of a line.
    fn load(&self, from: usize, target: usize) -> Result<Line<'_>, DecodeErr> {
        let data = self.data.as_ref();
        let at_line_start = target == 0 || data.get(target - 1) == Some(&b'\n');
        if target >= from || !at_line_start {
            return Err(DecodeErr::DanglingReference { offset: target });
        }
        Line::decode(data, target)
    }

    /// Resolves the value a reference stands for. A node line stands for its
    /// own value.
    fn resolve(&self, from: usize, reference: Reference) -> Result<Option<Value>, DecodeErr> {
        let mut from = from;
        let mut reference = reference;
        loop {
            let target = match reference {
                Reference::True => return Ok(Some(Value::Bool(true))),
                Reference::Offset(target) => target,
            };
            match self.load(from, target)? {
                Line::Literal(value) => return Ok(Some(value)),
                Line::Node(node) => match node.terminal() {
                    Some(next) => {
                        from = target;
                        reference = next;
                    }
                    None => return Ok(None),
                },
            }
        }
    }

    fn collect(
        &self,
        prefix: &mut String,
        offset: usize,
        node: &NodeLine<'_>,
        out: &mut Vec<(String, Value)>,
    ) -> Result<(), DecodeErr> {
        if let Some(reference) = node.terminal() {
            if let Some(value) = self.resolve(offset, reference)? {
                out.push((prefix.clone(), value));
            }
        }
        for (label, reference) in node.children.iter().filter(|(l, _)| !l.is_empty()) {
            let len = prefix.len();
            prefix.push_str(label);
            match *reference {
                Reference::True => out.push((prefix.clone(), Value::Bool(true))),
                Reference::Offset(target) => match self.load(offset, target)? {
                    Line::Literal(value) => out.push((prefix.clone(), value)),
                    Line::Node(child) => self.collect(prefix, target, &child, out)?,
                },
            }
            prefix.truncate(len);
        }
        Ok(())
    }
}

static_assertions::assert_impl_all!(TrieReader<bytes::Bytes>: Send, Sync, Clone);
static_assertions::assert_impl_all!(TrieReader<&'static str>: Send, Sync, Clone);
