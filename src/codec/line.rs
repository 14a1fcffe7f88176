use std::borrow::Cow;

use serde_json::Value;

use crate::codec::{
    DecodeErr,
    escape::{push_escaped, split_label},
    hex::{decode_offset, encode_offset, is_hex_digit},
    literal::decode_literal,
};

const NEWLINE: u8 = b'\n';
const CHILD: u8 = b'/';
const OFFSET: u8 = b':';
const TRUE: u8 = b'!';

/// Where a value lives: inline as the boolean `true`, or in the line starting
/// at the given byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reference {
    True,
    Offset(usize),
}

impl Reference {
    fn encode_into(self, out: &mut String) {
        match self {
            Reference::True => out.push(TRUE as char),
            Reference::Offset(offset) => {
                out.push(OFFSET as char);
                encode_offset(out, offset);
            }
        }
    }
}

/// One trie node: an optional own value followed by its outgoing edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeLine<'a> {
    pub own: Option<Reference>,
    pub children: Vec<(Cow<'a, str>, Reference)>,
}

impl<'a> NodeLine<'a> {
    pub fn encode(&self) -> String {
        let mut out = String::new();
        if let Some(own) = self.own {
            own.encode_into(&mut out);
        }
        for (label, reference) in &self.children {
            out.push(CHILD as char);
            push_escaped(&mut out, label);
            reference.encode_into(&mut out);
        }
        out
    }

    fn parse(text: &'a str, offset: usize) -> Result<Self, DecodeErr> {
        let mut rest = text;
        let own = match rest.as_bytes().first() {
            None | Some(&CHILD) => None,
            Some(_) => {
                let (own, tail) = parse_marker(rest, offset)?;
                rest = tail;
                Some(own)
            }
        };

        let mut children = Vec::new();
        while !rest.is_empty() {
            let tail = rest
                .strip_prefix(CHILD as char)
                .ok_or(DecodeErr::MalformedLine { offset })?;
            let (label, tail) = split_label(tail, offset)?;
            let (reference, tail) = parse_marker(tail, offset)?;
            children.push((label, reference));
            rest = tail;
        }

        Ok(Self { own, children })
    }

    /// Returns the edge whose non-empty label is a prefix of `path`.
    pub fn child_for(&self, path: &str) -> Option<(&str, Reference)> {
        self.children
            .iter()
            .find(|(label, _)| !label.is_empty() && path.starts_with(&**label))
            .map(|(label, reference)| (&**label, *reference))
    }

    /// Returns the value stored for the exact path reaching this node. An
    /// empty-label edge counts as the node's own value.
    pub fn terminal(&self) -> Option<Reference> {
        self.own.or_else(|| {
            self.children
                .iter()
                .find(|(label, _)| label.is_empty())
                .map(|(_, reference)| *reference)
        })
    }
}

/// Parses a `!` or `:hex` marker off the front of `text`.
fn parse_marker(text: &str, offset: usize) -> Result<(Reference, &str), DecodeErr> {
    match text.as_bytes().first() {
        Some(&TRUE) => Ok((Reference::True, &text[1..])),
        Some(&OFFSET) => {
            let digits = text[1..].bytes().take_while(|&b| is_hex_digit(b)).count();
            let (hex, tail) = text[1..].split_at(digits);
            if !(tail.is_empty() || tail.starts_with(CHILD as char)) {
                return Err(DecodeErr::TruncatedNumber { offset });
            }
            let target = decode_offset(hex.as_bytes()).ok_or(DecodeErr::TruncatedNumber { offset })?;
            Ok((Reference::Offset(target), tail))
        }
        _ => Err(DecodeErr::MalformedLine { offset }),
    }
}

/// A decoded line, tagged by its leading byte.
#[derive(Debug, Clone, PartialEq)]
pub enum Line<'a> {
    Node(NodeLine<'a>),
    Literal(Value),
}

impl<'a> Line<'a> {
    /// Decodes the line starting at `offset`, reading up to but not including
    /// the next newline.
    pub fn decode(buf: &'a [u8], offset: usize) -> Result<Self, DecodeErr> {
        let data = buf
            .get(offset..)
            .filter(|data| !data.is_empty())
            .ok_or(DecodeErr::MalformedLine { offset })?;
        let len = data
            .iter()
            .position(|&b| b == NEWLINE)
            .ok_or(DecodeErr::MalformedLine { offset })?;
        let text =
            std::str::from_utf8(&data[..len]).map_err(|_| DecodeErr::MalformedLine { offset })?;

        tracing::trace!(offset, len, "decoding line");

        match text.as_bytes().first() {
            None | Some(&CHILD) | Some(&OFFSET) | Some(&TRUE) => {
                NodeLine::parse(text, offset).map(Line::Node)
            }
            Some(_) => decode_literal(text, offset).map(Line::Literal),
        }
    }
}
