use std::{borrow::Cow, mem};

use bytes::BufMut;
use itertools::Itertools;
use serde_json::Value;

use crate::{
    EdgeOrder,
    codec::{
        encoder::Encoder,
        line::{NodeLine, Reference},
        literal::{encode_literal, is_true},
    },
    util::common_prefix_len,
};

/// A node of the in-memory radix trie.
///
/// Every node other than the root either holds a value or has at least two
/// edges. Sibling edges never share a first char.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Node {
    pub value: Option<Value>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Edge {
    pub label: String,
    pub node: Node,
}

impl Edge {
    fn leaf(label: &str, value: Value) -> Self {
        Self {
            label: label.to_owned(),
            node: Node { value: Some(value), edges: Vec::new() },
        }
    }

    /// Splits this edge `at` bytes into its label, inserting an empty
    /// intermediate node which owns the tail of the old edge.
    fn split(&mut self, at: usize) {
        debug_assert!(at > 0 && at < self.label.len());
        let tail = self.label.split_off(at);
        let child = mem::take(&mut self.node);
        self.node = Node {
            value: None,
            edges: vec![Edge { label: tail, node: child }],
        };
    }
}

impl Node {
    /// Returns the index of the edge sharing a first char with `path`.
    fn edge_index(&self, path: &str) -> Option<usize> {
        let first = path.chars().next()?;
        self.edges.iter().position(|e| e.label.starts_with(first))
    }

    /// Inserts `value` at `path`, returning the value previously stored at
    /// exactly that path.
    pub fn insert(&mut self, path: &str, value: Value) -> Option<Value> {
        let mut node = self;
        let mut rest = path;
        loop {
            if rest.is_empty() {
                return node.value.replace(value);
            }
            let Some(idx) = node.edge_index(rest) else {
                node.edges.push(Edge::leaf(rest, value));
                return None;
            };
            let edge = &mut node.edges[idx];
            let common = common_prefix_len(&edge.label, rest);
            if common < edge.label.len() {
                edge.split(common);
            }
            rest = &rest[common..];
            node = &mut edge.node;
        }
    }

    pub fn find(&self, path: &str) -> Option<&Value> {
        let mut node = self;
        let mut rest = path;
        loop {
            if rest.is_empty() {
                return node.value.as_ref();
            }
            let edge = &node.edges[node.edge_index(rest)?];
            rest = rest.strip_prefix(edge.label.as_str())?;
            node = &edge.node;
        }
    }

    /// Calls `f` with every stored path and value, depth first in edge order.
    pub fn visit<'a>(&'a self, prefix: &mut String, f: &mut impl FnMut(&str, &'a Value)) {
        if let Some(value) = &self.value {
            f(prefix, value);
        }
        for edge in &self.edges {
            let len = prefix.len();
            prefix.push_str(&edge.label);
            edge.node.visit(prefix, f);
            prefix.truncate(len);
        }
    }

    fn ordered_edges(&self, order: EdgeOrder) -> Vec<&Edge> {
        match order {
            EdgeOrder::Insertion => self.edges.iter().collect(),
            EdgeOrder::Sorted => self
                .edges
                .iter()
                .sorted_by(|a, b| a.label.cmp(&b.label))
                .collect(),
        }
    }

    /// Encodes this node and everything beneath it, returning the reference
    /// its parent edge should carry.
    pub fn encode<B: BufMut>(&self, encoder: &mut Encoder<B>, order: EdgeOrder) -> Reference {
        if self.edges.is_empty() {
            if let Some(value) = &self.value {
                return encode_value(value, encoder);
            }
        }
        let line = self.node_line(encoder, order).encode();
        Reference::Offset(encoder.put_line(line))
    }

    /// Encodes this node as the root. The root is always a node line and
    /// always the last line of the output.
    pub fn encode_root<B: BufMut>(&self, encoder: &mut Encoder<B>, order: EdgeOrder) -> usize {
        let line = self.node_line(encoder, order).encode();
        encoder.put_root(&line)
    }

    fn node_line<B: BufMut>(&self, encoder: &mut Encoder<B>, order: EdgeOrder) -> NodeLine<'_> {
        let own = self.value.as_ref().map(|value| encode_value(value, encoder));
        let children = self
            .ordered_edges(order)
            .into_iter()
            .map(|edge| (Cow::Borrowed(edge.label.as_str()), edge.node.encode(encoder, order)))
            .collect_vec();

        let next = encoder.bytes_written();
        debug_assert!(
            own.iter()
                .chain(children.iter().map(|(_, r)| r))
                .all(|r| match r {
                    Reference::True => true,
                    Reference::Offset(offset) => *offset < next,
                }),
            "BUG: node line references a line that is not yet written"
        );

        NodeLine { own, children }
    }
}

fn encode_value<B: BufMut>(value: &Value, encoder: &mut Encoder<B>) -> Reference {
    if is_true(value) {
        Reference::True
    } else {
        Reference::Offset(encoder.put_line(encode_literal(value)))
    }
}
