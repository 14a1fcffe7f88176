use bytes::{BufMut, Bytes};
use serde_json::Value;

use crate::{
    Encodable, TrieReader,
    codec::encoder::Encoder,
    writer::node::Node,
};

mod node;

/// The order in which a node's edges are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EdgeOrder {
    /// Edges are written in the order they were created. Two writers fed the
    /// same entries in a different order may produce different (equally
    /// valid) buffers.
    #[default]
    Insertion,

    /// Edges are sorted by label, so the output only depends on the set of
    /// entries.
    Sorted,
}

/// An in-memory radix trie mapping path strings to JSON values.
///
/// `TrieWriter` is the owned builder: insert paths, then serialize with
/// [`TrieWriter::stringify`] or [`Encodable::encode_to_bytes`]. Paths are
/// opaque strings, they are never split on a separator.
///
/// For seek-based lookups over a serialized trie, see [`TrieReader`].
///
/// # Examples
///
/// ```
/// use linetrie::{TrieReader, TrieWriter};
/// use serde_json::json;
///
/// let mut writer = TrieWriter::new();
/// writer.insert("/foo", json!("f"));
/// writer.insert("/foo/bar", json!("b"));
/// writer.insert("/foo/", json!("/"));
///
/// assert_eq!(writer.find("/foo/bar"), Some(&json!("b")));
/// assert_eq!(writer.find("/foo/ba"), None);
///
/// let out = writer.stringify();
/// let reader = TrieReader::new(out.as_str());
/// assert_eq!(reader.find("/foo/").unwrap(), Some(json!("/")));
/// ```
#[derive(Clone, Debug, Default)]
pub struct TrieWriter {
    root: Node,
    len: usize,
    edge_order: EdgeOrder,
}

impl TrieWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty writer which emits edges in the given order.
    pub fn with_edge_order(edge_order: EdgeOrder) -> Self {
        Self { edge_order, ..Self::default() }
    }

    pub fn set_edge_order(&mut self, edge_order: EdgeOrder) {
        self.edge_order = edge_order;
    }

    #[inline]
    pub fn edge_order(&self) -> EdgeOrder {
        self.edge_order
    }

    /// The number of distinct paths holding a value.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Associates `value` with `path`, returning the value previously stored
    /// at exactly that path.
    ///
    /// # Examples
    ///
    /// ```
    /// use linetrie::TrieWriter;
    /// use serde_json::json;
    ///
    /// let mut writer = TrieWriter::new();
    /// assert_eq!(writer.insert("/a", 1), None);
    /// assert_eq!(writer.insert("/a", 2), Some(json!(1)));
    /// assert_eq!(writer.len(), 1);
    /// ```
    pub fn insert(&mut self, path: impl AsRef<str>, value: impl Into<Value>) -> Option<Value> {
        let prev = self.root.insert(path.as_ref(), value.into());
        if prev.is_none() {
            self.len += 1;
        }
        prev
    }

    /// Inserts every path/value pair in `entries`.
    pub fn bulk_insert<K, V, I>(&mut self, entries: I)
    where
        K: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (path, value) in entries {
            self.insert(path, value);
        }
    }

    /// Returns the value stored at exactly `path`. Prefixes and extensions of
    /// stored paths are not matches.
    pub fn find(&self, path: &str) -> Option<&Value> {
        self.root.find(path)
    }

    /// Returns every stored path and value, depth first in edge order.
    pub fn iter(&self) -> impl Iterator<Item = (String, &Value)> {
        let mut out = Vec::with_capacity(self.len);
        self.root
            .visit(&mut String::new(), &mut |path, value| out.push((path.to_owned(), value)));
        out.into_iter()
    }

    /// Serializes this trie to its line format. The output always ends with
    /// the root line and a trailing newline.
    pub fn stringify(&self) -> String {
        let mut encoder = Encoder::new(Vec::new());
        self.encode(&mut encoder);
        String::from_utf8(encoder.into_inner()).expect("BUG: encoder emitted invalid utf-8")
    }

    /// Encodes this trie into a [`TrieReader`] for seek-based lookups.
    pub fn encode_to_reader(&self) -> TrieReader<Bytes> {
        TrieReader::new(self.encode_to_bytes())
    }
}

impl Encodable for TrieWriter {
    fn encode<B: BufMut>(&self, encoder: &mut Encoder<B>) {
        let root = self.root.encode_root(encoder, self.edge_order);
        tracing::debug!(
            entries = self.len,
            lines = encoder.lines_written() + 1,
            dedup_hits = encoder.dedup_hits(),
            root,
            bytes = encoder.bytes_written(),
            "encoded trie"
        );
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for TrieWriter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut writer = Self::default();
        writer.bulk_insert(iter);
        writer
    }
}

impl<K: AsRef<str>, V: Into<Value>> Extend<(K, V)> for TrieWriter {
    #[inline]
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.bulk_insert(iter);
    }
}

static_assertions::assert_impl_all!(TrieWriter: Send, Sync, Clone);

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use proptest::{collection::hash_map, proptest};
    use serde_json::{Map, json};

    use super::*;
    use crate::testutil::{PathSetGen, check_lookup, mktries, path_strategy, value_strategy};

    fn trousers(values: [i64; 6]) -> TrieWriter {
        let paths = [
            "/trousers",
            "/trousers/blue",
            "/trousers/red",
            "/trains",
            "/trains/steam",
            "/tractors",
        ];
        TrieWriter::from_iter(paths.into_iter().zip(values))
    }

    #[test]
    fn test_sanity() {
        let mut writer = TrieWriter::new();
        assert!(writer.is_empty());
        assert_eq!(writer.stringify(), "\n");

        writer.insert("/foo", "f");
        writer.insert("/foo/bar", "b");
        writer.insert("/foo/", "/");
        assert_eq!(writer.len(), 3);

        for (path, value) in [("/foo", "f"), ("/foo/bar", "b"), ("/foo/", "/")] {
            assert_eq!(writer.find(path), Some(&json!(value)));
        }
        for path in ["", "/", "/fo", "/foo/b", "/foo/barr", "/foo//"] {
            assert_eq!(writer.find(path), None, "{path}");
        }

        let reader = TrieReader::new(writer.stringify());
        for (path, value) in [("/foo", "f"), ("/foo/bar", "b"), ("/foo/", "/")] {
            assert_eq!(reader.find(path).unwrap(), Some(json!(value)));
        }
    }

    #[test]
    fn test_expected_output() {
        let writer = TrieWriter::from_iter([
            ("/foo", json!("f")),
            ("/foo/bar", json!("b")),
            ("/foo/", json!("/")),
        ]);
        // "f" at 0, "/" at 4, "b" at 8, node "/" at 12, node "/foo" at 21
        assert_eq!(
            writer.stringify(),
            "\"f\"\n\"/\"\n\"b\"\n:4/bar:8\n:/\\/:c\n/\\/foo:15\n"
        );
    }

    #[test]
    fn test_true_is_inlined() {
        let with_true = TrieWriter::from_iter([("/foo", true)]).stringify();
        let with_int = TrieWriter::from_iter([("/foo", 1234)]).stringify();
        assert_eq!(with_true, "/\\/foo!\n");
        assert!(with_true.len() < with_int.len());

        // a branch holding true still writes a node line, with an inline own value
        let writer = TrieWriter::from_iter([("/a", json!(true)), ("/a/b", json!(true))]);
        assert_eq!(writer.stringify(), "!/\\/b!\n/\\/a:\n");
    }

    #[test]
    fn test_values_are_deduplicated() {
        let shared = trousers([1, 2, 3, 2, 1, 3]);
        let distinct = trousers([1, 2, 3, 4, 5, 6]);
        assert!(shared.stringify().len() < distinct.stringify().len());

        let writer = TrieWriter::from_iter([("/a", json!({"x": 1})), ("/b", json!({"x": 1}))]);
        assert_eq!(writer.stringify(), "{\"x\":1}\n/a:/b:\n/\\/:8\n");
    }

    #[test]
    fn test_subtrees_are_deduplicated() {
        let writer = TrieWriter::from_iter([
            ("/en/a", 1),
            ("/en/b", 2),
            ("/fr/a", 1),
            ("/fr/b", 2),
        ]);
        let out = writer.stringify();
        assert_eq!(out.lines().filter(|l| *l == "/a:/b:2").count(), 1);
        check_lookup(writer.iter().map(|(p, v)| (p, v.clone())).collect_vec());
    }

    #[test]
    fn test_stringify_is_idempotent() {
        let writer = trousers([1, 2, 3, 4, 5, 6]);
        assert_eq!(writer.stringify(), writer.stringify());
        assert_eq!(writer.encode_to_bytes(), writer.encode_to_bytes());
    }

    #[test]
    fn test_reinsert_overwrites() {
        let mut writer = trousers([1, 2, 3, 4, 5, 6]);
        assert_eq!(writer.insert("/trains", "electric"), Some(json!(4)));
        assert_eq!(writer.len(), 6);
        assert_eq!(writer.find("/trains"), Some(&json!("electric")));
        let reader = writer.encode_to_reader();
        assert_eq!(reader.find("/trains").unwrap(), Some(json!("electric")));
        assert_eq!(reader.find("/trains/steam").unwrap(), Some(json!(5)));
    }

    #[test]
    fn test_empty_path() {
        let mut writer = TrieWriter::new();
        writer.insert("", 7);
        writer.insert("/x", 8);
        assert_eq!(writer.stringify(), "7\n8\n:/\\/x:2\n");
        let reader = writer.encode_to_reader();
        assert_eq!(reader.find("").unwrap(), Some(json!(7)));
        assert_eq!(reader.find("/x").unwrap(), Some(json!(8)));
    }

    #[test]
    fn test_newline_in_path() {
        let mut writer = TrieWriter::new();
        writer.insert("/a\nb", 1);
        writer.insert("/a\nc", 2);
        assert_eq!(writer.find("/a\nb"), Some(&json!(1)));

        let out = writer.stringify();
        assert_eq!(out, "1\n2\n/b:/c:2\n/\\/a\\n:4\n");
        let reader = TrieReader::new(out.as_str());
        assert_eq!(reader.find("/a\nb").unwrap(), Some(json!(1)));
        assert_eq!(reader.find("/a\nc").unwrap(), Some(json!(2)));
        assert_eq!(reader.find("/a").unwrap(), None);
        assert_eq!(reader.decode_to_writer().unwrap().find("/a\nc"), Some(&json!(2)));
    }

    #[test]
    fn test_bulk_insert_map() {
        let mut map = Map::new();
        map.insert("/redirects/old".into(), json!("/new"));
        map.insert("/redirects/older".into(), json!({"to": "/new", "code": 301}));
        map.insert("/meta".into(), json!([1, null, false]));

        let mut writer = TrieWriter::new();
        writer.bulk_insert(map.clone());
        assert_eq!(writer.len(), 3);
        for (path, value) in &map {
            assert_eq!(writer.find(path), Some(value));
        }
        check_lookup(map.into_iter().collect_vec());
    }

    #[test]
    fn test_edge_order_sorted_is_canonical() {
        let entries = PathSetGen::new(0xDEAD_BEEF).entries(256, 7);
        let mut forward = TrieWriter::with_edge_order(EdgeOrder::Sorted);
        forward.extend(entries.iter().cloned());
        let mut backward = TrieWriter::new();
        backward.set_edge_order(EdgeOrder::Sorted);
        backward.extend(entries.iter().rev().cloned());
        assert_eq!(forward.stringify(), backward.stringify());

        let sorted = TrieWriter::from_iter([("/b", 1), ("/a", 2)]);
        assert_eq!(sorted.stringify(), "1\n2\n/b:/a:2\n/\\/:4\n");
        let mut sorted = sorted;
        sorted.set_edge_order(EdgeOrder::Sorted);
        assert_eq!(sorted.edge_order(), EdgeOrder::Sorted);
        assert_eq!(sorted.stringify(), "2\n1\n/a:/b:2\n/\\/:4\n");
    }

    #[test]
    fn test_iter() {
        let writer = trousers([1, 2, 3, 4, 5, 6]);
        let paths = writer.iter().map(|(path, _)| path).sorted().collect_vec();
        assert_eq!(
            paths,
            [
                "/tractors",
                "/trains",
                "/trains/steam",
                "/trousers",
                "/trousers/blue",
                "/trousers/red",
            ]
        );
    }

    #[test]
    fn test_random_paths() {
        let mut set_gen = PathSetGen::new(0xDEAD_BEEF);
        for (len, distinct) in [(1, 1), (16, 2), (256, 16), (4096, 64)] {
            check_lookup(set_gen.entries(len, distinct));
        }
    }

    proptest! {
        #[test]
        fn test_writer_reader_agree_proptest(
            entries in hash_map(path_strategy(), value_strategy(), 0..64),
            probe in path_strategy(),
        ) {
            let entries = entries.into_iter().collect_vec();
            check_lookup(entries.clone());

            let expected = entries.iter().find(|(p, _)| *p == probe).map(|(_, v)| v.clone());
            for trie in mktries(entries) {
                assert_eq!(trie.find(&probe), expected, "{trie:?}");
            }
        }
    }
}
