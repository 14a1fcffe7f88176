use std::{collections::HashMap, fmt::Debug};

use bytes::Bytes;
use itertools::Itertools;
use proptest::prelude::*;
use rand::{SeedableRng, seq::index};
use serde_json::Value;

use crate::{TrieReader, TrieWriter};

pub fn mkwriter<K: AsRef<str>>(entries: impl IntoIterator<Item = (K, Value)>) -> TrieWriter {
    TrieWriter::from_iter(entries)
}

pub fn mkreader<K: AsRef<str>>(entries: impl IntoIterator<Item = (K, Value)>) -> TrieReader<Bytes> {
    mkwriter(entries).encode_to_reader()
}

/// Create a pair of `TrieWriter` and `TrieReader` from the same entries.
pub fn mktries(entries: impl IntoIterator<Item = (String, Value)> + Clone) -> [TestTrie; 2] {
    let writer = mkwriter(entries.clone());
    let reader = mkreader(entries);
    [TestTrie::Writer(writer), TestTrie::Reader(reader)]
}

/// Asserts that every entry can be found in both a writer and a reader built
/// from `entries`, and that paths one char shorter or longer are only found
/// when they were inserted themselves. Later entries win over earlier ones.
#[track_caller]
pub fn check_lookup(entries: Vec<(String, Value)>) {
    let expected: HashMap<&str, &Value> = entries.iter().map(|(p, v)| (p.as_str(), v)).collect();

    for trie in mktries(entries.iter().cloned()) {
        for (&path, &value) in &expected {
            assert_eq!(trie.find(path).as_ref(), Some(value), "{trie:?} path {path:?}");

            let longer = format!("{path}~");
            assert_eq!(
                trie.find(&longer).as_ref(),
                expected.get(longer.as_str()).copied(),
                "{trie:?} path {longer:?}"
            );

            if let Some((idx, _)) = path.char_indices().last() {
                let shorter = &path[..idx];
                assert_eq!(
                    trie.find(shorter).as_ref(),
                    expected.get(shorter).copied(),
                    "{trie:?} path {shorter:?}"
                );
            }
        }
    }
}

#[derive(Clone)]
pub enum TestTrie {
    Writer(TrieWriter),
    Reader(TrieReader<Bytes>),
}

impl TestTrie {
    pub fn find(&self, path: &str) -> Option<Value> {
        match self {
            Self::Writer(writer) => writer.find(path).cloned(),
            Self::Reader(reader) => reader.find(path).unwrap(),
        }
    }
}

impl Debug for TestTrie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Writer(writer) => {
                let prefix: Vec<_> = writer.iter().take(10).collect();
                f.debug_struct("TrieWriter")
                    .field("len", &writer.len())
                    .field("prefix", &prefix)
                    .finish()
            }
            Self::Reader(reader) => f.debug_tuple("TrieReader").field(reader).finish(),
        }
    }
}

/// Path segments used by [`PathSetGen`]. Includes chars that need escaping
/// and multi-byte chars.
const SEGMENTS: &[&str] = &[
    "api",
    "v1",
    "v2",
    "users",
    "trousers",
    "trains",
    "tractors",
    "fancy/paths",
    "a:b",
    "bang!",
    r"back\slash",
    "ünïcödé",
];

const MAX_DEPTH: usize = 4;

pub struct PathSetGen {
    rng: rand::rngs::StdRng,
}

impl PathSetGen {
    pub fn new(seed: u64) -> Self {
        let rng = rand::rngs::StdRng::seed_from_u64(seed);
        Self { rng }
    }

    /// Returns up to `len` distinct paths built from 1 to 4 segments.
    pub fn paths(&mut self, len: usize) -> Vec<String> {
        let space = MAX_DEPTH * SEGMENTS.len().pow(MAX_DEPTH as u32);
        index::sample(&mut self.rng, space, len.min(space))
            .into_iter()
            .map(mkpath)
            .unique()
            .collect()
    }

    /// Returns up to `len` entries with distinct paths, cycling through
    /// `distinct` different values. The first value is always `true`.
    pub fn entries(&mut self, len: usize, distinct: usize) -> Vec<(String, Value)> {
        let distinct = distinct.max(1);
        self.paths(len)
            .into_iter()
            .enumerate()
            .map(|(i, path)| {
                let value = match i % distinct {
                    0 => Value::Bool(true),
                    n if n % 2 == 0 => Value::from(n),
                    n => Value::from(format!("/target/{n}")),
                };
                (path, value)
            })
            .collect()
    }
}

fn mkpath(mut idx: usize) -> String {
    let depth = idx % MAX_DEPTH + 1;
    idx /= MAX_DEPTH;
    let mut path = String::new();
    for _ in 0..depth {
        path.push('/');
        path.push_str(SEGMENTS[idx % SEGMENTS.len()]);
        idx /= SEGMENTS.len();
    }
    path
}

/// Short paths over a small alphabet, so that generated sets share prefixes
/// and exercise every escape.
pub fn path_strategy() -> impl Strategy<Value = String> {
    r"[/a-c:!\\é\n]{0,8}"
}

pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z\n \"]{0,6}".prop_map(Value::String),
        proptest::collection::vec(any::<u8>(), 0..4).prop_map(Value::from),
    ]
}
