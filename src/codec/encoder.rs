use std::collections::HashMap;

use bytes::BufMut;

const NEWLINE: &[u8] = b"\n";

pub struct Encoder<B: BufMut> {
    buf: B,
    bytes_written: usize,
    /// Offsets of every line written so far, keyed by line text.
    lines: HashMap<String, usize>,
    dedup_hits: usize,
    wrote_root: bool,
}

impl<B: BufMut> Encoder<B> {
    pub fn new(buf: B) -> Self {
        Self {
            buf,
            bytes_written: 0,
            lines: HashMap::new(),
            dedup_hits: 0,
            wrote_root: false,
        }
    }

    /// Retrieve the wrapped buffer from the `Encoder`
    pub fn into_inner(self) -> B {
        self.buf
    }

    /// Write an entire encoded trie to the buffer
    pub(crate) fn write_trie(&mut self, trie: &[u8]) {
        self.buf.put_slice(trie);
        self.bytes_written += trie.len();
        // assuming the trie is valid, it already ends with its root
        self.wrote_root = true;
    }

    /// The total number of bytes written to the buffer since this Encoder was
    /// initialized.
    pub(crate) fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// The number of distinct lines written, not counting the root.
    pub(crate) fn lines_written(&self) -> usize {
        self.lines.len()
    }

    /// The number of lines that were satisfied by an earlier identical line.
    pub(crate) fn dedup_hits(&self) -> usize {
        self.dedup_hits
    }

    /// Write a line unless an identical line was already written. Returns the
    /// offset of the line.
    pub(crate) fn put_line(&mut self, line: String) -> usize {
        assert!(!self.wrote_root, "invalid encoder usage: root already written");
        if let Some(&offset) = self.lines.get(&line) {
            self.dedup_hits += 1;
            return offset;
        }
        let offset = self.put_raw_line(&line);
        self.lines.insert(line, offset);
        offset
    }

    /// Write the root line. The root is always appended, never deduplicated,
    /// and must be the last line written.
    pub(crate) fn put_root(&mut self, line: &str) -> usize {
        assert!(!self.wrote_root, "invalid encoder usage: root already written");
        self.wrote_root = true;
        self.put_raw_line(line)
    }

    fn put_raw_line(&mut self, line: &str) -> usize {
        assert!(
            !line.as_bytes().contains(&b'\n'),
            "BUG: line contains a raw newline"
        );
        let offset = self.bytes_written;
        self.buf.put_slice(line.as_bytes());
        self.buf.put_slice(NEWLINE);
        self.bytes_written += line.len() + NEWLINE.len();
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup() {
        let mut encoder = Encoder::new(Vec::<u8>::new());
        assert_eq!(encoder.put_line("1".into()), 0);
        assert_eq!(encoder.put_line("\"a\"".into()), 2);
        assert_eq!(encoder.put_line("1".into()), 0);
        assert_eq!(encoder.put_root("/x:/y:2"), 6);
        assert_eq!(encoder.dedup_hits(), 1);
        assert_eq!(encoder.lines_written(), 2);
        assert_eq!(encoder.bytes_written(), 14);
        assert_eq!(encoder.into_inner(), b"1\n\"a\"\n/x:/y:2\n");
    }

    #[test]
    #[should_panic(expected = "root already written")]
    fn test_nothing_after_root() {
        let mut encoder = Encoder::new(Vec::<u8>::new());
        encoder.put_root("");
        encoder.put_line("1".into());
    }
}
