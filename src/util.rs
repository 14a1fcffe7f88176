/// Returns the length in bytes of the longest common prefix of `a` and `b`.
/// The result always falls on a char boundary of both strings.
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map_or_else(|| a.len().min(b.len()), |((idx, _), _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_prefix_len() {
        assert_eq!(common_prefix_len("", ""), 0);
        assert_eq!(common_prefix_len("/foo", ""), 0);
        assert_eq!(common_prefix_len("/foo", "/foo"), 4);
        assert_eq!(common_prefix_len("/foo", "/foo/bar"), 4);
        assert_eq!(common_prefix_len("/foo/bar", "/foo"), 4);
        assert_eq!(common_prefix_len("/trousers", "/trains"), 3);
        assert_eq!(common_prefix_len("x", "y"), 0);
    }

    #[test]
    fn test_common_prefix_char_boundary() {
        // 'é' and 'ê' share their first utf-8 byte
        assert_eq!(common_prefix_len("/é", "/ê"), 1);
        assert_eq!(common_prefix_len("/éa", "/éb"), 3);
    }
}
