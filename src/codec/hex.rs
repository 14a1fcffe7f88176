//! Offsets are written as lowercase hex without leading zeros. Zero is
//! written as the empty string.

use std::fmt::Write;

/// Appends the hex form of `offset` to `out`.
pub fn encode_offset(out: &mut String, offset: usize) {
    if offset != 0 {
        write!(out, "{offset:x}").expect("BUG: failed to write to String");
    }
}

/// Parses a run of hex digits. Returns `None` on any non lowercase hex
/// digit, on a leading zero, or on overflow.
pub fn decode_offset(digits: &[u8]) -> Option<usize> {
    if digits.first() == Some(&b'0') {
        return None;
    }
    digits.iter().try_fold(0usize, |acc, &d| {
        let nibble = match d {
            b'0'..=b'9' => d - b'0',
            b'a'..=b'f' => d - b'a' + 10,
            _ => return None,
        };
        acc.checked_mul(16)?.checked_add(nibble as usize)
    })
}

/// Returns true if `b` may appear in an encoded offset.
#[inline]
pub fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_digit() || (b'a'..=b'f').contains(&b)
}
