use std::borrow::Cow;

use crate::codec::DecodeErr;

const ESCAPE: u8 = b'\\';

/// A raw newline would end the line, so it is written as `\n`.
const NEWLINE: u8 = b'\n';
const NEWLINE_ESCAPED: u8 = b'n';

#[inline]
fn needs_escape(b: u8) -> bool {
    matches!(b, b'/' | b':' | b'!' | ESCAPE | NEWLINE)
}

#[inline]
fn is_escapable(b: u8) -> bool {
    matches!(b, b'/' | b':' | b'!' | ESCAPE | NEWLINE_ESCAPED)
}

/// Appends `label` to `out`, prefixing each of `/`, `:`, `!` and `\` with a
/// backslash. Newlines are written as `\n`.
pub fn push_escaped(out: &mut String, label: &str) {
    let mut rest = label;
    while let Some(idx) = rest.bytes().position(needs_escape) {
        out.push_str(&rest[..idx]);
        out.push(ESCAPE as char);
        match rest.as_bytes()[idx] {
            NEWLINE => out.push(NEWLINE_ESCAPED as char),
            _ => out.push_str(&rest[idx..idx + 1]),
        }
        rest = &rest[idx + 1..];
    }
    out.push_str(rest);
}

/// Splits an escaped label off the front of `line`.
///
/// The label ends at the first unescaped `:` or `!`, which is left at the
/// front of the returned remainder. An unescaped `/` or the end of the line
/// before a value marker is a malformed line. `offset` is only used for
/// error reporting.
pub fn split_label(line: &str, offset: usize) -> Result<(Cow<'_, str>, &str), DecodeErr> {
    let bytes = line.as_bytes();
    let mut escaped = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            ESCAPE => {
                match bytes.get(i + 1) {
                    Some(&next) if is_escapable(next) => {}
                    _ => return Err(DecodeErr::InvalidEscape { offset }),
                }
                escaped = true;
                i += 2;
            }
            b':' | b'!' => {
                let (raw, rest) = line.split_at(i);
                let label = if escaped {
                    Cow::Owned(unescape(raw))
                } else {
                    Cow::Borrowed(raw)
                };
                return Ok((label, rest));
            }
            b'/' => return Err(DecodeErr::MalformedLine { offset }),
            _ => i += 1,
        }
    }
    Err(DecodeErr::MalformedLine { offset })
}

// `raw` has already been validated by `split_label`
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(idx) = rest.bytes().position(|b| b == ESCAPE) {
        out.push_str(&rest[..idx]);
        match rest.as_bytes()[idx + 1] {
            NEWLINE_ESCAPED => out.push(NEWLINE as char),
            _ => out.push_str(&rest[idx + 1..idx + 2]),
        }
        rest = &rest[idx + 2..];
    }
    out.push_str(rest);
    out
}
