//! Leaf values are stored as compact JSON. Compact JSON escapes every control
//! character inside strings, so a literal never contains a raw newline.

use serde_json::Value;

use crate::codec::DecodeErr;

/// Returns true if `value` is exactly the boolean `true`.
#[inline]
pub fn is_true(value: &Value) -> bool {
    matches!(value, Value::Bool(true))
}

pub fn encode_literal(value: &Value) -> String {
    let literal = value.to_string();
    debug_assert!(
        !literal.contains('\n'),
        "BUG: literal contains a raw newline"
    );
    literal
}

pub fn decode_literal(text: &str, offset: usize) -> Result<Value, DecodeErr> {
    serde_json::from_str(text).map_err(|source| DecodeErr::InvalidLiteral { offset, source })
}
