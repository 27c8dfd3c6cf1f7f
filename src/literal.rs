//! Numeric literal parsing for ids, opcodes, base ids and windows.
//!
//! Literals arrive as text from the parsed model. A literal is read as a
//! decimal first (integers, or floats truncated toward zero such as `"10.0"`),
//! and only when that fails as hexadecimal, with or without a `0x` prefix.
//!
//! ```text
//! "26"   → 26      "10.0" → 10     "1e2" → 100
//! "0x1A" → 26      "1A"   → 26     ""    → invalid
//! ```

use crate::Id;

/// Parse a signed integer literal. Returns `None` when neither stage accepts it.
pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    parse_decimal(text).or_else(|| parse_hex(text))
}

/// Parse a literal that must be a non-negative id or opcode.
pub fn parse_id(text: &str) -> Option<Id> {
    parse_int(text).and_then(|v| Id::try_from(v).ok())
}

/// Parse a literal and keep only its magnitude.
///
/// Instance base ids and windows are absolute values: `"-16"` reads as 16.
pub fn parse_magnitude(text: &str) -> Option<Id> {
    parse_int(text).map(i64::unsigned_abs)
}

/// Parse an assembly base id. Negative values read as 0; the allocation
/// floor then lifts every non-positive base id to 1.
pub fn parse_assembly_base(text: &str) -> Option<Id> {
    parse_int(text).map(clamp_non_negative)
}

/// Map a signed value to an id, sending negatives to 0.
pub fn clamp_non_negative(value: i64) -> Id {
    Id::try_from(value).unwrap_or(0)
}

fn parse_decimal(text: &str) -> Option<i64> {
    if let Ok(v) = text.parse::<i64>() {
        return Some(v);
    }
    let f = text.parse::<f64>().ok()?;
    if !f.is_finite() {
        return None;
    }
    let truncated = f.trunc();
    // i64::MAX is not exactly representable; stay strictly inside the range.
    if truncated >= -(2f64.powi(63)) && truncated < 2f64.powi(63) {
        Some(truncated as i64)
    } else {
        None
    }
}

fn parse_hex(text: &str) -> Option<i64> {
    let (negative, rest) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let digits = rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))
        .unwrap_or(rest);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let magnitude = i64::from_str_radix(digits, 16).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
