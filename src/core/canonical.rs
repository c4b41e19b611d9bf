//! Canonical JSON Serialization
//!
//! Deterministic text encoding of structured values for commitment hashing.
//! Every participant (bot SDKs, the match server verifier) must produce the
//! same bytes for the same logical value, so the format is pinned exactly:
//!
//! - No whitespace anywhere.
//! - Arrays keep element order.
//! - Object keys are sorted by byte-wise (UTF-8) order.
//! - Strings escape everything outside printable ASCII as `\uXXXX`.
//! - Floats use the shortest round-trip digits, laid out like the
//!   verifier's `repr` (`8.0`, `0.35`, `1e-05`, `1e+16`).

use serde::Serialize;
use serde_json::{Number, Value};

/// Encode a value canonically.
///
/// Pure and total: the same structural value always yields the same string,
/// regardless of how its objects were built.
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Encode any serializable value canonically.
///
/// The value is first converted to a [`Value`], so typed data and literal
/// JSON with the same structure produce the same text.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    Ok(canonicalize(&value))
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(number) => write_number(out, number),
        Value::String(text) => write_string(out, text),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            // Keys are unique, so an unstable sort is still deterministic.
            entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

fn write_number(out: &mut String, number: &Number) {
    if let Some(int) = number.as_i64() {
        out.push_str(&int.to_string());
    } else if let Some(uint) = number.as_u64() {
        out.push_str(&uint.to_string());
    } else if let Some(float) = number.as_f64() {
        out.push_str(&format_float(float));
    } else {
        // Only reachable with arbitrary-precision numbers.
        out.push_str(&number.to_string());
    }
}

/// Format a float in shortest round-trip form.
///
/// Decimal notation is used for decimal exponents in `-4..16`, scientific
/// notation (`d.ddde±XX`) otherwise. Integral floats keep a `.0` suffix.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // `{:e}` yields the shortest digits that round-trip, e.g. "-1.25e-7".
    let scientific = format!("{:e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };

    let negative = mantissa.starts_with('-');
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let digits = prefer_even(value.abs(), digits, exponent);

    let mut out = String::with_capacity(digits.len() + 8);
    if negative {
        out.push('-');
    }

    if (-4..16).contains(&exponent) {
        if exponent >= 0 {
            let int_len = exponent as usize + 1;
            if digits.len() <= int_len {
                out.push_str(&digits);
                out.extend(std::iter::repeat('0').take(int_len - digits.len()));
                out.push_str(".0");
            } else {
                out.push_str(&digits[..int_len]);
                out.push('.');
                out.push_str(&digits[int_len..]);
            }
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat('0').take((-exponent - 1) as usize));
            out.push_str(&digits);
        }
    } else {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if exponent < 0 { '-' } else { '+' });
        out.push_str(&format!("{:02}", exponent.unsigned_abs()));
    }

    out
}

/// When the value sits exactly halfway between two shortest digit strings,
/// pick the one ending in an even digit. `{:e}` rounds such ties up.
fn prefer_even(magnitude: f64, digits: String, exponent: i32) -> String {
    // Two shortest candidates can only share one f64 at 16+ digits.
    let Some(last) = digits.bytes().last().map(|b| b - b'0') else {
        return digits;
    };
    if digits.len() < 16 || last % 2 == 0 {
        return digits;
    }

    // 767 fractional digits cover the exact expansion of any f64.
    let exact = format!("{:.767e}", magnitude);
    let Some((mantissa, exact_exponent)) = exact.split_once('e') else {
        return digits;
    };
    if exact_exponent.parse::<i32>().ok() != Some(exponent) {
        return digits;
    }
    let exact_digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let exact_digits = exact_digits.trim_end_matches('0');

    let stem = &digits[..digits.len() - 1];
    for neighbour in [last - 1, last + 1] {
        if neighbour > 9 {
            continue;
        }
        let midpoint = format!("{}{}5", stem, neighbour.min(last));
        if exact_digits != midpoint {
            continue;
        }
        let candidate = format!("{}{}", stem, neighbour);
        let reparsed = format!("{}.{}e{}", &candidate[..1], &candidate[1..], exponent).parse::<f64>();
        if reparsed.ok() == Some(magnitude) {
            return candidate;
        }
    }
    digits
}

fn write_string(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ' '..='~' => out.push(ch),
            _ => {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
        }
    }
    out.push('"');
}

// =============================================================================
// TESTS
// =============================================================================
