#![forbid(unsafe_code)]

//! Numeric coercion for input bindings.
//!
//! Form inputs report their contents as text. A binding over a numeric
//! property coerces the text back to a number following JavaScript's
//! `Number(x)` conversion, since that is what browser-shaped input events
//! expect. NaN and infinities have no JSON representation and become `null`.

use serde_json::{Number, Value};

/// Largest integer magnitude an f64 represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Coerce `value` to a JSON number, or `null` when the result is not finite.
#[must_use]
pub fn to_number(value: &Value) -> Value {
    number_value(numeric(value))
}

fn numeric(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_text(s),
        // Sequences go through their text form: [] is "", [x] is x's text.
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [only] => match only {
                Value::Bool(_) | Value::Object(_) => f64::NAN,
                other => numeric(other),
            },
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

fn parse_text(text: &str) -> f64 {
    let t = text.trim();
    if t.is_empty() {
        return 0.0;
    }
    let radix = match t.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &t[2..];
        if digits.starts_with('+') {
            return f64::NAN;
        }
        return u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
    }
    // Rust accepts "inf" and "nan" spellings JavaScript rejects; both sides
    // end non-finite, which maps to null either way.
    t.parse::<f64>().unwrap_or(f64::NAN)
}

fn number_value(n: f64) -> Value {
    if !n.is_finite() {
        return Value::Null;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}
