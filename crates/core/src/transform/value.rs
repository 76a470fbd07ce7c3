//! JavaScript-style coercions over JSON values.

use std::cmp::Ordering;

use serde_json::{Map, Number, Value};

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Convert an `f64` result back to JSON, keeping integers integral.
///
/// `NaN` and infinities have no JSON form and become `null`.
pub fn number_value(n: f64) -> Value {
    if !n.is_finite() {
        return Value::Null;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        // -0.0 also lands here and serializes as 0.
        return Value::from(n as i64);
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

/// Number to string the way JavaScript prints it: shortest round-trip
/// digits, switching to exponent form at `1e21` and below `1e-6`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".into();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity".into() } else { "-Infinity".into() };
    }
    if n == 0.0 {
        return "0".into();
    }
    let sign = if n < 0.0 { "-" } else { "" };
    // `{:e}` yields the shortest digits, e.g. `1.2345e-7`.
    let scientific = format!("{:e}", n.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let len = digits.len() as i32;
    // Position of the decimal point relative to the first digit.
    let point = exponent + 1;

    let body = if len <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - len) as usize))
    } else if 0 < point && point <= 21 {
        let (whole, fraction) = digits.split_at(point as usize);
        format!("{whole}.{fraction}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat((-point) as usize))
    } else {
        let (first, rest) = digits.split_at(1);
        let fraction = if rest.is_empty() {
            String::new()
        } else {
            format!(".{rest}")
        };
        let exp_sign = if point > 0 { '+' } else { '-' };
        format!("{first}{fraction}e{exp_sign}{}", (point - 1).abs())
    };
    format!("{sign}{body}")
}

pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_numeric_string(s),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single] => parse_numeric_string(&to_js_string(single)),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

fn parse_numeric_string(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let lower = trimmed.to_ascii_lowercase();
    let radix = [("0x", 16), ("0b", 2), ("0o", 8)]
        .into_iter()
        .find(|(prefix, _)| lower.starts_with(prefix));
    if let Some((prefix, radix)) = radix {
        return u64::from_str_radix(&lower[prefix.len()..], radix).map_or(f64::NAN, |v| v as f64);
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // Rust accepts "inf"/"nan" spellings that JavaScript does not.
        _ if lower.contains("inf") || lower.contains("nan") => f64::NAN,
        _ => trimmed.parse().unwrap_or(f64::NAN),
    }
}

/// `String(value)` semantics.
pub fn to_js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => match n.as_u64() {
                Some(u) => u.to_string(),
                None => format_number(n.as_f64().unwrap_or(f64::NAN)),
            },
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => join(items, ","),
        Value::Object(_) => "[object Object]".into(),
    }
}

/// `Array.prototype.join`: `null` elements render as empty strings.
pub fn join(items: &[Value], separator: &str) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::Null => String::new(),
            other => to_js_string(other),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

pub fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
    }
}

/// `===`. Arrays and objects compare structurally.
pub fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| strict_equals(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|other| strict_equals(v, other)))
        }
        _ => left == right,
    }
}

/// `==` with JavaScript's primitive coercions.
pub fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(_), Value::Number(_))
        | (Value::Number(_), Value::String(_))
        | (Value::Bool(_), _)
        | (_, Value::Bool(_)) => to_number(left) == to_number(right),
        (Value::Array(_) | Value::Object(_), Value::String(_) | Value::Number(_))
        | (Value::String(_) | Value::Number(_), Value::Array(_) | Value::Object(_)) => {
            let l = primitive(left);
            let r = primitive(right);
            loose_equals(&l, &r)
        }
        _ => strict_equals(left, right),
    }
}

fn primitive(value: &Value) -> Value {
    match value {
        Value::Array(_) | Value::Object(_) => Value::String(to_js_string(value)),
        other => other.clone(),
    }
}

/// Relational comparison. `None` when either side is `NaN`.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    let l = primitive(left);
    let r = primitive(right);
    match (&l, &r) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => to_number(&l).partial_cmp(&to_number(&r)),
    }
}

/// `+`: string concatenation if either side is (or becomes) a string.
pub fn add(left: &Value, right: &Value) -> Value {
    let l = primitive(left);
    let r = primitive(right);
    if l.is_string() || r.is_string() {
        let mut out = to_js_string(&l);
        out.push_str(&to_js_string(&r));
        return Value::String(out);
    }
    number_value(to_number(&l) + to_number(&r))
}

/// Key used when a value indexes an object.
pub fn property_key(value: &Value) -> String {
    to_js_string(value)
}

/// Parse an array index from a property key, e.g. `"3"`.
pub fn array_index(key: &Value) -> Option<usize> {
    match key {
        Value::Number(n) => n.as_u64().map(|u| u as usize).or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as usize)
        }),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s.parse().ok(),
        _ => None,
    }
}

/// Resolve a relative index (`-1` = last) against a length.
pub fn relative_index(index: f64, len: usize) -> usize {
    let len_f = len as f64;
    let index = if index.is_nan() { 0.0 } else { index.trunc() };
    if index < 0.0 {
        (len_f + index).max(0.0) as usize
    } else {
        index.min(len_f) as usize
    }
}

pub fn empty_object() -> Value {
    Value::Object(Map::new())
}
