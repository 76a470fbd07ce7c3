//! Built-in functions and methods that do not take callbacks.
//!
//! Each `*_method` function returns `Ok(None)` when the receiver has no such
//! method, letting the evaluator produce a uniform "is not a function" error.

use serde_json::{Map, Value};

use super::value::{
    array_index, format_number, join, number_value, property_key, relative_index, strict_equals,
    to_js_string, to_number, truthy,
};
use super::TransformError;

/// Namespaces that may prefix a global call, e.g. `Math.max`.
pub const NAMESPACES: &[&str] = &["Math", "Object", "JSON", "Array", "Number", "String"];

/// Free functions and namespaced functions callable from expressions.
pub const GLOBAL_FUNCTIONS: &[&str] = &[
    "Number",
    "String",
    "Boolean",
    "parseInt",
    "parseFloat",
    "isNaN",
    "Math.round",
    "Math.floor",
    "Math.ceil",
    "Math.abs",
    "Math.trunc",
    "Math.sign",
    "Math.sqrt",
    "Math.pow",
    "Math.min",
    "Math.max",
    "Object.keys",
    "Object.values",
    "Object.entries",
    "Object.fromEntries",
    "Object.assign",
    "JSON.stringify",
    "JSON.parse",
    "Array.isArray",
    "Number.isInteger",
    "Number.isFinite",
    "Number.parseFloat",
    "Number.parseInt",
];

/// Longest string `padStart`/`padEnd` will build.
const MAX_PADDED_LEN: usize = 1 << 20;

pub fn is_global_function(path: &str) -> bool {
    GLOBAL_FUNCTIONS.contains(&path)
}

/// Non-function members of the global namespaces, e.g. `Math.PI`.
pub fn namespace_constant(namespace: &str, name: &str) -> Option<Value> {
    let n = match (namespace, name) {
        ("Math", "PI") => std::f64::consts::PI,
        ("Math", "E") => std::f64::consts::E,
        ("Number", "MAX_SAFE_INTEGER") => 9_007_199_254_740_991.0,
        ("Number", "MIN_SAFE_INTEGER") => -9_007_199_254_740_991.0,
        _ => return None,
    };
    Some(number_value(n))
}

fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&Value::Null)
}

fn num_arg(args: &[Value], index: usize) -> f64 {
    to_number(arg(args, index))
}

/// Call a global function by its dotted path.
pub fn call_global(path: &str, args: &[Value]) -> Result<Value, TransformError> {
    let math = |f: fn(f64) -> f64| Ok(number_value(f(num_arg(args, 0))));

    match path {
        "Number" => Ok(number_value(if args.is_empty() { 0.0 } else { num_arg(args, 0) })),
        "String" => Ok(Value::String(if args.is_empty() {
            String::new()
        } else {
            to_js_string(arg(args, 0))
        })),
        "Boolean" => Ok(Value::Bool(truthy(arg(args, 0)))),
        "parseInt" | "Number.parseInt" => Ok(number_value(parse_int(
            &to_js_string(arg(args, 0)),
            args.get(1).map(to_number),
        ))),
        "parseFloat" | "Number.parseFloat" => {
            Ok(number_value(parse_float(&to_js_string(arg(args, 0)))))
        }
        "isNaN" => Ok(Value::Bool(num_arg(args, 0).is_nan())),
        "Math.round" => math(|x| (x + 0.5).floor()),
        "Math.floor" => math(f64::floor),
        "Math.ceil" => math(f64::ceil),
        "Math.abs" => math(f64::abs),
        "Math.trunc" => math(f64::trunc),
        "Math.sqrt" => math(f64::sqrt),
        "Math.sign" => math(|x| if x == 0.0 || x.is_nan() { x } else { x.signum() }),
        "Math.pow" => Ok(number_value(num_arg(args, 0).powf(num_arg(args, 1)))),
        "Math.min" => Ok(number_value(
            args.iter()
                .map(to_number)
                .fold(f64::INFINITY, |acc, x| if x.is_nan() || acc.is_nan() { f64::NAN } else { acc.min(x) }),
        )),
        "Math.max" => Ok(number_value(
            args.iter()
                .map(to_number)
                .fold(f64::NEG_INFINITY, |acc, x| if x.is_nan() || acc.is_nan() { f64::NAN } else { acc.max(x) }),
        )),
        "Object.keys" => Ok(Value::Array(
            entries(arg(args, 0)).into_iter().map(|(k, _)| Value::String(k)).collect(),
        )),
        "Object.values" => Ok(Value::Array(
            entries(arg(args, 0)).into_iter().map(|(_, v)| v).collect(),
        )),
        "Object.entries" => Ok(Value::Array(
            entries(arg(args, 0))
                .into_iter()
                .map(|(k, v)| Value::Array(vec![Value::String(k), v]))
                .collect(),
        )),
        "Object.fromEntries" => from_entries(arg(args, 0)),
        "Object.assign" => {
            let mut out = Map::new();
            for source in args {
                out.extend(entries(source));
            }
            Ok(Value::Object(out))
        }
        "JSON.stringify" => stringify(arg(args, 0), args.get(2)),
        "JSON.parse" => serde_json::from_str(&to_js_string(arg(args, 0)))
            .map_err(|e| TransformError::runtime(format!("SyntaxError: JSON.parse: {e}"))),
        "Array.isArray" => Ok(Value::Bool(arg(args, 0).is_array())),
        "Number.isInteger" => Ok(Value::Bool(
            arg(args, 0).as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0),
        )),
        "Number.isFinite" => Ok(Value::Bool(arg(args, 0).as_f64().is_some_and(f64::is_finite))),
        other => Err(TransformError::runtime(format!(
            "TypeError: {other} is not a function"
        ))),
    }
}

/// Own enumerable entries, in the order `Object.keys` reports them.
fn entries(value: &Value) -> Vec<(String, Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect(),
        Value::String(s) => s
            .chars()
            .enumerate()
            .map(|(i, c)| (i.to_string(), Value::String(c.to_string())))
            .collect(),
        _ => Vec::new(),
    }
}

fn from_entries(value: &Value) -> Result<Value, TransformError> {
    let Value::Array(pairs) = value else {
        return Err(TransformError::runtime(
            "TypeError: Object.fromEntries requires an array of [key, value] pairs",
        ));
    };
    let mut out = Map::new();
    for pair in pairs {
        match pair {
            Value::Array(kv) => {
                out.insert(
                    property_key(kv.first().unwrap_or(&Value::Null)),
                    kv.get(1).cloned().unwrap_or(Value::Null),
                );
            }
            other => {
                return Err(TransformError::runtime(format!(
                    "TypeError: Iterator value {} is not an entry object",
                    to_js_string(other)
                )))
            }
        }
    }
    Ok(Value::Object(out))
}

fn stringify(value: &Value, indent: Option<&Value>) -> Result<Value, TransformError> {
    let width = match indent {
        Some(Value::Number(n)) => n.as_f64().map_or(0, |f| f.clamp(0.0, 10.0) as usize),
        Some(Value::String(s)) => s.chars().take(10).count(),
        _ => 0,
    };
    let text = if width == 0 {
        serde_json::to_string(value)
    } else {
        let pad = match indent {
            Some(Value::String(s)) => s.chars().take(10).collect::<String>(),
            _ => " ".repeat(width),
        };
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(pad.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        serde::Serialize::serialize(value, &mut ser)
            .map(|()| String::from_utf8_lossy(&buf).into_owned())
    };
    text.map(Value::String)
        .map_err(|e| TransformError::runtime(format!("TypeError: JSON.stringify: {e}")))
}

fn parse_int(input: &str, radix: Option<f64>) -> f64 {
    let s = input.trim_start();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let explicit = radix.filter(|r| !r.is_nan() && *r != 0.0).map(|r| r as u32);
    let mut radix = explicit.unwrap_or(10);
    let mut digits = s;
    if matches!(explicit, None | Some(16)) {
        if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            radix = 16;
            digits = rest;
        }
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    let valid: String = digits.chars().take_while(|c| c.is_digit(radix)).collect();
    if valid.is_empty() {
        return f64::NAN;
    }
    let value = valid
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0f64, |acc, d| acc * f64::from(radix) + f64::from(d));
    if negative {
        -value
    } else {
        value
    }
}

fn parse_float(input: &str) -> f64 {
    let s = input.trim_start();
    if s.starts_with("Infinity") || s.starts_with("+Infinity") {
        return f64::INFINITY;
    }
    if s.starts_with("-Infinity") {
        return f64::NEG_INFINITY;
    }
    // Longest prefix that parses as a decimal literal.
    let candidate: String = s
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        .collect();
    (1..=candidate.len())
        .rev()
        .find_map(|end| candidate[..end].parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Methods on string receivers.
pub fn string_method(s: &str, name: &str, args: &[Value]) -> Result<Option<Value>, TransformError> {
    let text = |i: usize| to_js_string(arg(args, i));
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();

    let value = match name {
        "toUpperCase" => Value::String(s.to_uppercase()),
        "toLowerCase" => Value::String(s.to_lowercase()),
        "trim" => Value::String(s.trim().to_string()),
        "trimStart" => Value::String(s.trim_start().to_string()),
        "trimEnd" => Value::String(s.trim_end().to_string()),
        "toString" => Value::String(s.to_string()),
        "includes" => Value::Bool(s.contains(text(0).as_str())),
        "startsWith" => Value::Bool(s.starts_with(text(0).as_str())),
        "endsWith" => Value::Bool(s.ends_with(text(0).as_str())),
        "indexOf" => number_value(char_index(s, s.find(text(0).as_str()))),
        "lastIndexOf" => number_value(char_index(s, s.rfind(text(0).as_str()))),
        "replace" => Value::String(s.replacen(text(0).as_str(), &text(1), 1)),
        "replaceAll" => Value::String(s.replace(text(0).as_str(), &text(1))),
        "concat" => {
            let mut out = s.to_string();
            for a in args {
                out.push_str(&to_js_string(a));
            }
            Value::String(out)
        }
        "charAt" => {
            let i = num_arg(args, 0);
            let c = if i >= 0.0 { chars.get(i as usize) } else { None };
            Value::String(c.map(char::to_string).unwrap_or_default())
        }
        "at" => {
            let i = num_arg(args, 0).trunc();
            let index = if i < 0.0 { len as f64 + i } else { i };
            if index < 0.0 {
                Value::Null
            } else {
                chars.get(index as usize).map_or(Value::Null, |c| Value::String(c.to_string()))
            }
        }
        "slice" => {
            let start = relative_index(num_arg(args, 0), len);
            let end = match args.get(1) {
                Some(Value::Null) | None => len,
                Some(v) => relative_index(to_number(v), len),
            };
            Value::String(chars[start..end.max(start)].iter().collect())
        }
        "substring" => {
            let clamp = |v: f64| if v.is_nan() { 0 } else { v.clamp(0.0, len as f64) as usize };
            let a = clamp(num_arg(args, 0));
            let b = match args.get(1) {
                Some(Value::Null) | None => len,
                Some(v) => clamp(to_number(v)),
            };
            let (start, end) = if a <= b { (a, b) } else { (b, a) };
            Value::String(chars[start..end].iter().collect())
        }
        "split" => {
            let limit = match args.get(1) {
                Some(Value::Null) | None => usize::MAX,
                Some(v) => to_number(v).max(0.0) as usize,
            };
            let parts: Vec<Value> = match args.first() {
                None | Some(Value::Null) => vec![Value::String(s.to_string())],
                Some(sep) => {
                    let sep = to_js_string(sep);
                    if sep.is_empty() {
                        chars.iter().map(|c| Value::String(c.to_string())).collect()
                    } else {
                        s.split(sep.as_str()).map(|p| Value::String(p.to_string())).collect()
                    }
                }
            };
            Value::Array(parts.into_iter().take(limit).collect())
        }
        "padStart" | "padEnd" => {
            let target = num_arg(args, 0);
            let target = if target.is_nan() { 0 } else { target.max(0.0) as usize };
            if target > MAX_PADDED_LEN {
                return Err(TransformError::runtime("RangeError: Invalid string length"));
            }
            let fill = match args.get(1) {
                Some(Value::Null) | None => " ".to_string(),
                Some(v) => to_js_string(v),
            };
            if target <= len || fill.is_empty() {
                Value::String(s.to_string())
            } else {
                let pad: String = fill.chars().cycle().take(target - len).collect();
                Value::String(if name == "padStart" {
                    format!("{pad}{s}")
                } else {
                    format!("{s}{pad}")
                })
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn char_index(s: &str, byte_index: Option<usize>) -> f64 {
    byte_index.map_or(-1.0, |b| s[..b].chars().count() as f64)
}

/// Methods on number receivers.
pub fn number_method(n: f64, name: &str, args: &[Value]) -> Result<Option<Value>, TransformError> {
    let value = match name {
        "toFixed" => {
            let digits = num_arg(args, 0);
            let digits = if digits.is_nan() { 0.0 } else { digits };
            if !(0.0..=100.0).contains(&digits) {
                return Err(TransformError::runtime(
                    "RangeError: toFixed() digits argument must be between 0 and 100",
                ));
            }
            if n.is_finite() && n.abs() < 1e21 {
                Value::String(to_fixed(n, digits as usize))
            } else {
                Value::String(format_number(n))
            }
        }
        "toString" => match args.first().map(to_number) {
            None => Value::String(format_number(n)),
            Some(radix) if radix == 10.0 => Value::String(format_number(n)),
            Some(radix) if (2.0..=36.0).contains(&radix) && n.fract() == 0.0 && n.is_finite() => {
                Value::String(to_radix(n, radix as u32))
            }
            Some(_) => {
                return Err(TransformError::runtime(
                    "RangeError: toString() radix must be between 2 and 36 for integers",
                ))
            }
        },
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Fixed-point rendering that rounds exact halves away from zero; `format!`
/// alone would round them to even.
fn to_fixed(n: f64, digits: usize) -> String {
    let sign = if n < 0.0 { "-" } else { "" };
    let x = n.abs();
    if !is_half_tie(x, digits) {
        return format!("{sign}{x:.digits$}");
    }
    // A tie has exactly `digits + 1` decimals, the last being 5.
    let exact = format!("{:.*}", digits + 1, x);
    let mut out: Vec<u8> = exact.bytes().take(exact.len() - 1).collect();
    if out.last() == Some(&b'.') {
        out.pop();
    }
    let mut i = out.len();
    loop {
        if i == 0 {
            out.insert(0, b'1');
            break;
        }
        i -= 1;
        match out[i] {
            b'.' => continue,
            b'9' => out[i] = b'0',
            _ => {
                out[i] += 1;
                break;
            }
        }
    }
    format!("{sign}{}", String::from_utf8_lossy(&out))
}

/// Whether `x * 10^digits` lies exactly halfway between two integers.
fn is_half_tie(x: f64, digits: usize) -> bool {
    let bits = x.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased - 1075)
    };
    if mantissa == 0 {
        return false;
    }
    // x * 10^d = odd * 5^d * 2^(e + d) once trailing zero bits move into e,
    // which is a half exactly when that power is -1.
    let e = exponent + i64::from(mantissa.trailing_zeros());
    e + digits as i64 == -1
}

fn to_radix(n: f64, radix: u32) -> String {
    let negative = n < 0.0;
    let mut value = n.abs() as u128;
    if value == 0 {
        return "0".into();
    }
    let mut digits = Vec::new();
    while value > 0 {
        let d = (value % u128::from(radix)) as u32;
        digits.push(std::char::from_digit(d, radix).unwrap_or('0'));
        value /= u128::from(radix);
    }
    if negative {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

/// Array methods that do not take a callback.
pub fn array_method(
    items: &[Value],
    name: &str,
    args: &[Value],
) -> Result<Option<Value>, TransformError> {
    let len = items.len();
    let value = match name {
        "join" => {
            let sep = match args.first() {
                None | Some(Value::Null) => ",".to_string(),
                Some(v) => to_js_string(v),
            };
            Value::String(join(items, &sep))
        }
        "includes" => Value::Bool(items.iter().any(|v| strict_equals(v, arg(args, 0)))),
        "indexOf" => number_value(
            items
                .iter()
                .position(|v| strict_equals(v, arg(args, 0)))
                .map_or(-1.0, |i| i as f64),
        ),
        "lastIndexOf" => number_value(
            items
                .iter()
                .rposition(|v| strict_equals(v, arg(args, 0)))
                .map_or(-1.0, |i| i as f64),
        ),
        "slice" => {
            let start = relative_index(num_arg(args, 0), len);
            let end = match args.get(1) {
                Some(Value::Null) | None => len,
                Some(v) => relative_index(to_number(v), len),
            };
            Value::Array(items[start..end.max(start)].to_vec())
        }
        "concat" => {
            let mut out = items.to_vec();
            for a in args {
                match a {
                    Value::Array(more) => out.extend(more.iter().cloned()),
                    other => out.push(other.clone()),
                }
            }
            Value::Array(out)
        }
        "reverse" => Value::Array(items.iter().rev().cloned().collect()),
        "at" => {
            let i = num_arg(args, 0).trunc();
            let index = if i < 0.0 { len as f64 + i } else { i };
            if index < 0.0 {
                Value::Null
            } else {
                items.get(index as usize).cloned().unwrap_or(Value::Null)
            }
        }
        "flat" => {
            let depth = match args.first() {
                None | Some(Value::Null) => 1,
                Some(v) => to_number(v).max(0.0) as usize,
            };
            Value::Array(flatten(items, depth))
        }
        "toString" => Value::String(join(items, ",")),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

pub fn flatten(items: &[Value], depth: usize) -> Vec<Value> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Array(inner) if depth > 0 => out.extend(flatten(inner, depth - 1)),
            other => out.push(other.clone()),
        }
    }
    out
}

/// Methods on object receivers.
pub fn object_method(
    map: &Map<String, Value>,
    name: &str,
    args: &[Value],
) -> Result<Option<Value>, TransformError> {
    let value = match name {
        "hasOwnProperty" => Value::Bool(map.contains_key(&property_key(arg(args, 0)))),
        "toString" => Value::String("[object Object]".into()),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Borrow a stored property or element. `None` when the read is computed
/// (`length`, string indexing) or missing.
pub fn property_ref<'v>(target: &'v Value, key: &Value) -> Option<&'v Value> {
    match target {
        Value::Object(map) => map.get(&property_key(key)),
        Value::Array(items) => array_index(key).and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Property read on a non-null value. Missing properties yield `null`.
pub fn get_property(target: &Value, key: &Value) -> Value {
    match target {
        Value::Object(map) => map.get(&property_key(key)).cloned().unwrap_or(Value::Null),
        Value::Array(items) => {
            if matches!(key, Value::String(s) if s == "length") {
                return Value::from(items.len());
            }
            array_index(key)
                .and_then(|i| items.get(i).cloned())
                .unwrap_or(Value::Null)
        }
        Value::String(s) => {
            if matches!(key, Value::String(k) if k == "length") {
                return Value::from(s.chars().count());
            }
            array_index(key)
                .and_then(|i| s.chars().nth(i))
                .map_or(Value::Null, |c| Value::String(c.to_string()))
        }
        _ => Value::Null,
    }
}
