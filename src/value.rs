use std::{collections::BTreeMap, fmt};

use parse_display::Display;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// The kind of a parameter, declared by the variant of its default value.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display(style = "lowercase")]
pub enum ParamKind {
    String,
    Number,
    Bool,
    Array,
    Object,
}

/// A property of an object parameter.
///
/// Decoded properties are numbers when their text is exactly the formatting of that number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    Number(f64),
    String(String),
}
impl Field {
    /// Keeps `raw` as a string unless it round-trips through number formatting.
    pub fn from_raw(raw: &str) -> Self {
        let n = parse_number(raw);
        if format_number(n) == raw {
            Field::Number(n)
        } else {
            Field::String(raw.to_string())
        }
    }
    pub fn to_raw(&self) -> String {
        match self {
            Field::Number(n) => format_number(*n),
            Field::String(s) => s.clone(),
        }
    }
    fn is_identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Field::Number(a), Field::Number(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}
impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Field::Number(value)
    }
}
impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::String(value.to_string())
    }
}
impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::String(value)
    }
}

pub type ParamObject = BTreeMap<String, Field>;

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<String>),
    Object(ParamObject),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::String(_) => ParamKind::String,
            ParamValue::Number(_) => ParamKind::Number,
            ParamValue::Bool(_) => ParamKind::Bool,
            ParamValue::Array(_) => ParamKind::Array,
            ParamValue::Object(_) => ParamKind::Object,
        }
    }

    /// Structural equality where numbers compare bitwise, so `NaN` equals itself.
    pub fn is_identical(&self, other: &Self) -> bool {
        match (self, other) {
            (ParamValue::Number(a), ParamValue::Number(b)) => a.to_bits() == b.to_bits(),
            (ParamValue::Object(a), ParamValue::Object(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.is_identical(vb))
            }
            _ => self == other,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            ParamValue::Array(a) => Some(a),
            _ => None,
        }
    }
    pub fn as_object(&self) -> Option<&ParamObject> {
        match self {
            ParamValue::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl Default for ParamValue {
    fn default() -> Self {
        ParamValue::String(String::new())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::String(s) => f.write_str(s),
            ParamValue::Number(n) => f.write_str(&format_number(*n)),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Array(a) => f.write_str(&a.join(",")),
            ParamValue::Object(o) => {
                for (i, (k, v)) in o.iter().enumerate() {
                    if i != 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{k}:{}", v.to_raw())?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}
impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}
impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}
impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Number(value.into())
    }
}
impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}
impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::Array(value)
    }
}
impl From<&[&str]> for ParamValue {
    fn from(value: &[&str]) -> Self {
        ParamValue::Array(value.iter().map(|s| s.to_string()).collect())
    }
}
impl<const N: usize> From<[&str; N]> for ParamValue {
    fn from(value: [&str; N]) -> Self {
        ParamValue::Array(value.iter().map(|s| s.to_string()).collect())
    }
}
impl From<ParamObject> for ParamValue {
    fn from(value: ParamObject) -> Self {
        ParamValue::Object(value)
    }
}

/// Builds a [`ParamObject`] from `(name, field)` pairs.
pub fn object<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> ParamObject
where
    K: Into<String>,
    V: Into<Field>,
{
    fields
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Formats a number the way query values carry it: integral values without a
/// fractional part, `NaN`, `Infinity` and `-Infinity` for the special values.
///
/// Magnitudes from `1e21` up and below `1e-6` use exponent notation with an explicit
/// sign, such as `1e+21` or `1.5e-7`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        "0".to_string()
    } else if (1e-6..1e21).contains(&n.abs()) {
        n.to_string()
    } else {
        let s = format!("{n:e}");
        match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => s,
        }
    }
}

/// Numeric cast of query text.
///
/// Surrounding whitespace is ignored, empty text is `0`, `0x`/`0o`/`0b` prefixes
/// select a radix, and anything else that is not a decimal number is `NaN`.
pub fn parse_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return match u64::from_str_radix(digits, radix) {
                Ok(n) if !digits.starts_with('+') => n as f64,
                _ => f64::NAN,
            };
        }
    }
    let decimal = s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !decimal {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}
