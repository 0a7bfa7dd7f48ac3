//! Conversion between typed parameter values and query-string pairs.
//!
//! Each [`ParamKind`] has its own [`ParamCodec`]. The kind is taken from the default
//! value, which is also the result of decoding an absent parameter.

use crate::{
    value::{format_number, parse_number},
    Field, ParamError, ParamKind, ParamObject, ParamValue, QueryParams,
};


/// One write to the query: `None` deletes the name, `Some` sets it.
pub type Change = (String, Option<String>);

pub trait ParamCodec {
    fn kind(&self) -> ParamKind;

    /// Reads the parameter `name`, falling back to `default` when it is absent.
    fn decode(&self, params: &QueryParams, name: &str, default: &ParamValue) -> ParamValue;

    /// Writes `value`, which has this codec's kind.
    fn encode(&self, params: &QueryParams, name: &str, value: &ParamValue) -> Vec<Change>;

    /// Deletes every pair that carries the parameter.
    fn clear(&self, params: &QueryParams, name: &str) -> Vec<Change> {
        let _ = params;
        vec![(name.to_string(), None)]
    }
}

pub fn codec(kind: ParamKind) -> &'static dyn ParamCodec {
    match kind {
        ParamKind::String => &StringCodec,
        ParamKind::Number => &NumberCodec,
        ParamKind::Bool => &BoolCodec,
        ParamKind::Array => &ArrayCodec,
        ParamKind::Object => &ObjectCodec,
    }
}

pub fn decode(params: &QueryParams, name: &str, default: &ParamValue) -> ParamValue {
    codec(default.kind()).decode(params, name, default)
}

/// Computes the changes that store `value` for the parameter `name`.
///
/// A value identical to `default` only deletes, so defaults never appear in the query.
/// Otherwise the name is deleted first, which moves rewritten pairs to the end.
pub fn encode(
    params: &QueryParams,
    name: &str,
    value: &ParamValue,
    default: &ParamValue,
) -> Result<Vec<Change>, ParamError> {
    let kind = default.kind();
    if value.kind() != kind {
        return Err(ParamError::KindMismatch {
            name: name.to_string(),
            expected: kind,
            found: value.kind(),
        });
    }
    let codec = codec(kind);
    if value.is_identical(default) {
        return Ok(codec.clear(params, name));
    }
    let mut changes = vec![(name.to_string(), None)];
    changes.extend(codec.encode(params, name, value));
    Ok(changes)
}

pub struct StringCodec;
impl ParamCodec for StringCodec {
    fn kind(&self) -> ParamKind {
        ParamKind::String
    }
    fn decode(&self, params: &QueryParams, name: &str, default: &ParamValue) -> ParamValue {
        match params.get(name) {
            Some(raw) => ParamValue::String(raw.to_string()),
            None => default.clone(),
        }
    }
    fn encode(&self, _params: &QueryParams, name: &str, value: &ParamValue) -> Vec<Change> {
        vec![(name.to_string(), Some(value.to_string()))]
    }
}

pub struct NumberCodec;
impl ParamCodec for NumberCodec {
    fn kind(&self) -> ParamKind {
        ParamKind::Number
    }
    fn decode(&self, params: &QueryParams, name: &str, default: &ParamValue) -> ParamValue {
        match params.get(name) {
            Some(raw) => ParamValue::Number(parse_number(raw)),
            None => default.clone(),
        }
    }
    fn encode(&self, _params: &QueryParams, name: &str, value: &ParamValue) -> Vec<Change> {
        let raw = value.as_f64().map(format_number).unwrap_or_default();
        vec![(name.to_string(), Some(raw))]
    }
}

pub struct BoolCodec;
impl BoolCodec {
    pub fn parse(raw: &str) -> bool {
        !matches!(raw, "0" | "off" | "false")
    }
}
impl ParamCodec for BoolCodec {
    fn kind(&self) -> ParamKind {
        ParamKind::Bool
    }
    fn decode(&self, params: &QueryParams, name: &str, default: &ParamValue) -> ParamValue {
        match params.get(name) {
            Some(raw) => ParamValue::Bool(Self::parse(raw)),
            None => default.clone(),
        }
    }
    fn encode(&self, _params: &QueryParams, name: &str, value: &ParamValue) -> Vec<Change> {
        vec![(name.to_string(), Some(value.to_string()))]
    }
}

/// Elements joined by a literal `,`. An element containing a comma does not survive decoding.
pub struct ArrayCodec;
impl ParamCodec for ArrayCodec {
    fn kind(&self) -> ParamKind {
        ParamKind::Array
    }
    fn decode(&self, params: &QueryParams, name: &str, default: &ParamValue) -> ParamValue {
        match params.get(name) {
            Some("") => ParamValue::Array(Vec::new()),
            Some(raw) => ParamValue::Array(raw.split(',').map(str::to_string).collect()),
            None => default.clone(),
        }
    }
    fn encode(&self, _params: &QueryParams, name: &str, value: &ParamValue) -> Vec<Change> {
        let raw = value.as_array().map(|a| a.join(",")).unwrap_or_default();
        vec![(name.to_string(), Some(raw))]
    }
}

/// One pair per property, named by the parameter name followed by the property name.
pub struct ObjectCodec;
impl ObjectCodec {
    fn prefixed<'a>(
        params: &'a QueryParams,
        name: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> {
        params.iter().filter(move |(key, _)| key.starts_with(name))
    }
}
impl ParamCodec for ObjectCodec {
    fn kind(&self) -> ParamKind {
        ParamKind::Object
    }
    fn decode(&self, params: &QueryParams, name: &str, default: &ParamValue) -> ParamValue {
        let mut found = false;
        let mut object = ParamObject::new();
        for (key, raw) in Self::prefixed(params, name) {
            found = true;
            object.insert(key[name.len()..].to_string(), Field::from_raw(raw));
        }
        if found {
            ParamValue::Object(object)
        } else {
            default.clone()
        }
    }
    fn encode(&self, params: &QueryParams, name: &str, value: &ParamValue) -> Vec<Change> {
        let Some(object) = value.as_object() else {
            return Vec::new();
        };
        let mut changes: Vec<Change> = object
            .iter()
            .map(|(k, v)| (format!("{name}{k}"), Some(v.to_raw())))
            .collect();
        let mut stale = Vec::new();
        for (key, _) in Self::prefixed(params, name) {
            let kept = changes.iter().any(|(k, _)| k == key);
            if !kept && !stale.iter().any(|(k, _): &Change| k == key) {
                stale.push((key.to_string(), None));
            }
        }
        changes.extend(stale);
        changes
    }
    fn clear(&self, params: &QueryParams, name: &str) -> Vec<Change> {
        let mut changes = vec![(name.to_string(), None)];
        for (key, _) in Self::prefixed(params, name) {
            if !changes.iter().any(|(k, _)| k == key) {
                changes.push((key.to_string(), None));
            }
        }
        changes
    }
}
