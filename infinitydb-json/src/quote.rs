//! Underscore quoting between a [`Tree`] and plain JSON
//!
//! JSON only has string keys and a handful of value types, so every
//! component that JSON cannot carry natively is written as a string with a
//! leading underscore followed by the component's text form:
//!
//! | component        | as key          | as value        |
//! |------------------|-----------------|-----------------|
//! | `"abc"`          | `"abc"`         | `"abc"`         |
//! | `"_abc"`         | `"__abc"`       | `"__abc"`       |
//! | `5`              | `"_5"`          | `5`             |
//! | `Gene`           | `"_Gene"`       | `"_Gene"`       |
//! | `[3]`            | `"_[3]"`        | `"_[3]"`        |
//! | `true` / `null`  | `"_true"` / `"_null"` | `true` / `null` |
//!
//! A string that itself begins with an underscore is stuffed with one more.

use crate::error::{Result, TreeError};
use crate::tree::{Key, Mapping, Tree};
use infinitydb_core::{parse_primitive, Component};
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

fn stuff(s: &str) -> String {
    if s.starts_with('_') {
        format!("_{s}")
    } else {
        s.to_string()
    }
}

/// Quote one component for use as a JSON object key.
///
/// Non-finite floats have no text form that reads back as a Float and
/// are refused.
pub fn quote_component_key(component: &Component) -> Result<String> {
    match component {
        Component::String(s) => Ok(stuff(s)),
        Component::Float(f) if !f.is_finite() => Err(TreeError::structural(format!(
            "non-finite float {f} cannot be a mapping key"
        ))),
        other => Ok(format!("_{other}")),
    }
}

/// Quote a mapping key. Tuple keys cannot be represented in JSON.
pub fn quote_key(key: &Key) -> Result<String> {
    match key {
        Key::Component(c) => quote_component_key(c),
        Key::Tuple(t) => Err(TreeError::structural(format!(
            "Tuple key {key} cannot be written as JSON; unflatten first ({} components)",
            t.len()
        ))),
    }
}

/// Quote one component in value position.
pub fn quote_value(component: &Component) -> JsonValue {
    match component {
        Component::Null => JsonValue::Null,
        Component::Bool(b) => JsonValue::Bool(*b),
        Component::Int(i) => JsonValue::Number((*i).into()),
        // JSON has no NaN or infinities
        Component::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Component::String(s) => JsonValue::String(stuff(s)),
        other => JsonValue::String(format!("_{other}")),
    }
}

/// Convert a tree into plain JSON.
///
/// Bare Tuples become arrays, so they come back as lists from
/// [`unquote`].
pub fn quote(tree: &Tree) -> Result<JsonValue> {
    match tree {
        Tree::Scalar(c) => Ok(quote_value(c)),
        Tree::Tuple(t) => Ok(JsonValue::Array(t.iter().map(quote_value).collect())),
        Tree::List(items) => items
            .iter()
            .map(quote)
            .collect::<Result<Vec<_>>>()
            .map(JsonValue::Array),
        Tree::Map(map) => {
            let mut object = JsonMap::with_capacity(map.len());
            for (k, v) in map.iter() {
                object.insert(quote_key(k)?, quote(v)?);
            }
            Ok(JsonValue::Object(object))
        }
    }
}

/// Decode one quoted JSON string (key or value) into a component.
pub fn unquote_str(s: &str) -> Result<Component> {
    if let Some(stuffed) = s.strip_prefix("__") {
        Ok(Component::String(format!("_{stuffed}")))
    } else if let Some(text) = s.strip_prefix('_') {
        Ok(parse_primitive(text)?)
    } else {
        Ok(Component::String(s.to_string()))
    }
}

/// Convert plain JSON into a tree, decoding underscore-quoted strings.
pub fn unquote(value: &JsonValue) -> Result<Tree> {
    match value {
        JsonValue::Null => Ok(Tree::null()),
        JsonValue::Bool(b) => Ok(Tree::from(*b)),
        JsonValue::Number(n) => Ok(match n.as_i64() {
            Some(i) => Tree::from(i),
            None => Tree::from(n.as_f64().unwrap_or(f64::NAN)),
        }),
        JsonValue::String(s) => Ok(Tree::Scalar(unquote_str(s)?)),
        JsonValue::Array(items) => items
            .iter()
            .map(unquote)
            .collect::<Result<Vec<_>>>()
            .map(Tree::List),
        JsonValue::Object(object) => {
            let mut map = Mapping::new();
            for (k, v) in object {
                map.insert(unquote_str(k)?, unquote(v)?);
            }
            Ok(Tree::Map(map))
        }
    }
}

/// Serialize a tree as a JSON request body.
pub fn to_json_bytes(tree: &Tree) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&quote(tree)?)?)
}

/// Parse a JSON response body. An empty body is an empty mapping.
pub fn from_json_slice(bytes: &[u8]) -> Result<Tree> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Tree::empty_map());
    }
    let value: JsonValue = serde_json::from_slice(bytes)?;
    unquote(&value)
}
