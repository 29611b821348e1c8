//! Field accessors over loosely-typed JSON objects.
//!
//! Spawn documents are kept as raw JSON objects so that one mistyped field
//! fails on its own instead of failing the whole document. Every accessor
//! returns `Ok(None)` for an absent or `null` field and a
//! [`FieldError::TypeMismatch`] for a present field of the wrong shape.
//!
//! Species documents are typed serde structs instead; their fields go
//! through [`lenient`] and [`lenient_list`], which turn a mistyped value into
//! the field's default rather than an error for the whole document.

use dex_core::{FieldError, FieldResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

pub(crate) type Object = Map<String, Value>;

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn mismatch(field: &'static str, expected: &'static str, found: &Value) -> FieldError {
    FieldError::TypeMismatch {
        field,
        expected,
        found: kind_of(found).to_string(),
    }
}

fn present<'a>(map: &'a Object, field: &str) -> Option<&'a Value> {
    map.get(field).filter(|value| !value.is_null())
}

pub(crate) fn opt_str(map: &Object, field: &'static str) -> FieldResult<Option<String>> {
    match present(map, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(mismatch(field, "string", other)),
    }
}

pub(crate) fn opt_bool(map: &Object, field: &'static str) -> FieldResult<Option<bool>> {
    match present(map, field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(mismatch(field, "boolean", other)),
    }
}

/// Integer field; numeric strings are accepted.
pub(crate) fn opt_i64(map: &Object, field: &'static str) -> FieldResult<Option<i64>> {
    match present(map, field) {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| mismatch(field, "integer", &Value::Number(n.clone()))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| mismatch(field, "integer", &Value::String(s.clone()))),
        Some(other) => Err(mismatch(field, "integer", other)),
    }
}

pub(crate) fn opt_i32(map: &Object, field: &'static str) -> FieldResult<Option<i32>> {
    opt_i64(map, field)?
        .map(|n| i32::try_from(n).map_err(|_| out_of_range(field, n)))
        .transpose()
}

pub(crate) fn opt_u32(map: &Object, field: &'static str) -> FieldResult<Option<u32>> {
    opt_i64(map, field)?
        .map(|n| u32::try_from(n).map_err(|_| out_of_range(field, n)))
        .transpose()
}

pub(crate) fn opt_u8(map: &Object, field: &'static str) -> FieldResult<Option<u8>> {
    opt_i64(map, field)?
        .map(|n| u8::try_from(n).map_err(|_| out_of_range(field, n)))
        .transpose()
}

/// Floating-point field; numeric strings are accepted.
pub(crate) fn opt_f32(map: &Object, field: &'static str) -> FieldResult<Option<f32>> {
    match present(map, field) {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64().map(|f| f as f32)),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| mismatch(field, "number", &Value::String(s.clone()))),
        Some(other) => Err(mismatch(field, "number", other)),
    }
}

/// List of strings; a single string is read as a one-element list.
pub(crate) fn string_list(map: &Object, field: &'static str) -> FieldResult<Vec<String>> {
    match present(map, field) {
        None => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(mismatch(field, "string", other)),
            })
            .collect(),
        Some(other) => Err(mismatch(field, "array", other)),
    }
}

/// One object or a list of objects.
pub(crate) fn object_list(map: &Object, field: &'static str) -> FieldResult<Vec<Object>> {
    match present(map, field) {
        None => Ok(Vec::new()),
        Some(Value::Object(obj)) => Ok(vec![obj.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(obj) => Ok(obj.clone()),
                other => Err(mismatch(field, "object", other)),
            })
            .collect(),
        Some(other) => Err(mismatch(field, "object", other)),
    }
}

/// `deserialize_with` helper: a value of the wrong shape reads as the
/// default.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::trace!("Ignoring mistyped field: {}", e);
        T::default()
    }))
}

/// `deserialize_with` helper for lists: mistyped elements are dropped one by
/// one and a non-list value reads as empty.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            tracing::trace!("Ignoring mistyped list: found {}", kind_of(&other));
            return Ok(Vec::new());
        }
    };
    Ok(items
        .into_iter()
        .filter_map(|item| {
            serde_json::from_value(item)
                .map_err(|e| tracing::trace!("Ignoring mistyped list element: {}", e))
                .ok()
        })
        .collect())
}

fn out_of_range(field: &'static str, n: i64) -> FieldError {
    FieldError::TypeMismatch {
        field,
        expected: "integer in range",
        found: n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Object {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn absent_and_null_are_none() {
        let map = object(json!({ "a": null }));
        assert_eq!(opt_str(&map, "a"), Ok(None));
        assert_eq!(opt_bool(&map, "missing"), Ok(None));
        assert_eq!(string_list(&map, "a"), Ok(vec![]));
    }

    #[test]
    fn mismatches_are_reported_per_field() {
        let map = object(json!({ "canSeeSky": "yes", "minY": 12 }));
        assert!(matches!(
            opt_bool(&map, "canSeeSky"),
            Err(FieldError::TypeMismatch { field: "canSeeSky", .. })
        ));
        assert_eq!(opt_i32(&map, "minY"), Ok(Some(12)));
    }

    #[test]
    fn numeric_strings_and_ranges() {
        let map = object(json!({ "moonPhase": "3", "big": 900, "weight": "2.5" }));
        assert_eq!(opt_u8(&map, "moonPhase"), Ok(Some(3)));
        assert!(opt_u8(&map, "big").is_err());
        assert_eq!(opt_f32(&map, "weight"), Ok(Some(2.5)));
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sample {
        #[serde(deserialize_with = "lenient")]
        number: Option<u32>,
        #[serde(deserialize_with = "lenient_list")]
        names: Vec<String>,
    }

    #[test]
    fn lenient_fields_fall_back_to_default() {
        let sample: Sample =
            serde_json::from_value(json!({ "number": "many", "names": ["a", 2, "b"] })).unwrap();
        assert_eq!(sample.number, None);
        assert_eq!(sample.names, vec!["a", "b"]);

        let sample: Sample = serde_json::from_value(json!({ "number": 4, "names": 9 })).unwrap();
        assert_eq!(sample.number, Some(4));
        assert!(sample.names.is_empty());
    }

    #[test]
    fn lists_accept_single_values() {
        let map = object(json!({ "biomes": "#c:is_forest", "cond": { "x": 1 }, "bad": [1] }));
        assert_eq!(string_list(&map, "biomes"), Ok(vec!["#c:is_forest".to_string()]));
        assert_eq!(object_list(&map, "cond").map(|v| v.len()), Ok(1));
        assert!(string_list(&map, "bad").is_err());
    }
}
