//! Untyped field payload for declared field types that need no conversion

use serde::Deserialize;
use std::collections::HashMap;

/// Passthrough value for field types such as `Int`, `String`, `Bool`,
/// `LocalEnum.*`, `FilePath` or arrays of those.
///
/// Deserialized straight from the document tree, so integers stay `Int` and
/// only non-integral (or out of `i64` range) numbers become `Float`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(HashMap<String, Value>),
}

impl Value {
    /// String payload, also used for enum values and file paths
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload; floats are truncated
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Float payload, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Elements of an `Array<...>` field
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Strings of an `Array<String>` or `Array<LocalEnum.*>` field, skipping nulls.
    ///
    /// `None` if any non-null element is not a string.
    pub fn as_strings(&self) -> Option<Vec<&str>> {
        self.as_array()?
            .iter()
            .filter(|v| !v.is_null())
            .map(Value::as_string)
            .collect()
    }

    pub fn as_object(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// True for an unset field
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(json: serde_json::Value) -> Value {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_document_values_keep_number_kinds() {
        let value = parse(json!({
            "count": 42,
            "ratio": 0.5,
            "huge": 18_446_744_073_709_551_615u64,
            "name": "Chest",
            "items": ["Sword", null, true]
        }));
        let obj = value.as_object().unwrap();
        assert_eq!(obj["count"], Value::Int(42));
        assert_eq!(obj["ratio"].as_float(), Some(0.5));
        assert!(matches!(obj["huge"], Value::Float(_)));
        assert_eq!(obj["name"].as_string(), Some("Chest"));

        let items = obj["items"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert!(items[1].is_null());
        assert_eq!(items[2].as_bool(), Some(true));
    }

    #[test]
    fn test_enum_arrays() {
        let value = parse(json!(["Sword", null, "Potion"]));
        assert_eq!(value.as_strings(), Some(vec!["Sword", "Potion"]));
        assert_eq!(parse(json!([1, "Sword"])).as_strings(), None);
        assert_eq!(parse(json!(null)), Value::Null);
    }

    #[test]
    fn test_int_float_coercions() {
        assert_eq!(Value::from(3.9).as_int(), Some(3));
        assert_eq!(Value::from(7i64).as_float(), Some(7.0));
        assert_eq!(Value::from("x").as_int(), None);
    }
}
