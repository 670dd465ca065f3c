//! Conversions between `Value`, `serde_json::Value`, and serde types.

use serde::de::DeserializeOwned;
use serde::Serialize;
use typecats_value::Value;

use crate::Error;

/// Deserialize a Rust type out of an untyped tree.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_json::from_value(value_to_json(value)).map_err(|e| Error::decode(e.to_string()))
}

/// Serialize a Rust type into an untyped tree.
pub fn to_value<T: Serialize>(data: &T) -> Result<Value, Error> {
    let json = serde_json::to_value(data).map_err(|e| Error::encode(e.to_string()))?;
    Ok(json_to_value(json))
}

/// Convert our `Value` to `serde_json::Value`.
///
/// JSON has no NaN or infinity; those floats become `null`.
pub fn value_to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Map(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

/// Convert `serde_json::Value` to our `Value`, keeping object key order.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                // u64 beyond i64::MAX lands here too
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use typecats_value::map;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Pet {
        name: String,
        age: u32,
        nickname: Option<String>,
    }

    #[test]
    fn struct_through_value() {
        let original = Pet {
            name: "Tom".to_string(),
            age: 9,
            nickname: None,
        };

        let value = to_value(&original).unwrap();
        assert_eq!(
            value,
            map! { "name" => "Tom", "age" => 9, "nickname" => Value::Null }
        );
        let recovered: Pet = from_value(value).unwrap();
        assert_eq!(original, recovered);
    }

    #[test]
    fn decode_failure() {
        let err = from_value::<Pet>(map! { "name" => "Tom" }).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn json_numbers() {
        let value = json_to_value(json!({ "integer": 42, "float": 2.75, "negative": -100 }));
        assert_eq!(value.as_map().unwrap()["integer"], Value::Integer(42));
        assert_eq!(value.as_map().unwrap()["negative"], Value::Integer(-100));
        match value.as_map().unwrap()["float"] {
            Value::Float(f) => assert!((f - 2.75).abs() < 0.001),
            ref other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn json_object_order_is_kept() {
        let value = json_to_value(json!({ "zeta": 1, "alpha": 2, "mid": 3 }));
        let keys: Vec<&String> = value.as_map().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);

        let json = value_to_json(value);
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(value_to_json(Value::Float(f64::NAN)), serde_json::Value::Null);
        assert_eq!(value_to_json(Value::Float(1.5)), json!(1.5));
    }

    #[test]
    fn nested_arrays() {
        let value = Value::from(vec![Value::from(vec![1, 2]), Value::Null]);
        assert_eq!(value_to_json(value), json!([[1, 2], null]));
    }
}
