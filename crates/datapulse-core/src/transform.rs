//! # Data Transformer
//!
//! A pure, total enrichment step: annotates arbitrary input with derived
//! metadata. It never fails and never touches I/O, which is what lets the
//! orchestrator treat it as infallible.
//!
//! This is intentionally a placeholder enrichment — real business
//! transformation can replace the body without changing the output shape.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Tag describing the runtime shape of a JSON value.
fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Transform input data by attaching derived metadata.
///
/// Output always contains:
/// - `original_data` — the input, unchanged
/// - `processed_at` — RFC 3339 UTC timestamp of the transformation
/// - `data_keys` — the input's top-level keys in insertion order
///   (empty when the input is not an object)
/// - `data_type` — shape tag of the input
/// - `transformation_applied` — always `true`
pub fn transform(input: &Value) -> Map<String, Value> {
    let keys: Vec<Value> = match input {
        Value::Object(map) => map.keys().map(|k| Value::String(k.clone())).collect(),
        _ => Vec::new(),
    };

    let mut out = Map::new();
    out.insert("original_data".into(), input.clone());
    out.insert(
        "processed_at".into(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
    );
    out.insert("data_keys".into(), Value::Array(keys));
    out.insert("data_type".into(), Value::String(shape_of(input).into()));
    out.insert("transformation_applied".into(), Value::Bool(true));
    out
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn preserves_original_data_and_key_order() {
        let input = json!({"test_key": "test_value", "number": 123});
        let out = transform(&input);

        assert_eq!(out["original_data"], input);
        assert_eq!(out["data_keys"], json!(["test_key", "number"]));
        assert_eq!(out["data_type"], json!("object"));
        assert_eq!(out["transformation_applied"], json!(true));
    }

    #[test]
    fn empty_object_yields_empty_keys() {
        let out = transform(&json!({}));
        assert_eq!(out["data_keys"], json!([]));
        assert_eq!(out["data_type"], json!("object"));
    }

    #[test]
    fn non_object_input_yields_empty_keys_and_shape_tag() {
        let out = transform(&json!([1, 2, 3]));
        assert_eq!(out["data_keys"], json!([]));
        assert_eq!(out["data_type"], json!("array"));

        let out = transform(&json!("hello"));
        assert_eq!(out["data_type"], json!("string"));

        let out = transform(&Value::Null);
        assert_eq!(out["data_type"], json!("null"));
    }

    #[test]
    fn pure_up_to_timestamp() {
        let input = json!({"a": 1, "b": [true, null]});
        let first = transform(&input);
        let second = transform(&input);

        for field in ["original_data", "data_keys", "data_type", "transformation_applied"] {
            assert_eq!(first[field], second[field], "field {field} must be stable");
        }
    }

    proptest! {
        /// For any JSON object, original_data round-trips unchanged and
        /// data_keys lists the top-level keys in insertion order.
        #[test]
        fn object_metadata_holds(entries in proptest::collection::vec(
            ("[a-z]{1,8}", any::<i64>()), 0..8,
        )) {
            let mut map = Map::new();
            for (k, v) in &entries {
                map.insert(k.clone(), json!(v));
            }
            let expected_keys: Vec<Value> =
                map.keys().map(|k| Value::String(k.clone())).collect();
            let input = Value::Object(map);

            let out = transform(&input);
            prop_assert_eq!(&out["original_data"], &input);
            prop_assert_eq!(&out["data_keys"], &Value::Array(expected_keys));
            prop_assert_eq!(&out["transformation_applied"], &json!(true));
        }
    }
}
