//! Canonical JSON encoding
//!
//! Object keys are emitted in sorted order at every depth and the output is
//! compact, so equal models encode to identical bytes.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(ordered.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Canonical JSON bytes of `value`
pub fn canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&sort_keys(serde_json::to_value(value)?))
}

pub fn canonical_json_string<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&sort_keys(serde_json::to_value(value)?))
}
