//! Field projection for API records.
//!
//! Tool results can be trimmed to a caller-chosen set of top-level keys to
//! keep responses small. The `id` key always survives so trimmed records can
//! still be addressed by follow-up calls.

use serde_json::{Map, Value};

const ALWAYS_KEPT: &str = "id";

/// Keep only `fields` (plus `id`) in every object of `records`.
///
/// Non-object entries are passed through unchanged. Requested fields that a
/// record lacks are simply absent from the projected record.
pub fn project_records(records: Vec<Value>, fields: &[String]) -> Vec<Value> {
    records.into_iter().map(|record| project_record(record, fields)).collect()
}

/// Keep only `fields` (plus `id`) in a single record.
pub fn project_record(record: Value, fields: &[String]) -> Value {
    match record {
        Value::Object(mut object) => {
            let mut projected = Map::new();
            if let Some(id) = object.remove(ALWAYS_KEPT) {
                projected.insert(ALWAYS_KEPT.to_string(), id);
            }
            for field in fields {
                if let Some(value) = object.remove(field.as_str()) {
                    projected.insert(field.clone(), value);
                }
            }
            Value::Object(projected)
        }
        other => other,
    }
}
