//! Response envelope handling.
//!
//! The backend wraps payloads as `{"success": true, "<field>": ...}`. The
//! transforms here unwrap that envelope before the payload is cached, so
//! cache entries and typed views only ever see the payload itself.

use serde_json::Value;
use staffroom_core::{ApiError, Result};

/// Pull `field` out of an envelope object.
pub(crate) fn extract(value: Value, field: &str) -> Result<Value> {
    match value {
        Value::Object(mut map) => map
            .remove(field)
            .ok_or_else(|| ApiError::decode(format!("response has no `{field}` field"))),
        other => Err(ApiError::decode(format!(
            "expected an envelope object with `{field}`, got {other}"
        ))),
    }
}

pub(crate) fn user(value: Value) -> Result<Value> {
    extract(value, "user")
}

pub(crate) fn job(value: Value) -> Result<Value> {
    extract(value, "job")
}

pub(crate) fn jobs(value: Value) -> Result<Value> {
    extract(value, "jobs")
}

pub(crate) fn application(value: Value) -> Result<Value> {
    extract(value, "application")
}

pub(crate) fn applications(value: Value) -> Result<Value> {
    extract(value, "applications")
}

pub(crate) fn interview(value: Value) -> Result<Value> {
    extract(value, "interview")
}

pub(crate) fn interviews(value: Value) -> Result<Value> {
    extract(value, "interviews")
}

pub(crate) fn offer(value: Value) -> Result<Value> {
    extract(value, "offer")
}

pub(crate) fn offers(value: Value) -> Result<Value> {
    extract(value, "offers")
}

pub(crate) fn notification(value: Value) -> Result<Value> {
    extract(value, "notification")
}

pub(crate) fn notifications(value: Value) -> Result<Value> {
    extract(value, "notifications")
}

pub(crate) fn articles(value: Value) -> Result<Value> {
    extract(value, "articles")
}

pub(crate) fn bands(value: Value) -> Result<Value> {
    extract(value, "bands")
}

/// The `id` of every element in a payload array, for collection tag sets.
/// Numeric ids are stringified; elements without an id are skipped.
pub(crate) fn list_ids(value: &Value) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item.get("id") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_unwraps_payload() {
        let value = json!({"success": true, "user": {"id": "u1"}});
        assert_eq!(user(value).unwrap(), json!({"id": "u1"}));
    }

    #[test]
    fn test_extract_rejects_missing_field() {
        let err = jobs(json!({"success": true})).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));

        let err = jobs(json!([1, 2])).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_list_ids_handles_mixed_shapes() {
        let value = json!([
            {"id": "a"},
            {"id": 7},
            {"title": "no id"},
        ]);
        assert_eq!(list_ids(&value), vec!["a".to_string(), "7".to_string()]);
        assert!(list_ids(&json!({"not": "a list"})).is_empty());
    }
}
