//! Tolerant readers for the response shapes the API is allowed to use.

use serde_json::Value;

use crate::error::{ContractError, ContractResult};

/// The `data` member of a `{success, data}` envelope, or the value itself when flat.
#[must_use]
pub fn unwrap_data(value: &Value) -> &Value {
    match value.get("data") {
        Some(data) if value.get("success").is_some() => data,
        _ => value,
    }
}

/// First string member among `keys`, looking through a `data` envelope.
#[must_use]
pub fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    [unwrap_data(value), value].into_iter().find_map(|candidate| {
        keys.iter()
            .find_map(|key| candidate.get(*key).and_then(Value::as_str))
            .map(ToOwned::to_owned)
    })
}

/// Required string member, failing with the response path in the message.
pub fn require_string(value: &Value, keys: &[&str], context: &str) -> ContractResult<String> {
    string_field(value, keys).ok_or_else(|| {
        ContractError::Assertion(format!("{context}: none of {keys:?} present in {value}"))
    })
}

/// Numeric value, accepting string-encoded decimals.
#[must_use]
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Float comparison used for round-tripped numeric fields.
#[must_use]
pub fn numbers_match(actual: &Value, expected: f64) -> bool {
    as_number(actual).is_some_and(|actual| (actual - expected).abs() < 1e-6)
}

/// Whether the body carries an `error`, `message` or `details` member.
#[must_use]
pub fn has_error_payload(value: &Value) -> bool {
    ["error", "message", "details"]
        .iter()
        .any(|key| value.get(*key).is_some_and(|member| !member.is_null()))
}

/// Items of a list response, flat or enveloped.
#[must_use]
pub fn list_items(value: &Value) -> Option<&Vec<Value>> {
    value
        .as_array()
        .or_else(|| unwrap_data(value).as_array())
}

/// Whether an entity snapshot marks a soft delete.
#[must_use]
pub fn marks_deleted(value: &Value) -> bool {
    let data = unwrap_data(value);
    data.get("deleted_at").is_some_and(|member| !member.is_null())
        || data.get("is_deleted").and_then(Value::as_bool) == Some(true)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        as_number, has_error_payload, list_items, marks_deleted, numbers_match, string_field,
        unwrap_data,
    };

    #[test]
    fn envelopes_and_flat_bodies_read_alike() {
        let flat = json!({"id": "a"});
        let wrapped = json!({"success": true, "data": {"id": "a"}});
        assert_eq!(unwrap_data(&flat), unwrap_data(&wrapped));
        assert_eq!(string_field(&wrapped, &["job_id", "id"]).as_deref(), Some("a"));

        let entity_with_data_field = json!({"id": "a", "data": 3});
        assert_eq!(unwrap_data(&entity_with_data_field)["id"], "a");
    }

    #[test]
    fn numbers_tolerate_string_encoding() {
        assert_eq!(as_number(&json!("80.50")), Some(80.5));
        assert!(numbers_match(&json!(80), 80.0));
        assert!(numbers_match(&json!("92.5"), 92.5));
        assert!(!numbers_match(&json!(null), 0.0));
    }

    #[test]
    fn error_and_list_shapes() {
        assert!(has_error_payload(&json!({"error": "Validation failed"})));
        assert!(!has_error_payload(&json!({"id": "x"})));
        assert_eq!(list_items(&json!([1, 2])).map(Vec::len), Some(2));
        assert_eq!(list_items(&json!({"success": true, "data": [1]})).map(Vec::len), Some(1));
        assert!(marks_deleted(&json!({"deleted_at": "2026-01-01T00:00:00Z"})));
        assert!(!marks_deleted(&json!({"deleted_at": null})));
    }
}
