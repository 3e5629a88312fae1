//! Entry bookkeeping shared by the content adapters.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{ContentError, Result};

const RESERVED: [&str; 2] = ["id", "documentId"];

fn timestamp(now: DateTime<Utc>) -> Value {
    Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn into_object(document: Value) -> Result<Map<String, Value>> {
    match document {
        Value::Object(object) => Ok(object),
        other => Err(ContentError::InvalidDocument(format!(
            "entries must be JSON objects, got {other}"
        ))),
    }
}

/// Stamp a new entry. A caller-supplied `documentId` or timestamp is kept.
pub fn new_entry(document: Value, id: i64, now: DateTime<Utc>) -> Result<Value> {
    let mut object = into_object(document)?;
    object.insert("id".to_string(), Value::from(id));

    let document_id = object
        .get("documentId")
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
    object.insert("documentId".to_string(), Value::String(document_id));

    object
        .entry("createdAt")
        .or_insert_with(|| timestamp(now));
    object
        .entry("updatedAt")
        .or_insert_with(|| timestamp(now));
    Ok(Value::Object(object))
}

/// Shallow merge. Identifiers never change; `updatedAt` is refreshed unless
/// the changes set it.
pub fn merge_changes(existing: Value, changes: Value, now: DateTime<Utc>) -> Result<Value> {
    let changes = into_object(changes)?;
    let mut object = into_object(existing)?;
    let stamped = changes.contains_key("updatedAt");

    for (key, value) in changes {
        if RESERVED.contains(&key.as_str()) {
            continue;
        }
        object.insert(key, value);
    }
    if !stamped {
        object.insert("updatedAt".to_string(), timestamp(now));
    }
    Ok(Value::Object(object))
}

pub fn document_id(document: &Value) -> Option<&str> {
    document.get("documentId").and_then(Value::as_str)
}

pub fn published_at(document: &Value) -> Option<DateTime<Utc>> {
    document
        .get("publishedAt")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|stamp| stamp.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn new_entries_get_identifiers_and_timestamps() {
        let entry = new_entry(json!({ "title": "a", "id": 999 }), 4, now()).unwrap();
        assert_eq!(entry["id"], 4);
        assert_eq!(entry["documentId"].as_str().unwrap().len(), 32);
        assert_eq!(entry["createdAt"], "2025-03-14T09:30:00.000Z");
        assert_eq!(entry["updatedAt"], entry["createdAt"]);
    }

    #[test]
    fn supplied_document_id_and_stamps_survive() {
        let entry = new_entry(
            json!({ "documentId": "abc", "updatedAt": "2024-01-01T00:00:00.000Z" }),
            1,
            now(),
        )
        .unwrap();
        assert_eq!(entry["documentId"], "abc");
        assert_eq!(entry["updatedAt"], "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn merge_keeps_identifiers_and_refreshes_updated_at() {
        let existing = json!({ "id": 1, "documentId": "abc", "title": "old", "date": "2024-05-01" });
        let merged = merge_changes(existing, json!({ "title": "new", "id": 9 }), now()).unwrap();
        assert_eq!(merged["id"], 1);
        assert_eq!(merged["title"], "new");
        assert_eq!(merged["date"], "2024-05-01");
        assert_eq!(merged["updatedAt"], "2025-03-14T09:30:00.000Z");
    }

    #[test]
    fn non_objects_are_rejected() {
        assert!(matches!(
            new_entry(json!([1, 2]), 1, now()),
            Err(ContentError::InvalidDocument(_))
        ));
    }
}
