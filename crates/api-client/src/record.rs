//! Opaque clinical documents
//!
//! Records and medication requests are schemaless JSON documents. The client
//! only needs their identifier, which backends expose under one of a few
//! conventional field names.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a record
pub type RecordId = String;

/// Fields checked, in order, for a document identifier
pub const ID_FIELDS: [&str; 3] = ["RecordID", "id", "_id"];

/// Fields a list response may wrap its array in
const LIST_FIELDS: [&str; 4] = ["data", "records", "items", BUNDLE_FIELD];

/// FHIR bundle field whose items wrap each document
const BUNDLE_FIELD: &str = "entry";

/// An opaque JSON document keyed by a [`RecordId`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Value);

impl Record {
    /// Wrap a JSON value
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The document identifier, if it has one
    ///
    /// Numeric identifiers are rendered as strings.
    pub fn id(&self) -> Option<RecordId> {
        ID_FIELDS.iter().find_map(|field| match self.0.get(*field)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Whether this document carries the given identifier
    pub fn has_id(&self, id: &str) -> bool {
        self.id().is_some_and(|own| own == id)
    }

    /// Look up a top-level field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Borrow the underlying JSON
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Unwrap into the underlying JSON
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Decode a list response into records
///
/// Accepts a bare array, or an object wrapping the array under `data`,
/// `records`, `items` or `entry`. Only items of a FHIR bundle's `entry`
/// array are unwrapped from `{ "resource": {...} }`; everything else is kept
/// as sent.
pub fn records_from_value(value: Value) -> ApiResult<Vec<Record>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let Some((field, list)) = LIST_FIELDS.iter().find_map(|field| {
                match map.remove(*field) {
                    Some(Value::Array(items)) => Some((*field, items)),
                    _ => None,
                }
            }) else {
                return Err(ApiError::unexpected("list response object has no array field"));
            };
            if field == BUNDLE_FIELD {
                return Ok(list.into_iter().map(unwrap_entry).map(Record).collect());
            }
            list
        }
        Value::Null => Vec::new(),
        other => {
            return Err(ApiError::unexpected(format!(
                "list response is not an array: {other}"
            )));
        }
    };

    Ok(items.into_iter().map(Record).collect())
}

/// Bundle entries carry the document under `resource`
fn unwrap_entry(item: Value) -> Value {
    match item {
        Value::Object(mut map) if map.get("resource").is_some_and(Value::is_object) => {
            map.remove("resource").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_field_priority() {
        let record = Record::new(json!({"RecordID": "r-1", "id": "other"}));
        assert_eq!(record.id().as_deref(), Some("r-1"));

        let fhir = Record::new(json!({"resourceType": "MedicationRequest", "id": "mr-7"}));
        assert_eq!(fhir.id().as_deref(), Some("mr-7"));

        let mongo = Record::new(json!({"_id": 42}));
        assert_eq!(mongo.id().as_deref(), Some("42"));
    }

    #[test]
    fn test_missing_id() {
        let record = Record::new(json!({"RecordID": "", "name": "x"}));
        assert!(record.id().is_none());
        assert!(!record.has_id(""));
    }

    #[test]
    fn test_bare_array() {
        let records = records_from_value(json!([{"RecordID": "a"}, {"RecordID": "b"}])).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[1].has_id("b"));
    }

    #[test]
    fn test_wrapped_array() {
        let records = records_from_value(json!({"data": [{"id": "1"}], "total": 1})).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_fhir_bundle() {
        let bundle = json!({
            "resourceType": "Bundle",
            "entry": [
                {
                    "fullUrl": "urn:1",
                    "resource": {"resourceType": "MedicationRequest", "id": "mr-1"}
                },
                {"resource": {"resourceType": "MedicationRequest", "id": "mr-2"}}
            ]
        });
        let records = records_from_value(bundle).unwrap();
        assert_eq!(
            records.iter().filter_map(Record::id).collect::<Vec<_>>(),
            vec!["mr-1", "mr-2"]
        );
    }

    #[test]
    fn test_resource_field_kept_outside_bundle() {
        let records = records_from_value(json!([
            {"RecordID": "r1", "resource": {"kind": "lab", "value": 5}}
        ]))
        .unwrap();
        assert!(records[0].has_id("r1"));
        assert_eq!(records[0].get("resource"), Some(&json!({"kind": "lab", "value": 5})));

        let wrapped = records_from_value(json!({
            "data": [{"id": "d1", "resource": {"kind": "note"}}]
        }))
        .unwrap();
        assert!(wrapped[0].has_id("d1"));
    }

    #[test]
    fn test_bundle_entry_with_many_fields_unwrapped() {
        let bundle = json!({
            "entry": [{
                "fullUrl": "urn:1",
                "search": {"mode": "match"},
                "request": {"method": "GET"},
                "response": {"status": "200"},
                "resource": {"id": "mr-9"}
            }]
        });
        let records = records_from_value(bundle).unwrap();
        assert!(records[0].has_id("mr-9"));
    }

    #[test]
    fn test_unexpected_shapes() {
        assert!(records_from_value(json!({"message": "ok"})).is_err());
        assert!(records_from_value(json!("nope")).is_err());
        assert!(records_from_value(Value::Null).unwrap().is_empty());
    }
}
