//! Tabular data model as exposed by the record store.
//!
//! Field values inside a [`Record`] are deliberately kept as opaque
//! `serde_json::Value`s: the backend allows scalars, sequences, and nested
//! objects (attachments, linked records), and the MCP layer must treat all
//! of them defensively. See [`crate::value`] for stringification.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field types whose values are plain text and therefore searchable with
/// the backend's formula predicate.
pub const TEXT_FIELD_TYPES: &[&str] = &[
    "singleLineText",
    "multilineText",
    "richText",
    "email",
    "url",
    "phoneNumber",
    "lookup",
    "rollup",
];

/// Whether a field type participates in free-text search.
pub fn is_text_field_type(field_type: &str) -> bool {
    TEXT_FIELD_TYPES.contains(&field_type)
}

/// Root container of tables. Read-only metadata from this system's
/// perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Base {
    pub id: String,
    pub name: String,
    pub permission_level: String,
}

/// A typed collection of records within a base.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub primary_field_id: String,
    pub fields: Vec<Field>,
    #[serde(default)]
    pub views: Vec<View>,
}

impl Table {
    /// Resolve the table's primary field. The backend guarantees
    /// `primary_field_id` references a field of this table; a miss here
    /// means the schema response was inconsistent.
    pub fn primary_field(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == self.primary_field_id)
    }
}

/// A typed column definition. The type enumeration is open on the backend
/// side, so it is carried as a string rather than an enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl Field {
    /// Whether this field can be targeted by free-text search.
    pub fn is_text_searchable(&self) -> bool {
        is_text_field_type(&self.field_type)
    }
}

/// A saved filter/sort/visibility configuration. Read-only metadata here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub view_type: Option<String>,
}

/// A row of field values, keyed by field name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: serde_json::Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
}

/// Identifier plus replacement fields for a batch update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPatch {
    pub id: String,
    pub fields: serde_json::Map<String, Value>,
}

/// Deletion acknowledgement returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedRecord {
    pub id: String,
    pub deleted: bool,
}

/// Definition of a field to create, or the full field set of a new table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// Options for listing records. All optional; pagination is handled by the
/// client, not the caller.
#[derive(Debug, Clone, Default)]
pub struct ListRecordsOptions {
    pub max_records: Option<usize>,
    pub filter_by_formula: Option<String>,
    pub view: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_field_types_are_recognized() {
        assert!(is_text_field_type("singleLineText"));
        assert!(is_text_field_type("rollup"));
        assert!(!is_text_field_type("number"));
        assert!(!is_text_field_type("checkbox"));
    }

    #[test]
    fn primary_field_resolves_within_own_fields() {
        let table: Table = serde_json::from_value(json!({
            "id": "tbl1",
            "name": "Contacts",
            "primaryFieldId": "fld2",
            "fields": [
                {"id": "fld1", "name": "Email", "type": "email"},
                {"id": "fld2", "name": "Name", "type": "singleLineText"}
            ],
            "views": []
        }))
        .unwrap();

        assert_eq!(table.primary_field().unwrap().name, "Name");
    }

    #[test]
    fn record_tolerates_missing_fields_map() {
        let record: Record = serde_json::from_value(json!({"id": "rec1"})).unwrap();
        assert!(record.fields.is_empty());
    }
}
