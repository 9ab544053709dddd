//! Result shaping for schema-browsing tools.
//!
//! Backend responses pass through mostly untouched; the one policy here is
//! the `detailLevel` tiering for table descriptors, which selects which
//! keys are exposed without reshaping anything else.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use gridbase_core::Table;

/// How much of a table descriptor to expose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DetailLevel {
    /// Table id and name only.
    TableIdentifiersOnly,
    /// Table id and name, plus id and name for each field and view.
    IdentifiersOnly,
    /// The complete descriptor including field types and options.
    #[default]
    Full,
}

/// Shape a table descriptor according to the requested detail level.
pub fn table_to_json(table: &Table, detail: DetailLevel) -> Value {
    match detail {
        DetailLevel::TableIdentifiersOnly => json!({
            "id": table.id,
            "name": table.name,
        }),
        DetailLevel::IdentifiersOnly => json!({
            "id": table.id,
            "name": table.name,
            "fields": table
                .fields
                .iter()
                .map(|f| json!({"id": f.id, "name": f.name}))
                .collect::<Vec<_>>(),
            "views": table
                .views
                .iter()
                .map(|v| json!({"id": v.id, "name": v.name}))
                .collect::<Vec<_>>(),
        }),
        DetailLevel::Full => serde_json::to_value(table).unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        serde_json::from_value(json!({
            "id": "tbl1",
            "name": "Tasks",
            "description": "Things to do",
            "primaryFieldId": "fld1",
            "fields": [
                {"id": "fld1", "name": "Title", "type": "singleLineText"},
                {"id": "fld2", "name": "Done", "type": "checkbox", "options": {"icon": "check"}}
            ],
            "views": [{"id": "viw1", "name": "Grid", "type": "grid"}]
        }))
        .unwrap()
    }

    #[test]
    fn table_identifiers_only_exposes_nothing_else() {
        let value = table_to_json(&sample_table(), DetailLevel::TableIdentifiersOnly);
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["id"], "tbl1");
        assert_eq!(object["name"], "Tasks");
        assert!(!object.contains_key("fields"));
        assert!(!object.contains_key("views"));
        assert!(!object.contains_key("description"));
    }

    #[test]
    fn identifiers_only_trims_fields_and_views() {
        let value = table_to_json(&sample_table(), DetailLevel::IdentifiersOnly);
        let fields = value["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields[0].get("type").is_none());
        assert_eq!(fields[1]["name"], "Done");
        assert_eq!(value["views"][0]["name"], "Grid");
    }

    #[test]
    fn full_detail_keeps_types_and_options() {
        let value = table_to_json(&sample_table(), DetailLevel::Full);
        assert_eq!(value["fields"][1]["type"], "checkbox");
        assert_eq!(value["fields"][1]["options"]["icon"], "check");
        assert_eq!(value["primaryFieldId"], "fld1");
    }

    #[test]
    fn detail_level_parses_camel_case_values() {
        let detail: DetailLevel = serde_json::from_value(json!("tableIdentifiersOnly")).unwrap();
        assert_eq!(detail, DetailLevel::TableIdentifiersOnly);
        let detail: DetailLevel = serde_json::from_value(json!("full")).unwrap();
        assert_eq!(detail, DetailLevel::Full);
        assert_eq!(DetailLevel::default(), DetailLevel::Full);
    }
}
