//! Total stringification over arbitrary field values.
//!
//! Record fields arrive as untyped JSON. The search synthesizer needs a
//! human-readable form for every possible shape, so this function is total
//! over the `serde_json::Value` variants and never fails.

use serde_json::Value;

/// Render a field value for display in a search snippet.
///
/// Null and absent values become the empty string; scalars use their
/// literal form; sequences stringify each element, drop empties, and join
/// with `", "`; nested objects fall back to compact JSON (or the empty
/// string if serialization fails).
pub fn stringify_field_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(stringify_field_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_use_literal_form() {
        assert_eq!(stringify_field_value(&json!(null)), "");
        assert_eq!(stringify_field_value(&json!(true)), "true");
        assert_eq!(stringify_field_value(&json!(42)), "42");
        assert_eq!(stringify_field_value(&json!(1.5)), "1.5");
        assert_eq!(stringify_field_value(&json!("hello")), "hello");
    }

    #[test]
    fn sequences_drop_empties_and_join() {
        assert_eq!(
            stringify_field_value(&json!(["a", null, "b", ""])),
            "a, b"
        );
        assert_eq!(stringify_field_value(&json!([])), "");
    }

    #[test]
    fn nested_objects_serialize_to_json() {
        let attachment = json!({"url": "https://files.example/1", "filename": "a.png"});
        let rendered = stringify_field_value(&attachment);
        assert!(rendered.contains("\"filename\":\"a.png\""));
    }

    #[test]
    fn nested_sequences_recurse() {
        assert_eq!(
            stringify_field_value(&json!([["x"], ["y", null]])),
            "x, y"
        );
    }
}
