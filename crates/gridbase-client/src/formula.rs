//! Backend filter-formula construction for free-text search.
//!
//! The record store evaluates a boolean formula server-side. A search term
//! is embedded as a quoted string literal, so it must be escaped first to
//! keep user input from breaking out of the literal.

use gridbase_core::{Field, StoreError};

/// Escape a string for embedding inside a double-quoted formula literal.
pub fn escape_formula_string(term: &str) -> String {
    term.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Resolve which fields a search should target.
///
/// With no explicit request, every text-like field of the table is used.
/// Explicitly requested names must each resolve to a text-like field, or
/// the whole search is rejected before any records request is made.
pub fn searchable_fields<'a>(
    fields: &'a [Field],
    requested: Option<&[String]>,
) -> Result<Vec<&'a Field>, StoreError> {
    match requested {
        None => Ok(fields.iter().filter(|f| f.is_text_searchable()).collect()),
        Some(names) => {
            let mut resolved = Vec::with_capacity(names.len());
            let mut invalid = Vec::new();
            for name in names {
                match fields.iter().find(|f| &f.name == name) {
                    Some(field) if field.is_text_searchable() => resolved.push(field),
                    _ => invalid.push(name.as_str()),
                }
            }
            if invalid.is_empty() {
                Ok(resolved)
            } else {
                Err(StoreError::InvalidSearchFields(invalid.join(", ")))
            }
        }
    }
}

/// Build the `OR(FIND(...), ...)` predicate over the given fields.
///
/// Returns `None` when there is nothing to search: an empty field set can
/// only match nothing, so the caller should skip the backend call.
pub fn build_search_formula(term: &str, fields: &[&Field]) -> Option<String> {
    if fields.is_empty() {
        return None;
    }

    let needle = escape_formula_string(&term.to_lowercase());
    let clauses: Vec<String> = fields
        .iter()
        .map(|field| format!("FIND(\"{}\", LOWER({{{}}} & \"\")) > 0", needle, field.name))
        .collect();

    Some(if clauses.len() == 1 {
        clauses.into_iter().next().unwrap()
    } else {
        format!("OR({})", clauses.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, field_type: &str) -> Field {
        Field {
            id: format!("fld_{name}"),
            name: name.to_string(),
            field_type: field_type.to_string(),
            description: None,
            options: None,
        }
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(escape_formula_string(r#"a"b\c"#), r#"a\"b\\c"#);
    }

    #[test]
    fn defaults_to_all_text_fields() {
        let fields = vec![
            field("Name", "singleLineText"),
            field("Count", "number"),
            field("Notes", "multilineText"),
        ];
        let resolved = searchable_fields(&fields, None).unwrap();
        let names: Vec<_> = resolved.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Name", "Notes"]);
    }

    #[test]
    fn rejects_non_text_and_unknown_fields() {
        let fields = vec![field("Name", "singleLineText"), field("Count", "number")];

        let err = searchable_fields(&fields, Some(&["Count".to_string()])).unwrap_err();
        assert!(err.to_string().contains("invalid fields requested"));
        assert!(err.to_string().contains("Count"));

        let err = searchable_fields(&fields, Some(&["Missing".to_string()])).unwrap_err();
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn single_field_needs_no_or_wrapper() {
        let f = field("Name", "singleLineText");
        let formula = build_search_formula("Acme", &[&f]).unwrap();
        assert_eq!(formula, "FIND(\"acme\", LOWER({Name} & \"\")) > 0");
    }

    #[test]
    fn multiple_fields_are_wrapped_in_or() {
        let a = field("Name", "singleLineText");
        let b = field("Notes", "multilineText");
        let formula = build_search_formula("x", &[&a, &b]).unwrap();
        assert!(formula.starts_with("OR("));
        assert!(formula.contains("{Name}"));
        assert!(formula.contains("{Notes}"));
    }

    #[test]
    fn empty_field_set_yields_no_formula() {
        assert!(build_search_formula("x", &[]).is_none());
    }

    #[test]
    fn term_cannot_escape_the_literal() {
        let f = field("Name", "singleLineText");
        let formula = build_search_formula(r#"") > 0, TRUE(), ""#, &[&f]).unwrap();
        // The injected quote must stay escaped inside the literal.
        assert!(!formula.contains(r#"FIND("") > 0"#));
        assert!(formula.contains(r#"\""#));
    }
}
