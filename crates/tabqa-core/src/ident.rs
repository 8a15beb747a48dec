//! Identifier sanitization for derived table and column names.
//!
//! Ingested files and spreadsheet sheets carry arbitrary names; the store
//! only accepts SQL identifiers. `sanitize` maps any string into the
//! identifier alphabet and is idempotent, so re-deriving a name from an
//! already-derived name cannot drift.

/// Prefix applied when a sanitized name would not start with a letter
/// or underscore.
const PREFIX: &str = "col_";

/// Map a raw name into a safe SQL identifier.
///
/// Every character outside `[A-Za-z0-9_]` becomes `_`. If the result does
/// not start with an ASCII letter or underscore it is prefixed with
/// `col_`. Empty input sanitizes to `col_`.
///
/// Idempotent: `sanitize(sanitize(x)) == sanitize(x)`.
#[must_use]
pub fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    let starts_ok = out
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok {
        out = format!("{PREFIX}{out}");
    }
    out
}

/// Derive the store table name for a flat (single-sheet) file.
#[must_use]
pub fn table_name_for_file(file_id: &str) -> String {
    sanitize(&format!("table_{file_id}"))
}

/// Derive the store table name for one sheet of a multi-sheet file.
#[must_use]
pub fn table_name_for_sheet(file_id: &str, sheet_name: &str) -> String {
    sanitize(&format!("table_{file_id}_{}", sanitize(sheet_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn replaces_non_identifier_characters() {
        assert_eq!(sanitize("unit price ($)"), "unit_price____");
        assert_eq!(sanitize("结晶釜价格表"), "______");
        assert_eq!(sanitize("qty"), "qty");
    }

    #[test]
    fn prefixes_names_not_starting_with_letter_or_underscore() {
        assert_eq!(sanitize("2024_sales"), "col_2024_sales");
        assert_eq!(sanitize("_hidden"), "_hidden");
        assert_eq!(sanitize(""), "col_");
    }

    #[test]
    fn sheet_table_names_compose_file_id_and_sheet() {
        assert_eq!(
            table_name_for_sheet("f1", "Q1 Sales"),
            "table_f1_Q1_Sales"
        );
        assert_eq!(table_name_for_file("f1"), "table_f1");
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(name in ".{0,64}") {
            let once = sanitize(&name);
            prop_assert_eq!(sanitize(&once), once);
        }

        #[test]
        fn sanitize_output_is_identifier_safe(name in ".{0,64}") {
            let out = sanitize(&name);
            prop_assert!(!out.is_empty());
            prop_assert!(out.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
            let first = out.chars().next().unwrap();
            prop_assert!(first.is_ascii_alphabetic() || first == '_');
        }
    }
}
