//! Result formatting: raw rows → scalar or fixed-width table text.
//!
//! Deterministic, input-only transformation. The output feeds both the
//! synthesizer prompt and, for debugging, the CLI.

use tabqa_core::QueryResult;

/// Rendered for an empty result set — never the empty string.
pub const EMPTY_MARKER: &str = "(no results)";
/// Label used for anonymous aggregate scalars.
pub const RESULT_LABEL: &str = "Result";
/// Rows shown before the table is cut with a trailer.
pub const MAX_ROWS: usize = 20;

/// Render a query result as text.
///
/// - empty → [`EMPTY_MARKER`]
/// - single row, single column → `"<column>: <value>"`, or
///   `"Result: <value>"` when the column name starts with `count`
///   (any case)
/// - otherwise → fixed-width table in the given column order, cut at
///   [`MAX_ROWS`] rows with a trailer naming the total
#[must_use]
pub fn format_result(result: &QueryResult) -> String {
    if result.rows.is_empty() {
        return EMPTY_MARKER.to_string();
    }

    if result.rows.len() == 1 && result.columns.len() == 1 {
        let column = &result.columns[0];
        let value = display(&result.rows[0][0]);
        if column.to_lowercase().starts_with("count") {
            return format!("{RESULT_LABEL}: {value}");
        }
        return format!("{column}: {value}");
    }

    format_table(result)
}

fn format_table(result: &QueryResult) -> String {
    let shown = result.rows.len().min(MAX_ROWS);

    // Column width = max(header, longest shown cell), counted in chars so
    // multi-byte cell text does not inflate the column.
    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.chars().count()).collect();
    for row in &result.rows[..shown] {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(display(cell).chars().count());
        }
    }

    let mut output = String::new();

    let header: Vec<String> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:width$}", c, width = widths[i]))
        .collect();
    output.push_str(&header.join(" | "));
    output.push('\n');

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&sep.join("-+-"));
    output.push('\n');

    for row in &result.rows[..shown] {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:width$}", display(cell), width = widths[i]))
            .collect();
        output.push_str(&cells.join(" | "));
        output.push('\n');
    }

    if result.rows.len() > MAX_ROWS {
        output.push_str(&format!(
            "... showing first {MAX_ROWS} of {} rows\n",
            result.rows.len()
        ));
    }

    output
}

fn display(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(columns: &[&str], rows: Vec<Vec<serde_json::Value>>) -> QueryResult {
        QueryResult {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn empty_result_renders_marker() {
        let r = result(&["price"], vec![]);
        assert_eq!(format_result(&r), EMPTY_MARKER);
    }

    #[test]
    fn single_scalar_renders_column_and_value() {
        let r = result(&["price"], vec![vec![serde_json::json!(9.5)]]);
        assert_eq!(format_result(&r), "price: 9.5");
    }

    #[test]
    fn count_column_renders_result_label_case_insensitively() {
        let r = result(&["COUNT(*)"], vec![vec![serde_json::json!(2)]]);
        assert_eq!(format_result(&r), "Result: 2");

        let r = result(&["count"], vec![vec![serde_json::json!(2)]]);
        assert_eq!(format_result(&r), "Result: 2");
    }

    #[test]
    fn table_preserves_column_order_and_aligns_widths() {
        let r = result(
            &["qty", "price"],
            vec![
                vec![serde_json::json!(3), serde_json::json!(9.5)],
                vec![serde_json::json!(7), serde_json::json!(12.0)],
            ],
        );
        let out = format_result(&r);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "qty | price");
        assert_eq!(lines[1], "----+------");
        assert_eq!(lines[2], "3   | 9.5  ");
        assert_eq!(lines[3], "7   | 12.0 ");
    }

    #[test]
    fn widths_count_chars_not_bytes_for_non_ascii_cells() {
        let r = result(
            &["name", "qty"],
            vec![
                vec![serde_json::json!("结晶釜"), serde_json::json!(3)],
                vec![serde_json::json!("x"), serde_json::json!(7)],
            ],
        );
        let out = format_result(&r);
        let lines: Vec<&str> = out.lines().collect();
        // "结晶釜" is 3 chars (9 bytes); the column stays 4 chars wide.
        assert_eq!(lines[0], "name | qty");
        assert_eq!(lines[1], "-----+----");
        assert_eq!(lines[2], "结晶釜  | 3  ");
        assert_eq!(lines[3], "x    | 7  ");
    }

    #[test]
    fn twenty_five_rows_show_twenty_plus_trailer() {
        let rows: Vec<Vec<serde_json::Value>> = (0..25)
            .map(|i| vec![serde_json::json!(i), serde_json::json!(i * 2)])
            .collect();
        let out = format_result(&result(&["a", "b"], rows));

        let lines: Vec<&str> = out.lines().collect();
        // header + separator + 20 data rows + trailer
        assert_eq!(lines.len(), 23);
        assert_eq!(lines[22], "... showing first 20 of 25 rows");
    }

    #[test]
    fn null_cells_render_as_null() {
        let r = result(
            &["a", "b"],
            vec![vec![serde_json::Value::Null, serde_json::json!("x")]],
        );
        assert!(format_result(&r).contains("null"));
    }
}
