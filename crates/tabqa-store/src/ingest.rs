//! Tabular file readers and table materialization.
//!
//! A file is parsed fully into in-memory [`Sheet`]s before the store is
//! opened; parse failures therefore never leave a partial table behind. Each
//! sheet is written inside one transaction that drops and recreates the
//! derived table, so replacement is atomic for concurrent readers.

use std::path::Path;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};

use tabqa_core::ident::{sanitize, table_name_for_file, table_name_for_sheet};
use tabqa_core::{ColumnInfo, Result, TabqaError, TableInfo};

/// One fully-parsed sheet, ready to be written as a table.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub table_name: String,
    pub sheet_name: Option<String>,
    /// Sanitized, de-duplicated column names.
    pub columns: Vec<String>,
    /// Declared SQL type per column.
    pub decl_types: Vec<&'static str>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl Sheet {
    /// Build a sheet from string cells, running the same column-type
    /// inference the CSV reader uses.
    pub fn of_strings(
        table_name: &str,
        sheet_name: Option<&str>,
        columns: Vec<&str>,
        rows: Vec<Vec<&str>>,
    ) -> Self {
        let columns = dedupe_columns(columns.iter().map(|c| sanitize(c)).collect());
        let cells: Vec<Vec<String>> = rows
            .into_iter()
            .map(|r| r.into_iter().map(str::to_string).collect())
            .collect();
        let decl_types = infer_string_types(columns.len(), &cells);
        let rows = cells
            .into_iter()
            .map(|r| typed_row(&r, &decl_types, columns.len()))
            .collect();
        Self {
            table_name: table_name.to_string(),
            sheet_name: sheet_name.map(str::to_string),
            columns,
            decl_types,
            rows,
        }
    }
}

/// Parse a tabular file into sheets. Flat formats yield one implicit sheet;
/// spreadsheets yield one sheet per workbook sheet.
pub fn read_sheets(file_id: &str, path: &Path) -> Result<Vec<Sheet>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => Ok(vec![read_csv(file_id, path)?]),
        "xlsx" | "xls" => read_excel(file_id, path),
        other => Err(TabqaError::Ingestion(format!(
            "unsupported file type for tabular import: .{other}"
        ))),
    }
}

fn read_csv(file_id: &str, path: &Path) -> Result<Sheet> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| TabqaError::Ingestion(format!("cannot read csv: {e}")))?;

    let headers: Vec<&str> = reader
        .headers()
        .map_err(|e| TabqaError::Ingestion(format!("cannot read csv header: {e}")))?
        .iter()
        .collect();
    if headers.is_empty() {
        return Err(TabqaError::Ingestion("csv file has no columns".to_string()));
    }
    let columns = dedupe_columns(headers.iter().map(|h| sanitize(h)).collect());

    let mut cells: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| TabqaError::Ingestion(format!("malformed csv row: {e}")))?;
        cells.push(record.iter().map(str::to_string).collect());
    }

    let decl_types = infer_string_types(columns.len(), &cells);
    let rows = cells
        .into_iter()
        .map(|r| typed_row(&r, &decl_types, columns.len()))
        .collect();

    Ok(Sheet {
        table_name: table_name_for_file(file_id),
        sheet_name: None,
        columns,
        decl_types,
        rows,
    })
}

fn read_excel(file_id: &str, path: &Path) -> Result<Vec<Sheet>> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| TabqaError::Ingestion(format!("cannot open workbook: {e}")))?;

    let mut sheets = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| TabqaError::Ingestion(format!("cannot read sheet {sheet_name}: {e}")))?;

        let mut rows_iter = range.rows();
        let Some(header_row) = rows_iter.next() else {
            // Blank sheets contribute no table.
            continue;
        };
        let columns = dedupe_columns(
            header_row
                .iter()
                .map(|cell| sanitize(&cell_text(cell)))
                .collect(),
        );

        let rows: Vec<Vec<SqlValue>> = rows_iter
            .map(|row| {
                let mut out: Vec<SqlValue> = row.iter().map(cell_value).collect();
                out.resize(columns.len(), SqlValue::Null);
                out
            })
            .collect();

        let decl_types = infer_value_types(columns.len(), &rows);
        sheets.push(Sheet {
            table_name: table_name_for_sheet(file_id, &sheet_name),
            sheet_name: Some(sheet_name.clone()),
            columns,
            decl_types,
            rows,
        });
    }

    if sheets.is_empty() {
        return Err(TabqaError::Ingestion(
            "workbook contains no non-empty sheets".to_string(),
        ));
    }
    Ok(sheets)
}

/// Write one sheet as a table, replacing any previous table of the same
/// name. Drop + create + insert happen inside a single transaction.
pub fn write_sheet(conn: &mut Connection, sheet: &Sheet) -> Result<TableInfo> {
    let store_err = |e: rusqlite::Error| TabqaError::Store(e.to_string());

    let column_defs: Vec<String> = sheet
        .columns
        .iter()
        .zip(&sheet.decl_types)
        .map(|(name, ty)| format!("\"{name}\" {ty}"))
        .collect();
    let create_sql = format!(
        "CREATE TABLE \"{}\" ({})",
        sheet.table_name,
        column_defs.join(", ")
    );
    let placeholders: Vec<String> = (1..=sheet.columns.len()).map(|i| format!("?{i}")).collect();
    let insert_sql = format!(
        "INSERT INTO \"{}\" VALUES ({})",
        sheet.table_name,
        placeholders.join(", ")
    );

    let tx = conn.transaction().map_err(store_err)?;
    tx.execute(
        &format!("DROP TABLE IF EXISTS \"{}\"", sheet.table_name),
        [],
    )
    .map_err(store_err)?;
    tx.execute(&create_sql, []).map_err(store_err)?;
    {
        let mut stmt = tx.prepare(&insert_sql).map_err(store_err)?;
        for row in &sheet.rows {
            stmt.execute(params_from_iter(row.iter()))
                .map_err(store_err)?;
        }
    }
    tx.commit().map_err(store_err)?;

    Ok(TableInfo {
        table_name: sheet.table_name.clone(),
        sheet_name: sheet.sheet_name.clone(),
        columns: sheet
            .columns
            .iter()
            .zip(&sheet.decl_types)
            .map(|(name, ty)| ColumnInfo {
                name: name.clone(),
                decl_type: (*ty).to_string(),
            })
            .collect(),
        row_count: sheet.rows.len() as u64,
    })
}

/// Disambiguate sanitized column names that collide within one sheet.
fn dedupe_columns(columns: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(columns.len());
    for col in columns {
        if !seen.contains(&col) {
            seen.push(col);
            continue;
        }
        let mut n = 2;
        while seen.contains(&format!("{col}_{n}")) {
            n += 1;
        }
        seen.push(format!("{col}_{n}"));
    }
    seen
}

/// Infer per-column SQL types from string cells: all-integer columns become
/// INTEGER, all-numeric columns REAL, everything else TEXT. Empty cells are
/// ignored (they load as NULL).
fn infer_string_types(n_columns: usize, rows: &[Vec<String>]) -> Vec<&'static str> {
    (0..n_columns)
        .map(|i| {
            let mut ty = "INTEGER";
            let mut any = false;
            for row in rows {
                let cell = row.get(i).map(String::as_str).unwrap_or("").trim();
                if cell.is_empty() {
                    continue;
                }
                any = true;
                if ty == "INTEGER" && cell.parse::<i64>().is_err() {
                    ty = "REAL";
                }
                if ty == "REAL" && cell.parse::<f64>().is_err() {
                    ty = "TEXT";
                    break;
                }
            }
            if any { ty } else { "TEXT" }
        })
        .collect()
}

/// Infer per-column SQL types from already-typed cells (spreadsheet path).
fn infer_value_types(n_columns: usize, rows: &[Vec<SqlValue>]) -> Vec<&'static str> {
    (0..n_columns)
        .map(|i| {
            let mut ty = "INTEGER";
            let mut any = false;
            for row in rows {
                match row.get(i) {
                    None | Some(SqlValue::Null) => {}
                    Some(SqlValue::Integer(_)) => any = true,
                    Some(SqlValue::Real(_)) => {
                        any = true;
                        if ty == "INTEGER" {
                            ty = "REAL";
                        }
                    }
                    Some(_) => {
                        any = true;
                        ty = "TEXT";
                        break;
                    }
                }
            }
            if any { ty } else { "TEXT" }
        })
        .collect()
}

/// Convert one string row into typed SQL values per the inferred column
/// types. Cells that fail their column's parse load as TEXT rather than
/// corrupting the row.
fn typed_row(cells: &[String], decl_types: &[&'static str], n_columns: usize) -> Vec<SqlValue> {
    (0..n_columns)
        .map(|i| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("").trim();
            if cell.is_empty() {
                return SqlValue::Null;
            }
            match decl_types[i] {
                "INTEGER" => cell
                    .parse::<i64>()
                    .map_or_else(|_| SqlValue::Text(cell.to_string()), SqlValue::Integer),
                "REAL" => cell
                    .parse::<f64>()
                    .map_or_else(|_| SqlValue::Text(cell.to_string()), SqlValue::Real),
                _ => SqlValue::Text(cell.to_string()),
            }
        })
        .collect()
}

fn cell_text(cell: &calamine::Data) -> String {
    use calamine::Data;
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell_value(cell: &calamine::Data) -> SqlValue {
    use calamine::Data;
    match cell {
        Data::Empty => SqlValue::Null,
        Data::Int(i) => SqlValue::Integer(*i),
        Data::Float(f) => SqlValue::Real(*f),
        Data::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Data::String(s) => {
            if s.is_empty() {
                SqlValue::Null
            } else {
                SqlValue::Text(s.clone())
            }
        }
        Data::Error(e) => SqlValue::Text(format!("#ERR {e:?}")),
        other => SqlValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_type_inference_prefers_narrowest_type() {
        let rows = vec![
            vec!["1".to_string(), "9.5".to_string(), "a".to_string(), "".to_string()],
            vec!["2".to_string(), "3".to_string(), "7".to_string(), "".to_string()],
        ];
        assert_eq!(
            infer_string_types(4, &rows),
            vec!["INTEGER", "REAL", "TEXT", "TEXT"]
        );
    }

    #[test]
    fn duplicate_columns_get_numeric_suffixes() {
        let cols = vec!["a".to_string(), "a".to_string(), "a".to_string()];
        assert_eq!(dedupe_columns(cols), vec!["a", "a_2", "a_3"]);
    }

    #[test]
    fn empty_cells_load_as_null() {
        let row = typed_row(
            &["".to_string(), "5".to_string()],
            &["INTEGER", "INTEGER"],
            2,
        );
        assert_eq!(row[0], SqlValue::Null);
        assert_eq!(row[1], SqlValue::Integer(5));
    }
}
