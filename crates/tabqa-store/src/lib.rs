//! # tabqa-store
//!
//! Per-knowledge-base embedded relational store.
//!
//! Each knowledge base owns exactly one SQLite file under the store
//! directory, addressed by knowledge-base id. Tabular uploads are
//! materialized as tables ([`StoreManager::ingest_tabular`]), the catalog is
//! read back through schema reflection ([`StoreManager::schema`]), and
//! generated statements run through [`StoreManager::execute`]. The store
//! file's lifecycle is tied 1:1 to its knowledge base; the deletion
//! collaborator calls [`StoreManager::drop_store`].

mod ingest;

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use tracing::debug;

use tabqa_core::{QueryResult, Result, TabqaError, TableInfo};

pub use ingest::Sheet;

/// Manages one SQLite store file per knowledge base.
pub struct StoreManager {
    dir: PathBuf,
}

impl StoreManager {
    /// Create a manager rooted at `dir`. The directory is created lazily on
    /// first ingestion.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the store file for a knowledge base. The id is encoded
    /// injectively, so distinct ids never collide onto one file.
    #[must_use]
    pub fn db_path(&self, kb_id: &str) -> PathBuf {
        self.dir.join(format!("{}.db", encode_kb_id(kb_id)))
    }

    /// Open (creating if needed) the store for a knowledge base.
    fn open(&self, kb_id: &str) -> Result<Connection> {
        std::fs::create_dir_all(&self.dir)?;
        Connection::open(self.db_path(kb_id)).map_err(|e| TabqaError::Store(e.to_string()))
    }

    /// Open the store for a knowledge base, failing if it was never created.
    fn open_existing(&self, kb_id: &str) -> Result<Connection> {
        let path = self.db_path(kb_id);
        if !path.exists() {
            return Err(TabqaError::StoreNotFound(kb_id.to_string()));
        }
        Connection::open(path).map_err(|e| TabqaError::Store(e.to_string()))
    }

    /// Ingest a tabular file into the knowledge base's store.
    ///
    /// `.csv` files become one table; `.xlsx`/`.xls` files become one table
    /// per sheet. Each table replaces any previous table of the same derived
    /// name inside a single transaction, so concurrent readers never observe
    /// a half-replaced table.
    ///
    /// # Errors
    ///
    /// Returns [`TabqaError::Ingestion`] for unsupported extensions or
    /// malformed files; the file is parsed fully before the store is touched,
    /// so a parse failure leaves the store unmutated.
    pub fn ingest_tabular(
        &self,
        kb_id: &str,
        file_id: &str,
        path: impl AsRef<Path>,
    ) -> Result<Vec<TableInfo>> {
        let path = path.as_ref();
        let sheets = ingest::read_sheets(file_id, path)?;

        let mut conn = self.open(kb_id)?;
        let mut tables = Vec::with_capacity(sheets.len());
        for sheet in sheets {
            debug!(kb_id, table = %sheet.table_name, rows = sheet.rows.len(), "writing table");
            tables.push(ingest::write_sheet(&mut conn, &sheet)?);
        }
        Ok(tables)
    }

    /// Enumerate every table in the knowledge base's store.
    ///
    /// A knowledge base with no store file yet yields an empty list, not an
    /// error — nothing tabular has been ingested.
    pub fn schema(&self, kb_id: &str) -> Result<Vec<TableInfo>> {
        let path = self.db_path(kb_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let conn = Connection::open(path).map_err(|e| TabqaError::Store(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .map_err(|e| TabqaError::Store(e.to_string()))?;
        let names: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .and_then(Iterator::collect)
            .map_err(|e| TabqaError::Store(e.to_string()))?;
        drop(stmt);

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            tables.push(describe_table(&conn, &name)?);
        }
        Ok(tables)
    }

    /// Execute a statement against the knowledge base's store.
    ///
    /// Only read-only statements (`SELECT`, `WITH`) are accepted; the
    /// statements come from a text-completion model and are never trusted
    /// with writes. The connection is scoped to this call and released on
    /// every branch.
    ///
    /// # Errors
    ///
    /// [`TabqaError::StoreNotFound`] if nothing was ever ingested;
    /// [`TabqaError::QueryExecution`] for rejected or failing statements,
    /// carrying the attempted statement text.
    pub fn execute(&self, kb_id: &str, sql: &str) -> Result<QueryResult> {
        if !is_read_only(sql) {
            return Err(TabqaError::QueryExecution {
                message: "only SELECT statements are accepted".to_string(),
                statement: sql.to_string(),
            });
        }

        let conn = self.open_existing(kb_id)?;
        debug!(kb_id, sql, "executing statement");

        let exec_err = |e: rusqlite::Error| TabqaError::QueryExecution {
            message: e.to_string(),
            statement: sql.to_string(),
        };

        let mut stmt = conn.prepare(sql).map_err(exec_err)?;
        let columns: Vec<String> = stmt.column_names().iter().map(ToString::to_string).collect();
        let n = columns.len();

        let mut rows_out = Vec::new();
        let mut rows = stmt.query([]).map_err(exec_err)?;
        while let Some(row) = rows.next().map_err(exec_err)? {
            let mut out = Vec::with_capacity(n);
            for i in 0..n {
                out.push(json_value(row.get_ref(i).map_err(exec_err)?));
            }
            rows_out.push(out);
        }

        Ok(QueryResult { columns, rows: rows_out })
    }

    /// Remove the knowledge base's store file. Invoked by the knowledge-base
    /// deletion collaborator; removing a store that never existed is a no-op.
    pub fn drop_store(&self, kb_id: &str) -> Result<()> {
        let path = self.db_path(kb_id);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Encode a knowledge-base id as a file-name stem.
///
/// ASCII alphanumerics and `-` pass through; every other byte becomes
/// `_` plus two hex digits (`_` itself included, as `_5f`). The mapping is
/// injective: distinct ids always yield distinct store files.
fn encode_kb_id(kb_id: &str) -> String {
    let mut out = String::with_capacity(kb_id.len());
    for b in kb_id.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' {
            out.push(b as char);
        } else {
            out.push_str(&format!("_{b:02x}"));
        }
    }
    out
}

/// Whether the statement's leading keyword marks it read-only.
fn is_read_only(sql: &str) -> bool {
    let first = sql.trim_start().split_whitespace().next().unwrap_or("");
    first.eq_ignore_ascii_case("select") || first.eq_ignore_ascii_case("with")
}

/// Read one table's columns (via `PRAGMA table_info`) and row count.
fn describe_table(conn: &Connection, name: &str) -> Result<TableInfo> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info(\"{name}\")"))
        .map_err(|e| TabqaError::Store(e.to_string()))?;
    let columns: Vec<tabqa_core::ColumnInfo> = stmt
        .query_map([], |row| {
            Ok(tabqa_core::ColumnInfo {
                name: row.get(1)?,
                decl_type: row.get(2)?,
            })
        })
        .and_then(Iterator::collect)
        .map_err(|e| TabqaError::Store(e.to_string()))?;

    let row_count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM \"{name}\""), [], |row| row.get(0))
        .map_err(|e| TabqaError::Store(e.to_string()))?;

    Ok(TableInfo {
        table_name: name.to_string(),
        sheet_name: None,
        columns,
        row_count: row_count as u64,
    })
}

/// Convert a SQLite value into JSON for the result model.
fn json_value(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::json!(i),
        ValueRef::Real(f) => serde_json::json!(f),
        ValueRef::Text(t) => serde_json::json!(String::from_utf8_lossy(t)),
        ValueRef::Blob(b) => serde_json::json!(format!("<blob {} bytes>", b.len())),
    }
}
