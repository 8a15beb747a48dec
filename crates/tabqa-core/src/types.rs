//! Shared data model for the tabqa crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named collection of uploaded files plus one derived relational store.
///
/// Owned by the knowledge-base collaborator; this core only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub id: String,
    pub name: String,
    /// Files in upload order. The context assembler relies on this order.
    pub files: Vec<FileRecord>,
}

/// One uploaded file within a knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    /// Storage path on disk.
    pub path: String,
    /// Declared type, normally the lowercase extension ("csv", "txt", ...).
    pub file_type: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
    /// Table descriptors produced by ingestion, for tabular files only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<TableInfo>>,
}

impl FileRecord {
    /// Whether this file feeds the tabular ingestion path rather than the
    /// text context path.
    #[must_use]
    pub fn is_tabular(&self) -> bool {
        matches!(self.file_type.as_str(), "csv" | "xlsx" | "xls")
    }
}

/// Metadata for one table materialized in a knowledge base's store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Sanitized identifier, unique within the store.
    pub table_name: String,
    /// Originating sheet name for multi-sheet files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    pub columns: Vec<ColumnInfo>,
    pub row_count: u64,
}

impl TableInfo {
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// One column of an ingested table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared SQL type ("INTEGER", "REAL", "TEXT").
    pub decl_type: String,
}

/// Rows returned by statement execution.
///
/// Column order is the statement's order; row order is the store's return
/// order — nothing is guaranteed unless the statement itself orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl QueryResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a cell by row index and column name.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&serde_json::Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx)
    }
}

/// Routing decision for an incoming question. Total: every question maps
/// to exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Narrative lookup answered from document context.
    Simple,
    /// Analytical/aggregate question answered through the store.
    Complex,
}

/// Speaker role of one conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One role-tagged message in a conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_record_tabular_detection() {
        let mut rec = FileRecord {
            id: "f1".to_string(),
            name: "prices.csv".to_string(),
            path: "/tmp/prices.csv".to_string(),
            file_type: "csv".to_string(),
            size: 12,
            uploaded_at: None,
            tables: None,
        };
        assert!(rec.is_tabular());
        rec.file_type = "txt".to_string();
        assert!(!rec.is_tabular());
    }

    #[test]
    fn query_result_cell_lookup_respects_column_order() {
        let result = QueryResult {
            columns: vec!["price".to_string(), "qty".to_string()],
            rows: vec![vec![serde_json::json!(9.5), serde_json::json!(3)]],
        };
        assert_eq!(result.cell(0, "qty"), Some(&serde_json::json!(3)));
        assert_eq!(result.cell(0, "missing"), None);
        assert_eq!(result.cell(1, "qty"), None);
    }

    #[test]
    fn turn_constructors_tag_roles() {
        assert_eq!(ConversationTurn::user("q").role, Role::User);
        assert_eq!(ConversationTurn::assistant("a").role, Role::Assistant);
    }
}
