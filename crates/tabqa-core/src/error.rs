//! Error types for tabqa.

use thiserror::Error;

/// Top-level result type for tabqa operations.
pub type Result<T> = std::result::Result<T, TabqaError>;

/// Top-level error type for tabqa.
///
/// The orchestrator converts every variant into a user-facing answer at the
/// `answer()` boundary; below that boundary variants propagate with `?`.
#[derive(Debug, Error)]
pub enum TabqaError {
    /// Unknown knowledge base, empty knowledge base, or a complex query
    /// against a knowledge base with no ingested tables.
    #[error("validation error: {0}")]
    Validation(String),

    /// A completion call failed after the retry budget was exhausted.
    /// All provider failures collapse into this one opaque kind.
    #[error("provider error: {0}")]
    Provider(String),

    /// Unsupported extension or malformed tabular file. Aborts only the
    /// affected file; no store mutation survives it.
    #[error("ingestion error: {0}")]
    Ingestion(String),

    /// A statement failed in the engine. Carries the attempted statement
    /// so failures are auditable; never retried.
    #[error("query execution error: {message} (statement: {statement})")]
    QueryExecution { message: String, statement: String },

    /// No store file exists for this knowledge base — nothing was ever
    /// ingested.
    #[error("no store found for knowledge base {0}")]
    StoreNotFound(String),

    /// Store-level failure outside statement execution (open, transaction).
    #[error("store error: {0}")]
    Store(String),

    /// Text extraction failed for a context file, including the encoding
    /// fallback path.
    #[error("extraction error: {0}")]
    Extraction(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_human_readable_messages() {
        let err = TabqaError::StoreNotFound("kb-42".to_string());
        assert!(err.to_string().contains("kb-42"));

        let err = TabqaError::QueryExecution {
            message: "no such table: orders".to_string(),
            statement: "SELECT * FROM orders".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("no such table"));
        assert!(msg.contains("SELECT * FROM orders"));
    }
}
