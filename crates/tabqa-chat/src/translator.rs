//! NL → SQL translation.
//!
//! One completion call over the question plus serialized schema metadata.
//! The model is instructed to return only the statement; replies are still
//! stripped of markdown code fences because models add them anyway. No
//! statement-type validation happens here — the store's executor enforces
//! the read-only allowlist.

use tabqa_core::{Result, TableInfo};
use tabqa_llm::CompletionProvider;

/// Generate one SQL statement for the question.
pub fn to_sql(
    provider: &dyn CompletionProvider,
    question: &str,
    schema: &[TableInfo],
) -> Result<String> {
    let prompt = format!(
        "You translate questions into SQLite SQL.\n\
         The database contains the following tables:\n\n{}\n\
         Write one SQLite SELECT statement answering the question below.\n\
         Return only the SQL statement, with no explanation and no markdown.\n\n\
         Question: {question}",
        serialize_schema(schema)
    );
    let reply = provider.complete(&prompt)?;
    Ok(strip_fences(&reply))
}

/// Render schema metadata for the prompt: one line per table with typed
/// columns and row counts.
pub fn serialize_schema(schema: &[TableInfo]) -> String {
    schema
        .iter()
        .map(|table| {
            let columns = table
                .columns
                .iter()
                .map(|c| format!("{} {}", c.name, c.decl_type))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "- {} ({} rows): {columns}",
                table.table_name, table.row_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove a surrounding markdown code fence, if any.
fn strip_fences(reply: &str) -> String {
    let trimmed = reply.trim();
    let trimmed = trimmed
        .strip_prefix("```sql")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim().to_string()
}
