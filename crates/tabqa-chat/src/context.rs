//! Context assembler for the simple answer path.
//!
//! Takes up to [`MAX_CONTEXT_FILES`] non-tabular files in the knowledge
//! base's existing file order — deliberately no relevance ranking, this is a
//! placeholder for future embedding-based retrieval. Each file's text is
//! truncated to a fixed character budget and labelled with a header; the
//! contributing file names become the answer's provenance sources.

use tracing::warn;

use tabqa_core::FileRecord;

use crate::extract::TextExtractor;

/// Cap on files contributing to one context window.
pub const MAX_CONTEXT_FILES: usize = 3;
/// Per-file character budget.
pub const MAX_FILE_CHARS: usize = 5000;
/// Appended when a file exceeds its budget.
pub const TRUNCATION_MARKER: &str = "...[truncated]";

/// Assembled context plus the names of the files that contributed.
#[derive(Debug, Clone)]
pub struct AssembledContext {
    pub text: String,
    pub sources: Vec<String>,
}

/// Build a context window from the first few non-tabular files.
///
/// Files whose text cannot be extracted are skipped with a warning rather
/// than failing the whole answer; the rest of the context still flows.
pub fn assemble(extractor: &dyn TextExtractor, files: &[FileRecord]) -> AssembledContext {
    let mut text = String::new();
    let mut sources = Vec::new();

    for file in files
        .iter()
        .filter(|f| !f.is_tabular())
        .take(MAX_CONTEXT_FILES)
    {
        let content = match extractor.extract(std::path::Path::new(&file.path)) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %file.name, error = %e, "skipping unreadable context file");
                continue;
            }
        };
        let content = truncate(&content);
        text.push_str(&format!("=== {} ===\n{content}\n\n", file.name));
        sources.push(file.name.clone());
    }

    AssembledContext { text, sources }
}

/// Cut at the character budget, on a char boundary, appending the marker.
fn truncate(content: &str) -> String {
    if content.chars().count() <= MAX_FILE_CHARS {
        return content.to_string();
    }
    let cut: String = content.chars().take(MAX_FILE_CHARS).collect();
    format!("{cut}{TRUNCATION_MARKER}")
}
