//! Text extraction seam for the simple answer path.
//!
//! Per-format extraction (PDF, Word) belongs to an external collaborator;
//! this crate only defines the capability contract plus a plain-text
//! implementation. The plain-text extractor decodes UTF-8 first and retries
//! with GBK — the legacy encoding of the original corpus — before giving up.

use std::path::Path;

use tabqa_core::{Result, TabqaError};

/// Extract raw text from a file for context assembly.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String>;
}

/// Plain-text extractor with a UTF-8 → GBK encoding fallback.
#[derive(Debug, Clone, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(err) => {
                let bytes = err.into_bytes();
                let (text, _, had_errors) = encoding_rs::GBK.decode(&bytes);
                if had_errors {
                    Err(TabqaError::Extraction(format!(
                        "cannot decode {} as utf-8 or gbk",
                        path.display()
                    )))
                } else {
                    Ok(text.into_owned())
                }
            }
        }
    }
}
