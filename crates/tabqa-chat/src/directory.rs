//! Knowledge-base directory seam.
//!
//! Metadata persistence (names, ids, upload bookkeeping) belongs to an
//! external collaborator; the engine only needs to look knowledge bases up.
//! An in-memory implementation ships for tests and the CLI.

use dashmap::DashMap;

use tabqa_core::{FileRecord, KnowledgeBase};

/// Read access to knowledge-base metadata.
pub trait KnowledgeDirectory: Send + Sync {
    fn get(&self, kb_id: &str) -> Option<KnowledgeBase>;

    fn list_files(&self, kb_id: &str) -> Vec<FileRecord> {
        self.get(kb_id).map(|kb| kb.files).unwrap_or_default()
    }
}

/// Map-backed directory for tests and the CLI.
#[derive(Default)]
pub struct InMemoryDirectory {
    map: DashMap<String, KnowledgeBase>,
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, kb: KnowledgeBase) {
        self.map.insert(kb.id.clone(), kb);
    }
}

impl KnowledgeDirectory for InMemoryDirectory {
    fn get(&self, kb_id: &str) -> Option<KnowledgeBase> {
        self.map.get(kb_id).map(|kb| kb.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_file_listing() {
        let dir = InMemoryDirectory::new();
        dir.insert(KnowledgeBase {
            id: "kb1".to_string(),
            name: "Products".to_string(),
            files: vec![FileRecord {
                id: "f1".to_string(),
                name: "prices.csv".to_string(),
                path: "/tmp/prices.csv".to_string(),
                file_type: "csv".to_string(),
                size: 10,
                uploaded_at: None,
                tables: None,
            }],
        });

        assert!(dir.get("kb1").is_some());
        assert!(dir.get("kb2").is_none());
        assert_eq!(dir.list_files("kb1").len(), 1);
        assert!(dir.list_files("kb2").is_empty());
    }
}
