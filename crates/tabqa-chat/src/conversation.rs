//! In-memory conversation store.
//!
//! Maps conversation id → append-only turn history. Mutation is serialized
//! per id through the map's entry locks, so two concurrent requests sharing
//! an id cannot lose each other's appends. Histories are capped at a turn
//! limit (oldest turns dropped) instead of growing without bound; state is
//! process-local and deliberately lost on restart.

use dashmap::DashMap;
use uuid::Uuid;

use tabqa_core::ConversationTurn;

/// Default cap on turns kept per conversation.
pub const DEFAULT_MAX_TURNS: usize = 100;

pub struct ConversationStore {
    map: DashMap<String, Vec<ConversationTurn>>,
    max_turns: usize,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}

impl ConversationStore {
    #[must_use]
    pub fn new(max_turns: usize) -> Self {
        Self { map: DashMap::new(), max_turns }
    }

    /// Resolve a conversation id.
    ///
    /// Absent id → a fresh UUID with empty history. Unknown id → created
    /// lazily under that id, never an error. A caller-supplied history
    /// replaces whatever is stored before new turns are appended
    /// (last writer wins under concurrent submissions).
    pub fn resolve(&self, id: Option<&str>, history: Option<Vec<ConversationTurn>>) -> String {
        let id = id.map_or_else(|| Uuid::new_v4().to_string(), str::to_string);
        let mut entry = self.map.entry(id.clone()).or_default();
        if let Some(history) = history {
            *entry = history;
        }
        id
    }

    /// Snapshot of a conversation's turns.
    #[must_use]
    pub fn history(&self, id: &str) -> Vec<ConversationTurn> {
        self.map.get(id).map(|turns| turns.clone()).unwrap_or_default()
    }

    /// Append one question/answer exchange. Called on every path, including
    /// error paths, so history always reflects what the user actually saw.
    pub fn record(&self, id: &str, question: &str, answer: &str) {
        let mut entry = self.map.entry(id.to_string()).or_default();
        entry.push(ConversationTurn::user(question));
        entry.push(ConversationTurn::assistant(answer));
        let len = entry.len();
        if len > self.max_turns {
            entry.drain(..len - self.max_turns);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabqa_core::Role;

    #[test]
    fn resolve_without_id_creates_fresh_conversation() {
        let store = ConversationStore::default();
        let id = store.resolve(None, None);
        assert!(!id.is_empty());
        assert!(store.history(&id).is_empty());
    }

    #[test]
    fn resolve_unknown_id_creates_it_lazily() {
        let store = ConversationStore::default();
        let id = store.resolve(Some("conv-1"), None);
        assert_eq!(id, "conv-1");
        assert!(store.history("conv-1").is_empty());
    }

    #[test]
    fn caller_supplied_history_replaces_stored() {
        let store = ConversationStore::default();
        store.record("conv-1", "old q", "old a");

        let supplied = vec![ConversationTurn::user("imported")];
        store.resolve(Some("conv-1"), Some(supplied));

        let history = store.history("conv-1");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "imported");
    }

    #[test]
    fn two_exchanges_accumulate_four_turns_in_order() {
        let store = ConversationStore::default();
        store.record("c", "q1", "a1");
        store.record("c", "q2", "a2");

        let history = store.history("c");
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "q1");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, "a1");
        assert_eq!(history[2].content, "q2");
        assert_eq!(history[3].content, "a2");
    }

    #[test]
    fn history_is_capped_dropping_oldest_turns() {
        let store = ConversationStore::new(4);
        store.record("c", "q1", "a1");
        store.record("c", "q2", "a2");
        store.record("c", "q3", "a3");

        let history = store.history("c");
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].content, "q2");
        assert_eq!(history[3].content, "a3");
    }

    #[test]
    fn concurrent_records_on_one_id_lose_nothing() {
        let store = std::sync::Arc::new(ConversationStore::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.record("shared", &format!("q{i}"), &format!("a{i}"));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.history("shared").len(), 16);
    }
}
