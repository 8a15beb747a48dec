//! Chat orchestrator: composes classification, context assembly,
//! translation, execution, formatting, and synthesis into the `answer()`
//! contract.
//!
//! `answer()` never raises past its boundary: every internal failure is
//! converted into a normal-shaped response whose answer embeds the error
//! and whose `error` flag is set, and the exchange is still recorded into
//! conversation history so failures stay auditable.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use tabqa_core::{Classification, ConversationTurn, KnowledgeBase, Result, Role, TabqaError, TableInfo};
use tabqa_llm::CompletionProvider;
use tabqa_store::StoreManager;

use crate::conversation::ConversationStore;
use crate::directory::KnowledgeDirectory;
use crate::extract::TextExtractor;
use crate::{classifier, context, formatter, synthesizer, translator};

/// The `answer()` result shape: always successful-looking, with `error`
/// flagging answers that embed a failure message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub conversation_id: String,
    /// File names (simple path) or table names (complex path) the answer
    /// was based on.
    pub sources: Vec<String>,
    pub is_complex: bool,
    pub error: bool,
}

struct Answered {
    answer: String,
    sources: Vec<String>,
    is_complex: bool,
}

pub struct ChatEngine {
    directory: Arc<dyn KnowledgeDirectory>,
    store: StoreManager,
    provider: Arc<dyn CompletionProvider>,
    extractor: Arc<dyn TextExtractor>,
    conversations: ConversationStore,
}

impl ChatEngine {
    pub fn new(
        directory: Arc<dyn KnowledgeDirectory>,
        store: StoreManager,
        provider: Arc<dyn CompletionProvider>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            directory,
            store,
            provider,
            extractor,
            conversations: ConversationStore::default(),
        }
    }

    /// Answer a question against a knowledge base.
    ///
    /// A missing `conversation_id` starts a new conversation; a
    /// caller-supplied `history` replaces the stored one before this
    /// exchange is appended. The user always gets a reply — failures come
    /// back as error-flagged answers, never as a hard failure.
    pub fn answer(
        &self,
        kb_id: &str,
        question: &str,
        conversation_id: Option<&str>,
        history: Option<Vec<ConversationTurn>>,
    ) -> ChatResponse {
        let conversation_id = self.conversations.resolve(conversation_id, history);
        let prior = self.conversations.history(&conversation_id);

        match self.route(kb_id, question, &prior) {
            Ok(answered) => {
                self.conversations
                    .record(&conversation_id, question, &answered.answer);
                ChatResponse {
                    answer: answered.answer,
                    conversation_id,
                    sources: answered.sources,
                    is_complex: answered.is_complex,
                    error: false,
                }
            }
            Err(e) => {
                warn!(kb_id, error = %e, "answer failed; returning error response");
                let answer = format!("Sorry, your question could not be answered: {e}");
                self.conversations.record(&conversation_id, question, &answer);
                ChatResponse {
                    answer,
                    conversation_id,
                    sources: Vec::new(),
                    is_complex: false,
                    error: true,
                }
            }
        }
    }

    /// Snapshot of a conversation's history.
    #[must_use]
    pub fn conversation(&self, conversation_id: &str) -> Vec<ConversationTurn> {
        self.conversations.history(conversation_id)
    }

    /// Ingest a tabular file into the knowledge base's store. Invoked by
    /// the upload collaborator right after the file is stored; on failure
    /// the caller must remove the stored artifact.
    pub fn ingest_tabular(
        &self,
        kb_id: &str,
        file_id: &str,
        path: impl AsRef<Path>,
    ) -> Result<Vec<TableInfo>> {
        self.store.ingest_tabular(kb_id, file_id, path)
    }

    /// Table metadata for a knowledge base (empty if nothing was ingested).
    pub fn schema(&self, kb_id: &str) -> Result<Vec<TableInfo>> {
        self.store.schema(kb_id)
    }

    /// Remove the knowledge base's store. Invoked by the deletion
    /// collaborator when the knowledge base itself is destroyed.
    pub fn drop_store(&self, kb_id: &str) -> Result<()> {
        self.store.drop_store(kb_id)
    }

    fn route(&self, kb_id: &str, question: &str, prior: &[ConversationTurn]) -> Result<Answered> {
        let kb = self.directory.get(kb_id).ok_or_else(|| {
            TabqaError::Validation(format!("knowledge base {kb_id} not found"))
        })?;

        let decision = classifier::classify(self.provider.as_ref(), question)?;
        debug!(kb_id, ?decision, "classified question");
        match decision {
            Classification::Simple => self.answer_simple(&kb, question, prior),
            Classification::Complex => self.answer_complex(&kb, question),
        }
    }

    fn answer_simple(
        &self,
        kb: &KnowledgeBase,
        question: &str,
        prior: &[ConversationTurn],
    ) -> Result<Answered> {
        if kb.files.is_empty() {
            return Err(TabqaError::Validation(format!(
                "knowledge base {} has no documents yet; upload a document first",
                kb.id
            )));
        }

        let ctx = context::assemble(self.extractor.as_ref(), &kb.files);
        let prompt = simple_prompt(&ctx.text, question, prior);
        let answer = self.provider.complete(&prompt)?;

        Ok(Answered {
            answer,
            sources: ctx.sources,
            is_complex: false,
        })
    }

    fn answer_complex(&self, kb: &KnowledgeBase, question: &str) -> Result<Answered> {
        let schema = self.store.schema(&kb.id)?;
        if schema.is_empty() {
            return Err(TabqaError::Validation(format!(
                "knowledge base {} has no tabular data; this question needs an ingested table",
                kb.id
            )));
        }

        let sql = translator::to_sql(self.provider.as_ref(), question, &schema)?;
        debug!(kb_id = %kb.id, sql, "generated statement");

        let result = self.store.execute(&kb.id, &sql)?;
        let formatted = formatter::format_result(&result);
        let answer = synthesizer::synthesize(self.provider.as_ref(), question, &sql, &formatted)?;

        // Cite the tables the statement actually touched; if none match
        // textually, fall back to the whole catalog.
        let mut sources: Vec<String> = schema
            .iter()
            .filter(|t| sql.contains(&t.table_name))
            .map(|t| t.table_name.clone())
            .collect();
        if sources.is_empty() {
            sources = schema.iter().map(|t| t.table_name.clone()).collect();
        }

        Ok(Answered {
            answer,
            sources,
            is_complex: true,
        })
    }
}

/// Prompt for the simple path: instructions, document context, prior
/// conversation, then the current question.
fn simple_prompt(context: &str, question: &str, prior: &[ConversationTurn]) -> String {
    let mut prompt = String::from(
        "You are a knowledge-base assistant. Answer the user's question \
         from the document content below. If the documents do not contain \
         the answer, say so plainly instead of guessing. Cite the document \
         name when you quote one.\n\nDocuments:\n",
    );
    prompt.push_str(context);

    if !prior.is_empty() {
        prompt.push_str("\nConversation so far:\n");
        for turn in prior {
            let role = match turn.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            prompt.push_str(&format!("{role}: {}\n", turn.content));
        }
    }

    prompt.push_str(&format!("\nCurrent question: {question}"));
    prompt
}
