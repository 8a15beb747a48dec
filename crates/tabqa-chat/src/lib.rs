//! # tabqa-chat
//!
//! Question answering over a knowledge base that mixes documents and
//! tabular data.
//!
//! A question is classified as a narrative lookup (answered from document
//! context) or an analytical question (translated to SQL, executed against
//! the knowledge base's store, formatted, then explained in natural
//! language). The [`ChatEngine`] orchestrates the whole flow and keeps
//! per-conversation turn history.
//!
//! Pipeline:
//! question → [`classifier`] → simple: [`context`] + completion
//!                           → complex: schema → [`translator`] →
//!                             store execution → [`formatter`] →
//!                             [`synthesizer`]
//! → conversation update → [`ChatResponse`] with provenance.

pub mod classifier;
pub mod context;
pub mod conversation;
pub mod directory;
pub mod engine;
pub mod extract;
pub mod formatter;
pub mod synthesizer;
pub mod translator;

pub use conversation::ConversationStore;
pub use directory::{InMemoryDirectory, KnowledgeDirectory};
pub use engine::{ChatEngine, ChatResponse};
pub use extract::{PlainTextExtractor, TextExtractor};
