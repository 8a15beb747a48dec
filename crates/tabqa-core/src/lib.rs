//! # tabqa-core
//!
//! Core types and error hierarchy for the tabqa knowledge-base Q&A engine.
//!
//! This crate defines the foundational types used across all other tabqa
//! crates:
//! - [`KnowledgeBase`] and [`FileRecord`] — the external file inventory
//! - [`TableInfo`] / [`ColumnInfo`] — schema metadata for ingested tables
//! - [`QueryResult`] — ordered columns + rows returned by the store
//! - [`Classification`] — the simple/complex routing decision
//! - [`ConversationTurn`] / [`Role`] — multi-turn chat history units
//! - Identifier sanitization ([`ident::sanitize`])
//! - Error hierarchy ([`TabqaError`])

pub mod error;
pub mod ident;
pub mod types;

pub use error::{Result, TabqaError};
pub use types::{
    Classification, ColumnInfo, ConversationTurn, FileRecord, KnowledgeBase, QueryResult, Role,
    TableInfo,
};
