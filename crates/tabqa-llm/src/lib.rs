//! # tabqa-llm
//!
//! Text-completion provider abstraction.
//!
//! The rest of the engine only sees the [`CompletionProvider`] capability
//! contract: one prompt in, one text reply out, failure collapsed into a
//! single opaque error kind. Completion calls are blocking I/O; the HTTP
//! provider enforces a bounded per-call timeout and a small bounded
//! retry-with-backoff so a hung or flaky provider cannot stall a request
//! indefinitely.
//!
//! Adding a backend = new module in `providers/` + new match arm in
//! [`build`].

pub mod providers;

use serde::Deserialize;

use tabqa_core::{Result, TabqaError};

pub use providers::dummy::DummyProvider;
pub use providers::openai_compatible::OpenAiCompatibleProvider;
pub use providers::scripted::ScriptedProvider;

/// Capability contract for text completion. Any failure is a
/// [`TabqaError::Provider`].
pub trait CompletionProvider: Send + Sync {
    /// Send `prompt` to the provider and return its text reply.
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Provider configuration, loaded from TOML by the binary.
///
/// The API key is sourced from the `TABQA_API_KEY` env var only — never
/// from TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend selector: "dummy" or "openai-compatible".
    pub provider: String,
    pub api_base_url: String,
    pub model: String,
    pub temperature: f64,
    /// Per-call HTTP timeout.
    pub timeout_seconds: u64,
    /// Retries after the first attempt, for transient failures only.
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai-compatible".to_string(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            timeout_seconds: 60,
            max_retries: 2,
        }
    }
}

/// Construct a provider from config and an optional API key.
///
/// # Errors
///
/// Returns [`TabqaError::Provider`] for unknown backends or a client that
/// cannot be built.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<Box<dyn CompletionProvider>> {
    match config.provider.as_str() {
        "dummy" => Ok(Box::new(DummyProvider)),
        "openai" | "openai-compatible" => Ok(Box::new(OpenAiCompatibleProvider::new(
            config, api_key,
        )?)),
        other => Err(TabqaError::Provider(format!("unknown provider: {other}"))),
    }
}
