//! Dummy provider — echoes input back prefixed with `[echo]`.
//! Used for wiring tests without a real API key.

use crate::CompletionProvider;
use tabqa_core::Result;

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl CompletionProvider for DummyProvider {
    fn complete(&self, prompt: &str) -> Result<String> {
        Ok(format!("[echo] {prompt}"))
    }
}
