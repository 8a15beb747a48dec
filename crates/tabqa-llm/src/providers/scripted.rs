//! Scripted provider — replays canned replies in order.
//!
//! Orchestration tests queue one reply per expected completion call
//! (classify, translate, synthesize) and assert on the prompts afterwards.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::CompletionProvider;
use tabqa_core::{Result, TabqaError};

#[derive(Debug, Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    #[must_use]
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

impl CompletionProvider for ScriptedProvider {
    fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(prompt.to_string());
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .ok_or_else(|| TabqaError::Provider("scripted provider exhausted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_replies_in_order_then_errors() {
        let provider = ScriptedProvider::new(["first", "second"]);
        assert_eq!(provider.complete("a").unwrap(), "first");
        assert_eq!(provider.complete("b").unwrap(), "second");
        assert!(provider.complete("c").is_err());
        assert_eq!(provider.prompts(), vec!["a", "b", "c"]);
    }
}
