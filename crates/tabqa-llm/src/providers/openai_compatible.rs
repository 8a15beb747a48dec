//! OpenAI-compatible chat-completions provider over blocking HTTP.
//!
//! One prompt maps to one user message. The client carries a hard per-call
//! timeout; transient failures (transport errors, 429, 5xx) are retried a
//! bounded number of times with exponential backoff before surfacing a
//! terminal provider error.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::{CompletionProvider, LlmConfig};
use tabqa_core::{Result, TabqaError};

const BACKOFF_BASE_MS: u64 = 500;

pub struct OpenAiCompatibleProvider {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
    temperature: f64,
    api_key: Option<String>,
    max_retries: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| TabqaError::Provider(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{}/chat/completions", config.api_base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key,
            max_retries: config.max_retries,
        })
    }

    fn send_once(&self, prompt: &str) -> std::result::Result<String, (bool, String)> {
        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        // Transport errors (connect, timeout) are worth retrying.
        let response = request.send().map_err(|e| (true, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retryable = status.as_u16() == 429 || status.is_server_error();
            let text = response.text().unwrap_or_default();
            return Err((retryable, format!("http {status}: {text}")));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| (false, format!("invalid response body: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or((false, "response contained no choices".to_string()))
    }
}

impl CompletionProvider for OpenAiCompatibleProvider {
    fn complete(&self, prompt: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            debug!(attempt, model = %self.model, "completion call");
            match self.send_once(prompt) {
                Ok(text) => return Ok(text),
                Err((retryable, message)) => {
                    if !retryable || attempt >= self.max_retries {
                        return Err(TabqaError::Provider(message));
                    }
                    let backoff = Duration::from_millis(BACKOFF_BASE_MS << attempt);
                    warn!(attempt, %message, ?backoff, "retrying completion call");
                    std::thread::sleep(backoff);
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> LlmConfig {
        LlmConfig {
            provider: "openai-compatible".to_string(),
            api_base_url: url.to_string(),
            model: "test-model".to_string(),
            temperature: 0.0,
            timeout_seconds: 5,
            max_retries: 0,
        }
    }

    #[test]
    fn url_joins_without_double_slash() {
        let provider = OpenAiCompatibleProvider::new(&config("http://localhost:9/v1/"), None).unwrap();
        assert_eq!(provider.url, "http://localhost:9/v1/chat/completions");
    }

    #[test]
    fn unreachable_host_is_provider_error() {
        // Port 9 (discard) is never a chat endpoint; with max_retries = 0 the
        // first transport failure is terminal.
        let provider = OpenAiCompatibleProvider::new(&config("http://127.0.0.1:9/v1"), None).unwrap();
        let err = provider.complete("hi").unwrap_err();
        assert!(matches!(err, TabqaError::Provider(_)));
    }
}
