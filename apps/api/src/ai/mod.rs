//! Text-generation client for a local Ollama instance.
//!
//! Enhancement is optional polish, never a correctness prerequisite: every
//! failure path (unreachable, non-2xx, empty output) collapses to `None`
//! with a warning, and callers fall back to the raw text.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

pub mod enhancer;
pub mod prompts;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            url: format!("{}/api/chat", base_url.trim_end_matches('/')),
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a single chat request and returns the assistant's cleaned text,
    /// or `None` on any failure.
    pub async fn chat(&self, system: &str, user: &str, max_tokens: u32) -> Option<String> {
        let body = json!({
            "model": self.model,
            "stream": false,
            "options": { "num_predict": max_tokens },
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ]
        });

        let response = match self.client.post(&self.url).json(&body).send().await {
            Ok(r) => r,
            Err(e) if e.is_connect() => {
                warn!("Ollama not reachable at {}; AI enhancement skipped", self.url);
                return None;
            }
            Err(e) => {
                warn!("Ollama error: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("Ollama returned HTTP {}", response.status());
            return None;
        }

        let parsed: ChatResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                warn!("Ollama response parse error: {e}");
                return None;
            }
        };

        let text = parsed.message?.content?;
        let text = strip_fences(&text);
        if text.is_empty() {
            return None;
        }
        info!("Ollama [{}] → {} chars", self.model, text.len());
        Some(text)
    }
}

/// Strips markdown code fences the model might wrap its output in.
fn strip_fences(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .replace("```", "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_with_language_tag() {
        let input = "```markdown\nSome enhanced text.\n```";
        assert_eq!(strip_fences(input), "Some enhanced text.");
    }

    #[test]
    fn test_strip_fences_bare() {
        let input = "```\nline one\nline two\n```";
        assert_eq!(strip_fences(input), "line one\nline two");
    }

    #[test]
    fn test_strip_fences_none_present() {
        assert_eq!(strip_fences("  plain text  "), "plain text");
    }
}
