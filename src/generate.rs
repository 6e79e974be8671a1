//! Generation backends behind one trait.
//!
//! The assembler only needs `generate(messages) -> text`; whether that text
//! comes from a local Ollama model or a hosted search-grounded API is a
//! construction-time choice. Both backends tolerate a system-role context
//! message injected mid-list and return a single raw text blob (possibly
//! code-fenced; the parser strips fences).

use reqwest::blocking::Client;
use serde_json::Value;

use crate::config;
use crate::error::{AssistantError, Result};
use crate::models::ChatMessage;

// ---------------------------------------------------------------------------
// Generate
// ---------------------------------------------------------------------------

/// A black-box text generation capability.
pub trait Generate: Send + Sync {
    fn generate(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Model identifier, recorded in telemetry.
    fn model(&self) -> &str;

    /// Telemetry pathway tag for calls through this backend.
    fn telemetry_pathway(&self) -> &'static str {
        "generation"
    }
}

// ---------------------------------------------------------------------------
// OllamaGenerator
// ---------------------------------------------------------------------------

/// Local model via the Ollama `/api/chat` endpoint.
pub struct OllamaGenerator {
    http: Client,
    url: String,
    model: String,
    num_ctx: u32,
    temperature: f64,
}

impl OllamaGenerator {
    pub fn new(host: &str, model: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(config::GENERATION_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: format!("{}/api/chat", host.trim_end_matches('/')),
            model: model.into(),
            num_ctx: 10240,
            temperature: 0.7,
        })
    }
}

impl Generate for OllamaGenerator {
    fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        let resp = self
            .http
            .post(&self.url)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": messages,
                "stream": false,
                "options": {
                    "num_ctx": self.num_ctx,
                    "temperature": self.temperature,
                },
            }))
            .send()?
            .error_for_status()?;

        let body: Value = resp.json()?;
        body.get("message")
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                AssistantError::Generation("Ollama response missing message content".to_string())
            })
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn telemetry_pathway(&self) -> &'static str {
        "tool_augmented_generation"
    }
}

// ---------------------------------------------------------------------------
// PerplexityGenerator
// ---------------------------------------------------------------------------

/// Hosted search-grounded model via the Perplexity chat-completions API.
pub struct PerplexityGenerator {
    http: Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f64,
}

impl PerplexityGenerator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(config::GENERATION_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: config::PERPLEXITY_API_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            // Low temperature: grounded output should stay close to sources.
            temperature: 0.1,
        })
    }
}

impl Generate for PerplexityGenerator {
    fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": messages,
                "temperature": self.temperature,
            }))
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(AssistantError::Generation(format!(
                "Perplexity API returned {status}: {body}"
            )));
        }

        let body: Value = resp.json()?;
        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                AssistantError::Generation(
                    "Perplexity response missing choice content".to_string(),
                )
            })
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn telemetry_pathway(&self) -> &'static str {
        "perplexity_api"
    }
}
