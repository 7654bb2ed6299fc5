//! Ollama LLM provider
//!
//! Connects to a local Ollama instance for chat completions.

use super::{Generation, GenerationRequest, LlmError, LlmProvider, ProviderCapabilities};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

/// Ollama provider for local LLM inference
pub struct OllamaProvider {
    /// Base URL for Ollama API
    base_url: String,

    /// Model to use
    model: String,

    /// HTTP agent carrying the request timeout
    agent: ureq::Agent,
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new("http://localhost:11434", "llama3.1")
    }
}

impl OllamaProvider {
    /// Create a new Ollama provider
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(120))
                .build(),
        }
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::AgentBuilder::new().timeout(timeout).build();
        self
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn id(&self) -> &str {
        "ollama"
    }

    fn name(&self) -> &str {
        "Ollama"
    }

    fn model(&self) -> String {
        self.model.clone()
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            grounding: false,
            structured_output: true,
            reasoning: false,
            max_output: 4096,
        }
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generation, LlmError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = build_request_body(&self.model, &request);
        let agent = self.agent.clone();

        let json = tokio::task::spawn_blocking(move || -> Result<Value, LlmError> {
            let response = agent
                .post(&url)
                .set("Content-Type", "application/json")
                .send_json(&body)?;
            Ok(response.into_json()?)
        })
        .await??;

        json.get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(Generation::new)
            .ok_or_else(|| LlmError::InvalidResponse("Invalid Ollama response".to_string()))
    }
}

fn build_request_body(model: &str, request: &GenerationRequest) -> Value {
    let options = &request.options;
    let mut messages = Vec::new();

    if let Some(system) = &request.system {
        messages.push(json!({ "role": "system", "content": system }));
    }
    messages.push(json!({ "role": "user", "content": request.prompt }));

    let mut body = json!({
        "model": model,
        "messages": messages,
        "stream": false,
        "options": {
            "temperature": options.temperature,
            "num_predict": options.max_output_tokens,
        }
    });

    if let Some(schema) = &options.schema {
        body["format"] = schema.schema.clone();
    }

    body
}
