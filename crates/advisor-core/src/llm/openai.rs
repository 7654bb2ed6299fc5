//! OpenAI LLM provider
//!
//! Connects to OpenAI's (or any compatible) chat completions API.

use super::{
    schema_instruction, Generation, GenerationRequest, LlmError, LlmProvider,
    ProviderCapabilities, ReasoningEffort,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

/// OpenAI provider
pub struct OpenAIProvider {
    /// API key
    api_key: String,

    /// Base URL for the API (supports OpenAI-compatible APIs)
    base_url: String,

    /// Model used for every request
    model: String,

    /// HTTP agent carrying the request timeout
    agent: ureq::Agent,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(120))
                .build(),
        }
    }

    /// Create with a specific base URL (for OpenAI-compatible APIs like Azure, local proxies)
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::AgentBuilder::new().timeout(timeout).build();
        self
    }

    fn is_reasoning_model(&self) -> bool {
        self.model.starts_with('o')
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn id(&self) -> &str {
        "openai"
    }

    fn name(&self) -> &str {
        "OpenAI"
    }

    fn model(&self) -> String {
        self.model.clone()
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            grounding: false,
            structured_output: true,
            reasoning: self.is_reasoning_model(),
            max_output: 16_384,
        }
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generation, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::ProviderUnavailable(
                "OpenAI API key not configured".to_string(),
            ));
        }

        if request.options.grounded {
            tracing::debug!(
                model = %self.model,
                "Chat completions has no search tool; answering without grounding"
            );
        }

        let url = format!("{}/chat/completions", self.base_url);
        let body = build_request_body(&self.model, self.is_reasoning_model(), &request);
        let auth = format!("Bearer {}", self.api_key);
        let agent = self.agent.clone();

        let json = tokio::task::spawn_blocking(move || -> Result<Value, LlmError> {
            let response = agent
                .post(&url)
                .set("Content-Type", "application/json")
                .set("Authorization", &auth)
                .send_json(&body)?;
            Ok(response.into_json()?)
        })
        .await??;

        parse_response(&json).map(Generation::new)
    }
}

fn build_request_body(model: &str, reasoning_model: bool, request: &GenerationRequest) -> Value {
    let options = &request.options;
    let mut messages = Vec::new();

    if let Some(system) = &request.system {
        messages.push(json!({ "role": "system", "content": system }));
    }
    messages.push(json!({ "role": "user", "content": request.prompt }));

    let mut body = json!({
        "model": model,
        "messages": messages,
        "max_completion_tokens": options.max_output_tokens,
    });

    // Reasoning models reject a custom temperature.
    if reasoning_model {
        if options.effort == ReasoningEffort::High {
            body["reasoning_effort"] = json!("high");
        }
    } else {
        body["temperature"] = json!(options.temperature);
    }

    if let Some(schema) = &options.schema {
        body["response_format"] = json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema.name,
                "schema": schema.schema,
            }
        });
        // Some compatible servers ignore response_format; keep the instruction too.
        if let Some(Value::Array(msgs)) = body.get_mut("messages") {
            if let Some(last) = msgs.last_mut() {
                last["content"] = json!(format!(
                    "{}\n\n{}",
                    request.prompt,
                    schema_instruction(schema)
                ));
            }
        }
    }

    body
}

fn parse_response(json: &Value) -> Result<String, LlmError> {
    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error");
        return Err(LlmError::Api {
            status: 500,
            message: message.to_string(),
        });
    }

    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| LlmError::InvalidResponse("Invalid OpenAI response".to_string()))
}
