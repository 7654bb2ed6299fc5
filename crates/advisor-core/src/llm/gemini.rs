//! Gemini (Google AI) LLM provider
//!
//! Connects to Google's Gemini API for grounded and schema-constrained
//! generation.

use super::{
    schema_instruction, Generation, GenerationRequest, LlmError, LlmProvider,
    ProviderCapabilities, ReasoningEffort,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

/// Gemini provider for Google AI
pub struct GeminiProvider {
    /// API key
    api_key: String,

    /// Base URL for the API
    base_url: String,

    /// Model used for every request
    model: String,

    /// HTTP agent carrying the request timeout
    agent: ureq::Agent,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: model.to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(120))
                .build(),
        }
    }

    /// Create with a specific base URL
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::AgentBuilder::new().timeout(timeout).build();
        self
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn id(&self) -> &str {
        "gemini"
    }

    fn name(&self) -> &str {
        "Gemini"
    }

    fn model(&self) -> String {
        self.model.clone()
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            grounding: true,
            structured_output: true,
            reasoning: true,
            max_output: 65_536,
        }
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generation, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::ProviderUnavailable(
                "Gemini API key not configured".to_string(),
            ));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = build_request_body(&request);
        let agent = self.agent.clone();

        let json = tokio::task::spawn_blocking(move || -> Result<Value, LlmError> {
            let response = agent
                .post(&url)
                .set("Content-Type", "application/json")
                .send_json(&body)?;
            Ok(response.into_json()?)
        })
        .await??;

        parse_response(&json).map(Generation::new)
    }
}

/// Build the `generateContent` request body
fn build_request_body(request: &GenerationRequest) -> Value {
    let options = &request.options;

    // Search grounding cannot be combined with a response schema, so grounded
    // structured calls fall back to an in-prompt schema instruction.
    let native_schema = options.schema.as_ref().filter(|_| !options.grounded);
    let prompt = match (&options.schema, native_schema) {
        (Some(schema), None) => format!("{}\n\n{}", request.prompt, schema_instruction(schema)),
        _ => request.prompt.clone(),
    };

    let mut generation_config = json!({
        "temperature": options.temperature,
        "maxOutputTokens": options.max_output_tokens,
    });

    if let Some(schema) = native_schema {
        generation_config["responseMimeType"] = json!("application/json");
        generation_config["responseSchema"] = schema.schema.clone();
    }

    if options.effort == ReasoningEffort::High {
        generation_config["thinkingConfig"] = json!({ "thinkingBudget": -1 });
    }

    let mut body = json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }]
        }],
        "generationConfig": generation_config
    });

    if let Some(system) = &request.system {
        body["system_instruction"] = json!({
            "parts": [{ "text": system }]
        });
    }

    if options.grounded {
        body["tools"] = json!([{ "google_search": {} }]);
    }

    body
}

/// Concatenate the text parts of the first candidate
fn parse_response(json: &Value) -> Result<String, LlmError> {
    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error");
        return Err(LlmError::Api {
            status: error.get("code").and_then(|c| c.as_u64()).unwrap_or(500) as u16,
            message: message.to_string(),
        });
    }

    let text: String = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::InvalidResponse(
            "Gemini returned no text".to_string(),
        ));
    }

    Ok(text)
}
