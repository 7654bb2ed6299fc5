//! LLM provider trait and generation request types

use super::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provider capabilities flags
#[derive(Debug, Clone, Default)]
pub struct ProviderCapabilities {
    /// Supports tool-augmented retrieval (live search grounding)
    pub grounding: bool,

    /// Supports schema-constrained JSON output
    pub structured_output: bool,

    /// Supports an explicit reasoning/thinking budget
    pub reasoning: bool,

    /// Maximum output tokens
    pub max_output: usize,
}

/// Declared output shape for a schema-constrained call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchema {
    /// Short identifier, used by providers that require a schema name
    pub name: String,

    /// JSON Schema (OpenAPI subset) describing the expected object
    pub schema: Value,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// How much effort the model should spend before answering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    #[default]
    Standard,
    High,
}

/// Options for a single generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Request tool-augmented retrieval
    pub grounded: bool,

    /// Constrain the response to this schema
    pub schema: Option<OutputSchema>,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum output length in tokens
    pub max_output_tokens: u32,

    /// Reasoning effort
    pub effort: ReasoningEffort,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            grounded: false,
            schema: None,
            temperature: 0.7,
            max_output_tokens: 2048,
            effort: ReasoningEffort::Standard,
        }
    }
}

/// A generation request: optional system instruction plus one prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            options: GenerationOptions::default(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Text produced by a generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// LLM provider trait
///
/// Defines the structured generation capability consumed by the swarm
/// (Gemini, OpenAI-compatible, Ollama). Implementations must not panic;
/// every failure is reported as an [`LlmError`].
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider's unique identifier (e.g., "gemini", "openai", "ollama")
    fn id(&self) -> &str;

    /// Get the provider's display name
    fn name(&self) -> &str;

    /// Get the model used for generation
    fn model(&self) -> String;

    /// Get provider capabilities
    fn capabilities(&self) -> ProviderCapabilities;

    /// Generate text, optionally grounded and/or schema-constrained
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, LlmError>;
}

/// Wrapper to make Box<dyn LlmProvider> cloneable via Arc
pub type SharedProvider = std::sync::Arc<dyn LlmProvider>;
