//! LLM integration module
//!
//! Provides the structured generation capability used by the swarm.
//!
//! Supported providers:
//! - Gemini (Google AI, with search grounding)
//! - OpenAI (and compatible APIs)
//! - Ollama (local inference)

mod error;
mod extract;
mod gemini;
mod ollama;
mod openai;
mod provider;
mod registry;

pub use error::LlmError;
pub use extract::{extract_json_object, parse_json_object};
pub use provider::{
    Generation, GenerationOptions, GenerationRequest, LlmProvider, OutputSchema,
    ProviderCapabilities, ReasoningEffort, SharedProvider,
};
pub use registry::{ProviderInfo, ProviderRegistry};

// Provider implementations
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;

/// Prompt suffix describing the expected JSON shape, for providers or modes
/// without native schema enforcement.
pub(crate) fn schema_instruction(schema: &OutputSchema) -> String {
    format!(
        "Respond with a single JSON object (no markdown, no prose) matching this JSON schema:\n{}",
        schema.schema
    )
}
