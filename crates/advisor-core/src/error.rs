//! Error types for Advisor Core
//!
//! Provides a unified error type for the operations that are allowed to fail.
//! A swarm run itself never returns an error; failures inside a run are
//! absorbed into degraded blackboard slots or the finalizer fallback.

use thiserror::Error;

/// Result type for Advisor Core operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Unified error type for Advisor Core
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] crate::llm::LlmError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Lead not found in the store
    #[error("Lead not found: {0}")]
    LeadNotFound(String),

    /// Blackboard write rejected
    #[error("Blackboard error: {0}")]
    Blackboard(String),
}

impl AdvisorError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        AdvisorError::Config(msg.into())
    }

    /// Create a lead-not-found error
    pub fn lead_not_found(id: impl Into<String>) -> Self {
        AdvisorError::LeadNotFound(id.into())
    }

    /// Create a blackboard error
    pub fn blackboard(msg: impl Into<String>) -> Self {
        AdvisorError::Blackboard(msg.into())
    }
}

impl From<serde_json::Error> for AdvisorError {
    fn from(err: serde_json::Error) -> Self {
        AdvisorError::Serialization(err.to_string())
    }
}

impl From<crate::config::ConfigError> for AdvisorError {
    fn from(err: crate::config::ConfigError) -> Self {
        AdvisorError::Config(err.to_string())
    }
}
