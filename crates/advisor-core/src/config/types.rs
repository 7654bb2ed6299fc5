//! Configuration types for Advisor
//!
//! Defines the structure of `.advisor.toml` configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Per-role provider overrides, keyed by role name (e.g. "psychologist")
    #[serde(default)]
    pub agents: HashMap<String, AgentProviderConfig>,

    /// Swarm run limits and generation settings
    #[serde(default)]
    pub run: RunConfig,

    /// Market context snapshot source
    #[serde(default)]
    pub market: MarketConfig,
}

/// LLM configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Default provider to use (gemini, openai, ollama)
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Provider configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            timeout: default_timeout(),
            providers: default_providers(),
        }
    }
}

/// Individual provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// API key (supports ${ENV_VAR} syntax)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for the API
    #[serde(default)]
    pub base_url: Option<String>,

    /// Default model for this provider
    #[serde(default)]
    pub default_model: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: None,
            default_model: None,
        }
    }
}

/// Provider override for a single agent role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProviderConfig {
    /// Provider ID from `[llm.providers]`
    pub provider: String,
}

/// Limits and generation settings for a swarm run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Hard cap on supervisor iterations before the run is forced to finish
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Maximum characters of worker output included in a step preview
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Sampling temperature for specialist workers
    #[serde(default = "default_worker_temperature")]
    pub worker_temperature: f32,

    /// Output token budget for supervisor and workers
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Output token budget for the finalizer
    #[serde(default = "default_finalizer_max_output_tokens")]
    pub finalizer_max_output_tokens: u32,
}

fn default_max_iterations() -> u32 {
    6
}

fn default_preview_chars() -> usize {
    150
}

fn default_worker_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_finalizer_max_output_tokens() -> u32 {
    8192
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            preview_chars: default_preview_chars(),
            worker_temperature: default_worker_temperature(),
            max_output_tokens: default_max_output_tokens(),
            finalizer_max_output_tokens: default_finalizer_max_output_tokens(),
        }
    }
}

/// Where the market context snapshot comes from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Inline snapshot text
    #[serde(default)]
    pub snapshot: Option<String>,

    /// File containing the snapshot text (takes precedence over `snapshot`)
    #[serde(default)]
    pub snapshot_file: Option<PathBuf>,
}

/// Create default provider configurations
fn default_providers() -> HashMap<String, ProviderConfig> {
    let mut providers = HashMap::new();

    providers.insert(
        "gemini".to_string(),
        ProviderConfig {
            enabled: false, // Disabled by default until API key is set
            api_key: None,
            base_url: Some("https://generativelanguage.googleapis.com".to_string()),
            default_model: Some("gemini-2.5-flash".to_string()),
        },
    );

    providers.insert(
        "openai".to_string(),
        ProviderConfig {
            enabled: false,
            api_key: None,
            base_url: Some("https://api.openai.com/v1".to_string()),
            default_model: Some("gpt-4o".to_string()),
        },
    );

    // Ollama - local, no API key needed
    providers.insert(
        "ollama".to_string(),
        ProviderConfig {
            enabled: true,
            api_key: None,
            base_url: Some("http://localhost:11434".to_string()),
            default_model: Some("llama3.1".to_string()),
        },
    );

    providers
}

impl AdvisorConfig {
    /// Get a provider config by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.llm.providers.get(name)
    }

    /// Get the default provider config
    pub fn default_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider(&self.llm.default_provider)
    }

    /// Get all enabled providers
    pub fn enabled_providers(&self) -> Vec<(&String, &ProviderConfig)> {
        self.llm
            .providers
            .iter()
            .filter(|(_, config)| config.enabled)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_defaults() {
        let run = RunConfig::default();
        assert_eq!(run.max_iterations, 6);
        assert_eq!(run.preview_chars, 150);
    }

    #[test]
    fn test_partial_run_section_keeps_defaults() {
        let config: AdvisorConfig = toml::from_str("[run]\nmax_iterations = 3\n").unwrap();
        assert_eq!(config.run.max_iterations, 3);
        assert_eq!(config.run.preview_chars, 150);
        assert_eq!(config.llm.default_provider, "gemini");
    }

    #[test]
    fn test_agent_overrides_parse() {
        let config: AdvisorConfig =
            toml::from_str("[agents.psychologist]\nprovider = \"openai\"\n").unwrap();
        assert_eq!(config.agents["psychologist"].provider, "openai");
    }
}
