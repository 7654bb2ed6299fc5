//! Configuration loader with environment variable expansion
//!
//! Loads configuration from `.advisor.toml` in the project root or the user
//! config directory.

use super::types::{AdvisorConfig, ProviderConfig};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid expansion pattern: {0}")]
    PatternError(#[from] regex::Error),
}

const ENV_VAR_PATTERN: &str = r"\$\{([^}]+)\}";

/// Load configuration from various sources
///
/// Priority order:
/// 1. Project-level `.advisor.toml`
/// 2. User-level `~/.config/advisor/config.toml`
/// 3. Default configuration
pub fn load_config(project_dir: &Path) -> Result<AdvisorConfig, ConfigError> {
    let project_config = project_dir.join(".advisor.toml");
    if project_config.exists() {
        return load_from_file(&project_config);
    }

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            return load_from_file(&user_config);
        }
    }

    Ok(apply_env_overrides(AdvisorConfig::default()))
}

/// User-level config file location
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("advisor").join("config.toml"))
}

/// Load configuration from a specific file
pub fn load_from_file(path: &Path) -> Result<AdvisorConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config: AdvisorConfig = toml::from_str(&content)?;

    expand_env_vars(&mut config)?;

    Ok(apply_env_overrides(config))
}

/// Expand ${VAR} patterns in provider keys and URLs
fn expand_env_vars(config: &mut AdvisorConfig) -> Result<(), ConfigError> {
    let env_regex = Regex::new(ENV_VAR_PATTERN)?;

    for provider in config.llm.providers.values_mut() {
        if let Some(ref api_key) = provider.api_key {
            provider.api_key = Some(expand_string(api_key, &env_regex));
        }
        if let Some(ref base_url) = provider.base_url {
            provider.base_url = Some(expand_string(base_url, &env_regex));
        }
    }

    Ok(())
}

/// Expand environment variables in a single string
fn expand_string(s: &str, regex: &Regex) -> String {
    regex
        .replace_all(s, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
}

/// Apply environment variable overrides for common settings
///
/// Supports direct environment variables:
/// - GEMINI_API_KEY / GOOGLE_API_KEY -> gemini.api_key
/// - OPENAI_API_KEY -> openai.api_key
/// - OLLAMA_BASE_URL -> ollama.base_url
/// - ADVISOR_DEFAULT_PROVIDER -> llm.default_provider
fn apply_env_overrides(mut config: AdvisorConfig) -> AdvisorConfig {
    for env_var in ["GEMINI_API_KEY", "GOOGLE_API_KEY"] {
        if let Ok(key) = std::env::var(env_var) {
            if !key.is_empty() {
                let provider = config
                    .llm
                    .providers
                    .entry("gemini".to_string())
                    .or_insert_with(ProviderConfig::default);
                provider.api_key = Some(key);
                provider.enabled = true;
                break;
            }
        }
    }

    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        if !key.is_empty() {
            let provider = config
                .llm
                .providers
                .entry("openai".to_string())
                .or_insert_with(ProviderConfig::default);
            provider.api_key = Some(key);
            provider.enabled = true;
        }
    }

    if let Ok(url) = std::env::var("OLLAMA_BASE_URL") {
        if !url.is_empty() {
            let provider = config
                .llm
                .providers
                .entry("ollama".to_string())
                .or_insert_with(ProviderConfig::default);
            provider.base_url = Some(url);
        }
    }

    if let Ok(provider) = std::env::var("ADVISOR_DEFAULT_PROVIDER") {
        if !provider.is_empty() {
            config.llm.default_provider = provider;
        }
    }

    config
}

/// Create a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# Advisor Configuration
# Place this file in your project root as .advisor.toml
# or in ~/.config/advisor/config.toml for global settings

[llm]
# Default provider: gemini, openai, ollama
default_provider = "gemini"

# Request timeout in seconds
timeout = 120

[llm.providers.gemini]
enabled = true
api_key = "${GEMINI_API_KEY}"
default_model = "gemini-2.5-flash"

[llm.providers.openai]
enabled = false
api_key = "${OPENAI_API_KEY}"
default_model = "gpt-4o"

[llm.providers.ollama]
enabled = false
base_url = "http://localhost:11434"
default_model = "llama3.1"

# Route a single role to a different provider
# [agents.psychologist]
# provider = "openai"

[run]
# Supervisor iterations before the run is forced to finish
max_iterations = 6
# Characters of worker output shown in each timeline step
preview_chars = 150
worker_temperature = 0.7
max_output_tokens = 2048
finalizer_max_output_tokens = 8192

[market]
# snapshot = "Prime rents up 4% YoY; mortgage rates stable at 4.1%"
# snapshot_file = "market.txt"
"#
}
