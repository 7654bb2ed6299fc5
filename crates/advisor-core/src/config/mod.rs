//! Configuration module for Advisor
//!
//! Handles loading and parsing of `.advisor.toml` configuration files
//! with support for environment variable expansion.

mod loader;
mod types;

pub use loader::{load_config, load_from_file, sample_config, user_config_path, ConfigError};
pub use types::{
    AdvisorConfig, AgentProviderConfig, LlmConfig, MarketConfig, ProviderConfig, RunConfig,
};
