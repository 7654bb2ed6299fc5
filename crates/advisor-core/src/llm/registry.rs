//! Provider registry: builds providers from config and resolves one per role

use super::{GeminiProvider, LlmError, OllamaProvider, OpenAIProvider, SharedProvider};
use crate::config::{AdvisorConfig, ProviderConfig};
use crate::swarm::AgentRole;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Registry for managing multiple LLM providers
pub struct ProviderRegistry {
    /// All registered providers
    providers: HashMap<String, SharedProvider>,

    /// Provider used when a role has no override
    default_provider: SharedProvider,

    /// Role -> provider ID overrides
    role_overrides: HashMap<AgentRole, String>,
}

impl ProviderRegistry {
    /// Create a registry where every role uses `provider`
    pub fn new(provider: SharedProvider) -> Self {
        let mut providers = HashMap::new();
        providers.insert(provider.id().to_string(), provider.clone());
        Self {
            providers,
            default_provider: provider,
            role_overrides: HashMap::new(),
        }
    }

    /// Create a registry from configuration
    ///
    /// Every enabled provider is built; the default provider must be among
    /// them. Role overrides naming an unknown provider are skipped with a
    /// warning.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self, LlmError> {
        let timeout = Duration::from_secs(config.llm.timeout);

        let mut providers: HashMap<String, SharedProvider> = HashMap::new();
        for (id, provider_config) in config.enabled_providers() {
            match build_provider(id, provider_config, timeout) {
                Some(provider) => {
                    providers.insert(id.clone(), provider);
                }
                None => {
                    tracing::warn!(provider = %id, "Skipping provider: missing key or unsupported");
                }
            }
        }

        let default_id = &config.llm.default_provider;
        let default_provider = providers.get(default_id).cloned().ok_or_else(|| {
            LlmError::ProviderUnavailable(format!(
                "Default provider '{}' is not enabled or has no API key",
                default_id
            ))
        })?;

        let mut role_overrides = HashMap::new();
        for (role_name, agent) in &config.agents {
            let Ok(role) = role_name.parse::<AgentRole>() else {
                tracing::warn!(role = %role_name, "Ignoring override for unknown agent role");
                continue;
            };
            if providers.contains_key(&agent.provider) {
                role_overrides.insert(role, agent.provider.clone());
            } else {
                tracing::warn!(
                    role = %role_name,
                    provider = %agent.provider,
                    "Ignoring override: provider not enabled"
                );
            }
        }

        Ok(Self {
            providers,
            default_provider,
            role_overrides,
        })
    }

    /// Register a provider
    pub fn register(&mut self, provider: SharedProvider) {
        let id = provider.id().to_string();
        self.providers.insert(id, provider);
    }

    /// Route a role to a registered provider
    pub fn route_role(&mut self, role: AgentRole, provider_id: &str) -> Result<(), LlmError> {
        if !self.providers.contains_key(provider_id) {
            return Err(LlmError::ProviderUnavailable(format!(
                "Provider '{}' not registered",
                provider_id
            )));
        }
        self.role_overrides.insert(role, provider_id.to_string());
        Ok(())
    }

    /// Get a provider by ID
    pub fn get(&self, id: &str) -> Option<SharedProvider> {
        self.providers.get(id).cloned()
    }

    /// Resolve the provider for a role
    pub fn for_role(&self, role: AgentRole) -> SharedProvider {
        self.role_overrides
            .get(&role)
            .and_then(|id| self.get(id))
            .unwrap_or_else(|| self.default_provider.clone())
    }

    /// Get all registered provider IDs
    pub fn provider_ids(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    /// Get display info for all providers
    pub fn provider_info(&self) -> Vec<ProviderInfo> {
        self.providers
            .values()
            .map(|p| ProviderInfo {
                id: p.id().to_string(),
                name: p.name().to_string(),
                model: p.model(),
            })
            .collect()
    }
}

/// Build one provider from its config section
fn build_provider(id: &str, config: &ProviderConfig, timeout: Duration) -> Option<SharedProvider> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty() && !k.starts_with("${"));

    match id {
        "gemini" => {
            let model = config.default_model.as_deref().unwrap_or("gemini-2.5-flash");
            let mut provider = GeminiProvider::new(api_key?, model).with_timeout(timeout);
            if let Some(url) = &config.base_url {
                provider = provider.with_base_url(url);
            }
            Some(Arc::new(provider))
        }
        "openai" => {
            let model = config.default_model.as_deref().unwrap_or("gpt-4o");
            let mut provider = OpenAIProvider::new(api_key?, model).with_timeout(timeout);
            if let Some(url) = &config.base_url {
                provider = provider.with_base_url(url);
            }
            Some(Arc::new(provider))
        }
        "ollama" => {
            let base_url = config
                .base_url
                .as_deref()
                .unwrap_or("http://localhost:11434");
            let model = config.default_model.as_deref().unwrap_or("llama3.1");
            Some(Arc::new(
                OllamaProvider::new(base_url, model).with_timeout(timeout),
            ))
        }
        _ => None,
    }
}

/// Provider information for display
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub model: String,
}

impl ProviderInfo {
    /// Get a display string for the provider
    pub fn display(&self) -> String {
        format!("{} ({})", self.name, self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentProviderConfig;

    fn config_with_keys() -> AdvisorConfig {
        let mut config = AdvisorConfig::default();
        for id in ["gemini", "openai"] {
            let provider = config.llm.providers.get_mut(id).unwrap();
            provider.enabled = true;
            provider.api_key = Some(format!("{}-key", id));
        }
        config
    }

    #[test]
    fn test_from_config_uses_default_provider() {
        let registry = ProviderRegistry::from_config(&config_with_keys()).unwrap();
        assert_eq!(registry.for_role(AgentRole::Psychologist).id(), "gemini");
        assert_eq!(registry.for_role(AgentRole::Manager).id(), "gemini");
    }

    #[test]
    fn test_role_override() {
        let mut config = config_with_keys();
        config.agents.insert(
            "risk_officer".to_string(),
            AgentProviderConfig {
                provider: "openai".to_string(),
            },
        );
        let registry = ProviderRegistry::from_config(&config).unwrap();
        assert_eq!(registry.for_role(AgentRole::RiskOfficer).id(), "openai");
        assert_eq!(registry.for_role(AgentRole::MarketInsider).id(), "gemini");
    }

    #[test]
    fn test_default_without_key_is_an_error() {
        let config = AdvisorConfig::default();
        assert!(matches!(
            ProviderRegistry::from_config(&config),
            Err(LlmError::ProviderUnavailable(_))
        ));
    }

    #[test]
    fn test_unexpanded_key_is_treated_as_missing() {
        let mut config = config_with_keys();
        config.llm.providers.get_mut("gemini").unwrap().api_key =
            Some("${GEMINI_API_KEY}".to_string());
        assert!(ProviderRegistry::from_config(&config).is_err());
    }

    #[test]
    fn test_route_role_requires_registered_provider() {
        let mut registry = ProviderRegistry::new(Arc::new(OllamaProvider::default()));
        assert!(registry.route_role(AgentRole::Storyteller, "openai").is_err());
        assert!(registry.route_role(AgentRole::Storyteller, "ollama").is_ok());
        assert_eq!(registry.provider_ids(), vec!["ollama".to_string()]);
    }
}
