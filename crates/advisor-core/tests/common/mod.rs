//! Shared helpers for swarm scenario tests

#![allow(dead_code)]

use advisor_core::llm::{
    Generation, GenerationRequest, LlmError, LlmProvider, ProviderCapabilities,
};
use advisor_core::{AgentRole, ProviderRegistry, RunConfig, SwarmEngine};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// How the scripted manager answers
#[derive(Clone)]
pub enum ManagerScript {
    /// Pick the first offered option found in this order, else FINISH
    Prefer(Vec<AgentRole>),
    /// Always pick some specialist, never FINISH
    NeverFinish,
    /// Always answer with this raw text
    Raw(String),
    /// Always fail
    Fail,
}

/// Provider that answers by role, recognised from the prompt
pub struct ScriptedProvider {
    manager: ManagerScript,
    replies: HashMap<AgentRole, Result<String, LlmError>>,
    storyteller: Result<String, LlmError>,
    calls: Mutex<Vec<(AgentRole, GenerationRequest)>>,
}

impl ScriptedProvider {
    pub fn new(manager: ManagerScript) -> Self {
        let mut replies = HashMap::new();
        replies.insert(
            AgentRole::Psychologist,
            Ok(r#"{"discType":"C","riskTolerance":"low","painPoints":["service charges"],"summary":"Analytical investor"}"#.to_string()),
        );
        replies.insert(
            AgentRole::MarketInsider,
            Ok("Marina prices rose **4.2%** this quarter.".to_string()),
        );
        replies.insert(
            AgentRole::ValuationExpert,
            Ok("Fair value **1,450/sqft**, comparable sales support it.".to_string()),
        );
        replies.insert(
            AgentRole::RiskOfficer,
            Ok("Developer track record is solid; oversupply risk moderate.".to_string()),
        );
        replies.insert(
            AgentRole::WealthStructurer,
            Ok("20% down, 25-year mortgage, net yield **5.8%**.".to_string()),
        );
        Self {
            manager,
            replies,
            storyteller: Ok(
                r###"{"consultation_script":"## Your plan\nNet yield **5.8%**.","lead_priority":"urgent","key_insights":["analytical","yield focused"]}"###
                    .to_string(),
            ),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(mut self, role: AgentRole, reply: Result<&str, LlmError>) -> Self {
        let reply = reply.map(|s| s.to_string());
        if role == AgentRole::Storyteller {
            self.storyteller = reply;
        } else {
            self.replies.insert(role, reply);
        }
        self
    }

    /// Roles called, in order
    pub fn call_roles(&self) -> Vec<AgentRole> {
        self.calls.lock().iter().map(|(role, _)| *role).collect()
    }

    pub fn calls_for(&self, role: AgentRole) -> Vec<GenerationRequest> {
        self.calls
            .lock()
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, req)| req.clone())
            .collect()
    }

    fn manager_reply(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let offered: Vec<String> = request
            .options
            .schema
            .as_ref()
            .and_then(|s| s.schema["properties"]["next"]["enum"].as_array().cloned())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect();

        let pick = |next: &str| {
            Ok(format!(
                r#"{{"next":"{}","task":"Work on {}","reason":"scripted"}}"#,
                next, next
            ))
        };

        match &self.manager {
            ManagerScript::Prefer(order) => {
                let next = order
                    .iter()
                    .map(|r| r.as_str())
                    .find(|name| offered.iter().any(|o| o == name))
                    .unwrap_or("FINISH");
                pick(next)
            }
            ManagerScript::NeverFinish => {
                let next = offered
                    .iter()
                    .find(|o| o.as_str() != "FINISH")
                    .cloned()
                    .unwrap_or_else(|| "psychologist".to_string());
                pick(&next)
            }
            ManagerScript::Raw(text) => Ok(text.clone()),
            ManagerScript::Fail => Err(LlmError::Timeout),
        }
    }
}

fn classify(request: &GenerationRequest) -> AgentRole {
    let system = request.system.as_deref().unwrap_or_default();
    if system.contains("You are the Manager") {
        return AgentRole::Manager;
    }
    if system.contains("You are the Storyteller") {
        return AgentRole::Storyteller;
    }
    AgentRole::SPECIALISTS
        .into_iter()
        .find(|role| {
            request
                .prompt
                .starts_with(&format!("You are the {}", role.display_name()))
        })
        .unwrap_or(AgentRole::Manager)
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    fn name(&self) -> &str {
        "Scripted"
    }

    fn model(&self) -> String {
        "scripted-1".to_string()
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            grounding: true,
            structured_output: true,
            reasoning: true,
            max_output: 8192,
        }
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generation, LlmError> {
        let role = classify(&request);
        self.calls.lock().push((role, request.clone()));
        let reply = match role {
            AgentRole::Manager => self.manager_reply(&request),
            AgentRole::Storyteller => self.storyteller.clone(),
            other => self
                .replies
                .get(&other)
                .cloned()
                .unwrap_or_else(|| Ok(format!("{} notes", other.display_name()))),
        };
        reply.map(Generation::new)
    }
}

pub fn engine(provider: Arc<ScriptedProvider>, config: RunConfig) -> SwarmEngine {
    SwarmEngine::new(ProviderRegistry::new(provider), config)
}
