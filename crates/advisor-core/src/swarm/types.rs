//! Swarm types: roles, routes and progress steps

use serde::{Deserialize, Serialize};
use std::fmt;

/// Agent roles in the swarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentRole {
    /// Routes work between the specialists
    Manager,
    /// Classifies the lead's behavioral profile
    Psychologist,
    /// Reads the local market
    MarketInsider,
    /// Values the properties under discussion
    ValuationExpert,
    /// Flags legal, financial and market risk
    RiskOfficer,
    /// Structures financing and long-term wealth
    WealthStructurer,
    /// Writes the final consultation script
    Storyteller,
}

impl AgentRole {
    /// The five roles the manager can route to
    pub const SPECIALISTS: [AgentRole; 5] = [
        AgentRole::Psychologist,
        AgentRole::MarketInsider,
        AgentRole::ValuationExpert,
        AgentRole::RiskOfficer,
        AgentRole::WealthStructurer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Manager => "manager",
            AgentRole::Psychologist => "psychologist",
            AgentRole::MarketInsider => "market_insider",
            AgentRole::ValuationExpert => "valuation_expert",
            AgentRole::RiskOfficer => "risk_officer",
            AgentRole::WealthStructurer => "wealth_structurer",
            AgentRole::Storyteller => "storyteller",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AgentRole::Manager => "Manager",
            AgentRole::Psychologist => "Psychologist",
            AgentRole::MarketInsider => "Market Insider",
            AgentRole::ValuationExpert => "Valuation Expert",
            AgentRole::RiskOfficer => "Risk Officer",
            AgentRole::WealthStructurer => "Wealth Structurer",
            AgentRole::Storyteller => "Storyteller",
        }
    }

    /// Human-readable job description shown next to each step
    pub fn description(&self) -> &'static str {
        match self {
            AgentRole::Manager => "Coordinates the specialist team",
            AgentRole::Psychologist => "Behavioral profiling (DISC)",
            AgentRole::MarketInsider => "Local market intelligence",
            AgentRole::ValuationExpert => "Property valuation and pricing",
            AgentRole::RiskOfficer => "Legal, financial and market risk",
            AgentRole::WealthStructurer => "Financing and wealth structuring",
            AgentRole::Storyteller => "Consultation script synthesis",
        }
    }

    pub fn is_specialist(&self) -> bool {
        Self::SPECIALISTS.contains(self)
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for AgentRole {
    type Err = String;

    /// Accepts snake_case, PascalCase, kebab-case and spaced names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "manager" | "supervisor" => Ok(AgentRole::Manager),
            "psychologist" => Ok(AgentRole::Psychologist),
            "marketinsider" => Ok(AgentRole::MarketInsider),
            "valuationexpert" => Ok(AgentRole::ValuationExpert),
            "riskofficer" => Ok(AgentRole::RiskOfficer),
            "wealthstructurer" => Ok(AgentRole::WealthStructurer),
            "storyteller" | "finalizer" => Ok(AgentRole::Storyteller),
            _ => Err(format!("Unknown agent role: {}", s)),
        }
    }
}

/// Where control goes after a manager decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Role(AgentRole),
    Finish,
}

impl Route {
    /// Token used for termination in routing prompts and schemas
    pub const FINISH: &'static str = "FINISH";

    pub fn is_finish(&self) -> bool {
        matches!(self, Route::Finish)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Role(role) => f.write_str(role.as_str()),
            Route::Finish => f.write_str(Self::FINISH),
        }
    }
}

/// Progress status of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Thinking,
    Done,
}

/// A progress event pushed to the observer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwarmStep {
    pub agent_name: String,
    /// Human-readable description of the agent's job
    pub agent_role: String,
    pub agent_type: AgentRole,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl SwarmStep {
    pub fn thinking(role: AgentRole) -> Self {
        Self {
            agent_name: role.display_name().to_string(),
            agent_role: role.description().to_string(),
            agent_type: role,
            status: StepStatus::Thinking,
            output: None,
        }
    }

    pub fn done(role: AgentRole, output: impl Into<String>) -> Self {
        Self {
            agent_name: role.display_name().to_string(),
            agent_role: role.description().to_string(),
            agent_type: role,
            status: StepStatus::Done,
            output: Some(output.into()),
        }
    }
}

/// Truncate to at most `max_chars` characters, appending "..." when cut
pub fn preview(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
