//! Lead value types
//!
//! The lead is the read-mostly input of a swarm run. Its JSON shape uses
//! camelCase field names, matching what CRM front-ends send.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the lead is buying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadPurpose {
    Residence,
    Investment,
    #[default]
    Unknown,
}

impl LeadPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadPurpose::Residence => "residence",
            LeadPurpose::Investment => "investment",
            LeadPurpose::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LeadPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority tier, ordered from lowest to highest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LeadPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl LeadPriority {
    pub const ALL: [LeadPriority; 4] = [
        LeadPriority::Low,
        LeadPriority::Medium,
        LeadPriority::High,
        LeadPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadPriority::Low => "low",
            LeadPriority::Medium => "medium",
            LeadPriority::High => "high",
            LeadPriority::Urgent => "urgent",
        }
    }

    /// Ordinal rank (low = 0 .. urgent = 3)
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Whether `self` strictly outranks `other`
    pub fn outranks(&self, other: LeadPriority) -> bool {
        self.rank() > other.rank()
    }
}

impl fmt::Display for LeadPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeadPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(LeadPriority::Low),
            "medium" => Ok(LeadPriority::Medium),
            "high" => Ok(LeadPriority::High),
            "urgent" => Ok(LeadPriority::Urgent),
            _ => Err(format!("Unknown lead priority: {}", s)),
        }
    }
}

/// DISC behavioral classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DiscType {
    /// Dominance
    D,
    /// Influence
    I,
    /// Steadiness
    S,
    /// Conscientiousness
    C,
    #[default]
    Unknown,
}

impl DiscType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscType::D => "D",
            DiscType::I => "I",
            DiscType::S => "S",
            DiscType::C => "C",
            DiscType::Unknown => "Unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DiscType::D => "Dominance",
            DiscType::I => "Influence",
            DiscType::S => "Steadiness",
            DiscType::C => "Conscientiousness",
            DiscType::Unknown => "Unknown",
        }
    }

    /// Lenient parse: accepts letters and full names, anything else is Unknown
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "d" | "dominance" | "dominant" => DiscType::D,
            "i" | "influence" | "influential" => DiscType::I,
            "s" | "steadiness" | "steady" => DiscType::S,
            "c" | "conscientiousness" | "conscientious" => DiscType::C,
            _ => DiscType::Unknown,
        }
    }
}

impl fmt::Display for DiscType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appetite for risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    High,
    #[default]
    Medium,
    Low,
}

impl RiskTolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTolerance::High => "high",
            RiskTolerance::Medium => "medium",
            RiskTolerance::Low => "low",
        }
    }

    /// Lenient parse: unknown values fall back to medium
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => RiskTolerance::High,
            "low" => RiskTolerance::Low,
            _ => RiskTolerance::Medium,
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behavioral profile produced by the psychologist
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsychologyProfile {
    #[serde(default)]
    pub disc_type: DiscType,
    #[serde(default)]
    pub risk_tolerance: RiskTolerance,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

impl PsychologyProfile {
    /// The subset written back to the lead store
    pub fn to_update(&self) -> PsychologyUpdate {
        PsychologyUpdate {
            disc_type: self.disc_type,
            risk_tolerance: self.risk_tolerance,
            pain_points: self.pain_points.clone(),
        }
    }
}

/// Payload of a psychology write-back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsychologyUpdate {
    pub disc_type: DiscType,
    pub risk_tolerance: RiskTolerance,
    pub pain_points: Vec<String>,
}

/// One message of the conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who spoke ("client", "agent", ...)
    pub role: String,
    pub content: String,
}

impl ConversationTurn {
    pub fn client(content: impl Into<String>) -> Self {
        Self {
            role: "client".to_string(),
            content: content.into(),
        }
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: "agent".to_string(),
            content: content.into(),
        }
    }
}

/// A sales lead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub purpose: LeadPurpose,
    #[serde(default)]
    pub priority: LeadPriority,
    /// Budget as stated by the lead, free text
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub psychology: Option<PsychologyProfile>,
    #[serde(default)]
    pub conversation: Vec<ConversationTurn>,
}

impl Lead {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            phone: None,
            purpose: LeadPurpose::Unknown,
            priority: LeadPriority::Medium,
            budget: None,
            psychology: None,
            conversation: Vec::new(),
        }
    }

    pub fn with_purpose(mut self, purpose: LeadPurpose) -> Self {
        self.purpose = purpose;
        self
    }

    pub fn with_priority(mut self, priority: LeadPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_psychology(mut self, profile: PsychologyProfile) -> Self {
        self.psychology = Some(profile);
        self
    }

    pub fn with_conversation(mut self, turns: Vec<ConversationTurn>) -> Self {
        self.conversation = turns;
        self
    }

    /// Conversation rendered as "role: content" lines
    pub fn transcript(&self) -> String {
        if self.conversation.is_empty() {
            return "No conversation history.".to_string();
        }
        self.conversation
            .iter()
            .map(|turn| format!("{}: {}", turn.role, turn.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Short identity block for prompts
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Name: {}", self.name),
            format!("Purpose: {}", self.purpose),
            format!("Current priority: {}", self.priority),
        ];
        if let Some(budget) = &self.budget {
            lines.push(format!("Budget: {}", budget));
        }
        lines.join("\n")
    }
}
