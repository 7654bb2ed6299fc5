//! Run-scoped state: the blackboard and the routing bookkeeping

use super::types::{AgentRole, Route};
use crate::error::{AdvisorError, Result};
use crate::lead::{DiscType, Lead, PsychologyProfile};
use serde::Serialize;

/// A specialist's contribution to the blackboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Contribution<T> {
    /// The specialist produced a result
    Content { value: T },
    /// The specialist failed; the run carried on without it
    Degraded { reason: String },
}

impl<T> Contribution<T> {
    pub fn content(value: T) -> Self {
        Contribution::Content { value }
    }

    pub fn degraded(reason: impl Into<String>) -> Self {
        Contribution::Degraded {
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Contribution::Content { value } => Some(value),
            Contribution::Degraded { .. } => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Contribution::Degraded { .. })
    }
}

/// Shared record of everything the specialists have found so far
///
/// Slots only ever go from empty to written. Each slot belongs to one role
/// and accepts a single write per run; the one exception is a psychology
/// profile carried over from the lead, which the psychologist may replace once.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Blackboard {
    psychology_profile: Option<Contribution<PsychologyProfile>>,
    disc_type: Option<DiscType>,
    market_data: Option<Contribution<String>>,
    valuation_data: Option<Contribution<String>>,
    risk_assessment: Option<Contribution<String>>,
    financial_plan: Option<Contribution<String>>,
    #[serde(skip)]
    seeded_profile: bool,
    /// Failure of a psychologist re-run that left the seeded profile in place
    #[serde(skip)]
    psychology_failure: Option<String>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blackboard pre-seeded with the lead's prior profile, if any
    ///
    /// An `Unknown` prior classification does not count as a known DISC
    /// type, so the psychologist is still routed first.
    pub fn seeded_from(lead: &Lead) -> Self {
        let mut board = Self::new();
        if let Some(profile) = &lead.psychology {
            if profile.disc_type != DiscType::Unknown {
                board.disc_type = Some(profile.disc_type);
            }
            board.psychology_profile = Some(Contribution::content(profile.clone()));
            board.seeded_profile = true;
        }
        board
    }

    /// Record the psychologist's result
    ///
    /// A degraded result resolves the DISC type to `Unknown`, unless the slot
    /// holds a seeded profile: that profile and its DISC type are kept and
    /// the psychologist is still reported as degraded.
    pub fn record_psychology(&mut self, contribution: Contribution<PsychologyProfile>) -> Result<()> {
        if self.psychology_profile.is_some() && !self.seeded_profile {
            return Err(AdvisorError::blackboard(
                "psychology_profile has already been written this run",
            ));
        }
        if let Contribution::Degraded { reason } = &contribution {
            if self.seeded_profile {
                self.psychology_failure = Some(reason.clone());
                self.disc_type.get_or_insert(DiscType::Unknown);
                self.seeded_profile = false;
                return Ok(());
            }
        }
        self.disc_type = Some(
            contribution
                .value()
                .map(|p| p.disc_type)
                .unwrap_or(DiscType::Unknown),
        );
        self.psychology_profile = Some(contribution);
        self.seeded_profile = false;
        Ok(())
    }

    /// Record a free-text specialist's result
    pub fn record_text(&mut self, role: AgentRole, contribution: Contribution<String>) -> Result<()> {
        let slot = match role {
            AgentRole::MarketInsider => &mut self.market_data,
            AgentRole::ValuationExpert => &mut self.valuation_data,
            AgentRole::RiskOfficer => &mut self.risk_assessment,
            AgentRole::WealthStructurer => &mut self.financial_plan,
            other => {
                return Err(AdvisorError::blackboard(format!(
                    "{} has no free-text slot",
                    other.as_str()
                )))
            }
        };
        if slot.is_some() {
            return Err(AdvisorError::blackboard(format!(
                "slot for {} has already been written this run",
                role.as_str()
            )));
        }
        *slot = Some(contribution);
        Ok(())
    }

    pub fn psychology_profile(&self) -> Option<&Contribution<PsychologyProfile>> {
        self.psychology_profile.as_ref()
    }

    pub fn disc_type(&self) -> Option<DiscType> {
        self.disc_type
    }

    /// DISC type used for tone, `Unknown` when unset
    pub fn tone(&self) -> DiscType {
        self.disc_type.unwrap_or_default()
    }

    pub fn market_data(&self) -> Option<&Contribution<String>> {
        self.market_data.as_ref()
    }

    pub fn valuation_data(&self) -> Option<&Contribution<String>> {
        self.valuation_data.as_ref()
    }

    pub fn risk_assessment(&self) -> Option<&Contribution<String>> {
        self.risk_assessment.as_ref()
    }

    pub fn financial_plan(&self) -> Option<&Contribution<String>> {
        self.financial_plan.as_ref()
    }

    /// Whether the profile in the slot was carried over from the lead
    pub fn has_seeded_profile(&self) -> bool {
        self.seeded_profile
    }

    /// Slot content for a specialist, rendered as prompt text
    pub fn rendered(&self, role: AgentRole) -> Option<Contribution<String>> {
        let text_slot = |slot: &Option<Contribution<String>>| slot.clone();
        match role {
            AgentRole::Psychologist => self.psychology_profile.as_ref().map(|c| match c {
                Contribution::Content { value } => Contribution::content(render_profile(value)),
                Contribution::Degraded { reason } => Contribution::degraded(reason.clone()),
            }),
            AgentRole::MarketInsider => text_slot(&self.market_data),
            AgentRole::ValuationExpert => text_slot(&self.valuation_data),
            AgentRole::RiskOfficer => text_slot(&self.risk_assessment),
            AgentRole::WealthStructurer => text_slot(&self.financial_plan),
            AgentRole::Manager | AgentRole::Storyteller => None,
        }
    }

    /// Specialists whose slot holds a degraded contribution
    pub fn degraded_roles(&self) -> Vec<AgentRole> {
        AgentRole::SPECIALISTS
            .into_iter()
            .filter(|role| {
                (*role == AgentRole::Psychologist && self.psychology_failure.is_some())
                    || self.rendered(*role).is_some_and(|c| c.is_degraded())
            })
            .collect()
    }

    /// Why a psychologist re-run failed while the seeded profile was kept
    pub fn psychology_failure(&self) -> Option<&str> {
        self.psychology_failure.as_deref()
    }

    /// Specialists whose slot has been written (including a seeded profile)
    pub fn written_roles(&self) -> Vec<AgentRole> {
        AgentRole::SPECIALISTS
            .into_iter()
            .filter(|role| self.rendered(*role).is_some())
            .collect()
    }
}

fn render_profile(profile: &PsychologyProfile) -> String {
    let pain_points = if profile.pain_points.is_empty() {
        "none stated".to_string()
    } else {
        profile.pain_points.join("; ")
    };
    let mut text = format!(
        "DISC type: {} ({})\nRisk tolerance: {}\nPain points: {}",
        profile.disc_type,
        profile.disc_type.label(),
        profile.risk_tolerance,
        pain_points
    );
    if !profile.summary.is_empty() {
        text.push_str(&format!("\nSummary: {}", profile.summary));
    }
    text
}

/// Everything a run knows; created at run start and dropped at run end
#[derive(Debug, Clone)]
pub struct SwarmState {
    pub lead: Lead,
    pub blackboard: Blackboard,
    /// Market snapshot text, injected verbatim into prompts
    pub market_context: String,
    pub next: Route,
    pub assigned_task: String,
    pub last_agent: Option<AgentRole>,
    pub last_output: Option<String>,
    visited: Vec<AgentRole>,
    iteration: u32,
}

impl SwarmState {
    pub fn new(lead: Lead, market_context: impl Into<String>) -> Self {
        let blackboard = Blackboard::seeded_from(&lead);
        Self {
            lead,
            blackboard,
            market_context: market_context.into(),
            next: Route::Role(AgentRole::Manager),
            assigned_task: String::new(),
            last_agent: None,
            last_output: None,
            visited: Vec::new(),
            iteration: 0,
        }
    }

    /// Roles executed so far, in execution order
    pub fn visited(&self) -> &[AgentRole] {
        &self.visited
    }

    pub fn has_visited(&self, role: AgentRole) -> bool {
        self.visited.contains(&role)
    }

    /// Mark a role executed; returns false if it already was
    pub fn mark_visited(&mut self, role: AgentRole) -> bool {
        if self.has_visited(role) {
            return false;
        }
        self.visited.push(role);
        true
    }

    /// Specialists still eligible for routing
    pub fn unvisited_specialists(&self) -> Vec<AgentRole> {
        AgentRole::SPECIALISTS
            .into_iter()
            .filter(|role| !self.has_visited(*role))
            .collect()
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Count one manager decision
    pub fn advance(&mut self) -> u32 {
        self.iteration += 1;
        self.iteration
    }

    /// Record a worker completion for the manager's next decision
    pub fn complete(&mut self, role: AgentRole, output: String) {
        self.mark_visited(role);
        self.last_agent = Some(role);
        self.last_output = Some(output);
        self.next = Route::Role(AgentRole::Manager);
    }
}
