//! Role dispatch table and prompt building
//!
//! Every specialist is described by a static [`WorkerSpec`]; the worker
//! loop itself is identical across roles.

use super::state::{Contribution, SwarmState};
use super::types::AgentRole;
use crate::lead::DiscType;
use crate::llm::OutputSchema;
use serde_json::{json, Value};

/// Static configuration of one specialist
#[derive(Debug)]
pub struct WorkerSpec {
    pub role: AgentRole,
    /// Whether the worker may use search grounding
    pub grounded: bool,
    /// Output schema, for workers that return structured data
    pub schema: Option<fn() -> OutputSchema>,
    /// Role instructions placed at the top of the prompt
    pub instructions: &'static str,
}

impl WorkerSpec {
    pub fn output_schema(&self) -> Option<OutputSchema> {
        self.schema.map(|build| build())
    }
}

static WORKERS: [WorkerSpec; 5] = [
    WorkerSpec {
        role: AgentRole::Psychologist,
        grounded: false,
        schema: Some(psychology_schema),
        instructions: PSYCHOLOGIST_PROMPT,
    },
    WorkerSpec {
        role: AgentRole::MarketInsider,
        grounded: true,
        schema: None,
        instructions: MARKET_INSIDER_PROMPT,
    },
    WorkerSpec {
        role: AgentRole::ValuationExpert,
        grounded: true,
        schema: None,
        instructions: VALUATION_EXPERT_PROMPT,
    },
    WorkerSpec {
        role: AgentRole::RiskOfficer,
        grounded: true,
        schema: None,
        instructions: RISK_OFFICER_PROMPT,
    },
    WorkerSpec {
        role: AgentRole::WealthStructurer,
        grounded: false,
        schema: None,
        instructions: WEALTH_STRUCTURER_PROMPT,
    },
];

/// Look up the spec for a specialist role
pub fn worker_spec(role: AgentRole) -> Option<&'static WorkerSpec> {
    WORKERS.iter().find(|spec| spec.role == role)
}

const PSYCHOLOGIST_PROMPT: &str = r#"
You are the Psychologist of a real-estate advisory team.
Classify the lead's behavioral profile using the DISC model
(D = Dominance, I = Influence, S = Steadiness, C = Conscientiousness)
from the conversation history. Use "Unknown" when the evidence is too thin.
Assess their risk tolerance (high, medium, low) and list their pain points.
"#;

const MARKET_INSIDER_PROMPT: &str = r#"
You are the Market Insider of a real-estate advisory team.
Describe the current market conditions relevant to this lead: price trends,
inventory, demand, rental yields and notable developments in the areas they
care about. Cite concrete figures where you can.
"#;

const VALUATION_EXPERT_PROMPT: &str = r#"
You are the Valuation Expert of a real-estate advisory team.
Estimate fair value ranges for the properties or segments the lead is
considering. Build on the market findings if available and state price per
square meter, comparable sales and expected appreciation.
"#;

const RISK_OFFICER_PROMPT: &str = r#"
You are the Risk Officer of a real-estate advisory team.
Identify legal, financial and market risks for this lead: title and permit
issues, developer track record, interest rate exposure, liquidity and
oversupply. Rate each risk and propose a mitigation.
"#;

const WEALTH_STRUCTURER_PROMPT: &str = r#"
You are the Wealth Structurer of a real-estate advisory team.
Propose how the lead should finance and hold the purchase: down payment,
mortgage options, payment plans, expected cash flow and how the asset fits
a long-term wealth plan.
"#;

/// Canned task used when the psychologist is routed without a model decision
pub const PSYCHOLOGIST_GATE_TASK: &str =
    "Classify the lead's behavioral profile from the conversation history and return the structured result.";

/// Style directive for a DISC type
pub fn tone_directive(disc: DiscType) -> &'static str {
    match disc {
        DiscType::D => {
            "Tone: direct and results-first. Lead with the bottom line, keep it brief, offer clear options and let them decide."
        }
        DiscType::I => {
            "Tone: warm and enthusiastic. Tell the story of the lifestyle, use vivid examples and keep the energy positive."
        }
        DiscType::S => {
            "Tone: calm and reassuring. Emphasize security, stability and a step-by-step process with no pressure."
        }
        DiscType::C => {
            "Tone: precise and analytical. Lead with data, numbers and sources, and be explicit about assumptions."
        }
        DiscType::Unknown => {
            "Tone: professional and balanced. Be clear and friendly, and back claims with key figures."
        }
    }
}

/// JSON schema of the psychologist's result
pub fn psychology_schema() -> OutputSchema {
    OutputSchema::new(
        "psychology_profile",
        json!({
            "type": "object",
            "properties": {
                "discType": { "type": "string", "enum": ["D", "I", "S", "C", "Unknown"] },
                "riskTolerance": { "type": "string", "enum": ["high", "medium", "low"] },
                "painPoints": { "type": "array", "items": { "type": "string" } },
                "summary": { "type": "string" }
            },
            "required": ["discType", "riskTolerance", "painPoints", "summary"]
        }),
    )
}

/// JSON schema of a manager decision restricted to `candidates` plus FINISH
pub fn routing_schema(candidates: &[AgentRole]) -> OutputSchema {
    let mut options: Vec<Value> = candidates.iter().map(|r| json!(r.as_str())).collect();
    options.push(json!(super::Route::FINISH));
    OutputSchema::new(
        "routing_decision",
        json!({
            "type": "object",
            "properties": {
                "next": { "type": "string", "enum": options },
                "task": { "type": "string" },
                "reason": { "type": "string" }
            },
            "required": ["next", "task", "reason"]
        }),
    )
}

/// Specialist findings so far, one section per written slot
///
/// Degraded slots are marked unavailable rather than omitted.
pub fn findings_section(state: &SwarmState) -> String {
    let sections: Vec<String> = AgentRole::SPECIALISTS
        .into_iter()
        .filter_map(|role| {
            state.blackboard.rendered(role).map(|c| match c {
                Contribution::Content { value } => {
                    format!("### {}\n{}", role.display_name(), value.trim())
                }
                Contribution::Degraded { reason } => format!(
                    "### {}\n[UNAVAILABLE: this specialist failed ({}); do not invent its findings]",
                    role.display_name(),
                    reason
                ),
            })
        })
        .collect();

    if sections.is_empty() {
        "No specialist findings yet.".to_string()
    } else {
        sections.join("\n\n")
    }
}

/// Shared context block: lead, conversation and market snapshot
pub fn context_section(state: &SwarmState) -> String {
    format!(
        "## Lead\n{}\n\n## Conversation\n{}\n\n## Market snapshot\n{}",
        state.lead.summary(),
        state.lead.transcript(),
        if state.market_context.trim().is_empty() {
            "No market snapshot available."
        } else {
            state.market_context.trim()
        }
    )
}

/// Full prompt for a specialist
pub fn build_worker_prompt(spec: &WorkerSpec, state: &SwarmState, task: &str) -> String {
    format!(
        "{}\n{}\n\n{}\n\n## Findings so far\n{}\n\n## Your task\n{}",
        spec.instructions.trim(),
        tone_directive(state.blackboard.tone()),
        context_section(state),
        findings_section(state),
        task
    )
}
