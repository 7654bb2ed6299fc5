//! Manager: decides which specialist runs next
//!
//! The manager never fails. A missing profile routes straight to the
//! psychologist, an exhausted team finishes without asking the model, and
//! any model error, unparsable reply or ineligible choice ends the run.

use super::observer::SwarmObserver;
use super::roles::{context_section, findings_section, routing_schema, PSYCHOLOGIST_GATE_TASK};
use super::state::SwarmState;
use super::types::{preview, AgentRole, Route, SwarmStep};
use crate::config::RunConfig;
use crate::llm::{parse_json_object, GenerationOptions, GenerationRequest, LlmProvider};

const MANAGER_SYSTEM_PROMPT: &str = r#"
You are the Manager of a real-estate advisory team preparing a consultation for one sales lead.
Pick the single specialist who should work next, give them a concrete task, or answer FINISH
when the team has enough to write the consultation.

Specialists:
- psychologist: behavioral (DISC) profile, risk tolerance and pain points
- market_insider: current market conditions and trends
- valuation_expert: fair value and pricing of the relevant properties
- risk_officer: legal, financial and market risks
- wealth_structurer: financing, payment plans and long-term wealth fit

Guidelines:
- Market analysis should generally come before valuation.
- A low risk tolerance or risk-averse profile calls for the risk officer.
- An investment purpose calls for the valuation expert and the wealth structurer.
- Only choose from the options you are given. Never repeat a specialist.
"#;

/// A manager decision
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub next: Route,
    pub task: String,
    pub reason: String,
}

impl Decision {
    pub fn finish(reason: impl Into<String>) -> Self {
        Self {
            next: Route::Finish,
            task: String::new(),
            reason: reason.into(),
        }
    }

    fn summary(&self) -> String {
        match self.next {
            Route::Role(role) => format!("Next: {} ({})", role.display_name(), self.reason),
            Route::Finish => format!("Finishing: {}", self.reason),
        }
    }
}

/// Decide the next route for the run
pub async fn decide(
    state: &SwarmState,
    provider: &dyn LlmProvider,
    config: &RunConfig,
    observer: &dyn SwarmObserver,
) -> Decision {
    observer.on_step(&SwarmStep::thinking(AgentRole::Manager));
    let decision = decide_inner(state, provider, config).await;
    tracing::debug!(
        lead_id = %state.lead.id,
        iteration = state.iteration() + 1,
        next = %decision.next,
        reason = %decision.reason,
        "Manager decision"
    );
    observer.on_step(&SwarmStep::done(
        AgentRole::Manager,
        preview(&decision.summary(), config.preview_chars),
    ));
    decision
}

async fn decide_inner(
    state: &SwarmState,
    provider: &dyn LlmProvider,
    config: &RunConfig,
) -> Decision {
    if state.blackboard.disc_type().is_none() && !state.has_visited(AgentRole::Psychologist) {
        return Decision {
            next: Route::Role(AgentRole::Psychologist),
            task: PSYCHOLOGIST_GATE_TASK.to_string(),
            reason: "Behavioral profile is required before other specialists".to_string(),
        };
    }

    let candidates = state.unvisited_specialists();
    if candidates.is_empty() {
        return Decision::finish("All specialists have reported");
    }

    let request = GenerationRequest::new(build_manager_prompt(state, &candidates))
        .with_system(MANAGER_SYSTEM_PROMPT.trim())
        .with_options(GenerationOptions {
            grounded: false,
            schema: Some(routing_schema(&candidates)),
            temperature: 0.0,
            max_output_tokens: config.max_output_tokens,
            ..GenerationOptions::default()
        });

    match provider.generate(request).await {
        Ok(generation) => parse_decision(&generation.text, &candidates),
        Err(e) => {
            tracing::warn!(lead_id = %state.lead.id, error = %e, "Manager call failed; finishing");
            Decision::finish(format!("Routing failed: {}", e))
        }
    }
}

fn build_manager_prompt(state: &SwarmState, candidates: &[AgentRole]) -> String {
    let options: Vec<&str> = candidates
        .iter()
        .map(|r| r.as_str())
        .chain(std::iter::once(Route::FINISH))
        .collect();
    let last = match (&state.last_agent, &state.last_output) {
        (Some(role), Some(output)) => format!("{}: {}", role.display_name(), output.trim()),
        _ => "None yet.".to_string(),
    };

    format!(
        "{}\n\n## Findings so far\n{}\n\n## Last completed\n{}\n\n## Options\n{}\n\nRespond with JSON: {{\"next\": <option>, \"task\": <instructions for that specialist>, \"reason\": <why>}}",
        context_section(state),
        findings_section(state),
        last,
        options.join(", ")
    )
}

/// Parse a manager reply, accepting only `eligible` roles or FINISH
///
/// Anything else (unparsable text, unknown or already-visited role) finishes.
pub fn parse_decision(content: &str, eligible: &[AgentRole]) -> Decision {
    let Some(json) = parse_json_object(content) else {
        return Decision::finish("Unparsable routing decision");
    };

    let next = json
        .get("next")
        .or_else(|| json.get("next_agent"))
        .or_else(|| json.get("nextAgent"))
        .and_then(|v| v.as_str())
        .unwrap_or(Route::FINISH);

    let reason = json
        .get("reason")
        .or_else(|| json.get("reasoning"))
        .and_then(|v| v.as_str())
        .unwrap_or("No reason given")
        .to_string();

    if next.trim().eq_ignore_ascii_case(Route::FINISH) {
        return Decision::finish(reason);
    }

    match next.parse::<AgentRole>() {
        Ok(role) if eligible.contains(&role) => {
            let task = json
                .get("task")
                .and_then(|v| v.as_str())
                .filter(|t| !t.trim().is_empty())
                .map(|t| t.to_string())
                .unwrap_or_else(|| format!("Provide your {} analysis for this lead.", role.description()));
            Decision {
                next: Route::Role(role),
                task,
                reason,
            }
        }
        _ => Decision::finish(format!("Ineligible route '{}'", next)),
    }
}
