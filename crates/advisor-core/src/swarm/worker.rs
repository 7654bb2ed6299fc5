//! Specialist execution
//!
//! One loop serves all five specialists; the role's [`WorkerSpec`] decides
//! grounding, schema and instructions.

use super::effects::SwarmEffect;
use super::observer::SwarmObserver;
use super::roles::{build_worker_prompt, worker_spec};
use super::state::{Contribution, SwarmState};
use super::types::{preview, AgentRole, SwarmStep};
use crate::config::RunConfig;
use crate::lead::{DiscType, PsychologyProfile, RiskTolerance};
use crate::llm::{parse_json_object, GenerationOptions, GenerationRequest, LlmProvider};
use serde_json::Value;

/// What a specialist turn produced
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerRun {
    /// Text handed back to the manager
    pub output: String,
    /// Store write to publish, if any
    pub effect: Option<SwarmEffect>,
    pub degraded: bool,
}

/// Run one specialist and record its contribution on the blackboard
///
/// Never fails: generation errors become a degraded slot.
pub async fn run_worker(
    role: AgentRole,
    task: &str,
    state: &mut SwarmState,
    provider: &dyn LlmProvider,
    config: &RunConfig,
    observer: &dyn SwarmObserver,
) -> WorkerRun {
    let Some(spec) = worker_spec(role) else {
        tracing::warn!(role = %role.as_str(), "No worker registered for role");
        return WorkerRun {
            output: format!("{} cannot run as a worker", role.display_name()),
            effect: None,
            degraded: true,
        };
    };

    observer.on_step(&SwarmStep::thinking(role));

    let request = GenerationRequest::new(build_worker_prompt(spec, state, task)).with_options(
        GenerationOptions {
            grounded: spec.grounded,
            schema: spec.output_schema(),
            temperature: config.worker_temperature,
            max_output_tokens: config.max_output_tokens,
            ..GenerationOptions::default()
        },
    );

    let result = provider.generate(request).await;
    let run = match (role, result) {
        (AgentRole::Psychologist, Ok(generation)) => record_profile(state, &generation.text),
        (_, Ok(generation)) => {
            let text = generation.text.trim().to_string();
            record(state, role, Contribution::content(text.clone()));
            WorkerRun {
                output: text,
                effect: None,
                degraded: false,
            }
        }
        (_, Err(e)) => {
            tracing::warn!(
                lead_id = %state.lead.id,
                role = %role.as_str(),
                error = %e,
                "Worker failed; recording degraded slot"
            );
            let reason = e.to_string();
            if role == AgentRole::Psychologist {
                if let Err(err) = state.blackboard.record_psychology(Contribution::degraded(&reason)) {
                    tracing::warn!(error = %err, "Blackboard rejected psychology write");
                }
            } else {
                record(state, role, Contribution::degraded(&reason));
            }
            WorkerRun {
                output: format!("{} unavailable: {}", role.display_name(), reason),
                effect: None,
                degraded: true,
            }
        }
    };

    observer.on_step(&SwarmStep::done(
        role,
        preview(&run.output, config.preview_chars),
    ));
    run
}

fn record(state: &mut SwarmState, role: AgentRole, contribution: Contribution<String>) {
    if let Err(e) = state.blackboard.record_text(role, contribution) {
        tracing::warn!(role = %role.as_str(), error = %e, "Blackboard rejected write");
    }
}

fn record_profile(state: &mut SwarmState, text: &str) -> WorkerRun {
    let (profile, parsed) = match parse_json_object(text).and_then(|json| profile_from_json(&json)) {
        Some(profile) => (profile, true),
        None => {
            tracing::warn!(lead_id = %state.lead.id, "Psychologist returned unparsable output");
            (
                PsychologyProfile {
                    summary: text.trim().to_string(),
                    ..PsychologyProfile::default()
                },
                false,
            )
        }
    };

    let output = format!(
        "DISC {} ({}), risk tolerance {}. {}",
        profile.disc_type,
        profile.disc_type.label(),
        profile.risk_tolerance,
        profile.summary
    )
    .trim()
    .to_string();

    let effect = parsed.then(|| SwarmEffect::PersistPsychology {
        lead_id: state.lead.id.clone(),
        update: profile.to_update(),
    });

    if let Err(e) = state
        .blackboard
        .record_psychology(Contribution::content(profile))
    {
        tracing::warn!(error = %e, "Blackboard rejected psychology write");
    }

    WorkerRun {
        output,
        effect,
        degraded: false,
    }
}

/// Lenient field-by-field read of a psychologist reply
///
/// `None` unless the object carries a DISC classification; other fields
/// fall back to their defaults.
pub fn profile_from_json(json: &Value) -> Option<PsychologyProfile> {
    let str_field = |camel: &str, snake: &str| {
        json.get(camel)
            .or_else(|| json.get(snake))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };

    let pain_points = json
        .get("painPoints")
        .or_else(|| json.get("pain_points"))
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let disc_type = DiscType::parse_lenient(&str_field("discType", "disc_type")?);

    Some(PsychologyProfile {
        disc_type,
        risk_tolerance: str_field("riskTolerance", "risk_tolerance")
            .map(|s| RiskTolerance::parse_lenient(&s))
            .unwrap_or_default(),
        pain_points,
        summary: str_field("summary", "summary").unwrap_or_default(),
    })
}
