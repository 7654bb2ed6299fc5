//! Storyteller: turns the blackboard into the client-facing script

use super::observer::SwarmObserver;
use super::roles::{context_section, findings_section, tone_directive};
use super::state::SwarmState;
use super::types::{preview, AgentRole, SwarmStep};
use crate::config::RunConfig;
use crate::lead::LeadPriority;
use crate::llm::{
    parse_json_object, GenerationOptions, GenerationRequest, LlmProvider, OutputSchema,
    ReasoningEffort,
};
use serde_json::json;

/// Returned in place of a script when synthesis fails
pub const FALLBACK_SCRIPT: &str = "I apologize, but I was unable to prepare the consultation script for this lead right now. Please review the specialist notes and try again.";

const STORYTELLER_SYSTEM_PROMPT: &str = r#"
You are the Storyteller of a real-estate advisory team.
Synthesize every specialist finding into one coherent consultation script the sales
agent can use in their next conversation with the lead. Write in markdown, speak to
the lead's goals and pain points, and put key figures (prices, yields, rates, dates)
in **bold**. Never invent findings for a specialist marked unavailable.
Finally, re-evaluate the lead's priority as one of: low, medium, high, urgent.
"#;

/// Result of the final synthesis
#[derive(Debug, Clone, PartialEq)]
pub struct Finalization {
    pub consultation_script: String,
    /// Priority the model assessed, if synthesis succeeded
    pub assessed_priority: Option<LeadPriority>,
    pub key_insights: Vec<String>,
    pub ok: bool,
}

impl Finalization {
    fn fallback() -> Self {
        Self {
            consultation_script: FALLBACK_SCRIPT.to_string(),
            assessed_priority: None,
            key_insights: Vec::new(),
            ok: false,
        }
    }
}

fn synthesis_schema() -> OutputSchema {
    OutputSchema::new(
        "consultation",
        json!({
            "type": "object",
            "properties": {
                "consultation_script": { "type": "string" },
                "lead_priority": { "type": "string", "enum": ["low", "medium", "high", "urgent"] },
                "key_insights": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["consultation_script", "lead_priority", "key_insights"]
        }),
    )
}

fn build_synthesis_prompt(state: &SwarmState) -> String {
    format!(
        "{}\n\n{}\n\n## Specialist findings\n{}\n\nRespond with JSON: {{\"consultation_script\": <markdown>, \"lead_priority\": <low|medium|high|urgent>, \"key_insights\": [<string>]}}",
        tone_directive(state.blackboard.tone()),
        context_section(state),
        findings_section(state)
    )
}

/// Write the consultation script
///
/// Never fails: any error or empty script yields [`FALLBACK_SCRIPT`].
pub async fn finalize(
    state: &SwarmState,
    provider: &dyn LlmProvider,
    config: &RunConfig,
    observer: &dyn SwarmObserver,
) -> Finalization {
    observer.on_step(&SwarmStep::thinking(AgentRole::Storyteller));

    let request = GenerationRequest::new(build_synthesis_prompt(state))
        .with_system(STORYTELLER_SYSTEM_PROMPT.trim())
        .with_options(GenerationOptions {
            grounded: false,
            schema: Some(synthesis_schema()),
            temperature: config.worker_temperature,
            max_output_tokens: config.finalizer_max_output_tokens,
            effort: ReasoningEffort::High,
        });

    let finalization = match provider.generate(request).await {
        Ok(generation) => parse_finalization(&generation.text).unwrap_or_else(|| {
            tracing::warn!(lead_id = %state.lead.id, "Storyteller output unusable; using fallback");
            Finalization::fallback()
        }),
        Err(e) => {
            tracing::warn!(lead_id = %state.lead.id, error = %e, "Storyteller failed; using fallback");
            Finalization::fallback()
        }
    };

    observer.on_step(&SwarmStep::done(
        AgentRole::Storyteller,
        preview(&finalization.consultation_script, config.preview_chars),
    ));
    finalization
}

/// Parse a synthesis reply; `None` when there is no usable script
pub fn parse_finalization(content: &str) -> Option<Finalization> {
    let json = parse_json_object(content)?;

    let script = json
        .get("consultation_script")
        .or_else(|| json.get("consultationScript"))
        .and_then(|v| v.as_str())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())?
        .to_string();

    let assessed_priority = json
        .get("lead_priority")
        .or_else(|| json.get("leadPriority"))
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<LeadPriority>().ok());

    let key_insights = json
        .get("key_insights")
        .or_else(|| json.get("keyInsights"))
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();

    Some(Finalization {
        consultation_script: script,
        assessed_priority,
        key_insights,
        ok: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::{DiscType, Lead, PsychologyProfile};
    use crate::llm::{Generation, LlmError, ProviderCapabilities};
    use crate::swarm::observer::RecordingObserver;
    use crate::swarm::state::Contribution;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    struct Capture {
        reply: Result<String, LlmError>,
        last: Mutex<Option<GenerationRequest>>,
    }

    #[async_trait]
    impl LlmProvider for Capture {
        fn id(&self) -> &str {
            "capture"
        }
        fn name(&self) -> &str {
            "Capture"
        }
        fn model(&self) -> String {
            "test".to_string()
        }
        fn capabilities(&self) -> ProviderCapabilities {
            ProviderCapabilities::default()
        }
        async fn generate(&self, request: GenerationRequest) -> Result<Generation, LlmError> {
            *self.last.lock() = Some(request);
            self.reply.clone().map(Generation::new)
        }
    }

    fn capture(reply: Result<&str, LlmError>) -> Capture {
        Capture {
            reply: reply.map(|s| s.to_string()),
            last: Mutex::new(None),
        }
    }

    #[tokio::test]
    async fn test_finalize_parses_script() {
        let provider = capture(Ok(
            r#"{"consultation_script":"Hello **Dana**","lead_priority":"urgent","key_insights":["cash buyer"]}"#,
        ));
        let lead = Lead::new("l", "Dana").with_psychology(PsychologyProfile {
            disc_type: DiscType::D,
            ..PsychologyProfile::default()
        });
        let state = SwarmState::new(lead, "");
        let result = finalize(&state, &provider, &RunConfig::default(), &RecordingObserver::new()).await;

        assert!(result.ok);
        assert_eq!(result.consultation_script, "Hello **Dana**");
        assert_eq!(result.assessed_priority, Some(LeadPriority::Urgent));
        assert_eq!(result.key_insights, vec!["cash buyer".to_string()]);

        let request = provider.last.lock().clone().unwrap();
        assert_eq!(request.options.effort, ReasoningEffort::High);
        assert_eq!(request.options.max_output_tokens, 8192);
        assert!(request.prompt.contains(tone_directive(DiscType::D)));
    }

    #[tokio::test]
    async fn test_finalize_error_returns_apology() {
        let provider = capture(Err(LlmError::Timeout));
        let state = SwarmState::new(Lead::new("l", "Dana"), "");
        let observer = RecordingObserver::new();
        let result = finalize(&state, &provider, &RunConfig::default(), &observer).await;

        assert!(!result.ok);
        assert_eq!(result.consultation_script, FALLBACK_SCRIPT);
        assert_eq!(result.assessed_priority, None);
        assert_eq!(observer.steps().len(), 2);
    }

    #[tokio::test]
    async fn test_degraded_slots_are_flagged_in_prompt() {
        let provider = capture(Ok(r#"{"consultation_script":"ok","lead_priority":"low"}"#));
        let mut state = SwarmState::new(Lead::new("l", "Dana"), "");
        state
            .blackboard
            .record_text(AgentRole::RiskOfficer, Contribution::degraded("quota"))
            .unwrap();
        finalize(&state, &provider, &RunConfig::default(), &RecordingObserver::new()).await;

        let prompt = provider.last.lock().clone().unwrap().prompt;
        assert!(prompt.contains("### Risk Officer"));
        assert!(prompt.contains("UNAVAILABLE"));
    }

    #[test]
    fn test_empty_script_is_unusable() {
        assert!(parse_finalization(r#"{"consultation_script":"  ","lead_priority":"high"}"#).is_none());
        assert!(parse_finalization("not json").is_none());
    }

    #[test]
    fn test_unknown_priority_is_dropped() {
        let parsed =
            parse_finalization(r#"{"consultationScript":"Hi","leadPriority":"critical"}"#).unwrap();
        assert_eq!(parsed.assessed_priority, None);
        assert!(parsed.key_insights.is_empty());
    }
}
