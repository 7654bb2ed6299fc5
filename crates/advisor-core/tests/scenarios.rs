//! End-to-end swarm runs against a scripted provider

mod common;

use advisor_core::lead::{ConversationTurn, PsychologyProfile};
use advisor_core::llm::LlmError;
use advisor_core::swarm::FALLBACK_SCRIPT;
use advisor_core::{
    AgentRole, DiscType, InMemoryLeadStore, Lead, LeadLocks, LeadPriority, LeadPurpose,
    LeadStore, RecordingObserver, RunConfig, StepStatus, SwarmEffect, SwarmEvent,
};
use common::{engine, ManagerScript, ScriptedProvider};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::Arc;

fn investor() -> Lead {
    Lead::new("lead-42", "Dana Reyes")
        .with_purpose(LeadPurpose::Investment)
        .with_priority(LeadPriority::Medium)
        .with_conversation(vec![
            ConversationTurn::client("What net yield can I expect on a two-bed in the Marina?"),
            ConversationTurn::agent("Around 6% gross, depending on service charges."),
            ConversationTurn::client("I need the exact numbers before deciding."),
        ])
}

fn investment_order() -> ManagerScript {
    ManagerScript::Prefer(vec![
        AgentRole::MarketInsider,
        AgentRole::ValuationExpert,
        AgentRole::WealthStructurer,
    ])
}

fn assert_no_repeats(visited: &[AgentRole]) {
    let unique: HashSet<_> = visited.iter().collect();
    assert_eq!(unique.len(), visited.len(), "repeated role in {:?}", visited);
}

#[tokio::test]
async fn investment_lead_visits_profile_market_and_wealth() {
    let provider = Arc::new(ScriptedProvider::new(investment_order()));
    let engine = engine(provider.clone(), RunConfig::default());

    let outcome = engine.run(&investor(), &RecordingObserver::new()).await;

    assert_eq!(
        outcome.visited,
        vec![
            AgentRole::Psychologist,
            AgentRole::MarketInsider,
            AgentRole::ValuationExpert,
            AgentRole::WealthStructurer,
        ]
    );
    assert!(outcome.finalized_ok);
    assert!(outcome.consultation_script.contains("**5.8%**"));
    assert!(outcome.iterations <= 6);
    assert_no_repeats(&outcome.visited);
}

#[tokio::test]
async fn psychologist_runs_first_without_prior_profile() {
    let provider = Arc::new(ScriptedProvider::new(ManagerScript::Prefer(vec![
        AgentRole::RiskOfficer,
    ])));
    let engine = engine(provider.clone(), RunConfig::default());

    let outcome = engine.run(&investor(), &RecordingObserver::new()).await;

    assert_eq!(outcome.visited.first(), Some(&AgentRole::Psychologist));
    // The gate decision needs no model call, so the first call is the psychologist.
    assert_eq!(provider.call_roles().first(), Some(&AgentRole::Psychologist));
}

#[tokio::test]
async fn prior_profile_skips_the_gate() {
    let lead = investor().with_psychology(PsychologyProfile {
        disc_type: DiscType::D,
        ..PsychologyProfile::default()
    });
    let provider = Arc::new(ScriptedProvider::new(ManagerScript::Prefer(vec![
        AgentRole::MarketInsider,
    ])));
    let engine = engine(provider.clone(), RunConfig::default());

    let outcome = engine.run(&lead, &RecordingObserver::new()).await;

    assert_eq!(outcome.visited, vec![AgentRole::MarketInsider]);
    assert_eq!(provider.call_roles().first(), Some(&AgentRole::Manager));
    assert!(outcome
        .effects
        .iter()
        .all(|e| !matches!(e, SwarmEffect::PersistPsychology { .. })));

    // The storyteller writes in the seeded profile's tone.
    let synthesis = &provider.calls_for(AgentRole::Storyteller)[0];
    assert!(synthesis
        .prompt
        .contains(advisor_core::swarm::tone_directive(DiscType::D)));
}

fn seeded_driver() -> Lead {
    investor().with_psychology(PsychologyProfile {
        disc_type: DiscType::D,
        pain_points: vec!["exit fees".to_string()],
        ..PsychologyProfile::default()
    })
}

#[tokio::test]
async fn failed_profile_rerun_keeps_the_seeded_profile() {
    let provider = Arc::new(
        ScriptedProvider::new(ManagerScript::Prefer(vec![AgentRole::Psychologist]))
            .with_reply(AgentRole::Psychologist, Err(LlmError::Timeout)),
    );
    let engine = engine(provider.clone(), RunConfig::default());

    let outcome = engine.run(&seeded_driver(), &RecordingObserver::new()).await;

    assert_eq!(outcome.visited, vec![AgentRole::Psychologist]);
    assert_eq!(outcome.degraded_roles, vec![AgentRole::Psychologist]);
    assert!(outcome
        .effects
        .iter()
        .all(|e| !matches!(e, SwarmEffect::PersistPsychology { .. })));

    let synthesis = &provider.calls_for(AgentRole::Storyteller)[0].prompt;
    assert!(synthesis.contains(advisor_core::swarm::tone_directive(DiscType::D)));
    assert!(synthesis.contains("exit fees"));
}

#[tokio::test]
async fn profile_reply_without_disc_type_leaves_the_store_alone() {
    let provider = Arc::new(
        ScriptedProvider::new(ManagerScript::Prefer(vec![AgentRole::Psychologist]))
            .with_reply(AgentRole::Psychologist, Ok(r#"{"error":"quota"}"#)),
    );
    let engine = engine(provider, RunConfig::default());
    let store: Arc<dyn LeadStore> = Arc::new(InMemoryLeadStore::with_leads([seeded_driver()]));

    let outcome = engine
        .run_exclusive(&LeadLocks::new(), store.clone(), "lead-42", RecordingObserver::new())
        .await
        .unwrap();

    assert!(outcome
        .effects
        .iter()
        .all(|e| !matches!(e, SwarmEffect::PersistPsychology { .. })));
    let profile = store.get("lead-42").unwrap().psychology.unwrap();
    assert_eq!(profile.disc_type, DiscType::D);
    assert_eq!(profile.pain_points, vec!["exit fees".to_string()]);
}

#[tokio::test]
async fn never_finishing_manager_stops_at_the_cap() {
    let provider = Arc::new(ScriptedProvider::new(ManagerScript::NeverFinish));
    let config = RunConfig {
        max_iterations: 3,
        ..RunConfig::default()
    };
    let engine = engine(provider.clone(), config);

    let outcome = engine.run(&investor(), &RecordingObserver::new()).await;

    assert_eq!(outcome.iterations, 3);
    assert_eq!(outcome.visited.len(), 3);
    assert_eq!(provider.calls_for(AgentRole::Storyteller).len(), 1);
    assert!(outcome.finalized_ok);
    assert_no_repeats(&outcome.visited);
}

#[tokio::test]
async fn never_finishing_manager_respects_default_cap() {
    let provider = Arc::new(ScriptedProvider::new(ManagerScript::NeverFinish));
    let engine = engine(provider.clone(), RunConfig::default());

    let outcome = engine.run(&investor(), &RecordingObserver::new()).await;

    assert!(outcome.iterations <= 6);
    assert_eq!(outcome.visited.len(), 5);
    assert_no_repeats(&outcome.visited);
    assert_eq!(provider.calls_for(AgentRole::Storyteller).len(), 1);
}

#[tokio::test]
async fn ineligible_route_terminates_instead_of_looping() {
    let provider = Arc::new(ScriptedProvider::new(ManagerScript::Raw(
        r#"{"next":"psychologist","task":"again","reason":"loop"}"#.to_string(),
    )));
    let engine = engine(provider.clone(), RunConfig::default());

    let outcome = engine.run(&investor(), &RecordingObserver::new()).await;

    assert_eq!(outcome.visited, vec![AgentRole::Psychologist]);
    assert_eq!(outcome.iterations, 2);
    assert!(outcome.finalized_ok);
}

#[tokio::test]
async fn unknown_route_terminates() {
    let provider = Arc::new(ScriptedProvider::new(ManagerScript::Raw(
        r#"{"next":"astrologer"}"#.to_string(),
    )));
    let engine = engine(provider, RunConfig::default());

    let outcome = engine.run(&investor(), &RecordingObserver::new()).await;
    assert_eq!(outcome.visited, vec![AgentRole::Psychologist]);
}

#[tokio::test]
async fn failing_manager_still_finalizes() {
    let provider = Arc::new(ScriptedProvider::new(ManagerScript::Fail));
    let engine = engine(provider.clone(), RunConfig::default());

    let outcome = engine.run(&investor(), &RecordingObserver::new()).await;

    assert_eq!(outcome.visited, vec![AgentRole::Psychologist]);
    assert!(outcome.finalized_ok);
    assert!(!outcome.consultation_script.is_empty());
}

#[tokio::test]
async fn failing_worker_degrades_its_slot_and_run_continues() {
    let provider = Arc::new(
        ScriptedProvider::new(ManagerScript::Prefer(vec![
            AgentRole::RiskOfficer,
            AgentRole::WealthStructurer,
        ]))
        .with_reply(
            AgentRole::RiskOfficer,
            Err(LlmError::Connection("connection reset".to_string())),
        ),
    );
    let engine = engine(provider.clone(), RunConfig::default());

    let outcome = engine.run(&investor(), &RecordingObserver::new()).await;

    assert_eq!(outcome.degraded_roles, vec![AgentRole::RiskOfficer]);
    assert_eq!(
        outcome.visited,
        vec![
            AgentRole::Psychologist,
            AgentRole::RiskOfficer,
            AgentRole::WealthStructurer
        ]
    );
    assert!(outcome.finalized_ok);
    assert!(!outcome.consultation_script.is_empty());

    // Earlier findings survive and the failure is shown as unavailable.
    let synthesis = &provider.calls_for(AgentRole::Storyteller)[0].prompt;
    assert!(synthesis.contains("### Psychologist"));
    assert!(synthesis.contains("### Wealth Structurer"));
    assert!(synthesis.contains("UNAVAILABLE"));
}

#[tokio::test]
async fn all_specialists_feed_the_final_script() {
    let provider = Arc::new(ScriptedProvider::new(ManagerScript::Prefer(
        AgentRole::SPECIALISTS.to_vec(),
    )));
    let engine = engine(provider.clone(), RunConfig::default());

    let outcome = engine.run(&investor(), &RecordingObserver::new()).await;

    assert_eq!(outcome.visited.len(), 5);
    assert!(outcome.degraded_roles.is_empty());
    assert!(!outcome.consultation_script.is_empty());
    assert!(LeadPriority::ALL.contains(&outcome.lead_priority));

    let synthesis = &provider.calls_for(AgentRole::Storyteller)[0].prompt;
    for role in AgentRole::SPECIALISTS {
        assert!(
            synthesis.contains(&format!("### {}", role.display_name())),
            "missing {} findings",
            role
        );
    }
}

#[tokio::test]
async fn malformed_profile_falls_back_to_unknown() {
    let provider = Arc::new(
        ScriptedProvider::new(investment_order())
            .with_reply(AgentRole::Psychologist, Ok("Seems like a nice person, hard to say.")),
    );
    let engine = engine(provider.clone(), RunConfig::default());

    let outcome = engine.run(&investor(), &RecordingObserver::new()).await;

    assert!(outcome.visited.len() > 1);
    assert!(outcome
        .effects
        .iter()
        .all(|e| !matches!(e, SwarmEffect::PersistPsychology { .. })));
    let synthesis = &provider.calls_for(AgentRole::Storyteller)[0].prompt;
    assert!(synthesis.contains(advisor_core::swarm::tone_directive(DiscType::Unknown)));
}

#[tokio::test]
async fn psychology_effect_is_pushed_before_the_next_decision() {
    let provider = Arc::new(ScriptedProvider::new(investment_order()));
    let engine = engine(provider, RunConfig::default());
    let observer = RecordingObserver::new();

    let outcome = engine.run(&investor(), &observer).await;

    let events = observer.events();
    let effect_at = events
        .iter()
        .position(|e| matches!(e, SwarmEvent::Effect(SwarmEffect::PersistPsychology { .. })))
        .unwrap();
    match &events[effect_at - 1] {
        SwarmEvent::Step(step) => {
            assert_eq!(step.agent_type, AgentRole::Psychologist);
            assert_eq!(step.status, StepStatus::Done);
        }
        other => panic!("unexpected event before effect: {:?}", other),
    }
    match &events[effect_at + 1] {
        SwarmEvent::Step(step) => assert_eq!(step.agent_type, AgentRole::Manager),
        other => panic!("unexpected event after effect: {:?}", other),
    }

    match &outcome.effects[0] {
        SwarmEffect::PersistPsychology { lead_id, update } => {
            assert_eq!(lead_id, "lead-42");
            assert_eq!(update.disc_type, DiscType::C);
        }
        other => panic!("unexpected first effect: {:?}", other),
    }
}

#[tokio::test]
async fn steps_pair_thinking_with_done() {
    let provider = Arc::new(ScriptedProvider::new(investment_order()));
    let engine = engine(provider, RunConfig::default());
    let observer = RecordingObserver::new();

    engine.run(&investor(), &observer).await;

    let steps = observer.steps();
    assert_eq!(steps.len() % 2, 0);
    for pair in steps.chunks(2) {
        assert_eq!(pair[0].status, StepStatus::Thinking);
        assert_eq!(pair[1].status, StepStatus::Done);
        assert_eq!(pair[0].agent_name, pair[1].agent_name);
    }
    assert_eq!(steps.last().map(|s| s.agent_type), Some(AgentRole::Storyteller));
}

#[tokio::test]
async fn priority_upgrade_only_when_higher() {
    let provider = Arc::new(
        ScriptedProvider::new(ManagerScript::Prefer(vec![])).with_reply(
            AgentRole::Storyteller,
            Ok(r#"{"consultation_script":"Hi","lead_priority":"low","key_insights":[]}"#),
        ),
    );
    let engine = engine(provider, RunConfig::default());
    let lead = investor().with_priority(LeadPriority::High);

    let outcome = engine.run(&lead, &RecordingObserver::new()).await;

    assert_eq!(outcome.assessed_priority, Some(LeadPriority::Low));
    assert_eq!(outcome.lead_priority, LeadPriority::High);
    assert!(outcome
        .effects
        .iter()
        .all(|e| !matches!(e, SwarmEffect::PersistPriority { .. })));
}

#[tokio::test]
async fn urgent_assessment_upgrades_priority() {
    let provider = Arc::new(ScriptedProvider::new(ManagerScript::Prefer(vec![])));
    let engine = engine(provider, RunConfig::default());

    let outcome = engine.run(&investor(), &RecordingObserver::new()).await;

    assert_eq!(outcome.lead_priority, LeadPriority::Urgent);
    assert!(outcome.effects.contains(&SwarmEffect::PersistPriority {
        lead_id: "lead-42".to_string(),
        from: LeadPriority::Medium,
        to: LeadPriority::Urgent,
    }));
}

#[tokio::test]
async fn failed_synthesis_returns_apology_and_keeps_priority() {
    let provider = Arc::new(
        ScriptedProvider::new(investment_order())
            .with_reply(AgentRole::Storyteller, Err(LlmError::Timeout)),
    );
    let engine = engine(provider, RunConfig::default());

    let outcome = engine.run(&investor(), &RecordingObserver::new()).await;

    assert!(!outcome.finalized_ok);
    assert_eq!(outcome.consultation_script, FALLBACK_SCRIPT);
    assert_eq!(outcome.lead_priority, LeadPriority::Medium);
    assert_eq!(outcome.effects.len(), 1);
}

#[tokio::test]
async fn exclusive_run_applies_effects_to_the_store() {
    let provider = Arc::new(ScriptedProvider::new(investment_order()));
    let engine = Arc::new(engine(provider, RunConfig::default()));
    let store: Arc<dyn LeadStore> = Arc::new(InMemoryLeadStore::with_leads([investor()]));
    let locks = Arc::new(LeadLocks::new());

    let outcome = engine
        .run_exclusive(&locks, store.clone(), "lead-42", RecordingObserver::new())
        .await
        .unwrap();

    let stored = store.get("lead-42").unwrap();
    assert_eq!(stored.priority, LeadPriority::Urgent);
    assert_eq!(
        stored.psychology.map(|p| p.disc_type),
        Some(DiscType::C)
    );
    assert_eq!(outcome.lead_priority, LeadPriority::Urgent);
    assert!(locks.is_empty());
}

#[tokio::test]
async fn exclusive_run_for_missing_lead_fails() {
    let provider = Arc::new(ScriptedProvider::new(investment_order()));
    let engine = engine(provider, RunConfig::default());
    let store: Arc<dyn LeadStore> = Arc::new(InMemoryLeadStore::new());
    let locks = LeadLocks::new();

    let result = engine
        .run_exclusive(&locks, store, "nobody", RecordingObserver::new())
        .await;
    assert!(result.is_err());
    assert!(locks.is_empty());
}

#[tokio::test]
async fn concurrent_runs_on_one_lead_are_serialized() {
    let provider = Arc::new(ScriptedProvider::new(investment_order()));
    let engine = Arc::new(engine(provider, RunConfig::default()));
    let store: Arc<dyn LeadStore> = Arc::new(InMemoryLeadStore::with_leads([investor()]));
    let locks = Arc::new(LeadLocks::new());

    let mut handles = Vec::new();
    for _ in 0..2 {
        let (engine, store, locks) = (engine.clone(), store.clone(), locks.clone());
        handles.push(tokio::spawn(async move {
            engine
                .run_exclusive(&locks, store, "lead-42", RecordingObserver::new())
                .await
        }));
    }

    let mut upgrades = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        upgrades += outcome
            .effects
            .iter()
            .filter(|e| matches!(e, SwarmEffect::PersistPriority { .. }))
            .count();
    }
    // The second run loads the already-upgraded lead, so only one upgrade happens.
    assert_eq!(upgrades, 1);
}
