//! Swarm engine: the manager/specialist loop and final synthesis

use super::effects::SwarmEffect;
use super::finalizer::finalize;
use super::locks::LeadLocks;
use super::observer::{StoreSync, SwarmObserver};
use super::state::SwarmState;
use super::supervisor::{decide, Decision};
use super::types::{AgentRole, Route};
use super::worker::run_worker;
use crate::config::RunConfig;
use crate::error::Result;
use crate::lead::{Lead, LeadPriority, LeadStore};
use crate::llm::ProviderRegistry;
use crate::market::{MarketContextProvider, StaticMarketContext};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Result of one swarm run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwarmOutcome {
    pub run_id: Uuid,
    pub lead_id: String,
    /// Markdown consultation script, or the apology text
    pub consultation_script: String,
    /// Effective priority after the run (never lower than the stored one)
    pub lead_priority: LeadPriority,
    /// Priority the storyteller assessed, if it succeeded
    pub assessed_priority: Option<LeadPriority>,
    pub key_insights: Vec<String>,
    /// Specialists executed, in order
    pub visited: Vec<AgentRole>,
    /// Manager decisions taken
    pub iterations: u32,
    pub effects: Vec<SwarmEffect>,
    pub degraded_roles: Vec<AgentRole>,
    pub finalized_ok: bool,
}

/// Runs the advisory swarm for one lead at a time
pub struct SwarmEngine {
    registry: ProviderRegistry,
    config: RunConfig,
    market: Arc<dyn MarketContextProvider>,
}

impl SwarmEngine {
    pub fn new(registry: ProviderRegistry, config: RunConfig) -> Self {
        Self {
            registry,
            config,
            market: Arc::new(StaticMarketContext::empty()),
        }
    }

    pub fn with_market(mut self, market: Arc<dyn MarketContextProvider>) -> Self {
        self.market = market;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Run the swarm for a lead
    ///
    /// Never fails. Effects are pushed to `observer` as they happen and are
    /// also returned in the outcome; applying them is up to the caller.
    pub async fn run(&self, lead: &Lead, observer: &dyn SwarmObserver) -> SwarmOutcome {
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, lead_id = %lead.id, "Swarm run started");

        let mut state = SwarmState::new(lead.clone(), self.market.snapshot());
        let mut effects = Vec::new();

        loop {
            let decision = if state.iteration() >= self.config.max_iterations {
                tracing::info!(
                    %run_id,
                    iteration = state.iteration(),
                    "Iteration cap reached; finishing"
                );
                Decision::finish("Iteration limit reached")
            } else {
                let manager = self.registry.for_role(AgentRole::Manager);
                let decision = decide(&state, manager.as_ref(), &self.config, observer).await;
                state.advance();
                decision
            };

            state.next = decision.next;
            state.assigned_task = decision.task;

            let role = match decision.next {
                Route::Finish => break,
                Route::Role(role) if role.is_specialist() && !state.has_visited(role) => role,
                Route::Role(role) => {
                    tracing::warn!(%run_id, role = %role.as_str(), "Refusing ineligible route; finishing");
                    state.next = Route::Finish;
                    break;
                }
            };

            tracing::debug!(%run_id, role = %role.as_str(), iteration = state.iteration(), "Dispatching specialist");
            let provider = self.registry.for_role(role);
            let task = state.assigned_task.clone();
            let worker = run_worker(
                role,
                &task,
                &mut state,
                provider.as_ref(),
                &self.config,
                observer,
            )
            .await;

            if let Some(effect) = worker.effect {
                observer.on_effect(&effect);
                effects.push(effect);
            }
            state.complete(role, worker.output);
        }

        let storyteller = self.registry.for_role(AgentRole::Storyteller);
        let finalization = finalize(&state, storyteller.as_ref(), &self.config, observer).await;

        let mut lead_priority = lead.priority;
        if let Some(assessed) = finalization.assessed_priority {
            if let Some(effect) = SwarmEffect::priority_upgrade(&lead.id, lead.priority, assessed) {
                lead_priority = assessed;
                observer.on_effect(&effect);
                effects.push(effect);
            }
        }

        let outcome = SwarmOutcome {
            run_id,
            lead_id: lead.id.clone(),
            consultation_script: finalization.consultation_script,
            lead_priority,
            assessed_priority: finalization.assessed_priority,
            key_insights: finalization.key_insights,
            visited: state.visited().to_vec(),
            iterations: state.iteration(),
            effects,
            degraded_roles: state.blackboard.degraded_roles(),
            finalized_ok: finalization.ok,
        };

        tracing::info!(
            %run_id,
            lead_id = %outcome.lead_id,
            iterations = outcome.iterations,
            visited = outcome.visited.len(),
            degraded = outcome.degraded_roles.len(),
            finalized_ok = outcome.finalized_ok,
            "Swarm run finished"
        );
        outcome
    }

    /// Run against a stored lead while holding its lock
    ///
    /// The lead is loaded after the lock is acquired, so a queued run sees
    /// the writes of the run before it. Effects are applied to the store as
    /// they are produced.
    pub async fn run_exclusive<O: SwarmObserver>(
        &self,
        locks: &LeadLocks,
        store: Arc<dyn LeadStore>,
        lead_id: &str,
        observer: O,
    ) -> Result<SwarmOutcome> {
        let guard = locks.acquire(lead_id).await;
        let lead = match store.get(lead_id) {
            Ok(lead) => lead,
            Err(e) => {
                drop(guard);
                locks.prune();
                return Err(e);
            }
        };
        let sync = StoreSync::new(store, observer);
        let outcome = self.run(&lead, &sync).await;
        drop(guard);
        locks.prune();
        Ok(outcome)
    }
}
