//! Advisor Core - multi-agent advisory swarm for sales leads
//!
//! This crate provides the UI-agnostic backend:
//! - Swarm engine (manager, specialists, storyteller)
//! - LLM providers (Gemini, OpenAI-compatible, Ollama)
//! - Lead model, store and effect application
//! - Configuration loading
//!
//! Any surface (CLI, HTTP server) drives a run through [`SwarmEngine`].
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐     Lead      ┌──────────────────┐
//! │   CLI / Server    │ ─────────────→│   SwarmEngine    │
//! │                   │               │                  │
//! │                   │ ←─────────────│                  │
//! └───────────────────┘ Steps/Effects └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use advisor_core::{load_config, ProviderRegistry, SwarmEngine, FnObserver};
//!
//! let config = load_config(&cwd)?;
//! let engine = SwarmEngine::new(ProviderRegistry::from_config(&config)?, config.run.clone());
//!
//! let outcome = engine
//!     .run(&lead, &FnObserver(|step: &SwarmStep| println!("{}: {:?}", step.agent_name, step.status)))
//!     .await;
//! println!("{}", outcome.consultation_script);
//! ```

pub mod config;
pub mod error;
pub mod lead;
pub mod llm;
pub mod market;
pub mod swarm;

pub use error::{AdvisorError, Result};

// Re-export config types
pub use config::{load_config, load_from_file, sample_config, AdvisorConfig, RunConfig};

// Re-export lead types
pub use lead::{
    apply_effect, apply_effect_to_lead, DiscType, InMemoryLeadStore, Lead, LeadPriority,
    LeadPurpose, LeadStore, PsychologyProfile, RiskTolerance,
};

// Re-export LLM types
pub use llm::{LlmError, LlmProvider, ProviderRegistry, SharedProvider};

// Re-export market types
pub use market::{FileMarketContext, MarketContextProvider, StaticMarketContext};

// Re-export swarm types
pub use swarm::{
    AgentRole, ChannelObserver, FnObserver, LeadLocks, NullObserver, RecordingObserver,
    StepStatus, StoreSync, SwarmEffect, SwarmEngine, SwarmEvent, SwarmObserver, SwarmOutcome,
    SwarmStep,
};

/// Get the crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
