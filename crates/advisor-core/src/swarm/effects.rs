//! Writes the swarm asks its caller to make to the lead store

use crate::lead::{LeadPriority, PsychologyUpdate};
use serde::{Deserialize, Serialize};

/// A lead-store write published during a run
///
/// Effects are pushed to the observer the moment they happen and are also
/// collected in the run outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SwarmEffect {
    /// Psychologist classification, published right after it completes
    #[serde(rename_all = "camelCase")]
    PersistPsychology {
        lead_id: String,
        update: PsychologyUpdate,
    },

    /// Priority upgrade decided by the finalizer
    #[serde(rename_all = "camelCase")]
    PersistPriority {
        lead_id: String,
        from: LeadPriority,
        to: LeadPriority,
    },
}

impl SwarmEffect {
    pub fn lead_id(&self) -> &str {
        match self {
            SwarmEffect::PersistPsychology { lead_id, .. } => lead_id,
            SwarmEffect::PersistPriority { lead_id, .. } => lead_id,
        }
    }

    /// Upgrade effect, only when `assessed` strictly outranks `stored`
    pub fn priority_upgrade(
        lead_id: &str,
        stored: LeadPriority,
        assessed: LeadPriority,
    ) -> Option<Self> {
        assessed.outranks(stored).then(|| SwarmEffect::PersistPriority {
            lead_id: lead_id.to_string(),
            from: stored,
            to: assessed,
        })
    }
}
