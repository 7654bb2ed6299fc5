//! Lead persistence contract and an in-memory implementation

use super::{Lead, LeadPriority, PsychologyProfile, PsychologyUpdate};
use crate::error::{AdvisorError, Result};
use crate::swarm::SwarmEffect;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Storage for leads
///
/// The swarm never touches a store directly; it publishes effects and the
/// caller decides when to apply them (see [`apply_effect`]).
pub trait LeadStore: Send + Sync {
    /// Fetch a lead by ID
    fn get(&self, lead_id: &str) -> Result<Lead>;

    /// Insert or replace a lead
    fn upsert(&self, lead: Lead) -> Result<()>;

    /// Write the psychologist's classification onto a lead
    fn persist_psychology(&self, lead_id: &str, update: &PsychologyUpdate) -> Result<()>;

    /// Set a lead's priority tier
    fn update_priority(&self, lead_id: &str, priority: LeadPriority) -> Result<()>;
}

/// Apply one swarm effect to a store
pub fn apply_effect(store: &dyn LeadStore, effect: &SwarmEffect) -> Result<()> {
    match effect {
        SwarmEffect::PersistPsychology { lead_id, update } => {
            store.persist_psychology(lead_id, update)
        }
        SwarmEffect::PersistPriority { lead_id, to, .. } => store.update_priority(lead_id, *to),
    }
}

/// Apply an effect to a lead value in place
///
/// Used where the lead lives outside any store (e.g. a JSON file on disk).
pub fn apply_effect_to_lead(lead: &mut Lead, effect: &SwarmEffect) {
    match effect {
        SwarmEffect::PersistPsychology { lead_id, update } if *lead_id == lead.id => {
            merge_psychology(lead, update);
        }
        SwarmEffect::PersistPriority { lead_id, to, .. } if *lead_id == lead.id => {
            lead.priority = *to;
        }
        _ => {}
    }
}

fn merge_psychology(lead: &mut Lead, update: &PsychologyUpdate) {
    let profile = lead
        .psychology
        .get_or_insert_with(PsychologyProfile::default);
    profile.disc_type = update.disc_type;
    profile.risk_tolerance = update.risk_tolerance;
    profile.pain_points = update.pain_points.clone();
}

/// Thread-safe in-memory lead store
#[derive(Default)]
pub struct InMemoryLeadStore {
    leads: RwLock<HashMap<String, Lead>>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with leads
    pub fn with_leads(leads: impl IntoIterator<Item = Lead>) -> Self {
        let store = Self::new();
        {
            let mut map = store.leads.write();
            for lead in leads {
                map.insert(lead.id.clone(), lead);
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.leads.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.read().is_empty()
    }

    /// All lead IDs, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.leads.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl LeadStore for InMemoryLeadStore {
    fn get(&self, lead_id: &str) -> Result<Lead> {
        self.leads
            .read()
            .get(lead_id)
            .cloned()
            .ok_or_else(|| AdvisorError::lead_not_found(lead_id))
    }

    fn upsert(&self, lead: Lead) -> Result<()> {
        self.leads.write().insert(lead.id.clone(), lead);
        Ok(())
    }

    fn persist_psychology(&self, lead_id: &str, update: &PsychologyUpdate) -> Result<()> {
        let mut leads = self.leads.write();
        let lead = leads
            .get_mut(lead_id)
            .ok_or_else(|| AdvisorError::lead_not_found(lead_id))?;
        merge_psychology(lead, update);
        Ok(())
    }

    fn update_priority(&self, lead_id: &str, priority: LeadPriority) -> Result<()> {
        let mut leads = self.leads.write();
        let lead = leads
            .get_mut(lead_id)
            .ok_or_else(|| AdvisorError::lead_not_found(lead_id))?;
        lead.priority = priority;
        Ok(())
    }
}
