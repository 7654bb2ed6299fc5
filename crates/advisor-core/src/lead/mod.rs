//! Lead model and persistence

mod store;
mod types;

pub use store::{apply_effect, apply_effect_to_lead, InMemoryLeadStore, LeadStore};
pub use types::{
    ConversationTurn, DiscType, Lead, LeadPriority, LeadPurpose, PsychologyProfile,
    PsychologyUpdate, RiskTolerance,
};
