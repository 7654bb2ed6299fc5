//! Server state management

use advisor_core::{InMemoryLeadStore, LeadLocks, LeadStore, SwarmEngine};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SwarmEngine>,
    pub store: Arc<InMemoryLeadStore>,
    pub locks: Arc<LeadLocks>,
}

impl AppState {
    pub fn new(engine: SwarmEngine, store: InMemoryLeadStore) -> Self {
        Self {
            engine: Arc::new(engine),
            store: Arc::new(store),
            locks: Arc::new(LeadLocks::new()),
        }
    }

    /// The store as the trait object the engine writes through
    pub fn lead_store(&self) -> Arc<dyn LeadStore> {
        self.store.clone()
    }
}
