//! Advisory swarm
//!
//! A manager routes a lead through up to five specialists over a shared
//! blackboard, then a storyteller writes the consultation script.
//!
//! ```text
//! Manager ──> Specialist ──> Manager ──> ... ──> FINISH ──> Storyteller
//! ```

pub mod effects;
pub mod engine;
pub mod finalizer;
pub mod locks;
pub mod observer;
pub mod roles;
pub mod state;
pub mod supervisor;
pub mod types;
pub mod worker;

pub use effects::SwarmEffect;
pub use engine::{SwarmEngine, SwarmOutcome};
pub use finalizer::{Finalization, FALLBACK_SCRIPT};
pub use locks::{LeadGuard, LeadLocks};
pub use observer::{
    ChannelObserver, FnObserver, NullObserver, RecordingObserver, StoreSync, SwarmEvent,
    SwarmObserver,
};
pub use roles::{tone_directive, worker_spec, WorkerSpec};
pub use state::{Blackboard, Contribution, SwarmState};
pub use supervisor::Decision;
pub use types::{preview, AgentRole, Route, StepStatus, SwarmStep};
pub use worker::WorkerRun;
