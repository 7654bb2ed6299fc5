//! Progress observers
//!
//! Steps and effects are pushed synchronously in execution order. Observers
//! must not block; there is no acknowledgement or backpressure.

use super::effects::SwarmEffect;
use super::types::SwarmStep;
use crate::lead::{apply_effect, LeadStore};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Receives swarm progress
pub trait SwarmObserver: Send + Sync {
    /// Called for every `thinking`/`done` step
    fn on_step(&self, step: &SwarmStep);

    /// Called the moment a lead-store effect is produced
    fn on_effect(&self, _effect: &SwarmEffect) {}
}

impl<T: SwarmObserver + ?Sized> SwarmObserver for Arc<T> {
    fn on_step(&self, step: &SwarmStep) {
        (**self).on_step(step)
    }

    fn on_effect(&self, effect: &SwarmEffect) {
        (**self).on_effect(effect)
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SwarmObserver for NullObserver {
    fn on_step(&self, _step: &SwarmStep) {}
}

/// Adapts a closure over steps into an observer
pub struct FnObserver<F>(pub F);

impl<F> SwarmObserver for FnObserver<F>
where
    F: Fn(&SwarmStep) + Send + Sync,
{
    fn on_step(&self, step: &SwarmStep) {
        (self.0)(step)
    }
}

/// Anything an observer can be told about
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum SwarmEvent {
    Step(SwarmStep),
    Effect(SwarmEffect),
}

/// Forwards events to a channel
pub struct ChannelObserver {
    tx: Sender<SwarmEvent>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<SwarmEvent>) -> Self {
        Self { tx }
    }

    /// Create an observer with its receiving end
    pub fn channel() -> (Self, Receiver<SwarmEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self::new(tx), rx)
    }
}

impl SwarmObserver for ChannelObserver {
    fn on_step(&self, step: &SwarmStep) {
        // A dropped receiver only means nobody is watching anymore.
        let _ = self.tx.send(SwarmEvent::Step(step.clone()));
    }

    fn on_effect(&self, effect: &SwarmEffect) {
        let _ = self.tx.send(SwarmEvent::Effect(effect.clone()));
    }
}

/// Keeps every event in memory
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SwarmEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SwarmEvent> {
        self.events.lock().clone()
    }

    pub fn steps(&self) -> Vec<SwarmStep> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                SwarmEvent::Step(step) => Some(step.clone()),
                SwarmEvent::Effect(_) => None,
            })
            .collect()
    }

    pub fn effects(&self) -> Vec<SwarmEffect> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                SwarmEvent::Effect(effect) => Some(effect.clone()),
                SwarmEvent::Step(_) => None,
            })
            .collect()
    }
}

impl SwarmObserver for RecordingObserver {
    fn on_step(&self, step: &SwarmStep) {
        self.events.lock().push(SwarmEvent::Step(step.clone()));
    }

    fn on_effect(&self, effect: &SwarmEffect) {
        self.events.lock().push(SwarmEvent::Effect(effect.clone()));
    }
}

/// Applies effects to a lead store as they happen, then forwards to `inner`
pub struct StoreSync<O> {
    store: Arc<dyn LeadStore>,
    inner: O,
}

impl<O: SwarmObserver> StoreSync<O> {
    pub fn new(store: Arc<dyn LeadStore>, inner: O) -> Self {
        Self { store, inner }
    }
}

impl<O: SwarmObserver> SwarmObserver for StoreSync<O> {
    fn on_step(&self, step: &SwarmStep) {
        self.inner.on_step(step);
    }

    fn on_effect(&self, effect: &SwarmEffect) {
        if let Err(e) = apply_effect(self.store.as_ref(), effect) {
            tracing::warn!(lead_id = %effect.lead_id(), error = %e, "Failed to apply swarm effect");
        }
        self.inner.on_effect(effect);
    }
}
