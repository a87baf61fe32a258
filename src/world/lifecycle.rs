//! Hooks fired by container moves
//!
//! Moving a thing in or out of play has knock-on effects: an abandoned item
//! starts its cleanup clock, an ambient action starts or stops, a respawning
//! item leaves a copy behind. The container operations call these hooks and
//! know nothing else about them. Every hook is a no-op for a thing lacking the
//! matching capability.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::attr::{Action, Cleanup, Reset};
use crate::events::EventQueue;

use super::thing::Thing;

/// Lifecycle hooks invoked by Add, Remove and Move
pub trait Lifecycle: Send + Sync {
    /// The thing was left lying around
    fn cleanup_schedule(&self, thing: &Thing);

    /// The thing was picked up or otherwise taken out of play
    fn cleanup_cancel(&self, thing: &Thing);

    /// The thing entered play
    fn action_begin(&self, thing: &Thing);

    /// The thing left play
    fn action_cancel(&self, thing: &Thing);

    /// Called when the thing is removed from a container. Returns the thing
    /// that should continue in its place, if removal spawns a replacement.
    fn respawn(&self, thing: &Thing) -> Option<Thing>;

    /// The thing is being discarded for good
    fn free(&self, thing: &Thing) {
        self.cleanup_cancel(thing);
        self.action_cancel(thing);
    }
}

/// Lifecycle driven by the Cleanup, Action and Reset attributes
pub struct AttrLifecycle {
    events: Arc<dyn EventQueue>,
}

impl AttrLifecycle {
    pub fn new(events: Arc<dyn EventQueue>) -> Self {
        Self { events }
    }
}

impl Lifecycle for AttrLifecycle {
    fn cleanup_schedule(&self, thing: &Thing) {
        if let Some(cleanup) = thing.find::<Cleanup>() {
            cleanup.schedule(thing, self.events.as_ref());
        }
    }

    fn cleanup_cancel(&self, thing: &Thing) {
        if let Some(cleanup) = thing.find::<Cleanup>() {
            cleanup.cancel();
        }
    }

    fn action_begin(&self, thing: &Thing) {
        if let Some(action) = thing.find::<Action>() {
            action.begin(thing, self.events.as_ref());
        }
    }

    fn action_cancel(&self, thing: &Thing) {
        if let Some(action) = thing.find::<Action>() {
            action.cancel();
        }
    }

    fn respawn(&self, thing: &Thing) -> Option<Thing> {
        let reset = thing.find::<Reset>().filter(|r| r.spawns())?;
        reset.schedule(thing, self.events.as_ref());

        let copy = thing.copy();
        tracing::debug!(original = %thing.id(), copy = %copy.id(), "respawning");
        Some(copy)
    }
}

/// A lifecycle hook, as recorded by [`RecordingLifecycle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    CleanupSchedule,
    CleanupCancel,
    ActionBegin,
    ActionCancel,
    Respawn,
}

/// Lifecycle that records every hook call instead of acting on it.
/// Respawn hands back a copy only when created with
/// [`RecordingLifecycle::respawning`].
#[derive(Default)]
pub struct RecordingLifecycle {
    calls: Mutex<Vec<(Hook, Thing)>>,
    respawns: bool,
}

impl RecordingLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record calls and answer every respawn with a copy
    pub fn respawning() -> Self {
        Self {
            respawns: true,
            ..Self::default()
        }
    }

    /// Remove and return the calls made so far, oldest first
    pub fn take(&self) -> Vec<(Hook, Thing)> {
        std::mem::take(&mut *self.calls.lock())
    }

    /// Hooks fired so far for `thing`, oldest first
    pub fn hooks_for(&self, thing: &Thing) -> Vec<Hook> {
        self.calls
            .lock()
            .iter()
            .filter(|(_, t)| t == thing)
            .map(|(hook, _)| *hook)
            .collect()
    }

    fn record(&self, hook: Hook, thing: &Thing) {
        self.calls.lock().push((hook, thing.clone()));
    }
}

impl Lifecycle for RecordingLifecycle {
    fn cleanup_schedule(&self, thing: &Thing) {
        self.record(Hook::CleanupSchedule, thing);
    }

    fn cleanup_cancel(&self, thing: &Thing) {
        self.record(Hook::CleanupCancel, thing);
    }

    fn action_begin(&self, thing: &Thing) {
        self.record(Hook::ActionBegin, thing);
    }

    fn action_cancel(&self, thing: &Thing) {
        self.record(Hook::ActionCancel, thing);
    }

    fn respawn(&self, thing: &Thing) -> Option<Thing> {
        self.record(Hook::Respawn, thing);
        self.respawns.then(|| thing.copy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{Name, RESET_COMMAND};
    use crate::events::RecordingEvents;
    use std::time::Duration;

    #[test]
    fn test_hooks_skip_missing_capabilities() {
        let events = Arc::new(RecordingEvents::new());
        let lifecycle = AttrLifecycle::new(events.clone());
        let rock = Thing::builder().with(Name::new("a rock")).build();

        lifecycle.cleanup_schedule(&rock);
        lifecycle.action_begin(&rock);

        assert!(lifecycle.respawn(&rock).is_none());
        assert!(events.is_empty());
    }

    #[test]
    fn test_respawn_schedules_reset_for_original() {
        let events = Arc::new(RecordingEvents::new());
        let lifecycle = AttrLifecycle::new(events.clone());
        let bread = Thing::builder()
            .with(Name::new("some bread"))
            .with(Reset::new(Duration::from_secs(60), true))
            .build();

        let copy = lifecycle.respawn(&bread).unwrap();

        assert_ne!(copy, bread);
        assert_eq!(copy.name(""), "some bread");
        assert_eq!(events.pending_for(&bread), vec![RESET_COMMAND.to_string()]);
        assert!(lifecycle.respawn(&copy).is_none());
    }

    #[test]
    fn test_cleanup_keeps_single_pending_event() {
        let events = Arc::new(RecordingEvents::new());
        let lifecycle = AttrLifecycle::new(events.clone());
        let mug = Thing::builder()
            .with(Cleanup::new(Duration::from_secs(60)))
            .build();

        lifecycle.cleanup_schedule(&mug);
        lifecycle.cleanup_schedule(&mug);
        assert_eq!(events.len(), 1);

        lifecycle.free(&mug);
        assert!(events.is_empty());
    }
}
