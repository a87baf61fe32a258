use std::time::Duration;

use super::Pending;
use crate::events::EventQueue;
use crate::world::{Attribute, Thing};

/// Internal command delivered when a thing should be put back into play
pub const RESET_COMMAND: &str = "$RESET";

/// Puts a thing back into play at its origin after a delay.
///
/// With `spawn` set, taking the thing leaves the original behind (disabled)
/// and a copy travels instead, so the original reappears once the reset
/// fires. Without it the thing itself is returned to its origin when it is
/// cleaned up.
#[derive(Debug)]
pub struct Reset {
    after: Duration,
    spawn: bool,
    pending: Pending,
}

impl Reset {
    pub fn new(after: Duration, spawn: bool) -> Self {
        Self {
            after,
            spawn,
            pending: Pending::default(),
        }
    }

    /// True if removing the thing produces a copy
    pub fn spawns(&self) -> bool {
        self.spawn
    }

    /// Schedule the reset, replacing a pending one
    pub fn schedule(&self, thing: &Thing, events: &dyn EventQueue) {
        self.pending
            .replace(events.schedule(thing, RESET_COMMAND, self.after));
    }

    pub fn cancel(&self) -> bool {
        self.pending.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_set()
    }

    pub(crate) fn fired(&self) {
        self.pending.clear();
    }
}

impl Attribute for Reset {
    // Copies are the ones that travel and are never reset themselves
    fn copy(&self) -> Option<Box<dyn Attribute>> {
        None
    }

    fn dump(&self) -> String {
        format!(
            "Reset: after {:?} spawn: {} (pending: {})",
            self.after,
            self.spawn,
            self.is_pending()
        )
    }
}
