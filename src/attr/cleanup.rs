use std::time::Duration;

use super::Pending;
use crate::events::EventQueue;
use crate::world::{Attribute, Thing};

/// Internal command delivered when an abandoned thing is due to be cleaned up
pub const CLEANUP_COMMAND: &str = "$CLEANUP";

/// Removes a thing from play once it has been left lying around for a while
#[derive(Debug)]
pub struct Cleanup {
    after: Duration,
    pending: Pending,
}

impl Cleanup {
    pub fn new(after: Duration) -> Self {
        Self {
            after,
            pending: Pending::default(),
        }
    }

    /// Delay before an abandoned thing is cleaned up
    pub fn after(&self) -> Duration {
        self.after
    }

    /// Start the cleanup clock for `thing`. A clock already running is left
    /// alone.
    pub fn schedule(&self, thing: &Thing, events: &dyn EventQueue) {
        if self.pending.is_set() {
            return;
        }
        self.pending
            .replace(events.schedule(thing, CLEANUP_COMMAND, self.after));
    }

    /// Stop the cleanup clock
    pub fn cancel(&self) -> bool {
        self.pending.cancel()
    }

    /// True if a cleanup is pending
    pub fn is_pending(&self) -> bool {
        self.pending.is_set()
    }

    pub(crate) fn fired(&self) {
        self.pending.clear();
    }
}

impl Attribute for Cleanup {
    fn copy(&self) -> Option<Box<dyn Attribute>> {
        Some(Box::new(Cleanup::new(self.after)))
    }

    fn dump(&self) -> String {
        format!(
            "Cleanup: after {:?} (pending: {})",
            self.after,
            self.is_pending()
        )
    }
}
