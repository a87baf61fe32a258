use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::Pending;
use crate::events::EventQueue;
use crate::world::{Attribute, Thing};

/// Internal command delivered when a thing should perform its next action
pub const ACTION_COMMAND: &str = "$ACTION";

/// Periodic ambient messages, e.g. a cat that purrs now and then. The clock
/// only runs while the thing is in play.
#[derive(Debug)]
pub struct Action {
    after: Duration,
    messages: Vec<String>,
    next: AtomicUsize,
    pending: Pending,
}

impl Action {
    pub fn new<I, S>(after: Duration, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            after,
            messages: messages.into_iter().map(Into::into).collect(),
            next: AtomicUsize::new(0),
            pending: Pending::default(),
        }
    }

    /// Schedule the next action unless one is already pending
    pub fn begin(&self, thing: &Thing, events: &dyn EventQueue) {
        if self.messages.is_empty() || self.pending.is_set() {
            return;
        }
        self.pending
            .replace(events.schedule(thing, ACTION_COMMAND, self.after));
    }

    /// Stop the action clock
    pub fn cancel(&self) -> bool {
        self.pending.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_set()
    }

    /// Next message, taken round-robin
    pub fn next_message(&self) -> Option<&str> {
        if self.messages.is_empty() {
            return None;
        }
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        self.messages.get(n % self.messages.len()).map(String::as_str)
    }

    pub(crate) fn fired(&self) {
        self.pending.clear();
    }
}

impl Attribute for Action {
    fn copy(&self) -> Option<Box<dyn Attribute>> {
        Some(Box::new(Action::new(self.after, self.messages.clone())))
    }

    fn dump(&self) -> String {
        format!(
            "Action: every {:?}, {} messages (pending: {})",
            self.after,
            self.messages.len(),
            self.is_pending()
        )
    }
}
