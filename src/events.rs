//! Scheduled events
//!
//! An event is a command line delivered to a target thing after a delay, as
//! if the thing had typed it. Scheduling hands back a [`CancelHandle`];
//! stateful attributes keep at most one outstanding handle and replace it
//! rather than stacking new ones.
//!
//! [`TokioEvents`] is the runtime implementation: each pending event is a
//! sleeping task that forwards the event to a channel drained by
//! [`deliver`]. [`RecordingEvents`] only records what was scheduled so the
//! caller can fire events by hand.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::command::Engine;
use crate::world::Thing;

/// Handle for cancelling a pending event
#[derive(Debug)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
    abort: Option<AbortHandle>,
}

impl CancelHandle {
    fn new(cancelled: Arc<AtomicBool>, abort: Option<AbortHandle>) -> Self {
        Self { cancelled, abort }
    }

    /// Cancel the event. Delivery checks the flag, so an event already on
    /// its way is dropped as well.
    pub fn cancel(self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(abort) = self.abort {
            abort.abort();
        }
    }

    /// True once cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Contract for delayed command delivery
pub trait EventQueue: Send + Sync {
    /// Deliver `command` to `target` after `delay`
    fn schedule(&self, target: &Thing, command: &str, delay: Duration) -> CancelHandle;
}

/// An event that has come due
pub struct Event {
    /// Thing the command runs as
    pub target: Thing,
    /// Command line to run
    pub command: String,
    /// When the event was due
    pub due: DateTime<Utc>,
    cancelled: Arc<AtomicBool>,
}

impl Event {
    /// True if the event was cancelled after it was queued
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Flag raised when the event is cancelled, for checking again once the
    /// command holds its locks
    pub(crate) fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("target", &self.target)
            .field("command", &self.command)
            .field("due", &self.due)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

fn due_in(delay: Duration) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero())
}

/// Tokio backed event queue
pub struct TokioEvents {
    tx: mpsc::UnboundedSender<Event>,
    runtime: tokio::runtime::Handle,
}

impl TokioEvents {
    /// Create a queue spawning timers on `runtime`. The receiver should be
    /// handed to [`deliver`].
    pub fn new(runtime: tokio::runtime::Handle) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, runtime }, rx)
    }
}

impl EventQueue for TokioEvents {
    fn schedule(&self, target: &Thing, command: &str, delay: Duration) -> CancelHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let event = Event {
            target: target.clone(),
            command: command.to_string(),
            due: due_in(delay),
            cancelled: cancelled.clone(),
        };

        tracing::debug!(
            target_id = %target.id(),
            command,
            delay_ms = delay.as_millis() as u64,
            "scheduling event"
        );

        let tx = self.tx.clone();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if !event.is_cancelled() {
                // The receiver only goes away on shutdown
                let _ = tx.send(event);
            }
        });

        CancelHandle::new(cancelled, Some(task.abort_handle()))
    }
}

/// Run due events as commands until the queue is closed.
///
/// Commands block on container locks, so each one runs on the blocking pool.
pub async fn deliver(engine: Arc<Engine>, mut rx: mpsc::UnboundedReceiver<Event>) {
    while let Some(event) = rx.recv().await {
        if event.is_cancelled() {
            continue;
        }

        let engine = engine.clone();
        tokio::task::spawn_blocking(move || engine.fire(&event));
    }

    tracing::debug!("event queue closed");
}

/// Event queue that records events instead of running timers
#[derive(Default)]
pub struct RecordingEvents {
    pending: Mutex<Vec<Event>>,
}

impl RecordingEvents {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every event not cancelled so far
    pub fn take(&self) -> Vec<Event> {
        let mut pending = self.pending.lock();
        std::mem::take(&mut *pending)
            .into_iter()
            .filter(|e| !e.is_cancelled())
            .collect()
    }

    /// Commands of the live events scheduled for `target`
    pub fn pending_for(&self, target: &Thing) -> Vec<String> {
        self.pending
            .lock()
            .iter()
            .filter(|e| &e.target == target && !e.is_cancelled())
            .map(|e| e.command.clone())
            .collect()
    }

    /// Number of live events
    pub fn len(&self) -> usize {
        self.pending.lock().iter().filter(|e| !e.is_cancelled()).count()
    }

    /// True if no live events are pending
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventQueue for RecordingEvents {
    fn schedule(&self, target: &Thing, command: &str, delay: Duration) -> CancelHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.pending.lock().push(Event {
            target: target.clone(),
            command: command.to_string(),
            due: due_in(delay),
            cancelled: cancelled.clone(),
        });
        CancelHandle::new(cancelled, None)
    }
}
