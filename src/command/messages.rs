//! Message buffers filled while a command runs and flushed once it is stable
//!
//! Nothing a handler writes reaches anyone until the command's lock set has
//! stopped growing. A pass that grows the lock set has its output thrown
//! away along with everything else it did.
//!
//! The participant and observer buffers start with a newline that moves the
//! recipient's cursor off their prompt line. A buffer holding nothing but
//! that newline counts as empty and is not sent.

use crate::attr::Player;
use crate::world::{Container, Locks, Thing};

/// Text accumulated for one recipient or group of recipients
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer(String);

impl Buffer {
    fn with_capacity(capacity: usize) -> Self {
        Self(String::with_capacity(capacity))
    }

    fn separated() -> Self {
        Self("\n".to_string())
    }

    /// Append text
    pub fn write(&mut self, text: &str) {
        self.0.push_str(text);
    }

    /// Append several pieces of text without building an intermediate string
    pub fn write_join(&mut self, parts: &[&str]) {
        for part in parts {
            self.0.push_str(part);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    /// True if the buffer holds more than its leading separator
    fn has_content(&self) -> bool {
        self.0.len() > 1
    }
}

/// Which buffers a silenced handler must not leave output in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mute {
    pub actor: bool,
    pub participant: bool,
    pub observers: bool,
}

impl Mute {
    /// Silence only the observers
    pub fn observers() -> Self {
        Self {
            observers: true,
            ..Self::default()
        }
    }

    /// True if nothing is silenced
    pub fn is_none(&self) -> bool {
        !self.actor && !self.participant && !self.observers
    }
}

/// Buffer lengths recorded before a silenced handler runs
#[derive(Debug)]
pub(crate) struct Marks {
    actor: Option<usize>,
    participant: Option<usize>,
    observers: Option<Vec<usize>>,
}

/// All buffers for one command
#[derive(Debug, Default)]
pub struct Messages {
    /// The acting thing. Always sent, even when empty.
    pub actor: Buffer,
    /// The participant. Sent only with content.
    pub participant: Buffer,
    observers: Vec<(Container, Buffer)>,
    allocated: bool,
}

impl Messages {
    /// Set up buffers on first use and add an observer buffer for any locked
    /// container that does not have one yet
    pub(crate) fn allocate(&mut self, locks: &[Container], actor_capacity: usize) {
        if !self.allocated {
            self.actor = Buffer::with_capacity(actor_capacity);
            self.participant = Buffer::separated();
            self.allocated = true;
        }

        for container in locks {
            if !self.observers.iter().any(|(c, _)| c == container) {
                self.observers.push((container.clone(), Buffer::separated()));
            }
        }
    }

    /// Throw all buffers away
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    /// Buffer for the observers in `at`. `None` if `at` is absent or was not
    /// locked.
    pub fn observer_for(&mut self, at: Option<&Container>) -> Option<&mut Buffer> {
        let at = at?;
        self.observers
            .iter_mut()
            .find(|(c, _)| c == at)
            .map(|(_, buffer)| buffer)
    }

    /// Write to the observers in `at`, if it was locked
    pub fn observe(&mut self, at: Option<&Container>, text: &str) {
        if let Some(buffer) = self.observer_for(at) {
            buffer.write(text);
        }
    }

    /// Containers with observer buffers, in allocation order
    pub fn observed(&self) -> impl Iterator<Item = &Container> {
        self.observers.iter().map(|(c, _)| c)
    }

    pub(crate) fn mark(&self, mute: Mute) -> Marks {
        Marks {
            actor: mute.actor.then(|| self.actor.len()),
            participant: mute.participant.then(|| self.participant.len()),
            observers: mute
                .observers
                .then(|| self.observers.iter().map(|(_, b)| b.len()).collect()),
        }
    }

    /// Truncate silenced buffers back to their marks. Observer buffers added
    /// after the marks were taken are silenced back to their separator.
    pub(crate) fn restore(&mut self, marks: Marks) {
        if let Some(len) = marks.actor {
            self.actor.truncate(len);
        }
        if let Some(len) = marks.participant {
            self.participant.truncate(len);
        }
        if let Some(lens) = marks.observers {
            for (i, (_, buffer)) in self.observers.iter_mut().enumerate() {
                buffer.truncate(lens.get(i).copied().unwrap_or(1));
            }
        }
    }

    /// Send everything that was written.
    ///
    /// Observer buffers go to every player in the container except the actor
    /// and the participant, and are skipped for crowded containers. Observers
    /// are only told anything when the actor is somewhere.
    pub(crate) fn deliver(
        &self,
        actor: &Thing,
        participant: Option<&Thing>,
        somewhere: bool,
        locks: &Locks<'_>,
    ) {
        if let Some(player) = actor.find::<Player>() {
            player.write(self.actor.as_str());
        }

        if self.participant.has_content() {
            if let Some(player) = participant.and_then(|p| p.find::<Player>()) {
                player.write(self.participant.as_str());
            }
        }

        if !somewhere {
            return;
        }

        for (at, buffer) in &self.observers {
            if !buffer.has_content() || locks.crowded(Some(at)) {
                continue;
            }
            for thing in locks.contents(Some(at)) {
                if &thing == actor || Some(&thing) == participant {
                    continue;
                }
                if let Some(player) = thing.find::<Player>() {
                    player.write(buffer.as_str());
                }
            }
        }
    }
}
