//! Per-command processing state and the lock acquisition loop
//!
//! A command cannot know up front every container it will touch: a move only
//! learns its destination after resolving the exit. Handlers therefore ask
//! for containers as they discover them with [`CommandState::add_lock`] and
//! return straight away. [`CommandState::parse`] notices the lock list grew,
//! releases everything, throws away that pass's output and runs the handler
//! again with the enlarged list, until a pass completes without asking for
//! anything new.
//!
//! The lock list is kept sorted by lock id with no duplicates, so every
//! command acquires overlapping containers in the same order. Handlers must
//! not change anything before they have every lock they need, since an
//! incomplete pass is simply run again.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::world::{Container, Locks, Thing, World};

use super::handlers::{Handler, Handlers};
use super::messages::{Messages, Mute};

/// Words dropped from input before a command sees it
const STOP_WORDS: [&str; 10] = [
    "A", "AN", "AT", "FROM", "IN", "INTO", "ON", "THE", "TO", "WITH",
];

/// Working context for one command line
pub struct CommandState<'w> {
    world: &'w World,

    /// The thing executing the command
    pub actor: Thing,

    /// Where the actor was when the command started. Handlers moving the
    /// actor update it.
    pub location: Option<Container>,

    /// Another thing taking part in the command, possibly elsewhere
    pub participant: Option<Thing>,

    /// Input words after the command, as typed
    pub input: Vec<String>,

    /// The command word, uppercased
    pub cmd: String,

    /// Input words after the command, uppercased
    pub words: Vec<String>,

    /// Set by handlers that completed successfully
    pub ok: bool,

    /// Set by handlers ending the actor's session
    pub quit: bool,

    /// Output buffers
    pub msg: Messages,

    internal: bool,
    cancelled: Option<Arc<AtomicBool>>,
    locks: Vec<Container>,
    passes: usize,
}

impl<'w> CommandState<'w> {
    /// State for `actor` running `input`, seeded with the actor's location
    pub fn new(world: &'w World, actor: &Thing, input: &str) -> Self {
        let (cmd, input) = tokenize(input);
        let words = input.iter().map(|w| w.to_uppercase()).collect();
        let location = actor.location();

        let mut state = Self {
            world,
            actor: actor.clone(),
            location: None,
            participant: None,
            input,
            cmd,
            words,
            ok: false,
            quit: false,
            msg: Messages::default(),
            internal: false,
            cancelled: None,
            locks: Vec::with_capacity(2),
            passes: 0,
        };
        state.add_lock(location.as_ref());
        state.location = location;
        state
    }

    /// Allow `$` commands, which are only run on behalf of the world itself
    pub(crate) fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// Abandon the command if `flag` is raised by the time its locks are held
    pub(crate) fn cancelled_by(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(flag);
        self
    }

    pub fn world(&self) -> &'w World {
        self.world
    }

    /// The lock list, ascending by lock id
    pub fn locks(&self) -> &[Container] {
        &self.locks
    }

    /// Number of handler passes run so far
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// True if `container` is in the lock list. Says nothing about whether
    /// the lock is currently held.
    pub fn can_lock(&self, container: &Container) -> bool {
        self.locks.iter().any(|c| c == container)
    }

    /// Add a container to the lock list at its sorted position. Absent
    /// containers and containers already listed are ignored; locking the
    /// same container twice would deadlock the command against itself.
    pub fn add_lock<'a>(&mut self, container: impl Into<Option<&'a Container>>) {
        let Some(container) = container.into() else {
            return;
        };
        if self.can_lock(container) {
            return;
        }

        let id = container.lock_id();
        let at = self.locks.partition_point(|c| c.lock_id() < id);
        self.locks.insert(at, container.clone());
    }

    /// Add a container to the lock list, returning true if it was not
    /// already there. A handler getting true must return and wait for the
    /// next pass.
    pub fn want_lock<'a>(&mut self, container: impl Into<Option<&'a Container>>) -> bool {
        let before = self.locks.len();
        self.add_lock(container);
        self.locks.len() != before
    }

    /// Observer buffer for the current location
    pub fn observer(&mut self, text: &str) {
        self.msg.observe(self.location.as_ref(), text);
    }

    /// Run passes until the lock list is stable
    pub fn parse(&mut self, handlers: &Handlers) {
        while !self.sync(handlers) {}
    }

    /// One pass: lock the current list, run the handler and, if it asked for
    /// nothing new, deliver the output. Returns true once stable.
    ///
    /// Locks are only ever added, so comparing lengths is enough to spot a
    /// change.
    pub fn sync(&mut self, handlers: &Handlers) -> bool {
        let world = self.world;
        let ordered = self.locks.clone();
        let refs: Vec<&Container> = ordered.iter().collect();
        let mut locks = Locks::acquire(world, &refs);

        self.passes += 1;
        if self.is_cancelled() {
            tracing::debug!(cmd = %self.cmd, pass = self.passes, "cancelled before running");
            return true;
        }
        self.msg
            .allocate(&self.locks, world.config().actor_buffer_capacity);
        let before = self.locks.len();

        match self.handler(handlers) {
            Some(handler) => handler(self, &mut locks),
            None if self.cmd.is_empty() => {}
            None => self.msg.actor.write("Eh?"),
        }

        if self.locks.len() == before {
            self.msg.deliver(
                &self.actor,
                self.participant.as_ref(),
                self.location.is_some(),
                &locks,
            );
            self.msg.clear();
            return true;
        }

        tracing::debug!(
            cmd = %self.cmd,
            pass = self.passes,
            held = before,
            wanted = self.locks.len(),
            "lock set grew, retrying"
        );
        self.msg.clear();
        self.participant = None;
        self.ok = false;
        self.quit = false;
        false
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn handler(&self, handlers: &Handlers) -> Option<Handler> {
        if self.cmd.starts_with('$') && !self.internal {
            return None;
        }
        handlers.get(&self.cmd)
    }

    /// Run `handler` keeping output out of the buffers selected by `mute`.
    /// The handler's changes to the world still happen.
    pub fn silent(&mut self, locks: &mut Locks<'_>, mute: Mute, handler: Handler) {
        if mute.is_none() {
            handler(self, locks);
            return;
        }

        let marks = self.msg.mark(mute);
        handler(self, locks);
        self.msg.restore(marks);
    }
}

/// Split input into the command word and its arguments, dropping stop words
fn tokenize(input: &str) -> (String, Vec<String>) {
    let mut words = input
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(&w.to_uppercase().as_str()))
        .map(str::to_string);

    let cmd = words.next().map(|w| w.to_uppercase()).unwrap_or_default();
    (cmd, words.collect())
}
