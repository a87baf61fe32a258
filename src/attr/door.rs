use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use super::Pending;
use super::exits::Direction;
use crate::events::EventQueue;
use crate::world::{Attribute, Thing, WeakThing};

/// Internal command delivered when a door should return to its initial state
pub const DOOR_COMMAND: &str = "$DOOR";

/// Blocks an exit while closed.
///
/// The two sides of a door are separate things in separate locations, each
/// carrying a `Door`. Sides are paired with [`Door::pair`] and a state change
/// on one side is mirrored onto the other. Only the side that was operated
/// keeps the pending reset.
pub struct Door {
    direction: Direction,
    reset_after: Duration,
    init_open: bool,
    open: Mutex<bool>,
    other: RwLock<WeakThing>,
    pending: Pending,
}

impl Door {
    /// A door blocking `direction`, initially open or closed. A zero
    /// `reset_after` means the door never resets itself.
    pub fn new(direction: Direction, init_open: bool, reset_after: Duration) -> Self {
        Self {
            direction,
            reset_after,
            init_open,
            open: Mutex::new(init_open),
            other: RwLock::new(WeakThing::default()),
            pending: Pending::default(),
        }
    }

    /// Pair the doors carried by two things as the two sides of one door
    pub fn pair(a: &Thing, b: &Thing) {
        if let (Some(da), Some(db)) = (a.find::<Door>(), b.find::<Door>()) {
            *da.other.write() = b.downgrade();
            *db.other.write() = a.downgrade();
        }
    }

    /// The thing carrying the other side, if paired
    pub fn other_side(&self) -> Option<Thing> {
        self.other.read().upgrade()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_open(&self) -> bool {
        *self.open.lock()
    }

    /// True if this door stops travel in `dir`
    pub fn blocks(&self, dir: Direction) -> bool {
        dir == self.direction && !self.is_open()
    }

    /// Short state description appended to the door's own description
    pub fn state(&self) -> &'static str {
        if self.is_open() {
            "It is open."
        } else {
            "It is closed."
        }
    }

    /// Open or close this side because someone operated it. Returns false if
    /// the door was already in that state. A door moved away from its initial
    /// state schedules its own reset.
    pub fn operate(&self, thing: &Thing, open: bool, events: &dyn EventQueue) -> bool {
        if !self.set(open) {
            return false;
        }
        if let Some(other) = self.other_side().as_ref().and_then(|o| o.find::<Door>()) {
            other.set(open);
        }
        if !self.reset_after.is_zero() && open != self.init_open {
            self.pending
                .replace(events.schedule(thing, DOOR_COMMAND, self.reset_after));
        }
        true
    }

    /// Return both sides to the initial state. Returns false if nothing
    /// changed.
    pub fn reset(&self) -> bool {
        self.pending.clear();
        let changed = self.set(self.init_open);
        if let Some(other) = self.other_side().as_ref().and_then(|o| o.find::<Door>()) {
            other.set(self.init_open);
        }
        changed
    }

    /// Change state without scheduling anything, cancelling a pending reset
    fn set(&self, open: bool) -> bool {
        let mut state = self.open.lock();
        if *state == open {
            return false;
        }
        *state = open;
        self.pending.cancel();
        true
    }
}

impl Attribute for Door {
    // A copy is an unpaired side in its initial state
    fn copy(&self) -> Option<Box<dyn Attribute>> {
        Some(Box::new(Door::new(
            self.direction,
            self.init_open,
            self.reset_after,
        )))
    }

    fn dump(&self) -> String {
        format!(
            "Door: {} open: {} ({}) reset: {:?}",
            self.direction,
            self.is_open(),
            self.init_open,
            self.reset_after
        )
    }
}
