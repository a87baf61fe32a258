//! Containers: the lockable, ordered stores things live in
//!
//! A [`Container`] is a shared handle to an [`Inventory`] behind its own
//! mutex, plus an immutable [`LockId`] fixed at creation. Lock ids are handed
//! out from a single increasing counter and are only ever used to put
//! containers into one global acquisition order.
//!
//! The inventory keeps narrative things in a contiguous prefix of its
//! contents and everything else after it:
//!
//! ```text
//! narratives := contents[..split]
//! other      := contents[split..]
//! ```
//!
//! Disabled things are still covered by the container's lock but are kept
//! out of contents, search and listings.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, MutexGuard};

use super::thing::{Thing, WeakThing};

static NEXT_LOCK_ID: AtomicU64 = AtomicU64::new(1);

/// Ordering key for container locks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LockId(u64);

impl LockId {
    fn next() -> Self {
        Self(NEXT_LOCK_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Shared {
    lock_id: LockId,
    owner: WeakThing,
    inventory: Mutex<Inventory>,
}

/// Shared handle to a container. Equality is identity.
#[derive(Clone)]
pub struct Container(Arc<Shared>);

/// Non-owning reference to a container
#[derive(Clone)]
pub struct WeakContainer(Weak<Shared>);

impl WeakContainer {
    /// Resolve the container if it is still alive
    pub fn upgrade(&self) -> Option<Container> {
        self.0.upgrade().map(Container)
    }
}

impl Container {
    pub(crate) fn new(owner: WeakThing, quiet_when_empty: bool) -> Self {
        Self(Arc::new(Shared {
            lock_id: LockId::next(),
            owner,
            inventory: Mutex::new(Inventory::new(quiet_when_empty)),
        }))
    }

    /// A container not owned by any thing
    pub fn detached() -> Self {
        Self::new(WeakThing::default(), false)
    }

    /// Lock ordering key. Immutable, reading it needs no synchronisation.
    pub fn lock_id(&self) -> LockId {
        self.0.lock_id
    }

    /// Block until this container's lock is held.
    ///
    /// Commands never call this directly: they request containers through
    /// the command state so locks are always taken in lock id order.
    pub fn lock(&self) -> MutexGuard<'_, Inventory> {
        self.0.inventory.lock()
    }

    /// The thing owning this container
    pub fn owner(&self) -> Option<Thing> {
        self.0.owner.upgrade()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Non-owning handle
    pub fn downgrade(&self) -> WeakContainer {
        WeakContainer(Arc::downgrade(&self.0))
    }

    /// True if putting something into this container would leave it carried
    /// by a player, directly or nested inside other containers.
    pub fn carried(&self) -> bool {
        let mut at = Some(self.clone());

        while let Some(container) = at {
            let Some(owner) = container.owner() else {
                return false;
            };
            if owner.is_player() {
                return true;
            }
            at = owner.location();
        }

        false
    }

    /// The top level container of the hierarchy this container is in
    pub fn outermost(&self) -> Container {
        let mut at = self.clone();

        while let Some(outer) = at.owner().and_then(|owner| owner.location()) {
            at = outer;
        }

        at
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Container {}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owner = self.owner().map(|o| o.name("(unnamed)"));
        f.debug_struct("Container")
            .field("lock_id", &self.0.lock_id)
            .field("owner", &owner)
            .finish()
    }
}

/// The data a container's lock protects
#[derive(Debug)]
pub struct Inventory {
    contents: Vec<Thing>,
    split: usize,
    disabled: Vec<Thing>,
    player_count: usize,
    quiet_when_empty: bool,
}

impl Inventory {
    fn new(quiet_when_empty: bool) -> Self {
        Self {
            contents: Vec::new(),
            split: 0,
            disabled: Vec::new(),
            player_count: 0,
            quiet_when_empty,
        }
    }

    /// Copy of the non-narrative contents
    pub fn contents(&self) -> Vec<Thing> {
        self.contents[self.split..].to_vec()
    }

    /// Copy of the narrative contents
    pub fn narratives(&self) -> Vec<Thing> {
        self.contents[..self.split].to_vec()
    }

    /// Copy of the disabled things
    pub fn disabled(&self) -> Vec<Thing> {
        self.disabled.clone()
    }

    /// Everything covered by this container's lock: contents, narratives
    /// and disabled things
    pub fn everything(&self) -> Vec<Thing> {
        self.contents.iter().chain(&self.disabled).cloned().collect()
    }

    /// First enabled thing answering to `alias`
    pub fn search(&self, alias: &str) -> Option<Thing> {
        self.contents.iter().find(|t| t.has_alias(alias)).cloned()
    }

    /// Human readable listing of the non-narrative contents
    pub fn list(&self) -> String {
        let items = &self.contents[self.split..];

        match items {
            [] if self.quiet_when_empty => String::new(),
            [] => "It is empty.".to_string(),
            [only] => format!("It contains {}.", only.name("Something")),
            many => {
                let mut buff = String::from("It contains:");
                for item in many {
                    buff.push_str("\n  ");
                    buff.push_str(&item.name("Something"));
                }
                buff
            }
        }
    }

    /// True if more than `crowd_size` players are here
    pub fn crowded(&self, crowd_size: usize) -> bool {
        self.player_count > crowd_size
    }

    /// True if any players are here
    pub fn players(&self) -> bool {
        self.player_count > 0
    }

    /// Number of players here
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    /// True if there are no non-narrative things
    pub fn is_empty(&self) -> bool {
        self.contents.len() == self.split
    }

    /// Number of enabled things, narratives included
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Number of narrative things
    pub fn split(&self) -> usize {
        self.split
    }

    /// Allocated capacity of the contents storage
    pub fn capacity(&self) -> usize {
        self.contents.capacity()
    }

    /// Diagnostic listing
    pub fn dump(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{} items (split: {}, disabled: {}, players: {})",
            self.contents.len() + self.disabled.len(),
            self.split,
            self.disabled.len(),
            self.player_count
        )];
        for thing in self.contents.iter().chain(&self.disabled) {
            lines.extend(thing.dump().into_iter().map(|l| format!("  {}", l)));
        }
        lines
    }

    /// Place a thing into contents: narratives at the front, others at the
    /// back. Fires no hooks.
    pub(crate) fn insert(&mut self, thing: Thing) {
        if thing.is_player() {
            self.player_count += 1;
        }

        if thing.is_narrative() {
            self.contents.insert(0, thing);
            self.split += 1;
        } else {
            self.contents.push(thing);
        }
    }

    /// Take a thing out of contents, preserving the order of the rest.
    /// Returns false if the thing was not there. Fires no hooks.
    pub(crate) fn take(&mut self, thing: &Thing, compact_slack: usize) -> bool {
        let Some(pos) = self.contents.iter().position(|c| c == thing) else {
            return false;
        };

        self.contents.remove(pos);

        if pos < self.split {
            self.split -= 1;
        }
        if thing.is_player() {
            self.player_count -= 1;
        }

        // Give memory back once less than half of the storage is in use and
        // the waste is worth a reallocation
        let (len, cap) = (self.contents.len(), self.contents.capacity());
        if cap.saturating_sub(len * 2) >= compact_slack {
            self.contents.shrink_to_fit();
        }

        true
    }

    /// Put a thing straight into the disabled set
    pub(crate) fn park(&mut self, thing: Thing) {
        self.disabled.push(thing);
    }

    /// Take a thing out of the disabled set
    pub(crate) fn unpark(&mut self, thing: &Thing) -> bool {
        match self.disabled.iter().position(|d| d == thing) {
            Some(pos) => {
                self.disabled.remove(pos);
                true
            }
            None => false,
        }
    }

    /// True if the thing is enabled here
    pub fn contains(&self, thing: &Thing) -> bool {
        self.contents.contains(thing)
    }

    /// True if the thing is in contents or disabled
    pub fn holds(&self, thing: &Thing) -> bool {
        self.contents.contains(thing) || self.disabled.contains(thing)
    }
}
