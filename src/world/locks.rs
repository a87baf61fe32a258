//! A set of held container locks and the atomic operations performed under it
//!
//! [`Locks`] is the only way to mutate a container. It owns the guards of
//! every container it was created for, taken in ascending lock id order, and
//! releases them in reverse order when dropped. Every mutating operation
//! first checks that all containers it touches are in the set; an operation
//! on a container that is not held is refused with a warning rather than
//! taking a lock out of order.
//!
//! Read operations accept an absent container and answer with a neutral
//! value (empty, false, `None`), so handlers can chain lookups without
//! presence checks.

use parking_lot::MutexGuard;

use super::World;
use super::container::{Container, Inventory, LockId};
use super::thing::Thing;

/// Guards for an ordered set of containers
pub struct Locks<'g> {
    world: &'g World,
    held: Vec<(&'g Container, MutexGuard<'g, Inventory>)>,
}

impl<'g> Locks<'g> {
    /// Lock `ordered` front to back. The caller guarantees the slice is
    /// sorted by lock id and free of duplicates.
    pub(crate) fn acquire(world: &'g World, ordered: &[&'g Container]) -> Self {
        let mut held = Vec::with_capacity(ordered.len());
        for container in ordered {
            tracing::trace!(lock_id = %container.lock_id(), "acquiring");
            held.push((*container, container.lock()));
        }
        Self { world, held }
    }

    /// Lock ids in acquisition order
    pub fn lock_ids(&self) -> Vec<LockId> {
        self.held.iter().map(|(c, _)| c.lock_id()).collect()
    }

    /// Containers in acquisition order
    pub fn containers(&self) -> impl Iterator<Item = &'g Container> + '_ {
        self.held.iter().map(|(c, _)| *c)
    }

    /// True if `container` is in this set
    pub fn holds(&self, container: &Container) -> bool {
        self.index(container).is_some()
    }

    fn index(&self, container: &Container) -> Option<usize> {
        self.held.iter().position(|(c, _)| c.ptr_eq(container))
    }

    /// Read access to a held container
    pub fn get(&self, container: &Container) -> Option<&Inventory> {
        self.index(container).map(|i| &*self.held[i].1)
    }

    fn get_mut(&mut self, container: &Container) -> Option<&mut Inventory> {
        self.index(container).map(|i| &mut *self.held[i].1)
    }

    fn refuse(&self, op: &str, container: &Container) {
        tracing::warn!(
            op,
            lock_id = %container.lock_id(),
            held = ?self.lock_ids(),
            "container is not in the held lock set"
        );
    }

    fn checked(&self, op: &str, container: Option<&Container>) -> bool {
        match container {
            Some(c) if !self.holds(c) => {
                self.refuse(op, c);
                false
            }
            _ => true,
        }
    }

    /// Put `thing` into `to`. Returns the thing stored, or `None` if `to` is
    /// absent or not held.
    pub fn add(&mut self, to: Option<&Container>, thing: &Thing) -> Option<Thing> {
        to?;
        self.move_thing(thing, None, to)
    }

    /// Take `thing` out of `from`. Returns the thing that continues in play,
    /// which is a replacement copy when the thing respawns, or `None` if it
    /// was not there.
    pub fn remove(&mut self, from: Option<&Container>, thing: &Thing) -> Option<Thing> {
        from?;
        self.move_thing(thing, from, None)
    }

    /// Move `thing` from `from` to `to` as one step.
    ///
    /// An absent `from` makes this add-only and an absent `to` remove-only.
    /// Both containers must be held. The returned thing is the one now
    /// referenced by `to`; it differs from `thing` when removal respawned a
    /// replacement, and callers must carry on with the returned value.
    pub fn move_thing(
        &mut self,
        thing: &Thing,
        from: Option<&Container>,
        to: Option<&Container>,
    ) -> Option<Thing> {
        if !self.checked("move", from) || !self.checked("move", to) {
            return None;
        }

        let lifecycle = self.world.lifecycle().clone();
        let slack = self.world.config().compact_slack;
        let is_player = thing.is_player();
        let mut moving = thing.clone();

        if let Some(from) = from {
            let inv = self.get_mut(from)?;
            if !inv.take(thing, slack) {
                return None;
            }
            if !is_player {
                lifecycle.cleanup_cancel(thing);
                lifecycle.action_cancel(thing);
                if let Some(copy) = lifecycle.respawn(thing) {
                    // The original waits at the source for its reset
                    inv.park(thing.clone());
                    moving = copy;
                }
            }
        }

        if let Some(to) = to {
            let inv = self.get_mut(to)?;
            inv.insert(moving.clone());
            if !is_player {
                lifecycle.action_begin(&moving);
            }
        }

        // A parked original keeps pointing at the source
        moving.set_location(to);

        if !is_player && from.is_some() && to.is_some_and(|to| !to.carried()) {
            lifecycle.cleanup_schedule(&moving);
        }

        Some(moving)
    }

    /// Take `thing` out of play at `at` without firing any hooks
    pub fn disable(&mut self, at: &Container, thing: &Thing) -> bool {
        if !self.checked("disable", Some(at)) {
            return false;
        }
        let slack = self.world.config().compact_slack;
        let Some(inv) = self.get_mut(at) else {
            return false;
        };
        if !inv.take(thing, slack) {
            return false;
        }
        inv.park(thing.clone());
        true
    }

    /// Put a disabled `thing` back into play at `at` without firing any hooks
    pub fn enable(&mut self, at: &Container, thing: &Thing) -> bool {
        if !self.checked("enable", Some(at)) {
            return false;
        }
        let Some(inv) = self.get_mut(at) else {
            return false;
        };
        if !inv.unpark(thing) {
            return false;
        }
        inv.insert(thing.clone());
        true
    }

    /// Place `thing` straight into the disabled set of `at`. The thing must
    /// not be in any container.
    pub fn add_disabled(&mut self, at: &Container, thing: &Thing) -> bool {
        if !self.checked("add disabled", Some(at)) {
            return false;
        }
        let Some(inv) = self.get_mut(at) else {
            return false;
        };
        if inv.holds(thing) {
            return false;
        }
        inv.park(thing.clone());
        thing.set_location(Some(at));
        true
    }

    /// Drop `thing` from `at`, enabled or disabled, firing no hooks and
    /// clearing its location
    pub fn discard(&mut self, at: &Container, thing: &Thing) -> bool {
        if !self.checked("discard", Some(at)) {
            return false;
        }
        let slack = self.world.config().compact_slack;
        let Some(inv) = self.get_mut(at) else {
            return false;
        };
        if !inv.take(thing, slack) && !inv.unpark(thing) {
            return false;
        }
        thing.set_location(None);
        true
    }

    /// First enabled thing in `at` answering to `alias`
    pub fn search(&self, at: Option<&Container>, alias: &str) -> Option<Thing> {
        self.get(at?)?.search(alias)
    }

    pub fn contents(&self, at: Option<&Container>) -> Vec<Thing> {
        self.read(at, Inventory::contents)
    }

    pub fn narratives(&self, at: Option<&Container>) -> Vec<Thing> {
        self.read(at, Inventory::narratives)
    }

    pub fn disabled(&self, at: Option<&Container>) -> Vec<Thing> {
        self.read(at, Inventory::disabled)
    }

    pub fn everything(&self, at: Option<&Container>) -> Vec<Thing> {
        self.read(at, Inventory::everything)
    }

    /// Listing of the non-narrative contents of `at`
    pub fn list(&self, at: Option<&Container>) -> String {
        self.read(at, Inventory::list)
    }

    /// True if `at` holds more players than the configured crowd size
    pub fn crowded(&self, at: Option<&Container>) -> bool {
        let crowd_size = self.world.config().crowd_size;
        self.read(at, |inv| inv.crowded(crowd_size))
    }

    fn read<T: Default>(&self, at: Option<&Container>, f: impl FnOnce(&Inventory) -> T) -> T {
        at.and_then(|c| self.get(c)).map(f).unwrap_or_default()
    }
}

impl Drop for Locks<'_> {
    fn drop(&mut self) {
        while let Some((container, guard)) = self.held.pop() {
            drop(guard);
            tracing::trace!(lock_id = %container.lock_id(), "released");
        }
    }
}
