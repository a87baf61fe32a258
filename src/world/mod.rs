//! The shared world graph and the services commands run against
//!
//! ## Key Components
//!
//! - [`Thing`]: an identity composed of attributes
//! - [`Container`] / [`Inventory`]: lockable ordered stores of things
//! - [`Locks`]: a held, ordered set of container locks and the atomic
//!   Add/Remove/Move operations performed under it
//! - [`Lifecycle`]: hooks fired as things move in and out of play
//! - [`Players`]: registry of players currently in the world
//! - [`World`]: owns the configuration, registry, event queue and
//!   locations
//!
//! ## Locking
//!
//! A container's contents may only be read or changed while its lock is held
//! through a [`Locks`] set. Sets are always acquired in ascending lock id
//! order, the single rule that keeps concurrent commands deadlock free.

mod container;
mod lifecycle;
mod locks;
mod players;
mod thing;

pub use container::{Container, Inventory, LockId, WeakContainer};
pub use lifecycle::{AttrLifecycle, Hook, Lifecycle, RecordingLifecycle};
pub use locks::Locks;
pub use players::Players;
pub use thing::{AsAny, Attribute, Thing, ThingBuilder, ThingId, WeakThing};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::config::WorldConfig;
use crate::events::EventQueue;

/// Everything shared by all command executions
pub struct World {
    config: WorldConfig,
    players: Players,
    events: Arc<dyn EventQueue>,
    lifecycle: Arc<dyn Lifecycle>,
    locations: RwLock<Vec<Thing>>,
    starts: RwLock<Vec<Thing>>,
    next_start: AtomicUsize,
}

impl World {
    /// Create an empty world scheduling its events on `events`
    pub fn new(config: WorldConfig, events: Arc<dyn EventQueue>) -> Self {
        let lifecycle = Arc::new(AttrLifecycle::new(events.clone()));
        Self {
            config,
            players: Players::new(),
            events,
            lifecycle,
            locations: RwLock::new(Vec::new()),
            starts: RwLock::new(Vec::new()),
            next_start: AtomicUsize::new(0),
        }
    }

    /// Replace the lifecycle hooks
    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn Lifecycle>) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn players(&self) -> &Players {
        &self.players
    }

    pub fn events(&self) -> &Arc<dyn EventQueue> {
        &self.events
    }

    pub fn lifecycle(&self) -> &Arc<dyn Lifecycle> {
        &self.lifecycle
    }

    /// Register a location. Start locations are where players enter.
    pub fn add_location(&self, location: Thing, start: bool) {
        if start {
            self.starts.write().push(location.clone());
        }
        self.locations.write().push(location);
    }

    /// All registered locations
    pub fn locations(&self) -> Vec<Thing> {
        self.locations.read().clone()
    }

    /// Next start location, taken round-robin
    pub fn start_location(&self) -> Option<Thing> {
        let starts = self.starts.read();
        if starts.is_empty() {
            return None;
        }
        let n = self.next_start.fetch_add(1, Ordering::Relaxed);
        starts.get(n % starts.len()).cloned()
    }

    /// Lock `containers` in ascending lock id order, ignoring duplicates.
    ///
    /// Commands get their locks through the command state; this is for world
    /// setup and tooling that knows its full footprint up front.
    pub fn lock<'g>(&'g self, containers: &[&'g Container]) -> Locks<'g> {
        let mut ordered = containers.to_vec();
        ordered.sort_by_key(|c| c.lock_id());
        ordered.dedup_by(|a, b| a.ptr_eq(b));
        Locks::acquire(self, &ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::Name;
    use crate::events::RecordingEvents;

    #[test]
    fn test_lock_sorts_and_dedups() {
        let world = World::new(WorldConfig::default(), Arc::new(RecordingEvents::new()));
        let a = Container::detached();
        let b = Container::detached();

        let locks = world.lock(&[&b, &a, &b]);

        assert_eq!(locks.lock_ids(), vec![a.lock_id(), b.lock_id()]);
    }

    #[test]
    fn test_start_locations_round_robin() {
        let world = World::new(WorldConfig::default(), Arc::new(RecordingEvents::new()));
        assert!(world.start_location().is_none());

        let hall = Thing::builder().with(Name::new("hall")).with_inventory().build();
        let yard = Thing::builder().with(Name::new("yard")).with_inventory().build();
        let cellar = Thing::builder().with(Name::new("cellar")).with_inventory().build();
        world.add_location(hall.clone(), true);
        world.add_location(cellar, false);
        world.add_location(yard.clone(), true);

        assert_eq!(world.locations().len(), 3);
        assert_eq!(world.start_location(), Some(hall));
        assert_eq!(world.start_location(), Some(yard));
    }
}
