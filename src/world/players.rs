//! Registry of players currently in the world

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::thing::Thing;

/// Capacity the registry shrinks back to once the last player leaves
const RECLAIM_CAPACITY: usize = 10;

/// Players currently in the world, with the time each one entered
#[derive(Default)]
pub struct Players {
    list: Mutex<Vec<(Thing, DateTime<Utc>)>>,
}

impl Players {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player. Registering the same player twice is ignored.
    pub fn add(&self, player: &Thing) {
        let mut list = self.list.lock();
        if list.iter().any(|(p, _)| p == player) {
            return;
        }
        list.push((player.clone(), Utc::now()));
        tracing::info!(player = %player.name("Someone"), online = list.len(), "player entered");
    }

    /// Unregister a player. Returns false if it was not registered.
    pub fn remove(&self, player: &Thing) -> bool {
        let mut list = self.list.lock();
        let Some(pos) = list.iter().position(|(p, _)| p == player) else {
            return false;
        };
        let (_, since) = list.remove(pos);

        let minutes = (Utc::now() - since).num_minutes();
        tracing::info!(player = %player.name("Someone"), minutes, "player left");

        // Last one out reclaims the slots left over from a busy period
        if list.is_empty() && list.capacity() > RECLAIM_CAPACITY {
            tracing::info!(
                "Last one out reclaims the player list: {} slots reclaimed",
                list.capacity() - RECLAIM_CAPACITY
            );
            *list = Vec::with_capacity(RECLAIM_CAPACITY);
        }
        true
    }

    /// Names of all players, leaving out `omit`
    pub fn list(&self, omit: Option<&Thing>) -> Vec<String> {
        self.list
            .lock()
            .iter()
            .filter(|(p, _)| Some(p) != omit)
            .map(|(p, _)| p.name("Someone"))
            .collect()
    }

    /// When `player` entered, if registered
    pub fn since(&self, player: &Thing) -> Option<DateTime<Utc>> {
        self.list
            .lock()
            .iter()
            .find(|(p, _)| p == player)
            .map(|(_, since)| *since)
    }

    pub fn len(&self) -> usize {
        self.list.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.lock().is_empty()
    }

    #[cfg(test)]
    fn capacity(&self) -> usize {
        self.list.lock().capacity()
    }
}
