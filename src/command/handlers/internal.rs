//! Commands the world runs on behalf of things, mostly from scheduled events.
//! Their names start with `$` so players cannot type them.

use crate::attr::{Action, Cleanup, Door, Reset};
use crate::command::messages::Mute;
use crate::command::state::CommandState;
use crate::world::{Container, Locks};

use super::player::look;

/// Internal command placing a player into the world
pub const POOF_COMMAND: &str = "$POOF";

/// Place the actor at the state's location, which the engine points at a
/// start location before running this
pub fn poof(s: &mut CommandState<'_>, locks: &mut Locks<'_>) {
    let Some(here) = s.location.clone() else {
        s.msg.actor.write("There is nowhere for you to appear.");
        return;
    };

    let actor = s.actor.clone();
    if actor.location().is_some() {
        return;
    }
    if locks.add(Some(&here), &actor).is_none() {
        return;
    }

    let who = actor.name("Someone");
    s.msg.actor.write("You appear in a puff of smoke.\n\n");
    s.observer(&format!("There is a puff of smoke and {} appears.", who));
    s.silent(locks, Mute::observers(), look);
    s.ok = true;
}

/// Remove an item left lying around. Items that reset without spawning are
/// returned, disabled, to where they started.
pub fn cleanup(s: &mut CommandState<'_>, locks: &mut Locks<'_>) {
    let item = s.actor.clone();
    let Some(here) = s.location.clone() else {
        return;
    };

    // Moved after the state was created. Whatever moved it has cancelled
    // this event or scheduled a fresh one, so leave the pending slot alone.
    if !locks.get(&here).is_some_and(|inv| inv.contains(&item)) {
        tracing::debug!(item = %item.id(), "cleanup target has moved");
        return;
    }

    // Picked up again since the event was scheduled
    if here.carried() {
        if let Some(cleanup) = item.find::<Cleanup>() {
            cleanup.fired();
        }
        return;
    }

    // Everything nested inside the item goes with it, and each nested
    // container has to be locked before its contents can be read
    let mut added = false;
    let mut nested = Vec::new();
    let mut pending: Vec<Container> = item.inventory().into_iter().cloned().collect();
    while let Some(container) = pending.pop() {
        if s.want_lock(&container) {
            added = true;
            continue;
        }
        for thing in locks.everything(Some(&container)) {
            pending.extend(thing.inventory().cloned());
            nested.push((container.clone(), thing));
        }
    }

    let reset = item.find::<Reset>().filter(|r| !r.spawns());
    let origin = reset.and_then(|_| item.origin());
    added |= s.want_lock(origin.as_ref());
    if added {
        return;
    }

    if let Some(cleanup) = item.find::<Cleanup>() {
        cleanup.fired();
    }

    let lifecycle = s.world().lifecycle().clone();
    for (container, thing) in &nested {
        locks.discard(container, thing);
        lifecycle.free(thing);
    }

    if !locks.discard(&here, &item) {
        return;
    }
    lifecycle.free(&item);

    if let (Some(reset), Some(origin)) = (reset, origin) {
        locks.add_disabled(&origin, &item);
        reset.schedule(&item, s.world().events().as_ref());
    }

    let name = item.name("something");
    s.observer(&format!(
        "You thought you noticed {} here, but you can't see it now.",
        name
    ));
    tracing::debug!(item = %item.id(), nested = nested.len(), "cleaned up");
    s.ok = true;
}

/// Put a disabled item back into play where it is
pub fn reset(s: &mut CommandState<'_>, locks: &mut Locks<'_>) {
    let item = s.actor.clone();
    let Some(here) = s.location.clone() else {
        return;
    };

    if let Some(reset) = item.find::<Reset>() {
        reset.fired();
    }
    if !locks.enable(&here, &item) {
        return;
    }
    s.world().lifecycle().action_begin(&item);

    let name = item.name("something");
    s.observer(&format!("You notice {} that you didn't see before.", name));
    s.ok = true;
}

/// Show the item's next ambient message to whoever is in the location
/// ultimately containing it, then schedule the following one
pub fn action(s: &mut CommandState<'_>, locks: &mut Locks<'_>) {
    let item = s.actor.clone();
    let Some(here) = s.location.clone() else {
        return;
    };
    let Some(action) = item.find::<Action>() else {
        return;
    };

    let outer = here.outermost();
    if s.want_lock(&outer) {
        return;
    }

    // Only things in play act
    let in_play = locks
        .get(&here)
        .is_some_and(|inv| inv.contains(&item));
    action.fired();
    if !in_play {
        return;
    }

    if let Some(text) = action.next_message() {
        s.msg.observe(Some(&outer), text);
    }
    s.world().lifecycle().action_begin(&item);
    s.ok = true;
}

/// Return a door, and its other side, to the initial state
pub fn door(s: &mut CommandState<'_>, _locks: &mut Locks<'_>) {
    let thing = s.actor.clone();
    let Some(door) = thing.find::<Door>() else {
        return;
    };

    let other = door.other_side();
    let other_at = other.as_ref().and_then(|o| o.location());
    if s.want_lock(other_at.as_ref()) {
        return;
    }

    if !door.reset() {
        return;
    }

    let verb = if door.is_open() { "open" } else { "close" };
    s.observer(&format!("You see {} {}.", thing.name("something"), verb));
    if let Some(other) = other.filter(|_| other_at != s.location) {
        let text = format!("You see {} {}.", other.name("something"), verb);
        s.msg.observe(other_at.as_ref(), &text);
    }
    s.ok = true;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::attr::{Alias, CLEANUP_COMMAND, Name, Player};
    use crate::command::Handlers;
    use crate::config::WorldConfig;
    use crate::events::RecordingEvents;
    use crate::world::{Thing, World};

    fn bag_with_coin() -> (Thing, Thing) {
        let bag = Thing::builder()
            .with(Name::new("a bag"))
            .with(Alias::new(["BAG"]))
            .with(Cleanup::new(Duration::from_secs(60)))
            .with_inventory()
            .build();
        let coin = Thing::builder().with(Name::new("a coin")).build();
        (bag, coin)
    }

    #[test]
    fn test_cleanup_leaves_bag_moved_before_locking() {
        let world = World::new(WorldConfig::default(), Arc::new(RecordingEvents::new()));
        let room = Thing::builder().with_inventory().build();
        let (player, _rx) = Player::new();
        let hero = Thing::builder().with(player).with_inventory().build();
        let (bag, coin) = bag_with_coin();
        let (at, carried) = (room.inventory().unwrap(), hero.inventory().unwrap());
        {
            let mut locks = world.lock(&[at, bag.inventory().unwrap()]);
            locks.add(Some(at), &bag);
            locks.add(bag.inventory(), &coin);
        }

        // The event's state still points at the room
        let mut state = CommandState::new(&world, &bag, CLEANUP_COMMAND).internal();
        {
            let mut locks = world.lock(&[at, carried]);
            locks.move_thing(&bag, Some(at), Some(carried));
        }
        state.parse(&Handlers::standard());

        assert_eq!(bag.location().as_ref(), Some(carried));
        assert_eq!(coin.location().as_ref(), bag.inventory());
        let locks = world.lock(&[carried, bag.inventory().unwrap()]);
        assert_eq!(locks.contents(bag.inventory()), vec![coin.clone()]);
        assert_eq!(locks.contents(Some(carried)), vec![bag.clone()]);
    }

    #[test]
    fn test_cleanup_keeps_fresh_event_after_item_moved_on() {
        let events = Arc::new(RecordingEvents::new());
        let world = World::new(WorldConfig::default(), events.clone());
        let (field, yard) = (
            Thing::builder().with_inventory().build(),
            Thing::builder().with_inventory().build(),
        );
        let (a, b) = (field.inventory().unwrap(), yard.inventory().unwrap());
        let (bag, _coin) = bag_with_coin();
        {
            let mut locks = world.lock(&[a]);
            locks.add(Some(a), &bag);
        }

        let mut state = CommandState::new(&world, &bag, CLEANUP_COMMAND).internal();
        {
            let mut locks = world.lock(&[a, b]);
            locks.move_thing(&bag, Some(a), Some(b));
        }
        assert_eq!(events.pending_for(&bag), vec![CLEANUP_COMMAND.to_string()]);
        state.parse(&Handlers::standard());

        assert_eq!(bag.location().as_ref(), Some(b));
        assert!(bag.find::<Cleanup>().unwrap().is_pending());
        assert_eq!(events.pending_for(&bag), vec![CLEANUP_COMMAND.to_string()]);
    }
}
