//! Container move semantics
//!
//! Exercises Add/Remove/Move through a held lock set together with the
//! lifecycle hooks they fire: cleanup of abandoned items, respawning and
//! returning items to where they started.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use burrow::attr::{
    Alias, CLEANUP_COMMAND, Cleanup, Name, Narrative, Player, RESET_COMMAND, Reset, Veto, Vetoes,
};
use burrow::events::RecordingEvents;
use burrow::world::Thing;
use burrow::{Engine, World, WorldConfig};
use tokio::sync::mpsc::UnboundedReceiver;

fn new_world() -> (Arc<World>, Arc<RecordingEvents>) {
    let events = Arc::new(RecordingEvents::new());
    let world = Arc::new(World::new(WorldConfig::default(), events.clone()));
    (world, events)
}

fn room(name: &str) -> Thing {
    Thing::builder()
        .with(Name::new(name))
        .with_inventory()
        .build()
}

fn player(name: &str) -> (Thing, UnboundedReceiver<String>) {
    let (attr, rx) = Player::new();
    let thing = Thing::builder()
        .with(Name::new(name))
        .with(Alias::new([name]))
        .with(attr)
        .with_inventory()
        .build();
    (thing, rx)
}

fn item(name: &str) -> Thing {
    Thing::builder()
        .with(Name::new(name))
        .with(Alias::new([name]))
        .with(Cleanup::new(Duration::from_secs(60)))
        .build()
}

#[test]
fn test_narrative_ordering_scenario() {
    let (world, _) = new_world();
    let hall = room("hall");
    let at = hall.inventory();

    let ordinary = item("mug");
    let sign = Thing::builder()
        .with(Name::new("a sign"))
        .with(Alias::new(["sign"]))
        .with(Narrative)
        .build();

    let mut locks = world.lock(&[at.unwrap()]);
    locks.add(at, &ordinary);
    locks.add(at, &sign);

    assert_eq!(locks.narratives(at), vec![sign.clone()]);
    assert_eq!(locks.contents(at), vec![ordinary.clone()]);
    assert_eq!(locks.get(at.unwrap()).map(|inv| inv.split()), Some(1));
    assert_eq!(locks.search(at, "SIGN"), Some(sign));
}

#[test]
fn test_move_is_atomic() {
    let (world, _) = new_world();
    let (a, b) = (room("a"), room("b"));
    let (ca, cb) = (a.inventory(), b.inventory());
    let things: Vec<Thing> = (0..5).map(|i| item(&format!("t{}", i))).collect();

    let mut locks = world.lock(&[cb.unwrap(), ca.unwrap()]);
    for t in &things {
        locks.add(ca, t);
    }

    for t in &things {
        let moved = locks.move_thing(t, ca, cb).unwrap();
        assert_eq!(&moved, t);

        let in_a = locks.contents(ca).into_iter().chain(locks.narratives(ca));
        assert!(in_a.filter(|x| x == t).count() == 0);
        let in_b = locks.contents(cb).into_iter().chain(locks.narratives(cb));
        assert_eq!(in_b.filter(|x| x == t).count(), 1);
        assert_eq!(t.location().as_ref(), cb);
    }

    // A second move of the same thing finds nothing to remove
    assert!(locks.move_thing(&things[0], ca, cb).is_none());
    assert_eq!(locks.contents(cb).len(), 5);
}

#[test]
fn test_disabled_search_is_invisible() {
    let (world, _) = new_world();
    let hall = room("hall");
    let at = hall.inventory();
    let ghost = item("ghost");

    let mut locks = world.lock(&[at.unwrap()]);
    locks.add(at, &ghost);
    assert!(locks.disable(at.unwrap(), &ghost));

    assert!(locks.search(at, "ghost").is_none());
    assert!(locks.contents(at).is_empty());
    assert!(locks.narratives(at).is_empty());
    assert_eq!(locks.disabled(at), vec![ghost.clone()]);
    assert_eq!(locks.everything(at), vec![ghost]);
}

#[test]
fn test_abandoned_item_cleanup_scenario() {
    let (world, events) = new_world();
    let field = room("field");
    let (alice, _arx) = player("alice");
    let (bob, _brx) = player("bob");
    let mug = item("mug");
    let spoon = item("spoon");

    let containers = [field.inventory(), alice.inventory(), bob.inventory()];
    let held: Vec<_> = containers.iter().flatten().copied().collect();
    let mut locks = world.lock(&held);
    locks.add(alice.inventory(), &mug);
    locks.add(alice.inventory(), &spoon);
    assert!(events.is_empty());

    // Dropped in an empty location: left lying around
    locks.move_thing(&mug, alice.inventory(), field.inventory());
    assert_eq!(events.pending_for(&mug), vec![CLEANUP_COMMAND.to_string()]);

    // Handed to another player: still carried
    locks.move_thing(&spoon, alice.inventory(), bob.inventory());
    assert!(events.pending_for(&spoon).is_empty());

    // Picking it up again cancels the pending cleanup
    locks.move_thing(&mug, field.inventory(), bob.inventory());
    assert!(events.pending_for(&mug).is_empty());
}

#[test]
fn test_respawn_copy_travels() {
    let (world, events) = new_world();
    let bakery = room("bakery");
    let (alice, _rx) = player("alice");
    let bread = Thing::builder()
        .with(Name::new("a loaf"))
        .with(Alias::new(["loaf"]))
        .with(Reset::new(Duration::from_secs(30), true))
        .build();

    {
        let held = [bakery.inventory().unwrap(), alice.inventory().unwrap()];
        let mut locks = world.lock(&held);
        locks.add(bakery.inventory(), &bread);

        let got = locks
            .move_thing(&bread, bakery.inventory(), alice.inventory())
            .unwrap();

        assert_ne!(got, bread);
        assert_eq!(got.name(""), "a loaf");
        assert_eq!(locks.contents(alice.inventory()), vec![got.clone()]);
        assert_eq!(got.location().as_ref(), alice.inventory());

        // The original waits, disabled, where it was
        assert!(locks.search(bakery.inventory(), "loaf").is_none());
        assert_eq!(locks.disabled(bakery.inventory()), vec![bread.clone()]);
        assert_eq!(bread.location().as_ref(), bakery.inventory());
    }
    assert_eq!(events.pending_for(&bread), vec![RESET_COMMAND.to_string()]);

    // The reset puts the original back into play
    let engine = Engine::new(world.clone());
    engine.run_event(&bread, RESET_COMMAND);

    let locks = world.lock(&[bakery.inventory().unwrap()]);
    assert_eq!(locks.search(bakery.inventory(), "LOAF"), Some(bread.clone()));
    assert!(locks.disabled(bakery.inventory()).is_empty());
}

#[test]
fn test_cleanup_event_removes_abandoned_item() {
    let (world, events) = new_world();
    let field = room("field");
    let (alice, _rx) = player("alice");
    let bag = Thing::builder()
        .with(Name::new("a bag"))
        .with(Alias::new(["bag"]))
        .with(Cleanup::new(Duration::from_secs(60)))
        .with_inventory()
        .build();
    let pebble = item("pebble");

    {
        let held = [
            field.inventory().unwrap(),
            alice.inventory().unwrap(),
            bag.inventory().unwrap(),
        ];
        let mut locks = world.lock(&held);
        locks.add(alice.inventory(), &bag);
        locks.add(bag.inventory(), &pebble);
        locks.move_thing(&bag, alice.inventory(), field.inventory());
    }

    let due = events.take();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].target, bag);

    let engine = Engine::new(world.clone());
    engine.run_event(&due[0].target, &due[0].command);

    assert!(bag.location().is_none());
    assert!(pebble.location().is_none());
    let locks = world.lock(&[field.inventory().unwrap()]);
    assert!(locks.everything(field.inventory()).is_empty());
}

#[test]
fn test_cleanup_skips_item_picked_up_again() {
    let (world, events) = new_world();
    let field = room("field");
    let (alice, _rx) = player("alice");
    let mug = item("mug");

    {
        let held = [field.inventory().unwrap(), alice.inventory().unwrap()];
        let mut locks = world.lock(&held);
        locks.add(alice.inventory(), &mug);
        locks.move_thing(&mug, alice.inventory(), field.inventory());
    }
    let due = events.take();

    // Picked up without the hooks seeing it, e.g. an event already in flight
    {
        let held = [field.inventory().unwrap(), alice.inventory().unwrap()];
        let mut locks = world.lock(&held);
        locks.discard(field.inventory().unwrap(), &mug);
        locks.add(alice.inventory(), &mug);
    }

    let engine = Engine::new(world.clone());
    engine.run_event(&mug, &due[0].command);
    assert_eq!(mug.location().as_ref(), alice.inventory());

    // A later drop starts a fresh cleanup clock
    {
        let held = [field.inventory().unwrap(), alice.inventory().unwrap()];
        let mut locks = world.lock(&held);
        locks.move_thing(&mug, alice.inventory(), field.inventory());
    }
    assert_eq!(events.pending_for(&mug), vec![CLEANUP_COMMAND.to_string()]);
}

#[test]
fn test_cleanup_returns_resettable_item_to_origin() {
    let (world, events) = new_world();
    let yard = room("yard");
    let field = room("field");
    let (alice, _rx) = player("alice");
    let bucket = Thing::builder()
        .with(Name::new("a bucket"))
        .with(Alias::new(["bucket"]))
        .with(Cleanup::new(Duration::from_secs(60)))
        .with(Reset::new(Duration::from_secs(30), false))
        .build();

    {
        let held = [
            yard.inventory().unwrap(),
            field.inventory().unwrap(),
            alice.inventory().unwrap(),
        ];
        let mut locks = world.lock(&held);
        locks.add(yard.inventory(), &bucket);
        let got = locks.move_thing(&bucket, yard.inventory(), alice.inventory());
        assert_eq!(got.as_ref(), Some(&bucket));
        locks.move_thing(&bucket, alice.inventory(), field.inventory());
    }
    assert_eq!(bucket.origin().as_ref(), yard.inventory());
    let due = events.take();
    assert_eq!(due.len(), 1);

    let engine = Engine::new(world.clone());
    engine.run_event(&bucket, &due[0].command);

    assert_eq!(bucket.location().as_ref(), yard.inventory());
    assert_eq!(events.pending_for(&bucket), vec![RESET_COMMAND.to_string()]);
    {
        let held = [yard.inventory().unwrap(), field.inventory().unwrap()];
        let locks = world.lock(&held);
        assert!(locks.everything(field.inventory()).is_empty());
        assert_eq!(locks.disabled(yard.inventory()), vec![bucket.clone()]);
    }

    engine.run_event(&bucket, RESET_COMMAND);
    let locks = world.lock(&[yard.inventory().unwrap()]);
    assert_eq!(locks.contents(yard.inventory()), vec![bucket]);
}

#[test]
fn test_remove_compacts_storage() {
    let (world, _) = new_world();
    let hall = room("hall");
    let at = hall.inventory();
    let slack = world.config().compact_slack;
    let things: Vec<Thing> = (0..64).map(|i| item(&format!("t{}", i))).collect();

    let mut locks = world.lock(&[at.unwrap()]);
    for t in &things {
        locks.add(at, t);
    }

    for t in &things[..60] {
        let (len, cap) = {
            let inv = locks.get(at.unwrap()).unwrap();
            (inv.len(), inv.capacity())
        };
        locks.remove(at, t);

        let inv = locks.get(at.unwrap()).unwrap();
        if cap.saturating_sub((len - 1) * 2) >= slack {
            assert_eq!(inv.capacity(), inv.len());
        } else {
            assert_eq!(inv.capacity(), cap);
        }
    }
}

#[test]
fn test_event_cancelled_while_waiting_for_locks_does_nothing() {
    let (world, events) = new_world();
    let field = room("field");
    let (alice, _rx) = player("alice");
    let mug = item("mug");
    let (at, carried) = (field.inventory().unwrap(), alice.inventory().unwrap());

    {
        let mut locks = world.lock(&[at, carried]);
        locks.add(Some(carried), &mug);
        locks.move_thing(&mug, Some(carried), Some(at));
    }
    let stale = events.take().remove(0);
    let engine = Arc::new(Engine::new(world.clone()));

    let waiting;
    {
        let mut locks = world.lock(&[at, carried]);
        waiting = {
            let engine = engine.clone();
            thread::spawn(move || engine.fire(&stale))
        };
        thread::sleep(Duration::from_millis(20));

        // Picked up and dropped again: the old event is cancelled and a
        // fresh one scheduled
        locks.move_thing(&mug, Some(at), Some(carried));
        locks.move_thing(&mug, Some(carried), Some(at));
    }
    waiting.join().unwrap();

    assert_eq!(mug.location().as_ref(), Some(at));
    assert!(mug.find::<Cleanup>().unwrap().is_pending());
    assert_eq!(events.pending_for(&mug), vec![CLEANUP_COMMAND.to_string()]);
}

#[test]
fn test_vetoed_commands_leave_item_in_place() {
    let (world, _) = new_world();
    let hall = room("hall");
    let (alice, mut arx) = player("alice");
    let (bob, _brx) = player("bob");
    let sword = Thing::builder()
        .with(Name::new("a cursed sword"))
        .with(Alias::new(["sword"]))
        .with(Vetoes::new([
            Veto::new("DROP", "The sword will not leave your hand."),
            Veto::new("GIVE", "The sword will not leave your hand."),
        ]))
        .build();
    let anvil = Thing::builder()
        .with(Name::new("an anvil"))
        .with(Alias::new(["anvil"]))
        .with(Vetoes::new([Veto::new("get", "The anvil is far too heavy.")]))
        .build();
    {
        let at = hall.inventory();
        let mut locks = world.lock(&[at.unwrap(), alice.inventory().unwrap()]);
        locks.add(at, &alice);
        locks.add(at, &bob);
        locks.add(at, &anvil);
        locks.add(alice.inventory(), &sword);
    }
    let engine = Engine::new(world.clone());

    let mut replies = Vec::new();
    for input in ["drop sword", "give sword to bob", "get anvil"] {
        engine.execute(&alice, input);
        replies.push(arx.try_recv().unwrap());
    }

    assert_eq!(
        replies,
        vec![
            "The sword will not leave your hand.".to_string(),
            "The sword will not leave your hand.".to_string(),
            "The anvil is far too heavy.".to_string(),
        ]
    );
    assert_eq!(sword.location().as_ref(), alice.inventory());
    assert_eq!(anvil.location().as_ref(), hall.inventory());
}
