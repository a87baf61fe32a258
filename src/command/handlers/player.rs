//! Commands typed by players

use crate::attr::{Direction, Door, Exits, Vetoes, Writing};
use crate::command::messages::Mute;
use crate::command::state::CommandState;
use crate::world::{Container, Locks, Thing};

/// Describe the actor's location
pub fn look(s: &mut CommandState<'_>, locks: &mut Locks<'_>) {
    let here = s.location.clone();
    let Some(room) = here.as_ref().and_then(Container::owner) else {
        s.msg.actor.write(
            "[The void]\nYou are in a dark void. Around you nothing. No stars, no light, no heat and no sound.",
        );
        return;
    };

    s.msg
        .actor
        .write_join(&["[", &room.name("Somewhere"), "]\n", &room.description()]);

    for thing in locks.contents(here.as_ref()) {
        if thing != s.actor {
            s.msg
                .actor
                .write_join(&["\nYou see ", &thing.name("something"), " here."]);
        }
    }

    if let Some(exits) = room.find::<Exits>() {
        s.msg.actor.write_join(&["\n\n", &exits.list()]);
    }

    let who = s.actor.name("Someone");
    s.observer(&format!("You see {} start looking around.", who));
    s.ok = true;
}

/// Examine a thing here or carried
pub fn examine(s: &mut CommandState<'_>, locks: &mut Locks<'_>) {
    let Some(name) = s.words.first().cloned() else {
        s.msg.actor.write("You go to examine... something?");
        return;
    };

    let carried = s.actor.inventory().cloned();
    if s.want_lock(carried.as_ref()) {
        return;
    }

    let Some(what) = locks
        .search(s.location.as_ref(), &name)
        .or_else(|| locks.search(carried.as_ref(), &name))
    else {
        s.msg
            .actor
            .write_join(&["You see no '", &s.input[0], "' to examine."]);
        return;
    };

    // Listing a container's contents needs its lock as well
    if s.want_lock(what.inventory()) {
        return;
    }

    let what_name = what.name("something");
    s.msg.actor.write_join(&["You examine ", &what_name, "."]);

    let description = what.description();
    if !description.is_empty() {
        s.msg.actor.write_join(&[" ", &description]);
    }
    if let Some(door) = what.find::<Door>() {
        s.msg.actor.write_join(&[" ", door.state()]);
    }
    let listing = locks.list(what.inventory());
    if !listing.is_empty() {
        s.msg.actor.write_join(&[" ", &listing]);
    }

    let who = s.actor.name("Someone");
    s.observer(&format!("You see {} study {}.", who, what_name));
    s.ok = true;
}

/// List what the actor is carrying
pub fn inventory(s: &mut CommandState<'_>, locks: &mut Locks<'_>) {
    let carried = s.actor.inventory().cloned();
    if s.want_lock(carried.as_ref()) {
        return;
    }

    let items = locks.contents(carried.as_ref());
    if items.is_empty() {
        s.msg.actor.write("You are not carrying anything.");
    } else {
        s.msg.actor.write("You are carrying:");
        for item in &items {
            s.msg.actor.write_join(&["\n  ", &item.name("something")]);
        }
    }

    let who = s.actor.name("Someone");
    s.observer(&format!("You see {} rummage through their possessions.", who));
    s.ok = true;
}

/// Read the writing on something here, on the scenery, or carried
pub fn read(s: &mut CommandState<'_>, locks: &mut Locks<'_>) {
    let Some(name) = s.words.first().cloned() else {
        s.msg
            .actor
            .write("Did you want to read something specific?");
        return;
    };

    let carried = s.actor.inventory().cloned();
    if s.want_lock(carried.as_ref()) {
        return;
    }

    let Some(what) = locks
        .search(s.location.as_ref(), &name)
        .or_else(|| locks.search(carried.as_ref(), &name))
    else {
        s.msg
            .actor
            .write_join(&["You see no '", &s.input[0], "' to read."]);
        return;
    };

    let what_name = what.name("something");
    let writing = what
        .find::<Writing>()
        .map(|w| w.writing().to_string())
        .unwrap_or_default();

    if writing.is_empty() {
        s.msg
            .actor
            .write_join(&["You see no writing on ", &what_name, " to read."]);
        return;
    }

    s.msg.actor.write_join(&[
        "You read the writing on ",
        &what_name,
        ". It says: ",
        &writing,
    ]);
    s.ok = true;
}

/// Pick something up from the actor's location
pub fn get(s: &mut CommandState<'_>, locks: &mut Locks<'_>) {
    let Some(name) = s.words.first().cloned() else {
        s.msg.actor.write("You go to get... something?");
        return;
    };

    let carried = s.actor.inventory().cloned();
    if s.want_lock(carried.as_ref()) {
        return;
    }

    let here = s.location.clone();
    let Some(what) = locks.search(here.as_ref(), &name) else {
        s.msg
            .actor
            .write_join(&["You see no '", &s.input[0], "' to get."]);
        return;
    };

    let what_name = what.name("something");
    if what == s.actor {
        s.msg
            .actor
            .write("Trying to pick yourself up by your bootlaces?");
        return;
    }
    if what.is_narrative() {
        s.msg
            .actor
            .write_join(&["For some reason you cannot take ", &what_name, "."]);
        return;
    }
    if what.is_player() {
        s.msg
            .actor
            .write_join(&[&what_name, " does not want to be picked up!"]);
        return;
    }
    if vetoed(s, &what, "GET") {
        return;
    }
    let Some(carried) = carried else {
        s.msg
            .actor
            .write_join(&["You have nowhere to put ", &what_name, "."]);
        return;
    };

    let Some(got) = locks.move_thing(&what, here.as_ref(), Some(&carried)) else {
        s.msg
            .actor
            .write_join(&["For some reason you cannot get ", &what_name, "."]);
        return;
    };

    let got_name = got.name("something");
    s.msg.actor.write_join(&["You get ", &got_name, "."]);
    let who = s.actor.name("Someone");
    s.observer(&format!("You see {} get {}.", who, got_name));
    s.ok = true;
}

/// Put down something the actor is carrying
pub fn drop(s: &mut CommandState<'_>, locks: &mut Locks<'_>) {
    let Some(name) = s.words.first().cloned() else {
        s.msg.actor.write("You go to drop... something?");
        return;
    };

    let carried = s.actor.inventory().cloned();
    if s.want_lock(carried.as_ref()) {
        return;
    }

    let Some(what) = locks.search(carried.as_ref(), &name) else {
        s.msg
            .actor
            .write_join(&["You have no '", &s.input[0], "' to drop."]);
        return;
    };

    if vetoed(s, &what, "DROP") {
        return;
    }

    let what_name = what.name("something");
    let here = s.location.clone();
    if here.is_none() {
        s.msg
            .actor
            .write_join(&["There is nowhere to drop ", &what_name, "."]);
        return;
    }

    let Some(dropped) = locks.move_thing(&what, carried.as_ref(), here.as_ref()) else {
        s.msg
            .actor
            .write_join(&["For some reason you cannot drop ", &what_name, "."]);
        return;
    };

    let dropped_name = dropped.name("something");
    s.msg.actor.write_join(&["You drop ", &dropped_name, "."]);
    let who = s.actor.name("Someone");
    s.observer(&format!("You see {} drop {}.", who, dropped_name));
    s.ok = true;
}

/// Give something carried to another player: GIVE item TO player
pub fn give(s: &mut CommandState<'_>, locks: &mut Locks<'_>) {
    let (Some(item), Some(whom)) = (s.words.first().cloned(), s.words.get(1).cloned()) else {
        s.msg.actor.write("You go to give... something to someone?");
        return;
    };

    let carried = s.actor.inventory().cloned();
    if s.want_lock(carried.as_ref()) {
        return;
    }

    let Some(what) = locks.search(carried.as_ref(), &item) else {
        s.msg
            .actor
            .write_join(&["You have no '", &s.input[0], "' to give."]);
        return;
    };

    let Some(who) = locks.search(s.location.as_ref(), &whom) else {
        s.msg
            .actor
            .write_join(&["You see no '", &s.input[1], "' to give to."]);
        return;
    };

    let what_name = what.name("something");
    let who_name = who.name("someone");
    if who == s.actor {
        s.msg
            .actor
            .write("You cannot give things to yourself.");
        return;
    }
    if vetoed(s, &what, "GIVE") {
        return;
    }

    let receiver = who.inventory().cloned().filter(|_| who.is_player());
    let Some(receiver) = receiver else {
        s.msg.actor.write_join(&[
            &who_name,
            " does not seem interested in ",
            &what_name,
            ".",
        ]);
        return;
    };
    if s.want_lock(&receiver) {
        return;
    }

    let Some(given) = locks.move_thing(&what, carried.as_ref(), Some(&receiver)) else {
        s.msg
            .actor
            .write_join(&["For some reason you cannot give ", &what_name, "."]);
        return;
    };

    let given_name = given.name("something");
    let giver = s.actor.name("Someone");
    s.participant = Some(who);
    s.msg
        .actor
        .write_join(&["You give ", &given_name, " to ", &who_name, "."]);
    s.msg
        .participant
        .write_join(&[&giver, " gives you ", &given_name, "."]);
    s.observer(&format!(
        "You see {} give {} to {}.",
        giver, given_name, who_name
    ));
    s.ok = true;
}

/// Write the reason and return true if `thing` refuses `command`
fn vetoed(s: &mut CommandState<'_>, thing: &Thing, command: &str) -> bool {
    let Some(veto) = thing.find::<Vetoes>().and_then(|v| v.check(&[command]).cloned()) else {
        return false;
    };
    s.msg.actor.write(veto.message());
    true
}

/// Sneeze loudly enough to be heard two locations away
pub fn sneeze(s: &mut CommandState<'_>, _locks: &mut Locks<'_>) {
    let levels = s
        .location
        .as_ref()
        .and_then(Container::owner)
        .map(|room| Exits::within(&room, 2))
        .unwrap_or_default();

    let mut added = false;
    for level in &levels {
        for container in level {
            added |= s.want_lock(container);
        }
    }
    if added {
        return;
    }

    s.msg.actor.write("You sneeze. Aaahhhccchhhooo!");

    let who = s.actor.name("Someone");
    s.observer(&format!("You see {} sneeze.", who));

    for near in levels.get(1).into_iter().flatten() {
        s.msg.observe(Some(near), "You hear a loud sneeze.");
    }
    for far in levels.get(2).into_iter().flatten() {
        s.msg.observe(Some(far), "You hear a sneeze.");
    }
    s.ok = true;
}

/// Move the actor through an exit. Reached either as a direction word or as
/// GO/MOVE followed by one.
pub fn go(s: &mut CommandState<'_>, locks: &mut Locks<'_>) {
    let word = match s.cmd.as_str() {
        "GO" | "MOVE" => s.words.first().cloned(),
        cmd => Some(cmd.to_string()),
    };
    let Some(dir) = word.as_deref().and_then(Direction::parse) else {
        s.msg.actor.write("You wanted to go which way?");
        return;
    };

    let here = s.location.clone();
    let Some(room) = here.as_ref().and_then(Container::owner) else {
        s.msg.actor.write("You cannot go anywhere from here.");
        return;
    };
    let Some(dest) = room.find::<Exits>().and_then(|e| e.towards(dir)) else {
        s.msg
            .actor
            .write_join(&["You can't go ", dir.name(), " from here!"]);
        return;
    };

    if let Some(blocker) = blocking_door(locks, here.as_ref(), dir) {
        s.msg.actor.write_join(&[
            "You cannot go ",
            dir.name(),
            ", ",
            &blocker.name("something"),
            " is blocking your way.",
        ]);
        return;
    }

    let Some(to) = dest.inventory().cloned() else {
        s.msg
            .actor
            .write_join(&["You can't go ", dir.name(), " from here!"]);
        return;
    };
    if s.want_lock(&to) {
        return;
    }

    let actor = s.actor.clone();
    if locks.move_thing(&actor, here.as_ref(), Some(&to)).is_none() {
        s.msg
            .actor
            .write_join(&["For some reason you cannot go ", dir.name(), "."]);
        return;
    }

    let who = actor.name("Someone");
    s.observer(&format!("You see {} go {}.", who, dir));
    s.location = Some(to);
    s.observer(&format!("You see {} enter.", who));

    s.silent(locks, Mute::observers(), look);
    s.ok = true;
}

/// First closed door at `here` blocking `dir`
fn blocking_door(locks: &Locks<'_>, here: Option<&Container>, dir: Direction) -> Option<Thing> {
    locks
        .narratives(here)
        .into_iter()
        .chain(locks.contents(here))
        .find(|t| t.find::<Door>().is_some_and(|d| d.blocks(dir)))
}

pub fn open(s: &mut CommandState<'_>, locks: &mut Locks<'_>) {
    operate(s, locks, true);
}

pub fn close(s: &mut CommandState<'_>, locks: &mut Locks<'_>) {
    operate(s, locks, false);
}

/// Shared body of OPEN and CLOSE
fn operate(s: &mut CommandState<'_>, locks: &mut Locks<'_>, open: bool) {
    let verb = if open { "open" } else { "close" };

    let Some(name) = s.words.first().cloned() else {
        s.msg
            .actor
            .write_join(&["You go to ", verb, "... something?"]);
        return;
    };

    let Some(what) = locks.search(s.location.as_ref(), &name) else {
        s.msg
            .actor
            .write_join(&["You see no '", &s.input[0], "' to ", verb, "."]);
        return;
    };

    let what_name = what.name("something");
    let Some(door) = what.find::<Door>() else {
        s.msg
            .actor
            .write_join(&["You cannot ", verb, " ", &what_name, "."]);
        return;
    };

    if door.is_open() == open {
        let state = if open { " is already open." } else { " is already closed." };
        s.msg.actor.write_join(&[&what_name, state]);
        return;
    }

    // The other side of the door is in another location
    let other = door.other_side();
    let other_at = other.as_ref().and_then(Thing::location);
    if s.want_lock(other_at.as_ref()) {
        return;
    }

    door.operate(&what, open, s.world().events().as_ref());

    let who = s.actor.name("Someone");
    s.msg.actor.write_join(&["You ", verb, " ", &what_name, "."]);
    s.observer(&format!("You see {} {} {}.", who, verb, what_name));

    if let Some(other) = other.filter(|_| other_at != s.location) {
        let text = format!("You see {} {}.", other.name("something"), verb);
        s.msg.observe(other_at.as_ref(), &text);
    }
    s.ok = true;
}

/// List the other players in the world
pub fn who(s: &mut CommandState<'_>, _locks: &mut Locks<'_>) {
    let names = s.world().players().list(Some(&s.actor));

    if names.is_empty() {
        s.msg.actor.write("You are all alone in this world.");
    } else {
        s.msg.actor.write("Also here:");
        for name in &names {
            s.msg.actor.write_join(&["\n  ", name]);
        }
        let count = names.len();
        let noun = if count == 1 { "player" } else { "players" };
        s.msg.actor.write(&format!(
            "\n\nThere {} {} other {} in this world.",
            if count == 1 { "is" } else { "are" },
            count,
            noun
        ));
    }
    s.ok = true;
}

/// Leave the world
pub fn quit(s: &mut CommandState<'_>, locks: &mut Locks<'_>) {
    let actor = s.actor.clone();
    let who = actor.name("Someone");

    s.observer(&format!(
        "{} gives a strangled cry of 'Bye Bye', slowly fades away and is gone.",
        who
    ));
    locks.remove(s.location.as_ref(), &actor);
    s.world().players().remove(&actor);

    s.msg.actor.write("You leave this world behind.");
    s.quit = true;
    s.ok = true;
}
