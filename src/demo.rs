//! A small zone built in code, used by the console driver and the tests

use crate::attr::{
    Action, Alias, Cleanup, Description, Direction, Door, Exits, Name, Narrative, Reset, Writing,
};
use crate::world::{Thing, World};

/// Handles to the demo locations and the things tests poke at
pub struct Zone {
    pub tavern: Thing,
    pub street: Thing,
    pub yard: Thing,
    pub cellar: Thing,
    pub trapdoor: Thing,
    pub sign: Thing,
    pub mug: Thing,
    pub bread: Thing,
    pub cat: Thing,
    pub chest: Thing,
    pub bucket: Thing,
}

fn location(name: &str, description: &str) -> Thing {
    Thing::builder()
        .with(Name::new(name))
        .with(Description::new(description))
        .with(Exits::new())
        .with_inventory()
        .build()
}

/// Build the zone into `world`. The tavern is the start location.
pub fn build(world: &World) -> Zone {
    let config = world.config();

    let tavern = location(
        "The Dragon's Breath",
        "You are in a low, smoky tavern. A fire crackles in the hearth.",
    );
    let street = location(
        "Cobbled Street",
        "A narrow cobbled street runs past the tavern door.",
    );
    let yard = location("Stable Yard", "A muddy yard behind the stables.");
    let cellar = location("Cellar", "A cold cellar that smells of old ale.");

    Exits::link_both(&tavern, Direction::East, &street);
    Exits::link_both(&street, Direction::North, &yard);
    Exits::link_both(&tavern, Direction::Down, &cellar);

    let trapdoor = Thing::builder()
        .with(Name::new("a trapdoor"))
        .with(Alias::new(["TRAPDOOR", "DOOR"]))
        .with(Description::new("A heavy wooden trapdoor set into the floor."))
        .with(Door::new(Direction::Down, false, config.reset_delay()))
        .with(Narrative)
        .build();
    let trapdoor_below = Thing::builder()
        .with(Name::new("a trapdoor"))
        .with(Alias::new(["TRAPDOOR", "DOOR"]))
        .with(Description::new("A heavy wooden trapdoor in the ceiling."))
        .with(Door::new(Direction::Up, false, config.reset_delay()))
        .with(Narrative)
        .build();
    Door::pair(&trapdoor, &trapdoor_below);

    let sign = Thing::builder()
        .with(Name::new("a sign"))
        .with(Alias::new(["SIGN"]))
        .with(Writing::new("The Dragon's Breath. No dragons."))
        .with(Narrative)
        .build();
    let mug = Thing::builder()
        .with(Name::new("a mug"))
        .with(Alias::new(["MUG"]))
        .with(Description::new("A chipped pewter mug."))
        .with(Cleanup::new(config.cleanup_delay()))
        .build();
    let bread = Thing::builder()
        .with(Name::new("a loaf of bread"))
        .with(Alias::new(["BREAD", "LOAF"]))
        .with(Description::new("A crusty loaf, still warm."))
        .with(Cleanup::new(config.cleanup_delay()))
        .with(Reset::new(config.reset_delay(), true))
        .build();
    let cat = Thing::builder()
        .with(Name::new("a tabby cat"))
        .with(Alias::new(["CAT", "TABBY"]))
        .with(Description::new("A fat tabby cat dozing by the fire."))
        .with(Action::new(
            config.action_delay(),
            ["The tabby cat purrs.", "The tabby cat stretches and yawns."],
        ))
        .with(Narrative)
        .build();
    let chest = Thing::builder()
        .with(Name::new("an old chest"))
        .with(Alias::new(["CHEST"]))
        .with(Description::new("An iron bound chest, bolted to the cobbles."))
        .with(Narrative)
        .with_inventory()
        .build();
    let coin = Thing::builder()
        .with(Name::new("a copper coin"))
        .with(Alias::new(["COIN"]))
        .build();
    let bucket = Thing::builder()
        .with(Name::new("a bucket"))
        .with(Alias::new(["BUCKET"]))
        .with(Description::new("A dented bucket."))
        .with(Cleanup::new(config.cleanup_delay()))
        .with(Reset::new(config.reset_delay(), false))
        .build();

    {
        let containers = [
            tavern.inventory(),
            street.inventory(),
            yard.inventory(),
            cellar.inventory(),
            chest.inventory(),
        ];
        let held: Vec<_> = containers.into_iter().flatten().collect();
        let mut locks = world.lock(&held);

        for thing in [&trapdoor, &sign, &mug, &bread, &cat] {
            locks.add(tavern.inventory(), thing);
        }
        locks.add(cellar.inventory(), &trapdoor_below);
        locks.add(street.inventory(), &chest);
        locks.add(chest.inventory(), &coin);
        locks.add(yard.inventory(), &bucket);
    }

    world.add_location(tavern.clone(), true);
    world.add_location(street.clone(), false);
    world.add_location(yard.clone(), false);
    world.add_location(cellar.clone(), false);

    tracing::info!(locations = world.locations().len(), "demo zone built");

    Zone {
        tavern,
        street,
        yard,
        cellar,
        trapdoor,
        sign,
        mug,
        bread,
        cat,
        chest,
        bucket,
    }
}
