use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use parking_lot::RwLock;

use crate::world::{Attribute, Container, Thing, WeakThing};

/// Direction of travel between locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    Up,
    Down,
}

impl Direction {
    /// Every direction, in listing order
    pub const ALL: [Direction; 10] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::Up,
        Direction::Down,
    ];

    /// Parse a short or long direction word, ignoring case
    pub fn parse(word: &str) -> Option<Self> {
        let dir = match word.to_uppercase().as_str() {
            "N" | "NORTH" => Direction::North,
            "NE" | "NORTHEAST" => Direction::NorthEast,
            "E" | "EAST" => Direction::East,
            "SE" | "SOUTHEAST" => Direction::SouthEast,
            "S" | "SOUTH" => Direction::South,
            "SW" | "SOUTHWEST" => Direction::SouthWest,
            "W" | "WEST" => Direction::West,
            "NW" | "NORTHWEST" => Direction::NorthWest,
            "U" | "UP" => Direction::Up,
            "D" | "DOWN" => Direction::Down,
            _ => return None,
        };
        Some(dir)
    }

    /// Lowercase long name, e.g. "northeast"
    pub fn name(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::NorthEast => "northeast",
            Direction::East => "east",
            Direction::SouthEast => "southeast",
            Direction::South => "south",
            Direction::SouthWest => "southwest",
            Direction::West => "west",
            Direction::NorthWest => "northwest",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// The direction leading back
    pub fn opposite(&self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ways out of a location.
///
/// Exits point at other location things through weak references so linked
/// locations never keep each other alive.
#[derive(Default)]
pub struct Exits {
    exits: RwLock<BTreeMap<Direction, WeakThing>>,
}

impl Exits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a one way exit
    pub fn link(&self, dir: Direction, to: &Thing) {
        self.exits.write().insert(dir, to.downgrade());
    }

    /// Add exits both ways between two locations carrying [`Exits`]
    pub fn link_both(from: &Thing, dir: Direction, to: &Thing) {
        if let Some(exits) = from.find::<Exits>() {
            exits.link(dir, to);
        }
        if let Some(exits) = to.find::<Exits>() {
            exits.link(dir.opposite(), from);
        }
    }

    /// Location reached going `dir`
    pub fn towards(&self, dir: Direction) -> Option<Thing> {
        self.exits.read().get(&dir).and_then(WeakThing::upgrade)
    }

    /// Destinations reachable in one move, in direction order
    pub fn destinations(&self) -> Vec<(Direction, Thing)> {
        self.exits
            .read()
            .iter()
            .filter_map(|(dir, to)| to.upgrade().map(|t| (*dir, t)))
            .collect()
    }

    /// Human readable list of exits
    pub fn list(&self) -> String {
        let names: Vec<&str> = self.exits.read().keys().map(Direction::name).collect();

        match names.as_slice() {
            [] => "You can see no immediate exits from here.".to_string(),
            [only] => format!("The only exit you can see from here is {}.", only),
            [init @ .., last] => format!(
                "You can see exits {} and {}.",
                init.join(", "),
                last
            ),
        }
    }

    /// Location containers reachable from `from` in at most `moves` moves,
    /// grouped by distance. Index 0 holds `from`'s own container and every
    /// container appears once, at its shortest distance.
    pub fn within(from: &Thing, moves: usize) -> Vec<Vec<Container>> {
        let mut levels: Vec<Vec<Container>> = vec![Vec::new(); moves + 1];
        let Some(start) = from.inventory() else {
            return levels;
        };

        let mut seen = vec![start.clone()];
        let mut queue = VecDeque::from([(from.clone(), 0)]);
        levels[0].push(start.clone());

        while let Some((loc, distance)) = queue.pop_front() {
            if distance == moves {
                continue;
            }
            let Some(exits) = loc.find::<Exits>() else {
                continue;
            };
            for (_, next) in exits.destinations() {
                let Some(inv) = next.inventory() else {
                    continue;
                };
                if seen.contains(inv) {
                    continue;
                }
                seen.push(inv.clone());
                levels[distance + 1].push(inv.clone());
                queue.push_back((next.clone(), distance + 1));
            }
        }

        levels
    }
}

impl Attribute for Exits {
    // Exits are wiring between particular locations
    fn copy(&self) -> Option<Box<dyn Attribute>> {
        None
    }

    fn dump(&self) -> String {
        let exits: Vec<String> = self
            .destinations()
            .into_iter()
            .map(|(dir, to)| format!("{} -> {}", dir, to.name("(unnamed)")))
            .collect();
        format!("Exits: {}", exits.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::Name;

    fn room(name: &str) -> Thing {
        Thing::builder()
            .with(Name::new(name))
            .with(Exits::new())
            .with_inventory()
            .build()
    }

    #[test]
    fn test_parse_and_opposite() {
        assert_eq!(Direction::parse("ne"), Some(Direction::NorthEast));
        assert_eq!(Direction::parse("DOWN"), Some(Direction::Down));
        assert_eq!(Direction::parse("sideways"), None);
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn test_list_phrasing() {
        let a = room("a");
        let b = room("b");
        let c = room("c");
        let exits = a.find::<Exits>().unwrap();
        assert_eq!(exits.list(), "You can see no immediate exits from here.");

        Exits::link_both(&a, Direction::East, &b);
        assert_eq!(
            exits.list(),
            "The only exit you can see from here is east."
        );

        Exits::link_both(&a, Direction::North, &c);
        assert_eq!(exits.list(), "You can see exits north and east.");
        assert_eq!(
            b.find::<Exits>().unwrap().towards(Direction::West),
            Some(a.clone())
        );
    }

    #[test]
    fn test_within_groups_by_distance() {
        // a - b - c - d in a line, plus a loop b - e - c
        let rooms: Vec<Thing> = ["a", "b", "c", "d", "e"].into_iter().map(room).collect();
        let inv = |i: usize| rooms[i].inventory().unwrap().clone();
        Exits::link_both(&rooms[0], Direction::East, &rooms[1]);
        Exits::link_both(&rooms[1], Direction::East, &rooms[2]);
        Exits::link_both(&rooms[2], Direction::East, &rooms[3]);
        Exits::link_both(&rooms[1], Direction::North, &rooms[4]);
        Exits::link_both(&rooms[4], Direction::SouthEast, &rooms[2]);

        let levels = Exits::within(&rooms[0], 2);

        assert_eq!(levels.len(), 3);
        assert_eq!(levels[0], vec![inv(0)]);
        assert_eq!(levels[1], vec![inv(1)]);
        assert_eq!(levels[2].len(), 2);
        assert!(levels[2].contains(&inv(2)));
        assert!(levels[2].contains(&inv(4)));
    }
}
