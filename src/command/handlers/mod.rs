//! Command dispatch table
//!
//! Handlers are plain functions looked up by their exact uppercase command
//! word. Every handler follows the same discipline: resolve what it needs,
//! ask for any missing container with `want_lock` and return if one was
//! added, and only then change the world and write messages.

mod internal;
mod player;

use std::collections::HashMap;

use crate::attr::{ACTION_COMMAND, CLEANUP_COMMAND, DOOR_COMMAND, RESET_COMMAND};
use crate::world::Locks;

use super::state::CommandState;

pub use internal::POOF_COMMAND;
pub use player::look;

/// A command handler
pub type Handler = fn(&mut CommandState<'_>, &mut Locks<'_>);

/// Mapping from command word to handler
#[derive(Clone, Default)]
pub struct Handlers {
    table: HashMap<String, Handler>,
}

impl Handlers {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under every name in `names`, replacing earlier
    /// registrations
    pub fn register(&mut self, names: &[&str], handler: Handler) {
        for name in names {
            self.table.insert(name.to_uppercase(), handler);
        }
    }

    /// Handler for an uppercase command word
    pub fn get(&self, cmd: &str) -> Option<Handler> {
        self.table.get(cmd).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Table with every bundled command
    pub fn standard() -> Self {
        let mut handlers = Self::new();

        handlers.register(&["LOOK", "L"], player::look);
        handlers.register(&["EXAMINE", "EXAM", "X"], player::examine);
        handlers.register(&["INVENTORY", "INV"], player::inventory);
        handlers.register(&["READ"], player::read);
        handlers.register(&["GET", "TAKE"], player::get);
        handlers.register(&["DROP"], player::drop);
        handlers.register(&["GIVE"], player::give);
        handlers.register(&["SNEEZE"], player::sneeze);
        handlers.register(
            &[
                "GO",
                "MOVE",
                "N",
                "NORTH",
                "NE",
                "NORTHEAST",
                "E",
                "EAST",
                "SE",
                "SOUTHEAST",
                "S",
                "SOUTH",
                "SW",
                "SOUTHWEST",
                "W",
                "WEST",
                "NW",
                "NORTHWEST",
                "U",
                "UP",
                "D",
                "DOWN",
            ],
            player::go,
        );
        handlers.register(&["OPEN"], player::open);
        handlers.register(&["CLOSE"], player::close);
        handlers.register(&["WHO"], player::who);
        handlers.register(&["QUIT"], player::quit);

        handlers.register(&[POOF_COMMAND], internal::poof);
        handlers.register(&[CLEANUP_COMMAND], internal::cleanup);
        handlers.register(&[RESET_COMMAND], internal::reset);
        handlers.register(&[ACTION_COMMAND], internal::action);
        handlers.register(&[DOOR_COMMAND], internal::door);

        handlers
    }
}
