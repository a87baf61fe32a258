//! Command processing
//!
//! Every command line runs in its own [`CommandState`]. The state collects
//! the containers the command needs, the handler runs under those locks, and
//! output is delivered once the lock set is stable. See [`state`] for the
//! acquisition protocol and [`messages`] for the fan-out rules.

pub mod handlers;
pub mod messages;
pub mod state;

pub use handlers::{Handler, Handlers};
pub use messages::{Buffer, Messages, Mute};
pub use state::CommandState;

use std::sync::Arc;

use crate::events::Event;
use crate::world::{Thing, World};

use handlers::POOF_COMMAND;

/// Runs commands against a world
pub struct Engine {
    world: Arc<World>,
    handlers: Handlers,
}

impl Engine {
    /// Engine with the bundled handlers
    pub fn new(world: Arc<World>) -> Self {
        Self::with_handlers(world, Handlers::standard())
    }

    pub fn with_handlers(world: Arc<World>, handlers: Handlers) -> Self {
        Self { world, handlers }
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    /// Run a line of player input. Returns false once the actor has quit.
    pub fn execute(&self, actor: &Thing, input: &str) -> bool {
        let mut state = CommandState::new(&self.world, actor, input);
        state.parse(&self.handlers);
        !state.quit
    }

    /// Run a scheduled command as `target`
    pub fn run_event(&self, target: &Thing, command: &str) {
        let mut state = CommandState::new(&self.world, target, command).internal();
        state.parse(&self.handlers);
    }

    /// Run a due event. An event cancelled after it came due, up to the
    /// point its command holds its locks, does nothing.
    pub fn fire(&self, event: &Event) {
        if event.is_cancelled() {
            return;
        }
        let mut state = CommandState::new(&self.world, &event.target, &event.command)
            .internal()
            .cancelled_by(event.cancel_flag());
        state.parse(&self.handlers);
    }

    /// Register a player and place it at a start location. Returns false if
    /// the world has nowhere to start.
    pub fn enter(&self, player: &Thing) -> bool {
        let Some(start) = self.world.start_location() else {
            tracing::warn!("world has no start location");
            return false;
        };
        let Some(at) = start.inventory().cloned() else {
            tracing::warn!(start = %start.name("(unnamed)"), "start location has no inventory");
            return false;
        };

        self.world.players().add(player);

        let mut state = CommandState::new(&self.world, player, POOF_COMMAND).internal();
        state.add_lock(&at);
        state.location = Some(at);
        state.parse(&self.handlers);
        state.ok
    }

    /// Take a player out of the world, e.g. when its connection drops
    pub fn leave(&self, player: &Thing) {
        if self.world.players().since(player).is_some() {
            self.execute(player, "QUIT");
        }
    }
}
