//! Capabilities things can carry
//!
//! Each attribute is a small type implementing [`Attribute`]. Things are
//! queried for them with [`Thing::find`], which returns `None` when the
//! capability is missing.
//!
//! [`Attribute`]: crate::world::Attribute
//! [`Thing::find`]: crate::world::Thing::find

mod action;
mod alias;
mod cleanup;
mod description;
mod door;
mod exits;
mod name;
mod narrative;
mod player;
mod reset;
mod veto;
mod writing;

pub use action::{ACTION_COMMAND, Action};
pub use alias::Alias;
pub use cleanup::{CLEANUP_COMMAND, Cleanup};
pub use description::Description;
pub use door::{DOOR_COMMAND, Door};
pub use exits::{Direction, Exits};
pub use name::Name;
pub use narrative::Narrative;
pub use player::Player;
pub use reset::{RESET_COMMAND, Reset};
pub use veto::{Veto, Vetoes};
pub use writing::Writing;

use parking_lot::Mutex;

use crate::events::CancelHandle;

/// Slot for the single outstanding event of a stateful attribute
#[derive(Debug, Default)]
pub(crate) struct Pending(Mutex<Option<CancelHandle>>);

impl Pending {
    /// True if an event is outstanding
    pub(crate) fn is_set(&self) -> bool {
        self.0.lock().as_ref().is_some_and(|h| !h.is_cancelled())
    }

    /// Store a new handle, cancelling the one it replaces
    pub(crate) fn replace(&self, handle: CancelHandle) {
        if let Some(old) = self.0.lock().replace(handle) {
            old.cancel();
        }
    }

    /// Cancel the outstanding event, if any
    pub(crate) fn cancel(&self) -> bool {
        match self.0.lock().take() {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Forget the outstanding event without cancelling it. Used once the
    /// event has been delivered.
    pub(crate) fn clear(&self) {
        self.0.lock().take();
    }
}
