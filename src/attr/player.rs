use tokio::sync::mpsc;

use crate::world::Attribute;

/// Marks a thing as a connected player and carries its output sink
#[derive(Debug)]
pub struct Player {
    output: mpsc::UnboundedSender<String>,
}

impl Player {
    /// Create a player attribute and the receiving end of its output
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (output, rx) = mpsc::unbounded_channel();
        (Self { output }, rx)
    }

    /// Send text to the player. Output to a player whose connection has gone
    /// away is dropped.
    pub fn write(&self, text: &str) {
        if self.output.send(text.to_string()).is_err() {
            tracing::debug!("dropping output for disconnected player");
        }
    }
}

impl Attribute for Player {
    // A player is never duplicated
    fn copy(&self) -> Option<Box<dyn Attribute>> {
        None
    }

    fn dump(&self) -> String {
        format!("Player (connected: {})", !self.output.is_closed())
    }
}
