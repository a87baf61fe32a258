//! Burrow – the concurrency and container kernel of a shared text world
//!
//! Many players issue commands at once against one graph of locations and
//! containers. This crate provides:
//! - Containers with a narrative prefix, a disabled set and atomic moves
//!   that fire lifecycle hooks (cleanup, ambient actions, respawn)
//! - A per-command processing state that discovers the containers it needs
//!   while running and retries until its lock set is stable, always locking
//!   in ascending lock id order
//! - Buffered message fan-out to the actor, a participant and observers,
//!   delivered only once a command is stable
//! - Scheduled events for cleanup, resets, doors and ambient actions
//! - A small bundled command set and demo zone exercising all of the above

#![warn(rust_2018_idioms)]

pub mod attr;
pub mod command;
pub mod config;
pub mod demo;
pub mod error;
pub mod events;
pub mod world;

// Re-export key types for convenience
pub use command::Engine;
pub use config::WorldConfig;
pub use error::{BurrowError, Result};
pub use world::World;

/// Current version of the kernel
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
