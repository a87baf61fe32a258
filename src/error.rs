//! Error types for the burrow kernel
//!
//! Container and lock operations never fail with an error: they return an
//! absent marker (`None`) the caller must check. The errors here cover the
//! ambient edges of the crate, configuration loading and persistence.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error
#[derive(Debug, Error)]
pub enum BurrowError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A setting holds a value the kernel cannot work with
    #[error("Invalid value for '{field}': {detail}")]
    InvalidValue {
        /// Name of the offending setting
        field: &'static str,
        /// Why the value was rejected
        detail: String,
    },

    /// Atomic write failed
    #[error("Atomic write failed for {path}: {detail}")]
    AtomicWriteFailed {
        /// Path where write failed
        path: PathBuf,
        /// Error details
        detail: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type using BurrowError
pub type Result<T> = std::result::Result<T, BurrowError>;
