//! World configuration and its on-disk form
//!
//! The configuration is plain serde data persisted as pretty JSON. Writes go
//! through a temporary file and a rename so a crash never leaves a torn file.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, Result};

/// Configuration for a running world
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// A container holding more players than this is crowded and receives no
    /// observer broadcasts
    pub crowd_size: usize,

    /// Unused capacity (beyond twice the length) tolerated in a container
    /// before Remove compacts its backing storage
    pub compact_slack: usize,

    /// Initial capacity of the actor's message buffer
    pub actor_buffer_capacity: usize,

    /// Seconds before an item left lying around is cleaned up
    pub cleanup_after: u64,

    /// Seconds before a respawning or cleaned up item is put back into play
    pub reset_after: u64,

    /// Seconds between ambient actions
    pub action_after: u64,

    /// Enable debug tracing
    pub debug: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            crowd_size: 10,
            compact_slack: 4,
            // Half of an 80x24 page, location descriptions are the usual reply
            actor_buffer_capacity: (80 * 24) / 2,
            cleanup_after: 600,
            reset_after: 300,
            action_after: 60,
            debug: false,
        }
    }
}

impl WorldConfig {
    /// Cleanup delay as a duration
    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_secs(self.cleanup_after)
    }

    /// Reset delay as a duration
    pub fn reset_delay(&self) -> Duration {
        Duration::from_secs(self.reset_after)
    }

    /// Action interval as a duration
    pub fn action_delay(&self) -> Duration {
        Duration::from_secs(self.action_after)
    }

    /// Reject settings the kernel cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.crowd_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "crowd_size",
                detail: "must be at least 1".to_string(),
            });
        }
        if self.compact_slack == 0 {
            return Err(ConfigError::InvalidValue {
                field: "compact_slack",
                detail: "must be at least 1, zero would compact on every remove".to_string(),
            });
        }
        Ok(())
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }

        let data = fs::read(path).map_err(ConfigError::from)?;
        let config: WorldConfig = serde_json::from_slice(&data).map_err(ConfigError::from)?;
        config.validate()?;

        tracing::debug!("Loaded world config from {:?}", path);
        Ok(config)
    }

    /// Write this configuration atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).map_err(ConfigError::from)?;
        write_atomic(path, &json)?;
        Ok(())
    }
}

/// Write data to a temporary file, sync, then rename over the target
fn write_atomic(path: &Path, data: &[u8]) -> ConfigResult<()> {
    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| ConfigError::AtomicWriteFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let dir = OpenOptions::new().read(true).open(parent)?;
        dir.sync_all()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BurrowError;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("world.json");

        let config = WorldConfig {
            crowd_size: 3,
            compact_slack: 8,
            debug: true,
            ..WorldConfig::default()
        };

        config.save(&path).unwrap();
        let loaded = WorldConfig::load(&path).unwrap();

        assert_eq!(loaded, config);
        assert!(!temp.path().join("world.tmp").exists());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("world.json");
        fs::write(&path, br#"{ "crowd_size": 25 }"#).unwrap();

        let loaded = WorldConfig::load(&path).unwrap();
        assert_eq!(loaded.crowd_size, 25);
        assert_eq!(loaded.compact_slack, WorldConfig::default().compact_slack);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("world.json");
        fs::write(&path, br#"{ "compact_slack": 0 }"#).unwrap();

        let err = WorldConfig::load(&path).unwrap_err();
        assert!(matches!(
            err,
            BurrowError::Config(ConfigError::InvalidValue { field: "compact_slack", .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = WorldConfig::load(&temp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, BurrowError::Config(ConfigError::NotFound(_))));
    }
}
