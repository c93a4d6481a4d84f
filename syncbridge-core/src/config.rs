//! Client configuration file.
//!
//! # Location
//!
//! ```text
//! <config_dir>/syncbridge/client.yaml   (e.g. ~/.config/syncbridge/client.yaml)
//! ```
//!
//! Every key is optional. A missing file means all defaults.
//!
//! # API pattern
//!
//! - `load_at(path)` — explicit file; used in tests with `TempDir`
//! - `load()` — derives the path from `dirs::config_dir()`, delegates to `load_at`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::ExcludedMarker;

pub const DEFAULT_BUS_NAME: &str = "org.enigmora.LNXDrive";
pub const DEFAULT_OBJECT_PATH: &str = "/org/enigmora/LNXDrive";
pub const DEFAULT_FILES_INTERFACE: &str = "org.enigmora.LNXDrive.Files";
pub const DEFAULT_SETTINGS_INTERFACE: &str = "org.enigmora.LNXDrive.Settings";

/// Bound for status queries and the config fetch.
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5_000;
/// Bound for pin / unpin / sync; these may move whole files.
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub bus_name: String,
    pub object_path: String,
    pub files_interface: String,
    pub settings_interface: String,
    pub query_timeout_ms: u64,
    pub action_timeout_ms: u64,
    pub excluded_marker: ExcludedMarker,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bus_name: DEFAULT_BUS_NAME.to_string(),
            object_path: DEFAULT_OBJECT_PATH.to_string(),
            files_interface: DEFAULT_FILES_INTERFACE.to_string(),
            settings_interface: DEFAULT_SETTINGS_INTERFACE.to_string(),
            query_timeout_ms: DEFAULT_QUERY_TIMEOUT_MS,
            action_timeout_ms: DEFAULT_ACTION_TIMEOUT_MS,
            excluded_marker: ExcludedMarker::default(),
        }
    }
}

impl ClientConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    /// Load from an explicit file. A missing file yields defaults.
    pub fn load_at(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `<config_dir>/syncbridge/client.yaml`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_at(&default_config_path()?)
    }
}

/// `<config_dir>/syncbridge/client.yaml`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let base = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .ok_or(ConfigError::HomeNotFound)?;
    Ok(base.join("syncbridge").join("client.yaml"))
}
