use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dlcscan_steam::{BlockList, SteamConfig, DEFAULT_MARKERS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Knobs of a discovery run; every field has a sensible default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryOptions {
    pub steam: SteamConfig,
    /// Enable new applications and select DLC seen for the first time.
    pub select_all_new: bool,
    /// Skip games listed in `block_list`.
    pub block_protected: bool,
    pub block_list: BlockList,
    /// Files identifying a Steamworks integration directory.
    pub markers: Vec<String>,
    /// Pause between spawning successive DLC lookups, in milliseconds.
    pub spawn_delay_ms: u64,
    /// Where cached app-info dumps live; defaults to the user cache directory.
    pub cache_dir: Option<PathBuf>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            steam: SteamConfig::default(),
            select_all_new: false,
            block_protected: true,
            block_list: BlockList::default(),
            markers: DEFAULT_MARKERS.iter().map(|marker| marker.to_string()).collect(),
            spawn_delay_ms: 10,
            cache_dir: None,
        }
    }
}

impl DiscoveryOptions {
    /// Loads options from a JSON file; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn spawn_delay(&self) -> Duration {
        Duration::from_millis(self.spawn_delay_ms)
    }
}
