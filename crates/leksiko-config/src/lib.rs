use std::env;

use serde::{Deserialize, Serialize};

use self::log::LogConfig;
use self::network::NetworkConfig;
use self::storage::StorageConfig;

pub mod log;
pub mod network;
pub mod storage;

pub use self::storage::HostOverride;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

impl Config {
    /// Build a config from `LEKSIKO_*` environment variables, using defaults
    /// for anything unset or unparsable.
    pub fn new() -> Self {
        Config {
            network: NetworkConfig::new(),
            storage: StorageConfig::new(),
            log: LogConfig::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            storage: StorageConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Reads a boolean flag, accepting `1`/`0` as well as `true`/`false`.
pub(crate) fn env_flag(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}
