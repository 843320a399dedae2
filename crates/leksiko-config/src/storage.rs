use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::env_flag;

/// Forces a backend family instead of probing the running environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOverride {
    #[default]
    Auto,
    Native,
    Browser,
    Memory,
    None,
}

impl HostOverride {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostOverride::Auto => "auto",
            HostOverride::Native => "native",
            HostOverride::Browser => "browser",
            HostOverride::Memory => "memory",
            HostOverride::None => "none",
        }
    }
}

impl FromStr for HostOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(HostOverride::Auto),
            "native" => Ok(HostOverride::Native),
            "browser" => Ok(HostOverride::Browser),
            "memory" => Ok(HostOverride::Memory),
            "none" => Ok(HostOverride::None),
            other => Err(format!("unknown host override: {other}")),
        }
    }
}

impl fmt::Display for HostOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("leksiko"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Keep the compressed snapshot in the local blob store between sessions
    #[serde(default)]
    pub store_locally: bool,
    /// Root for the native backends; `None` when no data dir can be resolved
    #[serde(default = "default_data_dir")]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub host: HostOverride,
}

impl StorageConfig {
    pub fn new() -> Self {
        let store_locally = env_flag("LEKSIKO_STORE_LOCALLY").unwrap_or(false);

        let data_dir = env::var("LEKSIKO_DATA_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(default_data_dir);

        let host = env::var("LEKSIKO_HOST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        Self {
            store_locally,
            data_dir,
            host,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_locally: false,
            data_dir: default_data_dir(),
            host: HostOverride::Auto,
        }
    }
}
