use std::env;

use serde::{Deserialize, Serialize};

pub(crate) fn default_snapshot_url() -> String {
    "http://localhost:3000/dictionary.json.gz".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Where the gzip-compressed dictionary snapshot is served from
    #[serde(default = "default_snapshot_url")]
    pub snapshot_url: String,
}

impl NetworkConfig {
    pub fn new() -> Self {
        let snapshot_url =
            env::var("LEKSIKO_SNAPSHOT_URL").unwrap_or_else(|_| default_snapshot_url());

        Self { snapshot_url }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            snapshot_url: default_snapshot_url(),
        }
    }
}
