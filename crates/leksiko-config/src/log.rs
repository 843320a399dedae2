use std::env;

use serde::{Deserialize, Serialize};

use crate::env_flag;

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl LogConfig {
    pub fn new() -> Self {
        let level = env::var("LEKSIKO_LOG").unwrap_or_else(|_| default_level());
        let json = env_flag("LEKSIKO_LOG_JSON").unwrap_or(false);

        Self { level, json }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}
