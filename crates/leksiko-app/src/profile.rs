use std::fs;
use std::path::{Path, PathBuf};

use leksiko_config::Config;
use serde::{Deserialize, Serialize};

const PROFILE_FILE: &str = "profile.json";

/// Saved settings, stored next to the dictionary data
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

pub fn profile_path(data_dir: &Path) -> PathBuf {
    data_dir.join(PROFILE_FILE)
}

/// Config from the profile in `data_dir` if there is one
pub fn load_profile(data_dir: &Path) -> anyhow::Result<Option<Config>> {
    let path = profile_path(data_dir);
    if !path.exists() {
        return Ok(None);
    }

    let data = fs::read_to_string(&path)?;
    let profile: Profile = serde_json::from_str(&data)?;
    Ok(Some(profile.value))
}

/// Resolve the effective config: environment first, then the profile found
/// under the environment's data dir replaces it wholesale.
///
/// Returns the profile path when one was used.
pub fn resolve_config() -> anyhow::Result<(Config, Option<PathBuf>)> {
    let env_config = Config::new();

    let Some(data_dir) = env_config.storage.data_dir.clone() else {
        return Ok((env_config, None));
    };

    match load_profile(&data_dir)? {
        Some(mut config) => {
            // data stays next to the profile that was read
            config.storage.data_dir = Some(data_dir.clone());
            Ok((config, Some(profile_path(&data_dir))))
        }
        None => Ok((env_config, None)),
    }
}

/// Write `config` as the main profile unless one already exists
pub fn init_profile(data_dir: &Path, config: &Config) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(data_dir)?;

    let path = profile_path(data_dir);
    if path.exists() {
        tracing::info!("Profile already exists at {}", path.display());
        return Ok(path);
    }

    let profile = Profile {
        name: "main".into(),
        value: config.clone(),
    };
    fs::write(&path, serde_json::to_string_pretty(&profile)?)?;
    tracing::info!("Created profile at {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_profile_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load_profile(dir.path()).unwrap().is_none());
    }

    #[test]
    fn init_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.store_locally = true;
        config.network.snapshot_url = "https://example.org/el.json.gz".into();

        let path = init_profile(dir.path(), &config).unwrap();
        assert_eq!(path, dir.path().join("profile.json"));

        let loaded = load_profile(dir.path()).unwrap().unwrap();
        assert!(loaded.storage.store_locally);
        assert_eq!(loaded.network.snapshot_url, "https://example.org/el.json.gz");
    }

    #[test]
    fn init_keeps_existing_profile() {
        let dir = TempDir::new().unwrap();
        fs::write(
            profile_path(dir.path()),
            r#"{ "name": "main", "value": { "log": { "level": "debug" } } }"#,
        )
        .unwrap();

        init_profile(dir.path(), &Config::default()).unwrap();

        let loaded = load_profile(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.log.level, "debug");
        assert!(!loaded.storage.store_locally);
    }

    #[test]
    fn malformed_profile_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(profile_path(dir.path()), "{ not json").unwrap();
        assert!(load_profile(dir.path()).is_err());
    }
}
