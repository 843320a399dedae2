//! File-system backends for native hosts.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::{BlobStore, KeyValueStore, Result, StorageError};

pub const SNAPSHOT_FILE_NAME: &str = "dictionary.json.gz";
pub const KV_DIR_NAME: &str = "kv";

fn io_error(operation: &'static str, key: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        operation,
        key: key.display().to_string(),
        source,
    }
}

/// Write through a sibling temp file so readers never see a torn value
async fn write_replace(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error("create_dir", parent, e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, data)
        .await
        .map_err(|e| io_error("write", &tmp, e))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| io_error("rename", path, e))
}

/// Compressed snapshot kept as one file in the data dir
pub struct FileBlobStore {
    path: PathBuf,
}

impl FileBlobStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SNAPSHOT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("load", &self.path, e)),
        }
    }

    async fn save(&self, data: &[u8]) -> Result<()> {
        write_replace(&self.path, data).await?;
        tracing::debug!("Saved {} snapshot bytes to {}", data.len(), self.path.display());
        Ok(())
    }
}

/// One JSON file per key, so a save rewrites only that key
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(KV_DIR_NAME))
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn load(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let path = self.key_path(key);
        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("load", &path, e)),
        };

        let value: serde_json::Value =
            serde_json::from_slice(&data).map_err(|source| StorageError::Json {
                key: key.to_string(),
                source,
            })?;

        Ok(if value.is_null() { None } else { Some(value) })
    }

    async fn save(&self, key: &str, value: serde_json::Value) -> Result<()> {
        let data = serde_json::to_vec(&value).map_err(|source| StorageError::Json {
            key: key.to_string(),
            source,
        })?;
        write_replace(&self.key_path(key), &data).await
    }
}
