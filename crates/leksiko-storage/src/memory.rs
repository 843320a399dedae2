use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::{BlobStore, KeyValueStore, Result, StorageError};

fn poisoned(operation: &'static str, key: &str) -> StorageError {
    StorageError::Backend {
        operation,
        key: key.to_string(),
        message: "lock poisoned".to_string(),
    }
}

/// In-process blob slot, gone when the process exits
#[derive(Default)]
pub struct MemoryBlobStore {
    slot: RwLock<Option<Vec<u8>>>,
    writes: RwLock<usize>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far
    pub fn write_count(&self) -> usize {
        self.writes.read().map(|w| *w).unwrap_or(0)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl BlobStore for MemoryBlobStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        let slot = self.slot.read().map_err(|_| poisoned("load", "blob"))?;
        Ok(slot.clone())
    }

    async fn save(&self, data: &[u8]) -> Result<()> {
        {
            let mut slot = self.slot.write().map_err(|_| poisoned("save", "blob"))?;
            *slot = Some(data.to_vec());
        }
        let mut writes = self.writes.write().map_err(|_| poisoned("save", "blob"))?;
        *writes += 1;
        Ok(())
    }
}

/// In-process key-value map, gone when the process exits
#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, serde_json::Value>>,
    writes: RwLock<HashMap<String, usize>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saves to `key` so far
    pub fn write_count(&self, key: &str) -> usize {
        self.writes
            .read()
            .map(|w| w.get(key).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Number of saves across all keys
    pub fn total_writes(&self) -> usize {
        self.writes.read().map(|w| w.values().sum()).unwrap_or(0)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl KeyValueStore for MemoryKvStore {
    async fn load(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let entries = self.entries.read().map_err(|_| poisoned("load", key))?;
        Ok(entries.get(key).filter(|v| !v.is_null()).cloned())
    }

    async fn save(&self, key: &str, value: serde_json::Value) -> Result<()> {
        {
            let mut entries = self.entries.write().map_err(|_| poisoned("save", key))?;
            entries.insert(key.to_string(), value);
        }
        let mut writes = self.writes.write().map_err(|_| poisoned("save", key))?;
        *writes.entry(key.to_string()).or_default() += 1;
        Ok(())
    }
}
