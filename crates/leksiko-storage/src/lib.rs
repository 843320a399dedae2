//! Persistence primitives shared by the dictionary and the queues.
//!
//! Two contracts with different cost profiles: a [`BlobStore`] holding one
//! large, rarely written byte buffer, and a [`KeyValueStore`] holding small
//! JSON values where a write touches only the key being saved. Which concrete
//! family backs them is decided once per process by [`Platform`].

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub mod error;
pub mod memory;
#[cfg(not(target_arch = "wasm32"))]
pub mod native;
pub mod platform;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use self::error::{Result, StorageError};
pub use self::memory::{MemoryBlobStore, MemoryKvStore};
#[cfg(not(target_arch = "wasm32"))]
pub use self::native::{FileBlobStore, FileKvStore};
pub use self::platform::{EnvironmentProbe, FixedProbe, HostEnvironment, Platform, TargetProbe};

/// Single named slot for an opaque byte buffer
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait BlobStore: Send + Sync {
    /// Read the slot, `None` if nothing was ever saved
    async fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the slot contents
    async fn save(&self, data: &[u8]) -> Result<()>;
}

/// String-keyed store of small JSON values
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait KeyValueStore: Send + Sync {
    /// Read one key. A stored JSON `null` is reported as absent.
    async fn load(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Write one key without touching any other
    async fn save(&self, key: &str, value: serde_json::Value) -> Result<()>;
}

/// Load a key and deserialize it into `T`
pub async fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    match store.load(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StorageError::Json {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Serialize `value` and save it under `key`
pub async fn save_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(value).map_err(|source| StorageError::Json {
        key: key.to_string(),
        source,
    })?;
    store.save(key, value).await
}
