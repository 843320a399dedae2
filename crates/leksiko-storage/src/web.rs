//! Browser backends: the snapshot lives in IndexedDB, queue state in
//! `localStorage`.

use async_trait::async_trait;
use gloo::storage::errors::StorageError as GlooError;
use gloo::storage::{LocalStorage, Storage};
use js_sys::Uint8Array;
use rexie::{ObjectStore, Rexie, TransactionMode};
use wasm_bindgen::JsValue;

use crate::{BlobStore, KeyValueStore, Result, StorageError};

pub const SNAPSHOT_KEY: &str = "dictionary:compressed_data";

const DATABASE: &str = "leksiko";
const OBJECT_STORE: &str = "snapshot";

fn backend_error(operation: &'static str, key: &str, error: GlooError) -> StorageError {
    StorageError::Backend {
        operation,
        key: key.to_string(),
        message: error.to_string(),
    }
}

fn idb_error(operation: &'static str, error: rexie::Error) -> StorageError {
    StorageError::Backend {
        operation,
        key: SNAPSHOT_KEY.to_string(),
        message: error.to_string(),
    }
}

/// Snapshot kept as raw bytes in one IndexedDB record.
///
/// `localStorage` holds strings only and is capped at a few megabytes per
/// origin, which a full dictionary outgrows.
#[derive(Default)]
pub struct LocalBlobStore;

impl LocalBlobStore {
    async fn open(operation: &'static str) -> Result<Rexie> {
        Rexie::builder(DATABASE)
            .version(1)
            .add_object_store(ObjectStore::new(OBJECT_STORE))
            .build()
            .await
            .map_err(|e| idb_error(operation, e))
    }
}

#[async_trait(?Send)]
impl BlobStore for LocalBlobStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        let db = Self::open("load").await?;
        let tx = db
            .transaction(&[OBJECT_STORE], TransactionMode::ReadOnly)
            .map_err(|e| idb_error("load", e))?;
        let store = tx.store(OBJECT_STORE).map_err(|e| idb_error("load", e))?;

        let value = store
            .get(JsValue::from_str(SNAPSHOT_KEY))
            .await
            .map_err(|e| idb_error("load", e))?;
        tx.done().await.map_err(|e| idb_error("load", e))?;
        db.close();

        Ok(value
            .filter(|v| !v.is_undefined() && !v.is_null())
            .map(|v| Uint8Array::new(&v).to_vec()))
    }

    async fn save(&self, data: &[u8]) -> Result<()> {
        let db = Self::open("save").await?;
        let tx = db
            .transaction(&[OBJECT_STORE], TransactionMode::ReadWrite)
            .map_err(|e| idb_error("save", e))?;
        let store = tx.store(OBJECT_STORE).map_err(|e| idb_error("save", e))?;

        let bytes: JsValue = Uint8Array::from(data).into();
        store
            .put(&bytes, Some(&JsValue::from_str(SNAPSHOT_KEY)))
            .await
            .map_err(|e| idb_error("save", e))?;
        tx.done().await.map_err(|e| idb_error("save", e))?;
        db.close();

        // drop the string copy older builds left in localStorage
        LocalStorage::delete(SNAPSHOT_KEY);
        Ok(())
    }
}

#[derive(Default)]
pub struct LocalKvStore;

#[async_trait(?Send)]
impl KeyValueStore for LocalKvStore {
    async fn load(&self, key: &str) -> Result<Option<serde_json::Value>> {
        match LocalStorage::get::<serde_json::Value>(key) {
            Ok(value) if value.is_null() => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(GlooError::KeyNotFound(_)) => Ok(None),
            Err(e) => Err(backend_error("load", key, e)),
        }
    }

    async fn save(&self, key: &str, value: serde_json::Value) -> Result<()> {
        LocalStorage::set(key, value).map_err(|e| backend_error("save", key, e))
    }
}

/// True when running inside a page with a `window`
pub fn has_window() -> bool {
    web_sys::window().is_some()
}

#[cfg(test)]
mod tests {
    use wasm_bindgen_test::*;

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn test_blob_keeps_bytes_larger_than_local_storage() {
        let store = LocalBlobStore;
        let data: Vec<u8> = (0..16 * 1024 * 1024).map(|i| (i % 251) as u8).collect();

        store.save(&data).await.expect("save");
        assert_eq!(store.load().await.expect("load"), Some(data));
        assert!(LocalStorage::raw().get_item(SNAPSHOT_KEY).ok().flatten().is_none());
    }

    #[wasm_bindgen_test]
    async fn test_kv_null_reads_as_absent() {
        let store = LocalKvStore;
        store
            .save("queue:currentQueueType", serde_json::Value::Null)
            .await
            .expect("save");
        assert_eq!(store.load("queue:currentQueueType").await.expect("load"), None);
    }
}
