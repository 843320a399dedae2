use async_trait::async_trait;

use crate::error::{Error, Result};

/// Where compressed snapshots come from
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the whole compressed snapshot, exactly as served
    async fn fetch(&self) -> Result<Vec<u8>>;

    /// Human-readable origin for logs
    fn describe(&self) -> String;
}

/// Downloads the snapshot over HTTP in one request
#[derive(Clone)]
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSnapshotSource {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    fn fetch_error(&self, message: impl ToString) -> Error {
        Error::Fetch {
            url: self.url.clone(),
            message: message.to_string(),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.fetch_error(e))?;

        if !response.status().is_success() {
            return Err(self.fetch_error(format!("HTTP {}", response.status())));
        }

        let bytes = response.bytes().await.map_err(|e| self.fetch_error(e))?;
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
