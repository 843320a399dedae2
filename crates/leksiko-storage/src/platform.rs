use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use leksiko_config::HostOverride;
use leksiko_config::storage::StorageConfig;

use crate::memory::{MemoryBlobStore, MemoryKvStore};
use crate::{BlobStore, KeyValueStore, Result, StorageError};

/// Backend family the process is hosted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEnvironment {
    /// Running in a page, backed by `localStorage`
    Browser,
    /// Running natively with a writable data directory
    NativeShell,
    /// Ephemeral in-process stores
    Memory,
    /// No client environment, e.g. a server-side render pass
    Unsupported,
}

impl HostEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostEnvironment::Browser => "browser",
            HostEnvironment::NativeShell => "native",
            HostEnvironment::Memory => "memory",
            HostEnvironment::Unsupported => "unsupported",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, HostEnvironment::Unsupported)
    }
}

impl fmt::Display for HostEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides which backend family applies to the running process
pub trait EnvironmentProbe: Send + Sync {
    fn detect(&self) -> HostEnvironment;
}

/// Probe driven by the compile target and the storage config
pub struct TargetProbe {
    host: HostOverride,
    has_data_dir: bool,
}

impl TargetProbe {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            host: config.host,
            has_data_dir: config.data_dir.is_some(),
        }
    }

    fn browser() -> HostEnvironment {
        #[cfg(target_arch = "wasm32")]
        {
            if crate::web::has_window() {
                return HostEnvironment::Browser;
            }
        }
        HostEnvironment::Unsupported
    }

    fn native(&self) -> HostEnvironment {
        if cfg!(target_arch = "wasm32") || !self.has_data_dir {
            HostEnvironment::Unsupported
        } else {
            HostEnvironment::NativeShell
        }
    }
}

impl EnvironmentProbe for TargetProbe {
    fn detect(&self) -> HostEnvironment {
        match self.host {
            HostOverride::Auto if cfg!(target_arch = "wasm32") => Self::browser(),
            HostOverride::Auto | HostOverride::Native => self.native(),
            HostOverride::Browser => Self::browser(),
            HostOverride::Memory => HostEnvironment::Memory,
            HostOverride::None => HostEnvironment::Unsupported,
        }
    }
}

/// Probe that always answers the same
pub struct FixedProbe(pub HostEnvironment);

impl EnvironmentProbe for FixedProbe {
    fn detect(&self) -> HostEnvironment {
        self.0
    }
}

struct Backends {
    blob: Arc<dyn BlobStore>,
    kv: Arc<dyn KeyValueStore>,
}

/// Resolves the host environment once and hands out the matching stores.
///
/// Both the probe result and the constructed backends are memoized for the
/// lifetime of the value, so every component sharing one `Platform` talks
/// to the same stores.
pub struct Platform {
    probe: Box<dyn EnvironmentProbe>,
    data_dir: Option<PathBuf>,
    host: OnceLock<HostEnvironment>,
    backends: OnceLock<Backends>,
}

impl Platform {
    pub fn new(probe: impl EnvironmentProbe + 'static, config: &StorageConfig) -> Self {
        Self {
            probe: Box::new(probe),
            data_dir: config.data_dir.clone(),
            host: OnceLock::new(),
            backends: OnceLock::new(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(TargetProbe::new(config), config)
    }

    /// Platform with no client environment; every store access fails fast
    pub fn unsupported() -> Self {
        Self::new(
            FixedProbe(HostEnvironment::Unsupported),
            &StorageConfig {
                data_dir: None,
                ..StorageConfig::default()
            },
        )
    }

    /// Memory-hosted platform bound to the given stores
    pub fn with_stores(blob: Arc<dyn BlobStore>, kv: Arc<dyn KeyValueStore>) -> Self {
        let platform = Self::new(
            FixedProbe(HostEnvironment::Memory),
            &StorageConfig {
                data_dir: None,
                ..StorageConfig::default()
            },
        );
        let _ = platform.backends.set(Backends { blob, kv });
        platform
    }

    pub fn in_memory() -> Self {
        Self::with_stores(
            Arc::new(MemoryBlobStore::new()),
            Arc::new(MemoryKvStore::new()),
        )
    }

    pub fn host(&self) -> HostEnvironment {
        *self.host.get_or_init(|| {
            let host = self.probe.detect();
            tracing::info!("Detected host environment: {host}");
            host
        })
    }

    pub fn is_supported(&self) -> bool {
        self.host().is_supported()
    }

    pub fn ensure_supported(&self, operation: &'static str) -> Result<HostEnvironment> {
        let host = self.host();
        if host.is_supported() {
            Ok(host)
        } else {
            Err(StorageError::PlatformUnsupported { operation })
        }
    }

    pub fn blob_store(&self) -> Result<Arc<dyn BlobStore>> {
        Ok(Arc::clone(&self.backends("open blob store")?.blob))
    }

    pub fn kv_store(&self) -> Result<Arc<dyn KeyValueStore>> {
        Ok(Arc::clone(&self.backends("open key-value store")?.kv))
    }

    fn backends(&self, operation: &'static str) -> Result<&Backends> {
        if let Some(backends) = self.backends.get() {
            return Ok(backends);
        }
        let host = self.ensure_supported(operation)?;
        let built = self.build(host, operation)?;
        Ok(self.backends.get_or_init(|| built))
    }

    fn build(&self, host: HostEnvironment, operation: &'static str) -> Result<Backends> {
        match host {
            HostEnvironment::Memory => Ok(Backends {
                blob: Arc::new(MemoryBlobStore::new()),
                kv: Arc::new(MemoryKvStore::new()),
            }),
            #[cfg(not(target_arch = "wasm32"))]
            HostEnvironment::NativeShell => {
                let dir = self
                    .data_dir
                    .as_deref()
                    .ok_or(StorageError::PlatformUnsupported { operation })?;
                tracing::debug!("Using file backends under {}", dir.display());
                Ok(Backends {
                    blob: Arc::new(crate::native::FileBlobStore::in_dir(dir)),
                    kv: Arc::new(crate::native::FileKvStore::in_dir(dir)),
                })
            }
            #[cfg(target_arch = "wasm32")]
            HostEnvironment::Browser => Ok(Backends {
                blob: Arc::new(crate::web::LocalBlobStore),
                kv: Arc::new(crate::web::LocalKvStore),
            }),
            _ => Err(StorageError::PlatformUnsupported { operation }),
        }
    }
}
