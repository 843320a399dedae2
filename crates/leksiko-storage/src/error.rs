use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{operation} requires a client environment, none is available")]
    PlatformUnsupported { operation: &'static str },

    #[error("IO error during {operation} on {key}: {source}")]
    Io {
        operation: &'static str,
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error for key {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Backend rejected {operation} on {key}: {message}")]
    Backend {
        operation: &'static str,
        key: String,
        message: String,
    },
}

impl StorageError {
    pub fn is_platform_unsupported(&self) -> bool {
        matches!(self, StorageError::PlatformUnsupported { .. })
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
