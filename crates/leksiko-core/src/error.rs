use leksiko_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{operation} is not available on this platform")]
    PlatformUnsupported { operation: &'static str },

    #[error("{component} not initialized, call initialize() first")]
    NotInitialized { component: &'static str },

    #[error("{collection} index out of bounds: {index} (len {len})")]
    OutOfBounds {
        collection: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invalid dictionary: {field} {reason}")]
    MalformedSnapshot { field: String, reason: String },

    #[error("Failed to decompress snapshot: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("Failed to download dictionary from {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[source] StorageError),
}

impl From<StorageError> for Error {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::PlatformUnsupported { operation } => {
                Error::PlatformUnsupported { operation }
            }
            other => Error::Storage(other),
        }
    }
}

impl Error {
    pub(crate) fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedSnapshot {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
