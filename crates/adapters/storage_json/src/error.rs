//! Storage-specific error type wrapping file system and JSON errors.

use std::path::PathBuf;

use lifxctl_domain::error::LifxCtlError;

/// Errors originating from the JSON storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading, writing or renaming the registry file failed.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry file is not a valid registry document.
    #[error("malformed registry file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<StorageError> for LifxCtlError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
