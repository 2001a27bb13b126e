use std::io;

use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised while persisting generated assets.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The raster could not be encoded.
    #[error("failed to encode `{file}`")]
    Encode {
        /// Target filename.
        file: String,
        /// Encoder failure.
        #[source]
        source: image::ImageError,
    },
    /// The filesystem rejected the operation (disk full, permissions...).
    #[error("failed to write `{path}`")]
    Io {
        /// Path that was being written.
        path: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// The blocking encode task did not complete.
    #[error("storage worker failed for `{file}`")]
    Worker {
        /// Target filename.
        file: String,
        /// Join failure of the encode task.
        #[source]
        source: tokio::task::JoinError,
    },
}

impl StorageError {
    /// Construct an IO error for `path`.
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}
