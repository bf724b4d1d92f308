//! Object-storage error types.

use thiserror::Error;

/// Errors that can occur while configuring or writing to object storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage endpoint is not a valid URL.
    #[error("Invalid storage endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// Failed to read the local file to upload.
    #[error("Failed to read '{path}' for upload: {message}")]
    ReadFailed { path: String, message: String },

    /// The storage service rejected or failed the write.
    #[error("Failed to upload '{key}': {message}")]
    UploadFailed { key: String, message: String },
}
