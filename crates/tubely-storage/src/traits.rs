//! Storage abstraction traits
//!
//! The upload pipeline only needs to put a finished file into the content store and to
//! sign read links for stored objects. Each is its own trait so tests can fake one
//! without the other.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tubely_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Content exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("Content is empty")]
    EmptyContent,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TooLarge { limit } => AppError::PayloadTooLarge(format!(
                "File exceeds the maximum allowed size of {} bytes",
                limit
            )),
            StorageError::EmptyContent => AppError::InvalidInput("File is empty".to_string()),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Puts finished files into the content store.
#[async_trait]
pub trait ObjectUploader: Send + Sync {
    /// Stream the file at `path` to `bucket/key` with the given content type.
    ///
    /// The object exists in the store if and only if this returns `Ok`.
    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        path: &Path,
    ) -> StorageResult<()>;
}

/// Produces time-limited read links for stored objects.
#[async_trait]
pub trait UrlSigner: Send + Sync {
    /// Generate a presigned GET URL valid for `expires_in`
    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;
}

/// Reject empty bucket or key before reaching the backend.
#[cfg(feature = "storage-s3")]
pub(crate) fn ensure_object_address(bucket: &str, key: &str) -> StorageResult<()> {
    if bucket.trim().is_empty() {
        return Err(StorageError::InvalidKey("Bucket name is empty".to_string()));
    }
    if key.trim().is_empty() {
        return Err(StorageError::InvalidKey("Object key is empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_large_maps_to_payload_too_large() {
        let err: AppError = StorageError::TooLarge { limit: 10 }.into();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }

    #[test]
    fn test_backend_errors_map_to_storage() {
        let err: AppError = StorageError::UploadFailed("timeout".into()).into();
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[cfg(feature = "storage-s3")]
    #[test]
    fn test_empty_address_is_invalid() {
        assert!(matches!(
            ensure_object_address("", "k"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            ensure_object_address("b", " "),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(ensure_object_address("b", "k").is_ok());
    }
}
