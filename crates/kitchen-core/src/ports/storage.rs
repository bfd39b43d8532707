//! Image storage port.

use async_trait::async_trait;

/// Receives accepted image bytes under an opaque reference.
///
/// The reference is later resolved by the static file server at
/// `/uploads/<reference>`.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    async fn store(&self, reference: &str, bytes: &[u8]) -> Result<(), StorageError>;

    async fn remove(&self, reference: &str) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}
