//! Storage traits and error types

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while persisting an asset
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot derive a file name from '{0}'")]
    InvalidName(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence boundary for asset bytes
///
/// Implementations must be shareable across crawl tasks.
#[async_trait]
pub trait AssetSink: Send + Sync {
    /// Stores `bytes` under `filename`, replacing anything already there
    async fn store(&self, filename: &str, bytes: &[u8]) -> StorageResult<()>;
}
