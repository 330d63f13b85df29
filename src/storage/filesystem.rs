use crate::storage::{AssetSink, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Writes assets as files inside one directory
///
/// The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FsAssetSink {
    dir: PathBuf,
}

impl FsAssetSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl AssetSink for FsAssetSink {
    async fn store(&self, filename: &str, bytes: &[u8]) -> StorageResult<()> {
        if filename.is_empty() || filename.contains(['/', '\\']) {
            return Err(StorageError::InvalidName(filename.to_string()));
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(filename), bytes).await?;
        Ok(())
    }
}
