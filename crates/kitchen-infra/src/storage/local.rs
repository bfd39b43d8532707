use std::path::{Path, PathBuf};

use async_trait::async_trait;

use kitchen_core::ports::{ImageStorage, StorageError};

/// Stores images as flat files under a single directory.
#[derive(Debug, Clone)]
pub struct LocalImageStorage {
    dir: PathBuf,
}

impl LocalImageStorage {
    /// Use `dir`, creating it if needed.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::Io(format!("{}: {}", dir.display(), e)))?;
        tracing::info!(dir = %dir.display(), "Image storage ready");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, reference: &str) -> Result<PathBuf, StorageError> {
        let flat = !reference.is_empty()
            && !reference.contains(['/', '\\'])
            && !reference.starts_with('.');
        if !flat {
            return Err(StorageError::InvalidReference(reference.to_string()));
        }
        Ok(self.dir.join(reference))
    }
}

#[async_trait]
impl ImageStorage for LocalImageStorage {
    async fn store(&self, reference: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(reference)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        tracing::debug!(reference, size = bytes.len(), "Image stored");
        Ok(())
    }

    async fn remove(&self, reference: &str) -> Result<(), StorageError> {
        let path = self.path_for(reference)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }
}
