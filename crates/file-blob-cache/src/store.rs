//! On-disk blob storage under generated names

use crate::error::{BlobCacheError, Result};
use crate::types::BlobId;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

const PARTIAL_SUFFIX: &str = ".partial";

/// A directory of opaque-named files, one per blob
#[derive(Debug, Clone)]
pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ensure the storage directory exists
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        info!(dir = ?self.dir, "Blob store initialized");
        Ok(())
    }

    pub fn path_for(&self, id: &BlobId) -> PathBuf {
        self.dir.join(id.as_str())
    }

    /// Persist bytes under a fresh identifier
    ///
    /// The data lands in a `.partial` file first and is renamed into place,
    /// so a blob name never refers to a half-written file.
    pub async fn write(&self, data: &[u8]) -> Result<BlobId> {
        fs::create_dir_all(&self.dir).await?;

        let id = BlobId::generate();
        let path = self.path_for(&id);
        let partial = self.dir.join(format!("{}{}", id, PARTIAL_SUFFIX));

        if let Err(e) = fs::write(&partial, data).await {
            let _ = fs::remove_file(&partial).await;
            return Err(e.into());
        }
        fs::rename(&partial, &path).await?;

        debug!(blob_id = %id, size = data.len(), "Wrote blob");
        Ok(id)
    }

    pub async fn read(&self, id: &BlobId) -> Result<Vec<u8>> {
        match fs::read(self.path_for(id)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BlobCacheError::NotFound(id.clone())),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a blob. Returns false if it was already gone.
    pub async fn delete(&self, id: &BlobId) -> Result<bool> {
        match fs::remove_file(self.path_for(id)).await {
            Ok(()) => {
                debug!(blob_id = %id, "Deleted blob");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self, id: &BlobId) -> bool {
        fs::try_exists(self.path_for(id)).await.unwrap_or(false)
    }

    /// Names of every file in the store, including interrupted writes
    pub async fn list(&self) -> Result<Vec<BlobId>> {
        let mut ids = Vec::new();
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                ids.push(BlobId::from(name.to_string()));
            }
        }
        Ok(ids)
    }
}
