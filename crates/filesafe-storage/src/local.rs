use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use filesafe_core::ext::thumbnail_name;
use filesafe_core::AppError;

/// Subdirectory of the uploads directory holding derived thumbnails.
pub const THUMBS_DIR: &str = "thumbs";

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::FilesystemFailure(err.to_string())
    }
}

/// Local filesystem blob store.
///
/// The namespace is flat: every blob lives directly under the uploads
/// directory under its storage name, thumbnails under `thumbs/` keyed by the
/// same name with the extension replaced.
#[derive(Clone)]
pub struct LocalStorage {
    uploads_dir: PathBuf,
    thumbs_dir: PathBuf,
}

impl LocalStorage {
    /// Create the store, making the uploads and thumbs directories if needed.
    pub async fn new(uploads_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let uploads_dir = uploads_dir.into();
        let thumbs_dir = uploads_dir.join(THUMBS_DIR);

        fs::create_dir_all(&thumbs_dir).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                thumbs_dir.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            uploads_dir,
            thumbs_dir,
        })
    }

    /// Validate a storage name and resolve it to its blob path.
    ///
    /// Storage names are flat tokens; anything that could traverse out of
    /// the uploads directory is rejected.
    pub fn blob_path(&self, name: &str) -> StorageResult<PathBuf> {
        if name.is_empty()
            || name.contains("..")
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.uploads_dir.join(name))
    }

    /// Thumbnail path derived from a storage name (no database involved).
    pub fn thumbnail_path(&self, storage_name: &str) -> PathBuf {
        self.thumbs_dir.join(thumbnail_name(storage_name))
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Whether a blob with this name currently exists on disk.
    pub async fn blob_exists(&self, name: &str) -> StorageResult<bool> {
        let path = self.blob_path(name)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    /// Durably write a blob: create, write, sync.
    pub async fn write_blob(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.blob_path(name)?;
        let start = Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            path = %path.display(),
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Blob written"
        );

        Ok(())
    }

    /// Delete a blob. Returns `Ok(true)` if a file was removed, `Ok(false)`
    /// if it was already absent; any other failure is an error.
    pub async fn remove_blob(&self, name: &str) -> StorageResult<bool> {
        let path = self.blob_path(name)?;
        Self::remove_at(&path).await
    }

    /// Delete the derived thumbnail for a storage name, with the same
    /// already-absent semantics as [`remove_blob`](Self::remove_blob).
    pub async fn remove_thumbnail(&self, storage_name: &str) -> StorageResult<bool> {
        let path = self.thumbnail_path(storage_name);
        Self::remove_at(&path).await
    }

    async fn remove_at(path: &Path) -> StorageResult<bool> {
        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "File removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
