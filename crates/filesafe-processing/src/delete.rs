//! Deletion pipeline: blob → thumbnail → record, then album touch-up.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use filesafe_core::ext::{last_extension, thumbnail_eligible};
use filesafe_core::models::UploaderIdentity;
use filesafe_core::{AlbumIndex, AppError, FileIndex};
use filesafe_storage::LocalStorage;

/// Reverses ingestion for one record.
///
/// The blob and thumbnail go first, the database record second: if the blob
/// delete fails for any reason other than already-absent, the operation
/// stops before touching the record, so the index and the filesystem cannot
/// diverge in the missing-record/present-blob direction. The reverse
/// divergence (record present, blob gone) is tolerated and logged.
pub struct DeletionPipeline {
    storage: Arc<LocalStorage>,
    files: Arc<dyn FileIndex>,
    albums: Arc<dyn AlbumIndex>,
}

impl DeletionPipeline {
    pub fn new(
        storage: Arc<LocalStorage>,
        files: Arc<dyn FileIndex>,
        albums: Arc<dyn AlbumIndex>,
    ) -> Self {
        Self {
            storage,
            files,
            albums,
        }
    }

    /// Delete a record if the identity owns it or holds the administrative
    /// override.
    pub async fn delete(&self, identity: &UploaderIdentity, id: Uuid) -> Result<(), AppError> {
        let record = self.files.get(id).await?.ok_or(AppError::RecordNotFound)?;

        if !identity.admin && record.owner_id != Some(identity.id) {
            return Err(AppError::NotAuthorized);
        }

        match self.storage.remove_blob(&record.name).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(name = %record.name, "Blob already absent during deletion")
            }
            Err(error) => return Err(error.into()),
        }

        if thumbnail_eligible(&last_extension(&record.name)) {
            match self.storage.remove_thumbnail(&record.name).await {
                // Thumbnail generation is best-effort, so absence is normal.
                Ok(_) => {}
                Err(error) => return Err(error.into()),
            }
        }

        self.files.remove(id).await?;

        if let Some(album) = record.album_id {
            let edited_at = Utc::now().timestamp();
            if let Err(error) = self.albums.touch_edited_at(album, edited_at).await {
                tracing::warn!(album = %album, error = %error, "Failed to touch album after deletion");
            }
        }

        tracing::info!(id = %id, name = %record.name, "File deleted");
        Ok(())
    }
}
