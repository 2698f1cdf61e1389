//! Duplicate-content detection.

use std::sync::Arc;

use uuid::Uuid;

use filesafe_core::models::{FileDraft, FileRecord};
use filesafe_core::{AppError, FileIndex};
use filesafe_storage::LocalStorage;

use crate::fingerprint::fingerprint_file;

/// A file already written to its allocated storage name, awaiting the
/// scan/dedup/persist decisions.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub name: String,
    pub original_name: String,
    pub mime_type: String,
    /// Actual size written to disk, not the declared size.
    pub size_bytes: i64,
}

/// Per-slot dedup decision.
pub enum DedupOutcome {
    /// No identical live record; the staged file is kept and this draft is
    /// queued for batch persistence.
    New(FileDraft),
    /// An identical live record exists; the staged file has been deleted
    /// and the existing record is canonical for this slot.
    Existing(FileRecord),
}

/// Decides, per staged file, whether identical content already exists in
/// the owner's scope. Each file in a batch is evaluated independently;
/// callers run evaluations concurrently and merge outcomes back into
/// submission order.
pub struct Deduplicator {
    files: Arc<dyn FileIndex>,
}

impl Deduplicator {
    pub fn new(files: Arc<dyn FileIndex>) -> Self {
        Self { files }
    }

    pub async fn evaluate(
        &self,
        storage: &LocalStorage,
        staged: &StagedFile,
        owner_id: Option<Uuid>,
        album_id: Option<Uuid>,
        source_ip: &str,
        created_at: i64,
    ) -> Result<DedupOutcome, AppError> {
        let path = storage.blob_path(&staged.name)?;
        let fingerprint = fingerprint_file(&path).await?;

        if let Some(existing) = self
            .files
            .find_duplicate(owner_id, &fingerprint, staged.size_bytes)
            .await?
        {
            storage.remove_blob(&staged.name).await?;
            tracing::debug!(
                name = %staged.name,
                existing = %existing.name,
                fingerprint = %fingerprint,
                "Duplicate content, discarding staged file"
            );
            return Ok(DedupOutcome::Existing(existing));
        }

        Ok(DedupOutcome::New(FileDraft {
            name: staged.name.clone(),
            original_name: staged.original_name.clone(),
            mime_type: staged.mime_type.clone(),
            size_bytes: staged.size_bytes,
            content_fingerprint: fingerprint,
            source_ip: source_ip.to_string(),
            owner_id,
            album_id,
            created_at,
        }))
    }
}
