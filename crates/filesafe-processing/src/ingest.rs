//! Ingestion pipeline: stage → empty-check → scan → dedup → persist.
//!
//! The batch is the unit of rejection for the empty-file policy and the
//! scan gate; dedup and persistence decide per file. The response is sent
//! before thumbnails and album touch-ups run, which are dispatched to the
//! background pool and can no longer affect the outcome.

use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;
use uuid::Uuid;

use filesafe_core::ext::{last_extension, storage_extension, thumbnail_eligible, thumbnail_name};
use filesafe_core::models::{FileRecord, SubmittedFile, UploadResponse, UploadedEntry, UploaderIdentity};
use filesafe_core::{AlbumIndex, AppError, FileIndex, UploadConfig};
use filesafe_storage::{LocalStorage, NameAllocator, THUMBS_DIR};
use filesafe_worker::BackgroundPool;

use crate::dedup::{DedupOutcome, Deduplicator, StagedFile};
use crate::scan::ScanGate;
use crate::thumbnail::Thumbnailer;
use crate::traits::FileScanner;

/// Orchestrates one upload batch from submitted blobs to persisted records.
pub struct IngestionPipeline {
    config: UploadConfig,
    storage: Arc<LocalStorage>,
    allocator: NameAllocator,
    dedup: Deduplicator,
    files: Arc<dyn FileIndex>,
    albums: Arc<dyn AlbumIndex>,
    scan_gate: Option<ScanGate>,
    thumbnailer: Arc<Thumbnailer>,
    background: BackgroundPool,
}

impl IngestionPipeline {
    pub fn new(
        config: UploadConfig,
        storage: Arc<LocalStorage>,
        files: Arc<dyn FileIndex>,
        albums: Arc<dyn AlbumIndex>,
        scanner: Option<Arc<dyn FileScanner>>,
        background: BackgroundPool,
    ) -> Self {
        let allocator = NameAllocator::new(
            config.token_length,
            config.max_tries,
            config.preserved_extensions.clone(),
        );
        let scan_gate = match scanner {
            Some(scanner) if config.scan.enabled => Some(ScanGate::new(scanner)),
            _ => None,
        };

        Self {
            allocator,
            dedup: Deduplicator::new(files.clone()),
            thumbnailer: Arc::new(Thumbnailer::new(config.ffmpeg_path.clone())),
            config,
            storage,
            files,
            albums,
            scan_gate,
            background,
        }
    }

    /// Replace the allocator, e.g. with a deterministic token source in
    /// tests.
    pub fn with_allocator(mut self, allocator: NameAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// Ingest one batch. `album_id` requires an identity owning that album.
    /// The returned file list preserves submission order; each slot holds
    /// either the newly created record or the pre-existing duplicate.
    pub async fn ingest(
        &self,
        identity: Option<&UploaderIdentity>,
        album_id: Option<Uuid>,
        source_ip: &str,
        batch: Vec<SubmittedFile>,
    ) -> Result<UploadResponse, AppError> {
        if batch.is_empty() {
            return Err(AppError::NoFilesSubmitted);
        }

        let owner_id = identity.map(|user| user.id);

        if let Some(album) = album_id {
            let owner = identity.ok_or(AppError::AlbumNotFound)?;
            if !self.albums.owned_album_exists(album, owner.id).await? {
                return Err(AppError::AlbumNotFound);
            }
        }

        self.check_policies(&batch)?;

        let staged = self.stage(&batch).await?;

        if self.config.filter_empty_files && staged.iter().any(|file| file.size_bytes == 0) {
            self.discard_staged(&staged).await;
            return Err(AppError::EmptyFileRejected);
        }

        if let Some(gate) = &self.scan_gate {
            gate.check_batch(&self.storage, &staged).await?;
        }

        let created_at = Utc::now().timestamp();
        let records = self
            .dedup_and_persist(&staged, owner_id, album_id, source_ip, created_at)
            .await?;

        let entries = records
            .iter()
            .map(|record| self.to_entry(record))
            .collect();

        self.dispatch_side_effects(records, created_at);

        Ok(UploadResponse { files: entries })
    }

    /// Extension and size policies, checked before anything is staged so a
    /// rejection leaves no files behind.
    fn check_policies(&self, batch: &[SubmittedFile]) -> Result<(), AppError> {
        for file in batch {
            let extension =
                storage_extension(&file.original_name, &self.config.preserved_extensions);
            if self
                .config
                .blocked_extensions
                .iter()
                .any(|blocked| blocked == &extension)
            {
                return Err(AppError::BlockedExtension { extension });
            }

            let size = (file.data.len() as i64).max(file.declared_size);
            if size > self.config.max_size_bytes {
                return Err(AppError::OversizeFile {
                    size,
                    max: self.config.max_size_bytes,
                });
            }
        }
        Ok(())
    }

    /// Allocate a storage name and write the blob for every file. Any
    /// failure aborts the batch and deletes what was already staged.
    async fn stage(&self, batch: &[SubmittedFile]) -> Result<Vec<StagedFile>, AppError> {
        let mut staged: Vec<StagedFile> = Vec::with_capacity(batch.len());

        for file in batch {
            let name = match self.allocator.allocate(&self.storage, &file.original_name).await {
                Ok(name) => name,
                Err(error) => {
                    self.discard_staged(&staged).await;
                    return Err(error);
                }
            };

            if let Err(error) = self.storage.write_blob(&name, &file.data).await {
                self.discard_staged(&staged).await;
                return Err(error.into());
            }

            staged.push(StagedFile {
                name,
                original_name: file.original_name.clone(),
                mime_type: file.mime_type.clone(),
                size_bytes: file.data.len() as i64,
            });
        }

        Ok(staged)
    }

    /// Evaluate dedup for every staged file concurrently, then persist the
    /// new drafts as one batch write. Returns one record per slot in
    /// submission order.
    async fn dedup_and_persist(
        &self,
        staged: &[StagedFile],
        owner_id: Option<Uuid>,
        album_id: Option<Uuid>,
        source_ip: &str,
        created_at: i64,
    ) -> Result<Vec<FileRecord>, AppError> {
        let outcomes = match try_join_all(staged.iter().map(|file| {
            self.dedup
                .evaluate(&self.storage, file, owner_id, album_id, source_ip, created_at)
        }))
        .await
        {
            Ok(outcomes) => outcomes,
            Err(error) => {
                self.discard_staged(staged).await;
                return Err(error);
            }
        };

        let drafts: Vec<_> = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                DedupOutcome::New(draft) => Some(draft.clone()),
                DedupOutcome::Existing(_) => None,
            })
            .collect();

        let inserted = if drafts.is_empty() {
            Vec::new()
        } else {
            match self.files.insert_batch(drafts.clone()).await {
                Ok(records) => records,
                Err(error) => {
                    // Known consistency gap, kept from the legacy design:
                    // the blobs stay on disk with no record. Log every name
                    // for manual reconciliation.
                    for draft in &drafts {
                        tracing::error!(
                            name = %draft.name,
                            "Orphaned blob: metadata batch write failed after dedup"
                        );
                    }
                    return Err(error);
                }
            }
        };

        // Merge new and pre-existing records back into submission order.
        let mut inserted = inserted.into_iter();
        let mut records = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                DedupOutcome::New(_) => {
                    records.push(inserted.next().ok_or_else(|| {
                        AppError::PersistenceFailure(
                            "Batch insert returned fewer records than drafts".to_string(),
                        )
                    })?);
                }
                DedupOutcome::Existing(record) => records.push(record),
            }
        }

        Ok(records)
    }

    fn to_entry(&self, record: &FileRecord) -> UploadedEntry {
        let extension = last_extension(&record.name);
        let thumb = thumbnail_eligible(&extension).then(|| {
            format!(
                "{}/{}/{}",
                self.config.base_url,
                THUMBS_DIR,
                thumbnail_name(&record.name)
            )
        });

        UploadedEntry {
            name: record.name.clone(),
            size: record.size_bytes,
            url: format!("{}/{}", self.config.base_url, record.name),
            thumb,
        }
    }

    /// Post-response work: album modification times and thumbnail
    /// derivation, detached onto the background pool. Thumbnails are
    /// dispatched for duplicates too; generation is idempotent and fills
    /// in previews that failed or lagged on the first upload.
    fn dispatch_side_effects(&self, records: Vec<FileRecord>, edited_at: i64) {
        for record in records {
            if let Some(album) = record.album_id {
                let albums = self.albums.clone();
                self.background.spawn("album-touch", async move {
                    albums
                        .touch_edited_at(album, edited_at)
                        .await
                        .map_err(anyhow::Error::from)
                });
            }

            if self.config.generate_thumbnails
                && thumbnail_eligible(&last_extension(&record.name))
            {
                let thumbnailer = self.thumbnailer.clone();
                let storage = self.storage.clone();
                let name = record.name;
                self.background.spawn("thumbnail", async move {
                    thumbnailer.generate(&storage, &name).await
                });
            }
        }
    }

    async fn discard_staged(&self, staged: &[StagedFile]) {
        for file in staged {
            if let Err(error) = self.storage.remove_blob(&file.name).await {
                tracing::warn!(name = %file.name, error = %error, "Failed to delete staged file");
            }
        }
    }
}
