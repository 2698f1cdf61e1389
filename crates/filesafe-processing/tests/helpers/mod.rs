//! Shared test fixtures: in-memory metadata stores, a stub scanner, and a
//! pipeline assembled over a temp directory.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use filesafe_core::models::{FileDraft, FileRecord, SubmittedFile, UploaderIdentity};
use filesafe_core::{AlbumIndex, AppError, FileIndex, ListScope, UploadConfig};
use filesafe_processing::{FileScanner, IngestionPipeline};
use filesafe_services::ScanVerdict;
use filesafe_storage::{LocalStorage, THUMBS_DIR};
use filesafe_worker::BackgroundPool;

#[derive(Default)]
pub struct InMemoryFileIndex {
    pub records: Mutex<Vec<FileRecord>>,
    pub users: Mutex<HashMap<Uuid, String>>,
    pub fail_inserts: AtomicBool,
}

impl InMemoryFileIndex {
    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn add_user(&self, id: Uuid, display_name: &str) {
        self.users.lock().unwrap().insert(id, display_name.to_string());
    }
}

#[async_trait]
impl FileIndex for InMemoryFileIndex {
    async fn find_duplicate(
        &self,
        owner_id: Option<Uuid>,
        content_fingerprint: &str,
        size_bytes: i64,
    ) -> Result<Option<FileRecord>, AppError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| {
                r.owner_id == owner_id
                    && r.content_fingerprint == content_fingerprint
                    && r.size_bytes == size_bytes
            })
            .cloned())
    }

    async fn insert_batch(&self, drafts: Vec<FileDraft>) -> Result<Vec<FileRecord>, AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::PersistenceFailure("forced failure".to_string()));
        }

        let mut records = self.records.lock().unwrap();
        let mut inserted = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let record = FileRecord {
                id: Uuid::new_v4(),
                name: draft.name,
                original_name: draft.original_name,
                mime_type: draft.mime_type,
                size_bytes: draft.size_bytes,
                content_fingerprint: draft.content_fingerprint,
                source_ip: draft.source_ip,
                owner_id: draft.owner_id,
                album_id: draft.album_id,
                created_at: draft.created_at,
            };
            records.push(record.clone());
            inserted.push(record);
        }
        Ok(inserted)
    }

    async fn get(&self, id: Uuid) -> Result<Option<FileRecord>, AppError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.records.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn list_page(
        &self,
        scope: ListScope,
        page: u32,
        page_size: i64,
    ) -> Result<Vec<FileRecord>, AppError> {
        let records = self.records.lock().unwrap();
        let mut filtered: Vec<FileRecord> = records
            .iter()
            .filter(|r| scope.owner_id.is_none() || r.owner_id == scope.owner_id)
            .filter(|r| scope.album_id.is_none() || r.album_id == scope.album_id)
            .cloned()
            .collect();
        // Newest first; ties resolve to most recently inserted.
        filtered.reverse();
        filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let start = (page as usize) * page_size as usize;
        Ok(filtered
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect())
    }

    async fn display_names(
        &self,
        owner_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(owner_ids
            .iter()
            .filter_map(|id| users.get(id).map(|name| (*id, name.clone())))
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryAlbumIndex {
    /// album id -> (owner id, edited_at)
    pub albums: Mutex<HashMap<Uuid, (Uuid, i64)>>,
}

impl InMemoryAlbumIndex {
    pub fn add_album(&self, owner_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.albums.lock().unwrap().insert(id, (owner_id, 0));
        id
    }

    pub fn edited_at(&self, album_id: Uuid) -> i64 {
        self.albums.lock().unwrap().get(&album_id).map(|a| a.1).unwrap_or(0)
    }
}

#[async_trait]
impl AlbumIndex for InMemoryAlbumIndex {
    async fn owned_album_exists(
        &self,
        album_id: Uuid,
        owner_id: Uuid,
    ) -> Result<bool, AppError> {
        Ok(self
            .albums
            .lock()
            .unwrap()
            .get(&album_id)
            .map(|(owner, _)| *owner == owner_id)
            .unwrap_or(false))
    }

    async fn touch_edited_at(&self, album_id: Uuid, edited_at: i64) -> Result<(), AppError> {
        if let Some(entry) = self.albums.lock().unwrap().get_mut(&album_id) {
            entry.1 = edited_at;
        }
        Ok(())
    }
}

/// Scanner stub: flags any file containing the marker bytes `EICAR`, or
/// simulates an unreachable daemon.
pub enum StubScanner {
    CleanUnlessMarked,
    Unavailable,
}

#[async_trait]
impl FileScanner for StubScanner {
    async fn scan_path(&self, path: &Path) -> ScanVerdict {
        match self {
            StubScanner::Unavailable => {
                ScanVerdict::Error("connection refused".to_string())
            }
            StubScanner::CleanUnlessMarked => {
                let data = tokio::fs::read(path).await.unwrap_or_default();
                if data.windows(5).any(|w| w == b"EICAR") {
                    ScanVerdict::Infected("Eicar-Test-Signature".to_string())
                } else {
                    ScanVerdict::Clean
                }
            }
        }
    }
}

pub struct TestEnv {
    pub _dir: tempfile::TempDir,
    pub storage: Arc<LocalStorage>,
    pub files: Arc<InMemoryFileIndex>,
    pub albums: Arc<InMemoryAlbumIndex>,
    pub pipeline: IngestionPipeline,
    pub config: UploadConfig,
}

/// Test config: small tokens, thumbnails off so nothing races the
/// assertions, scanning off unless a test enables it.
pub fn test_config() -> UploadConfig {
    let mut config = UploadConfig::default();
    config.token_length = 8;
    config.generate_thumbnails = false;
    config.scan.enabled = false;
    config
}

pub async fn setup(config: UploadConfig, scanner: Option<Arc<dyn FileScanner>>) -> TestEnv {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
    let files = Arc::new(InMemoryFileIndex::default());
    let albums = Arc::new(InMemoryAlbumIndex::default());

    let pipeline = IngestionPipeline::new(
        config.clone(),
        storage.clone(),
        files.clone(),
        albums.clone(),
        scanner,
        BackgroundPool::new(config.worker_capacity),
    );

    TestEnv {
        _dir: dir,
        storage,
        files,
        albums,
        pipeline,
        config,
    }
}

pub fn submitted(original_name: &str, mime_type: &str, data: &[u8]) -> SubmittedFile {
    SubmittedFile {
        original_name: original_name.to_string(),
        mime_type: mime_type.to_string(),
        declared_size: data.len() as i64,
        data: Bytes::copy_from_slice(data),
    }
}

pub fn identity(display_name: &str, admin: bool) -> UploaderIdentity {
    UploaderIdentity {
        id: Uuid::new_v4(),
        display_name: display_name.to_string(),
        admin,
    }
}

/// Number of blobs in the uploads directory (thumbs excluded).
pub fn blobs_on_disk(env: &TestEnv) -> usize {
    std::fs::read_dir(env.storage.uploads_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|e| e.file_name() != THUMBS_DIR)
        .count()
}
