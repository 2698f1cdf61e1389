//! Persistence trait seams.
//!
//! The pipelines talk to the metadata store through these traits so the
//! sqlx-backed repositories stay swappable for in-memory fakes in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{FileDraft, FileRecord};

/// Filter for the listing operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListScope {
    /// Restrict to one owner; `None` lists every record (administrative).
    pub owner_id: Option<Uuid>,
    /// Restrict to one album.
    pub album_id: Option<Uuid>,
}

/// Metadata store for file records.
#[async_trait]
pub trait FileIndex: Send + Sync {
    /// Look up a live record matching the dedup key
    /// `(owner-or-null, fingerprint, size)`.
    async fn find_duplicate(
        &self,
        owner_id: Option<Uuid>,
        content_fingerprint: &str,
        size_bytes: i64,
    ) -> Result<Option<FileRecord>, AppError>;

    /// Insert all drafts as one batch write and return the created records
    /// in draft order.
    async fn insert_batch(&self, drafts: Vec<FileDraft>) -> Result<Vec<FileRecord>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<FileRecord>, AppError>;

    async fn remove(&self, id: Uuid) -> Result<(), AppError>;

    /// Page of records, newest first.
    async fn list_page(
        &self,
        scope: ListScope,
        page: u32,
        page_size: i64,
    ) -> Result<Vec<FileRecord>, AppError>;

    /// Display names for the given owners (listing, administrative view).
    async fn display_names(
        &self,
        owner_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, AppError>;
}

/// Album store. Albums are owned elsewhere; the pipelines only check
/// ownership and touch the modification time.
#[async_trait]
pub trait AlbumIndex: Send + Sync {
    async fn owned_album_exists(&self, album_id: Uuid, owner_id: Uuid)
        -> Result<bool, AppError>;

    async fn touch_edited_at(&self, album_id: Uuid, edited_at: i64) -> Result<(), AppError>;
}
