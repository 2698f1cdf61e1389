use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted entity representing one stored upload.
///
/// Invariants maintained by the pipelines, not by database constraints:
/// `name` is unique among live records and files on disk, and at most one
/// live record exists per `(owner_id-or-null, content_fingerprint,
/// size_bytes)` tuple. Anonymous uploads (`owner_id` null) dedup only
/// against other anonymous uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FileRecord {
    pub id: Uuid,
    /// On-disk storage name (random token + extension).
    pub name: String,
    /// Caller-supplied name; not unique, not safe for the filesystem.
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    /// Lowercase hex SHA-256 digest of the blob contents.
    pub content_fingerprint: String,
    pub source_ip: String,
    /// None means anonymous upload.
    pub owner_id: Option<Uuid>,
    pub album_id: Option<Uuid>,
    /// Epoch seconds.
    pub created_at: i64,
}

/// A record awaiting batch persistence; identical to [`FileRecord`] minus
/// the database-assigned id.
#[derive(Debug, Clone)]
pub struct FileDraft {
    pub name: String,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub content_fingerprint: String,
    pub source_ip: String,
    pub owner_id: Option<Uuid>,
    pub album_id: Option<Uuid>,
    pub created_at: i64,
}
