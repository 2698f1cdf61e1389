use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One slot of an upload batch, as handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct SubmittedFile {
    pub original_name: String,
    pub mime_type: String,
    /// Size the caller declared; checked against policy before staging.
    pub declared_size: i64,
    pub data: Bytes,
}

/// One entry of a successful upload response, in submission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedEntry {
    pub name: String,
    pub size: i64,
    pub url: String,
    /// Present only for extensions eligible for thumbnail derivation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}

/// Successful ingestion result. `files` preserves submission order; a slot
/// holds either the newly created record or the pre-existing duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub files: Vec<UploadedEntry>,
}

/// One row of the listing operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListedFile {
    pub id: Uuid,
    pub name: String,
    pub original_name: String,
    pub size_bytes: i64,
    pub album_id: Option<Uuid>,
    pub created_at: i64,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    /// Uploader display name; populated for administrative identities only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
}
