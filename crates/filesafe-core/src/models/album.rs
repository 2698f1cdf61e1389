use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Album reference. Albums are managed elsewhere; the pipelines only verify
/// ownership before scoping an upload and touch `edited_at` afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Album {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Epoch seconds of the last mutation touching this album.
    pub edited_at: i64,
}
