use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use filesafe_core::{AlbumIndex, AppError};

/// Repository for album lookups and modification-time touch-ups. Album CRUD
/// itself lives in outer layers.
#[derive(Clone)]
pub struct AlbumRepository {
    pool: PgPool,
}

impl AlbumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlbumIndex for AlbumRepository {
    #[tracing::instrument(skip(self), fields(db.table = "albums", db.operation = "select"))]
    async fn owned_album_exists(
        &self,
        album_id: Uuid,
        owner_id: Uuid,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM albums WHERE id = $1 AND owner_id = $2)",
        )
        .bind(album_id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    #[tracing::instrument(skip(self), fields(db.table = "albums", db.operation = "update"))]
    async fn touch_edited_at(&self, album_id: Uuid, edited_at: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE albums SET edited_at = $2 WHERE id = $1")
            .bind(album_id)
            .bind(edited_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
