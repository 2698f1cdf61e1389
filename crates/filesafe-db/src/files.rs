use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use filesafe_core::models::{FileDraft, FileRecord};
use filesafe_core::{AppError, FileIndex, ListScope};

const FILE_COLUMNS: &str = "id, name, original_name, mime_type, size_bytes, \
                            content_fingerprint, source_ip, owner_id, album_id, created_at";

/// Repository for file records.
#[derive(Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileIndex for FileRepository {
    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select"))]
    async fn find_duplicate(
        &self,
        owner_id: Option<Uuid>,
        content_fingerprint: &str,
        size_bytes: i64,
    ) -> Result<Option<FileRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files \
             WHERE owner_id IS NOT DISTINCT FROM $1 \
               AND content_fingerprint = $2 AND size_bytes = $3 \
             LIMIT 1"
        ))
        .bind(owner_id)
        .bind(content_fingerprint)
        .bind(size_bytes)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self, drafts), fields(db.table = "files", db.operation = "insert", batch = drafts.len()))]
    async fn insert_batch(&self, drafts: Vec<FileDraft>) -> Result<Vec<FileRecord>, AppError> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO files (name, original_name, mime_type, size_bytes, \
             content_fingerprint, source_ip, owner_id, album_id, created_at) ",
        );
        builder.push_values(drafts.iter(), |mut row, draft| {
            row.push_bind(&draft.name)
                .push_bind(&draft.original_name)
                .push_bind(&draft.mime_type)
                .push_bind(draft.size_bytes)
                .push_bind(&draft.content_fingerprint)
                .push_bind(&draft.source_ip)
                .push_bind(draft.owner_id)
                .push_bind(draft.album_id)
                .push_bind(draft.created_at);
        });
        builder.push(format!(" RETURNING {FILE_COLUMNS}"));

        let mut inserted = builder
            .build_query_as::<FileRecord>()
            .fetch_all(&self.pool)
            .await?;

        // RETURNING order is not contractual; restore draft order by name.
        let mut by_name: HashMap<String, FileRecord> = inserted
            .drain(..)
            .map(|r| (r.name.clone(), r))
            .collect();
        let ordered = drafts
            .iter()
            .filter_map(|d| by_name.remove(&d.name))
            .collect::<Vec<_>>();

        if ordered.len() != drafts.len() {
            return Err(AppError::PersistenceFailure(
                "Batch insert returned fewer rows than drafts".to_string(),
            ));
        }

        Ok(ordered)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<FileRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "delete", db.record_id = %id))]
    async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select"))]
    async fn list_page(
        &self,
        scope: ListScope,
        page: u32,
        page_size: i64,
    ) -> Result<Vec<FileRecord>, AppError> {
        let records = sqlx::query_as::<Postgres, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files \
             WHERE ($1::uuid IS NULL OR owner_id = $1) \
               AND ($2::uuid IS NULL OR album_id = $2) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(scope.owner_id)
        .bind(scope.album_id)
        .bind(page_size)
        .bind(i64::from(page) * page_size)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    #[tracing::instrument(skip(self, owner_ids), fields(db.table = "users", db.operation = "select"))]
    async fn display_names(
        &self,
        owner_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, AppError> {
        if owner_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<Postgres, (Uuid, String)>(
            "SELECT id, display_name FROM users WHERE id = ANY($1)",
        )
        .bind(owner_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
