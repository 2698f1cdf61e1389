//! Filesafe database layer
//!
//! sqlx/PostgreSQL repositories implementing the persistence trait seams
//! from `filesafe-core`. The metadata store is append-only for new records;
//! dedup is a best-effort lookup, not a unique constraint (two concurrent
//! identical uploads may both insert, first write wins).

pub mod albums;
pub mod files;

pub use albums::AlbumRepository;
pub use files::FileRepository;

/// Apply the schema migrations bundled with this crate.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
