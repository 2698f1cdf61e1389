use rand::{distr::Alphanumeric, Rng};

use filesafe_core::ext::storage_extension;
use filesafe_core::AppError;

use crate::local::LocalStorage;

type TokenSource = Box<dyn Fn(usize) -> String + Send + Sync>;

fn random_token(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Produces a collision-checked unique storage name per incoming file.
///
/// The existence check and the eventual blob write are not atomic: another
/// upload could in principle create the same name between check and write.
/// The token space makes this vanishingly unlikely and it is an accepted
/// risk of the contract; no locking is layered on top.
pub struct NameAllocator {
    token_length: usize,
    max_tries: u32,
    preserved_extensions: Vec<String>,
    token_source: TokenSource,
}

impl NameAllocator {
    pub fn new(token_length: usize, max_tries: u32, preserved_extensions: Vec<String>) -> Self {
        Self {
            token_length,
            max_tries: max_tries.max(1),
            preserved_extensions,
            token_source: Box::new(random_token),
        }
    }

    /// Replace the random token source, e.g. with a deterministic one in
    /// tests that need to force collisions.
    pub fn with_token_source<F>(mut self, source: F) -> Self
    where
        F: Fn(usize) -> String + Send + Sync + 'static,
    {
        self.token_source = Box::new(source);
        self
    }

    /// Allocate a storage name not currently present on disk, retrying up
    /// to the configured maximum before failing with
    /// [`AppError::AllocationExhausted`].
    pub async fn allocate(
        &self,
        storage: &LocalStorage,
        original_name: &str,
    ) -> Result<String, AppError> {
        let extension = storage_extension(original_name, &self.preserved_extensions);

        for attempt in 1..=self.max_tries {
            let name = format!("{}{}", (self.token_source)(self.token_length), extension);
            if !storage.blob_exists(&name).await? {
                return Ok(name);
            }
            tracing::warn!(
                name = %name,
                attempt,
                max_tries = self.max_tries,
                "Storage name collision"
            );
        }

        Err(AppError::AllocationExhausted {
            attempts: self.max_tries,
        })
    }
}
