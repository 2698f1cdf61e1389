//! Traits for the ingestion pipeline.

use std::path::Path;

use async_trait::async_trait;

use filesafe_services::{ClamAvService, ScanVerdict};

/// Malware scanner seam. Implemented by [`ClamAvService`] in production and
/// by stubs in tests.
#[async_trait]
pub trait FileScanner: Send + Sync {
    async fn scan_path(&self, path: &Path) -> ScanVerdict;
}

#[async_trait]
impl FileScanner for ClamAvService {
    async fn scan_path(&self, path: &Path) -> ScanVerdict {
        ClamAvService::scan_path(self, path).await
    }
}
