//! Scan gate: batch accept/reject decision over the external scanner.

use std::sync::Arc;

use futures::future::join_all;

use filesafe_core::AppError;
use filesafe_services::ScanVerdict;
use filesafe_storage::LocalStorage;

use crate::dedup::StagedFile;
use crate::traits::FileScanner;

/// Submits a batch of staged files to the scanner and decides accept/reject
/// for the whole batch. The batch is one transactional unit submitted by
/// one caller: a single infected file condemns every file in it.
pub struct ScanGate {
    scanner: Arc<dyn FileScanner>,
}

impl ScanGate {
    pub fn new(scanner: Arc<dyn FileScanner>) -> Self {
        Self { scanner }
    }

    /// Scan every staged file concurrently. On any verdict other than clean
    /// the entire batch is deleted from disk and the call fails: infected
    /// files with [`AppError::ThreatDetected`] naming the first detected
    /// threat (concurrent detections of distinct threats surface only the
    /// first, a documented limitation), scanner failures or timeouts with
    /// [`AppError::ScanUnavailable`] — never interpreted as "no threat
    /// found".
    pub async fn check_batch(
        &self,
        storage: &LocalStorage,
        staged: &[StagedFile],
    ) -> Result<(), AppError> {
        let mut paths = Vec::with_capacity(staged.len());
        for file in staged {
            paths.push(storage.blob_path(&file.name)?);
        }

        let verdicts = join_all(
            paths
                .iter()
                .map(|path| self.scanner.scan_path(path)),
        )
        .await;

        let mut first_infected: Option<String> = None;
        let mut first_error: Option<String> = None;

        for (idx, verdict) in verdicts.into_iter().enumerate() {
            match verdict {
                ScanVerdict::Clean => {}
                ScanVerdict::Infected(label) => {
                    tracing::warn!(
                        name = %staged[idx].name,
                        original_name = %staged[idx].original_name,
                        virus = %label,
                        "Threat found in staged file"
                    );
                    if first_infected.is_none() {
                        first_infected = Some(label);
                    }
                }
                ScanVerdict::Error(message) => {
                    if first_error.is_none() {
                        first_error = Some(message);
                    }
                }
            }
        }

        // A definitive threat verdict wins over a scan failure: either way
        // the batch is rejected, but the threat label is the useful signal.
        if let Some(label) = first_infected {
            self.discard_batch(storage, staged).await;
            return Err(AppError::ThreatDetected { label });
        }

        if let Some(message) = first_error {
            self.discard_batch(storage, staged).await;
            return Err(AppError::ScanUnavailable(message));
        }

        Ok(())
    }

    async fn discard_batch(&self, storage: &LocalStorage, staged: &[StagedFile]) {
        for file in staged {
            if let Err(error) = storage.remove_blob(&file.name).await {
                tracing::warn!(name = %file.name, error = %error, "Failed to delete rejected staged file");
            }
        }
    }
}
