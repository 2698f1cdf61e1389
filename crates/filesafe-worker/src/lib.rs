//! Filesafe worker
//!
//! Bounded pool for detached post-response work (thumbnail derivation,
//! album timestamp touch-ups). Tasks run outside the request/response
//! lifecycle and can never fail a request already answered: every error is
//! logged at this boundary and goes no further.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

/// Semaphore-capped fire-and-forget task pool.
///
/// `spawn` never blocks the caller; tasks past the capacity wait for a
/// permit inside their own spawned future.
#[derive(Clone)]
pub struct BackgroundPool {
    semaphore: Arc<Semaphore>,
}

impl BackgroundPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity.max(1))),
        }
    }

    /// Submit a detached task. The label names the task in logs.
    pub fn spawn<F>(&self, label: &'static str, task: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let semaphore = self.semaphore.clone();
        tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                // Closed semaphore means shutdown; drop the task.
                Err(_) => return,
            };
            if let Err(error) = task.await {
                tracing::warn!(task = label, error = %error, "Background task failed");
            } else {
                tracing::debug!(task = label, "Background task finished");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrency_is_bounded() {
        let pool = BackgroundPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..8 {
            let running = running.clone();
            let peak = peak.clone();
            let done = done.clone();
            pool.spawn("test-task", async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                done.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        // Wait for all tasks to drain.
        for _ in 0..100 {
            if done.load(Ordering::SeqCst) == 8 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(done.load(Ordering::SeqCst), 8);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let pool = BackgroundPool::new(1);
        pool.spawn("failing-task", async { anyhow::bail!("boom") });
        // Nothing to assert beyond "does not panic the runtime".
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
