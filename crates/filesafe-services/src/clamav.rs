use std::path::Path;
use std::str;
use std::time::{Duration, Instant};

use clamav_client::tokio::Tcp;

use filesafe_core::config::ScanConfig;

/// Outcome of one scan round-trip.
///
/// `Error` is never a clean verdict: the scan gate treats it as
/// scanner-unavailable and fails closed.
#[derive(Debug, Clone)]
pub enum ScanVerdict {
    Clean,
    Infected(String),
    Error(String),
}

/// Client for a clamd instance reachable over TCP.
#[derive(Clone)]
pub struct ClamAvService {
    host: String,
    port: u16,
    timeout: Duration,
}

impl ClamAvService {
    pub fn new(host: String, port: u16, timeout_secs: u64) -> Self {
        Self {
            host,
            port,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.host.clone(), config.port, config.timeout_secs)
    }

    /// Scan a staged file by path. The round-trip is bounded by the
    /// configured timeout; a timeout is reported as [`ScanVerdict::Error`].
    pub async fn scan_path(&self, path: &Path) -> ScanVerdict {
        let start = Instant::now();
        tracing::debug!(host = %self.host, port = self.port, path = %path.display(), "Starting ClamAV scan");

        let connection = Tcp {
            host_address: format!("{}:{}", self.host, self.port),
        };

        let result = tokio::time::timeout(
            self.timeout,
            clamav_client::tokio::scan_file(path, connection, None),
        )
        .await;

        let response = match result {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                let message = format!("ClamAV scan error: {}", e);
                tracing::error!(error = %message, path = %path.display(), "ClamAV scan failed");
                return ScanVerdict::Error(message);
            }
            Err(_) => {
                let message = format!(
                    "ClamAV scan timeout (exceeded {} seconds)",
                    self.timeout.as_secs()
                );
                tracing::error!(error = %message, path = %path.display(), "ClamAV scan timeout");
                return ScanVerdict::Error(message);
            }
        };

        match clamav_client::clean(&response) {
            Ok(true) => {
                tracing::info!(
                    duration_ms = start.elapsed().as_millis(),
                    path = %path.display(),
                    "File scan completed: clean"
                );
                ScanVerdict::Clean
            }
            Ok(false) => {
                let label = parse_virus_label(&response);
                tracing::warn!(
                    duration_ms = start.elapsed().as_millis(),
                    path = %path.display(),
                    virus = %label,
                    "File scan detected threat"
                );
                ScanVerdict::Infected(label)
            }
            Err(e) => {
                let message = format!("Failed to parse ClamAV response: {}", e);
                tracing::error!(error = %message, "Unparseable ClamAV response");
                ScanVerdict::Error(message)
            }
        }
    }
}

/// Extract the threat label from a clamd reply such as
/// `stream: Eicar-Test-Signature FOUND\0`.
fn parse_virus_label(response: &[u8]) -> String {
    let text = match str::from_utf8(response) {
        Ok(s) => s.trim_matches(|c: char| c == '\0' || c.is_whitespace()),
        Err(_) => return "unknown".to_string(),
    };

    let Some(body) = text.strip_suffix("FOUND").map(str::trim_end) else {
        return "unknown".to_string();
    };

    match body.rsplit_once(": ") {
        Some((_, label)) if !label.trim().is_empty() => label.trim().to_string(),
        _ => "unknown".to_string(),
    }
}
