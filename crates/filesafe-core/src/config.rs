//! Configuration module
//!
//! Immutable configuration for the ingestion pipeline and its collaborators.
//! A single [`UploadConfig`] value is constructed once at process start
//! (from the environment or by hand) and passed explicitly into each
//! component's constructor; components never read ambient global state.

use std::env;

// Defaults mirror a small single-node deployment
const DEFAULT_TOKEN_LENGTH: usize = 32;
const DEFAULT_MAX_TRIES: u32 = 1;
const DEFAULT_MAX_SIZE_BYTES: i64 = 512 * 1024 * 1024;
const DEFAULT_PAGE_SIZE: i64 = 25;
const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 30;
const DEFAULT_WORKER_CAPACITY: usize = 4;

/// Malware scanner (clamd) connection settings.
#[derive(Clone, Debug)]
pub struct ScanConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    /// Bound on each scan round-trip; timeouts are treated as scan failures,
    /// never as a clean verdict.
    pub timeout_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "localhost".to_string(),
            port: 3310,
            timeout_secs: DEFAULT_SCAN_TIMEOUT_SECS,
        }
    }
}

/// Upload pipeline configuration.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    /// Base URL files are served from, without trailing slash
    /// (e.g. "https://files.example.com").
    pub base_url: String,
    /// Length of the random token portion of a storage name.
    pub token_length: usize,
    /// Maximum name allocation attempts before giving up.
    pub max_tries: u32,
    /// Per-file size ceiling.
    pub max_size_bytes: i64,
    /// Extensions rejected outright (with leading dot, lowercase).
    pub blocked_extensions: Vec<String>,
    /// Multi-part extensions matched greedily before the last dot-segment
    /// (with leading dot, lowercase), e.g. ".tar.gz".
    pub preserved_extensions: Vec<String>,
    /// Reject the whole batch when any staged file is zero bytes.
    pub filter_empty_files: bool,
    /// Derive preview thumbnails for eligible media after responding.
    pub generate_thumbnails: bool,
    pub scan: ScanConfig,
    /// Page size for the listing operation.
    pub page_size: i64,
    /// Path to the ffmpeg binary used for video frame extraction.
    pub ffmpeg_path: String,
    /// Concurrency cap of the background worker pool.
    pub worker_capacity: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9999".to_string(),
            token_length: DEFAULT_TOKEN_LENGTH,
            max_tries: DEFAULT_MAX_TRIES,
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            blocked_extensions: vec![".exe".to_string(), ".bat".to_string(), ".msi".to_string()],
            preserved_extensions: vec![
                ".tar.gz".to_string(),
                ".tar.xz".to_string(),
                ".tar.bz2".to_string(),
                ".tar.zst".to_string(),
            ],
            filter_empty_files: false,
            generate_thumbnails: true,
            scan: ScanConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            ffmpeg_path: "ffmpeg".to_string(),
            worker_capacity: DEFAULT_WORKER_CAPACITY,
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn env_list(key: &str, default: Vec<String>) -> Vec<String> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => default,
    }
}

impl UploadConfig {
    /// Build configuration from `FILESAFE_*` environment variables, falling
    /// back to [`Default`] values. Loads `.env` first if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Self {
            base_url: env_string("FILESAFE_BASE_URL", &defaults.base_url),
            token_length: env_parse("FILESAFE_TOKEN_LENGTH", defaults.token_length),
            max_tries: env_parse("FILESAFE_MAX_TRIES", defaults.max_tries),
            max_size_bytes: env_parse("FILESAFE_MAX_SIZE_BYTES", defaults.max_size_bytes),
            blocked_extensions: env_list(
                "FILESAFE_BLOCKED_EXTENSIONS",
                defaults.blocked_extensions,
            ),
            preserved_extensions: env_list(
                "FILESAFE_PRESERVED_EXTENSIONS",
                defaults.preserved_extensions,
            ),
            filter_empty_files: env_bool("FILESAFE_FILTER_EMPTY_FILES", defaults.filter_empty_files),
            generate_thumbnails: env_bool(
                "FILESAFE_GENERATE_THUMBNAILS",
                defaults.generate_thumbnails,
            ),
            scan: ScanConfig {
                enabled: env_bool("FILESAFE_SCAN_ENABLED", defaults.scan.enabled),
                host: env_string("FILESAFE_SCAN_HOST", &defaults.scan.host),
                port: env_parse("FILESAFE_SCAN_PORT", defaults.scan.port),
                timeout_secs: env_parse("FILESAFE_SCAN_TIMEOUT_SECS", defaults.scan.timeout_secs),
            },
            page_size: env_parse("FILESAFE_PAGE_SIZE", defaults.page_size),
            ffmpeg_path: env_string("FILESAFE_FFMPEG_PATH", &defaults.ffmpeg_path),
            worker_capacity: env_parse("FILESAFE_WORKER_CAPACITY", defaults.worker_capacity),
        }
    }
}
