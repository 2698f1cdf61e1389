//! Error types module
//!
//! All surfaced failures of the ingestion and deletion pipelines are unified
//! under the [`AppError`] enum. Scanner and database internals are never
//! shown to callers; their variants substitute a generic contact-owner
//! message via [`ErrorMetadata::client_message`].
//!
//! The `From<sqlx::Error>` conversion is gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like policy rejections
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g. "THREAT_DETECTED")
    fn error_code(&self) -> &'static str;

    /// Client-facing description (may differ from the internal message)
    fn client_message(&self) -> String;

    /// Whether internal details must be hidden from the caller
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Could not allocate a unique file name after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },

    #[error("File extension {extension} is not allowed")]
    BlockedExtension { extension: String },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    OversizeFile { size: i64, max: i64 },

    #[error("No files were submitted")]
    NoFilesSubmitted,

    #[error("Empty files are not allowed")]
    EmptyFileRejected,

    #[error("Scanner unavailable: {0}")]
    ScanUnavailable(String),

    #[error("Threat detected: {label}")]
    ThreatDetected { label: String },

    #[error("Not authorized to perform this operation")]
    NotAuthorized,

    #[error("File record not found")]
    RecordNotFound,

    #[error("Album doesn't exist or it doesn't belong to the user")]
    AlbumNotFound,

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Filesystem failure: {0}")]
    FilesystemFailure(String),
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::PersistenceFailure(err.to_string())
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::FilesystemFailure(err.to_string())
    }
}

/// Static metadata per variant: (error_code, sensitive, log_level).
/// client_message stays per-variant for dynamic content.
fn app_error_static_metadata(err: &AppError) -> (&'static str, bool, LogLevel) {
    match err {
        AppError::AllocationExhausted { .. } => ("ALLOCATION_EXHAUSTED", false, LogLevel::Warn),
        AppError::BlockedExtension { .. } => ("BLOCKED_EXTENSION", false, LogLevel::Debug),
        AppError::OversizeFile { .. } => ("OVERSIZE_FILE", false, LogLevel::Debug),
        AppError::NoFilesSubmitted => ("NO_FILES_SUBMITTED", false, LogLevel::Debug),
        AppError::EmptyFileRejected => ("EMPTY_FILE_REJECTED", false, LogLevel::Debug),
        AppError::ScanUnavailable(_) => ("SCAN_UNAVAILABLE", true, LogLevel::Error),
        AppError::ThreatDetected { .. } => ("THREAT_DETECTED", false, LogLevel::Warn),
        AppError::NotAuthorized => ("NOT_AUTHORIZED", false, LogLevel::Debug),
        AppError::RecordNotFound => ("RECORD_NOT_FOUND", false, LogLevel::Debug),
        AppError::AlbumNotFound => ("ALBUM_NOT_FOUND", false, LogLevel::Debug),
        AppError::PersistenceFailure(_) => ("PERSISTENCE_FAILURE", true, LogLevel::Error),
        AppError::FilesystemFailure(_) => ("FILESYSTEM_FAILURE", true, LogLevel::Error),
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::ScanUnavailable(_) => {
                "File scanner is unavailable, please contact the site owner".to_string()
            }
            AppError::PersistenceFailure(_) => {
                "Failed to store upload metadata, please contact the site owner".to_string()
            }
            AppError::FilesystemFailure(_) => {
                "Storage failure, please contact the site owner".to_string()
            }
            AppError::ThreatDetected { label } => format!("Threat detected: {}.", label),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_unavailable_hides_internal_detail() {
        let err = AppError::ScanUnavailable("connection refused (os error 111)".to_string());
        assert_eq!(err.error_code(), "SCAN_UNAVAILABLE");
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("os error"));
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn threat_detected_surfaces_label() {
        let err = AppError::ThreatDetected {
            label: "Eicar-Test-Signature".to_string(),
        };
        assert!(err.client_message().contains("Eicar-Test-Signature"));
        assert!(!err.is_sensitive());
    }

    #[test]
    fn io_error_maps_to_filesystem_failure() {
        let err: AppError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.error_code(), "FILESYSTEM_FAILURE");
    }

    #[test]
    fn policy_rejections_log_at_debug() {
        assert_eq!(AppError::NoFilesSubmitted.log_level(), LogLevel::Debug);
        assert_eq!(AppError::EmptyFileRejected.log_level(), LogLevel::Debug);
        assert_eq!(
            AppError::OversizeFile { size: 10, max: 5 }.log_level(),
            LogLevel::Debug
        );
    }
}
