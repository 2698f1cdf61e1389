//! Filesafe Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration, and
//! persistence trait seams shared across all filesafe components.

pub mod config;
pub mod error;
pub mod ext;
pub mod index;
pub mod models;
pub mod telemetry;

// Re-export commonly used types
pub use config::{ScanConfig, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use index::{AlbumIndex, FileIndex, ListScope};
