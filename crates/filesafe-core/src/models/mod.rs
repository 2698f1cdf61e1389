pub mod album;
pub mod file;
pub mod identity;
pub mod upload;

pub use album::Album;
pub use file::{FileDraft, FileRecord};
pub use identity::UploaderIdentity;
pub use upload::{ListedFile, SubmittedFile, UploadResponse, UploadedEntry};
