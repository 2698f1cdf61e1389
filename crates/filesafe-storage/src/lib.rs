//! Filesafe storage
//!
//! Local filesystem blob store: a flat directory of blobs keyed by storage
//! name, plus a `thumbs/` subdirectory for derived previews. Also home of
//! the collision-checked [`NameAllocator`].

pub mod allocator;
pub mod local;

pub use allocator::NameAllocator;
pub use local::{LocalStorage, StorageError, StorageResult, THUMBS_DIR};
