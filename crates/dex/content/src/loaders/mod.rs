//! Content loaders for reading static documents.
//!
//! Documents are reached through a [`DocumentSource`] (a directory tree or an
//! in-memory set) and parsed into a [`StaticLibrary`] by a scan that skips,
//! rather than aborts on, malformed documents.

pub mod config;
pub mod library;
pub mod source;

pub use config::ConfigLoader;
pub use library::{SkippedDocument, StaticLibrary};
pub use source::{DirectorySource, DocumentKind, DocumentSource, MemorySource, document_id};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
