//! Document store abstraction.
//!
//! The scanner, renderer and cleanup engine only talk to the vault through
//! [`DocumentStore`]. Paths are forward-slash strings relative to the vault
//! root. [`FsStore`] backs a real directory; [`MemoryStore`] keeps everything
//! in memory for tests.

pub mod fs;
pub mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use crate::models::Document;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),
}

impl StoreError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// What a write does to the document's modification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MtimePolicy {
    /// Let the write bump the modification time
    Touch,
    /// Restore the given modification time after writing
    Preserve(DateTime<Utc>),
}

/// One listing of the vault: per-document stat failures are kept in place
/// so the caller can report them.
pub type Listing = Vec<Result<Document, StoreError>>;

pub trait DocumentStore {
    /// Every document, in a stable enumeration order.
    ///
    /// Fails only when the vault as a whole cannot be listed.
    fn list_documents(&self) -> Result<Listing, StoreError>;

    fn read_content(&self, path: &str) -> Result<String, StoreError>;

    fn write_content(&self, path: &str, content: &str, mtime: MtimePolicy) -> Result<(), StoreError>;

    /// Rename a document. Never overwrites an existing document.
    fn rename(&self, from: &str, to: &str) -> Result<(), StoreError>;

    fn exists(&self, path: &str) -> bool;

    /// First document (in enumeration order) whose bare name is `name`
    fn resolve_by_bare_name(&self, name: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .list_documents()?
            .into_iter()
            .filter_map(Result::ok)
            .find(|doc| doc.bare_name() == name))
    }
}
