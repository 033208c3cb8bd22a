//! Host-side document stores.
//!
//! The host owns the canonical text of every document. The sync coordinator
//! only reads it, replaces it wholesale, and listens for change events.

mod file;
mod memory;

use std::fmt;

pub use file::FileHost;
pub use memory::MemoryHost;

/// Stable key for one open document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A store of documents the host edits.
pub trait HostDocuments {
    /// Current full text, or `None` if the document is unknown.
    fn full_text(&self, id: &DocumentId) -> Option<String>;

    /// Replace the whole document. The store reports its own change event
    /// for this write like any other.
    ///
    /// # Errors
    ///
    /// Fails if the document is unknown or the write is rejected.
    fn replace_full_text(&mut self, id: &DocumentId, text: &str) -> anyhow::Result<()>;

    /// Documents changed since the last call, in first-seen order.
    fn take_changes(&mut self) -> Vec<DocumentId>;
}
