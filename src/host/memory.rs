use std::collections::HashMap;

use anyhow::Result;

use super::{DocumentId, HostDocuments};
use crate::error::SyncError;

/// In-memory document store that records a change event for every write.
#[derive(Debug, Default)]
pub struct MemoryHost {
    documents: HashMap<DocumentId, String>,
    changes: Vec<DocumentId>,
    writes: usize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document without raising a change.
    pub fn insert(&mut self, id: impl Into<DocumentId>, text: impl Into<String>) {
        self.documents.insert(id.into(), text.into());
    }

    pub fn remove(&mut self, id: &DocumentId) {
        self.documents.remove(id);
        self.changes.retain(|changed| changed != id);
    }

    /// Simulate another actor editing the document.
    pub fn edit_externally(&mut self, id: &DocumentId, text: impl Into<String>) {
        self.documents.insert(id.clone(), text.into());
        self.record_change(id);
    }

    /// Number of successful `replace_full_text` calls.
    pub const fn write_count(&self) -> usize {
        self.writes
    }

    fn record_change(&mut self, id: &DocumentId) {
        if !self.changes.contains(id) {
            self.changes.push(id.clone());
        }
    }
}

impl HostDocuments for MemoryHost {
    fn full_text(&self, id: &DocumentId) -> Option<String> {
        self.documents.get(id).cloned()
    }

    fn replace_full_text(&mut self, id: &DocumentId, text: &str) -> Result<()> {
        let Some(current) = self.documents.get_mut(id) else {
            return Err(SyncError::UnknownDocument(id.to_string()).into());
        };
        text.clone_into(current);
        self.writes += 1;
        self.record_change(id);
        Ok(())
    }

    fn take_changes(&mut self) -> Vec<DocumentId> {
        std::mem::take(&mut self.changes)
    }
}
