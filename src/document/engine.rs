//! The structured-document engine behind the rich editing surface.

use std::ops::Range;

use ropey::Rope;

use super::parser::{parse, render_commonmark};
use super::types::StructuredDocument;
use crate::error::SyncError;

/// Whether replacing the content should raise an update notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notify {
    Emit,
    /// Used by the load path so a programmatic set does not echo back out.
    Suppress,
}

/// Get/set/serialize surface of a rich-text engine.
///
/// Update notifications are queued inside the engine and drained with
/// [`take_update`](Self::take_update) by whoever owns it.
pub trait DocumentEngine {
    /// Replace the whole document with parsed `markdown`.
    fn set_content(&mut self, markdown: &str, notify: Notify) -> Result<(), SyncError>;

    /// The markdown the current document was built from.
    fn content(&self) -> String;

    /// Raw engine markdown for the current document, before normalization.
    fn serialize_markdown(&self) -> Result<String, SyncError>;

    /// Returns true once for every batch of changes since the last call.
    fn take_update(&mut self) -> bool;
}

/// Engine built on comrak, holding its source in a rope.
#[derive(Debug)]
pub struct ComrakEngine {
    source: Rope,
    document: StructuredDocument,
    update_pending: bool,
}

impl ComrakEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self {
            source: Rope::new(),
            document: StructuredDocument::default(),
            update_pending: false,
        }
    }

    /// The current structured tree.
    pub const fn document(&self) -> &StructuredDocument {
        &self.document
    }

    /// Total source lines, used for scroll mapping.
    pub fn line_count(&self) -> usize {
        self.source.len_lines()
    }

    /// Insert `text` at a character offset (clamped to the end).
    pub fn insert(&mut self, char_idx: usize, text: &str) {
        let at = char_idx.min(self.source.len_chars());
        self.source.insert(at, text);
        self.user_edit();
    }

    /// Remove a character range (clamped to the document).
    pub fn remove(&mut self, range: Range<usize>) {
        let len = self.source.len_chars();
        let end = range.end.min(len);
        let start = range.start.min(end);
        if start == end {
            return;
        }
        self.source.remove(start..end);
        self.user_edit();
    }

    /// Replace the whole source as a user edit.
    pub fn replace(&mut self, text: &str) {
        self.source = Rope::from_str(text);
        self.user_edit();
    }

    fn user_edit(&mut self) {
        self.rebuild();
        self.update_pending = true;
    }

    fn rebuild(&mut self) {
        self.document = parse(&self.source.to_string());
    }
}

impl Default for ComrakEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentEngine for ComrakEngine {
    fn set_content(&mut self, markdown: &str, notify: Notify) -> Result<(), SyncError> {
        self.source = Rope::from_str(markdown);
        self.rebuild();
        if notify == Notify::Emit {
            self.update_pending = true;
        }
        Ok(())
    }

    fn content(&self) -> String {
        self.source.to_string()
    }

    fn serialize_markdown(&self) -> Result<String, SyncError> {
        render_commonmark(&self.content())
    }

    fn take_update(&mut self) -> bool {
        std::mem::take(&mut self.update_pending)
    }
}
