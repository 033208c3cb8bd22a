use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{DocumentId, HostDocuments};
use crate::error::SyncError;
use crate::watcher::FileWatcher;

#[derive(Debug)]
struct WatchedFile {
    path: PathBuf,
    watcher: Option<FileWatcher>,
}

/// Documents backed by files on disk, watched for outside modification.
#[derive(Debug, Default)]
pub struct FileHost {
    files: HashMap<DocumentId, WatchedFile>,
}

impl FileHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `path`. The document id is the path as given.
    ///
    /// A file that cannot be watched is still opened; outside edits to it
    /// simply go unnoticed.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read.
    pub fn open(&mut self, path: &Path) -> Result<DocumentId> {
        fs::metadata(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let watcher = match FileWatcher::new(path) {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                tracing::warn!(%err, path = %path.display(), "file watch unavailable");
                None
            }
        };
        let id = DocumentId::new(path.display().to_string());
        self.files.insert(
            id.clone(),
            WatchedFile {
                path: path.to_path_buf(),
                watcher,
            },
        );
        Ok(id)
    }

    /// Stop tracking a document.
    pub fn close(&mut self, id: &DocumentId) {
        self.files.remove(id);
    }

    pub fn path(&self, id: &DocumentId) -> Option<&Path> {
        self.files.get(id).map(|file| file.path.as_path())
    }

    pub fn is_watching(&self, id: &DocumentId) -> bool {
        self.files.get(id).is_some_and(|file| file.watcher.is_some())
    }
}

impl HostDocuments for FileHost {
    fn full_text(&self, id: &DocumentId) -> Option<String> {
        let file = self.files.get(id)?;
        match fs::read_to_string(&file.path) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(%err, path = %file.path.display(), "failed to read document");
                None
            }
        }
    }

    fn replace_full_text(&mut self, id: &DocumentId, text: &str) -> Result<()> {
        let file = self
            .files
            .get(id)
            .ok_or_else(|| SyncError::UnknownDocument(id.to_string()))?;
        fs::write(&file.path, text)
            .with_context(|| format!("Failed to write {}", file.path.display()))
    }

    fn take_changes(&mut self) -> Vec<DocumentId> {
        let mut changed: Vec<DocumentId> = self
            .files
            .iter_mut()
            .filter_map(|(id, file)| {
                let watcher = file.watcher.as_mut()?;
                watcher.take_changed().then(|| id.clone())
            })
            .collect();
        changed.sort();
        changed
    }
}
