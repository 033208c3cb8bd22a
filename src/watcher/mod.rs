//! Change detection for file-backed documents.
//!
//! The watcher only says that the file was touched. Debouncing and deciding
//! whether the change was our own write belong to the sync coordinator.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// The file a watcher cares about and the directory actually watched.
///
/// Editors and atomic writers often replace a file through a rename in its
/// directory, so the parent is watched and events are matched back by path or
/// file name.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WatchTarget {
    root: PathBuf,
    path: PathBuf,
    name: Option<OsString>,
}

impl WatchTarget {
    fn new(path: &Path) -> Self {
        // OS event paths are canonical
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let root = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let name = path.file_name().map(ToOwned::to_owned);
        Self { root, path, name }
    }

    fn matches(&self, event: &Event) -> bool {
        if !is_content_event(&event.kind) {
            return false;
        }
        event.paths.iter().any(|path| {
            *path == self.path
                || *path == self.root
                || self
                    .name
                    .as_deref()
                    .is_some_and(|name| path.file_name() == Some(name))
        })
    }
}

/// Reads and opens do not change content; our own `full_text` reads must
/// never look like edits.
const fn is_content_event(kind: &EventKind) -> bool {
    !matches!(kind, EventKind::Access(_))
}

/// Watches one file on disk.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    target: WatchTarget,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("target", &self.target.path)
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    /// Start watching `path`.
    ///
    /// # Errors
    /// Returns an error if the platform watcher cannot be created or the
    /// parent directory cannot be watched.
    pub fn new(path: impl AsRef<Path>) -> notify::Result<Self> {
        let target = WatchTarget::new(path.as_ref());

        let (tx, events) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&target.root, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            events,
            target,
        })
    }

    /// Canonical path of the watched file.
    pub fn target_path(&self) -> &Path {
        &self.target.path
    }

    /// Drain pending events. True if any of them touched the file.
    pub fn take_changed(&mut self) -> bool {
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        for result in self.events.try_iter() {
            match result {
                Ok(event) if self.target.matches(&event) => relevant += 1,
                Ok(_) => ignored += 1,
                Err(err) => {
                    tracing::warn!(%err, path = %self.target.path.display(), "watch error");
                }
            }
        }

        if relevant + ignored > 0 {
            crate::perf::log_event(
                "watcher.poll",
                format!(
                    "relevant={relevant} ignored={ignored} target={}",
                    self.target.path.display()
                ),
            );
        }
        relevant > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, DataChange, EventAttributes, ModifyKind};
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    fn event(kind: EventKind, path: PathBuf) -> Event {
        Event {
            kind,
            paths: vec![path],
            attrs: EventAttributes::new(),
        }
    }

    fn modify() -> EventKind {
        EventKind::Modify(ModifyKind::Data(DataChange::Content))
    }

    #[test]
    fn test_target_matches_file_and_its_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let path = root.join("doc.md");
        std::fs::write(&path, "hi").unwrap();
        let target = WatchTarget::new(&path);

        assert!(target.matches(&event(modify(), path)));
        assert!(target.matches(&event(EventKind::Any, root.clone())));
        assert!(!target.matches(&event(modify(), root.join("other.md"))));
    }

    #[test]
    fn test_access_events_are_not_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().canonicalize().unwrap().join("doc.md");
        std::fs::write(&path, "hi").unwrap();
        let target = WatchTarget::new(&path);

        assert!(!target.matches(&event(EventKind::Access(AccessKind::Any), path)));
    }

    #[test]
    fn test_renamed_in_file_matches_by_name() {
        let target = WatchTarget::new(Path::new("/no/such/dir/doc.md"));
        assert!(target.matches(&event(modify(), PathBuf::from("/elsewhere/doc.md"))));
    }

    #[test]
    fn test_bare_file_name_watches_current_dir() {
        let target = WatchTarget::new(Path::new("no-such-notes.md"));
        assert_eq!(target.root, PathBuf::from("."));
    }

    #[test]
    fn test_disk_write_is_detected() {
        let dir = tempdir().unwrap();
        let path = dir.path().canonicalize().unwrap().join("watched.md");
        std::fs::write(&path, "before").unwrap();
        let mut watcher = FileWatcher::new(&path).unwrap();
        assert_eq!(watcher.target_path(), path);

        // Backends need a moment before the watch is live
        std::thread::sleep(Duration::from_millis(500));
        std::fs::write(&path, "after").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut detected = false;
        while Instant::now() < deadline && !detected {
            detected = watcher.take_changed();
            std::thread::sleep(Duration::from_millis(50));
        }
        assert!(detected, "write should be seen within 5 seconds");
    }
}
