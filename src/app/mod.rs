//! The host-side bridge process.
//!
//! [`App::run`] opens one markdown file, watches it, and speaks the editor
//! protocol as JSON lines: editor messages arrive on stdin, host messages
//! leave on stdout, and diagnostics go to stderr.

mod event_loop;

use std::path::PathBuf;

use crate::config::Settings;

/// Owns the bridge configuration and runs the event loop.
pub struct App {
    file_path: PathBuf,
    settings: Settings,
    poll_interval_ms: u64,
}

impl App {
    /// Create a bridge for the given file with default settings.
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            settings: Settings::default(),
            poll_interval_ms: 50,
        }
    }

    /// Use resolved sync settings.
    pub const fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Longest the loop sleeps before checking the file watcher again.
    pub const fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }
}
