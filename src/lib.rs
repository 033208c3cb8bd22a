// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. sync::SyncCoordinator)
    clippy::module_name_repetitions
)]

//! # Velvet
//!
//! The core of a bidirectional markdown editor: a host owns plain markdown
//! text, a rendering side shows it as a structured rich-text document, and
//! edits flow both ways without feedback loops.
//!
//! ## Architecture
//!
//! - **Load path**: host text, placeholder insertion, structured document
//! - **Save path**: structured document, engine serialization, placeholder
//!   removal and newline cleanup, debounced emission
//! - **Echo suppression**: each self-write is stamped; host change events
//!   inside the cooldown, or matching the last written text, are dropped
//!
//! ## Modules
//!
//! - [`text`]: Blank-line placeholders and newline normalization
//! - [`links`]: Hyperlink scheme allow-list
//! - [`scroll`]: Line and pixel offset mapping
//! - [`document`]: Structured document engine and load/save pipeline
//! - [`channel`]: Tagged messages, channels, debounce and throttle timers
//! - [`editor`]: Rendering-side session
//! - [`sync`]: Host-side coordinator with echo suppression
//! - [`host`]: Host document stores (in memory and on disk)
//! - [`watcher`]: File watching
//! - [`config`]: Flags, rc files and resolved settings
//! - [`app`]: JSON-lines bridge process

pub mod app;
pub mod channel;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod host;
pub mod limits;
pub mod links;
pub mod perf;
pub mod scroll;
pub mod sync;
pub mod text;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::channel::{HostMessage, RenderMessage, channel};
    pub use crate::config::Settings;
    pub use crate::document::{ComrakEngine, DocumentEngine, StructuredDocument};
    pub use crate::editor::EditorSession;
    pub use crate::error::SyncError;
    pub use crate::host::{DocumentId, FileHost, HostDocuments, MemoryHost};
    pub use crate::scroll::ScrollState;
    pub use crate::sync::SyncCoordinator;
}
