//! Rendering-side editor session.
//!
//! Wraps a [`DocumentEngine`](crate::document::DocumentEngine) with the save
//! debounce, the scroll-report throttle and the open/close lifecycle.

mod session;

pub use session::EditorSession;
