//! Echo-suppressed synchronization between host documents and editors.
//!
//! The coordinator writes editor updates to the host, then classifies the
//! host change events that follow so its own writes are not sent back.

mod coordinator;
mod diagnostic;
mod echo;

pub use coordinator::SyncCoordinator;
pub use diagnostic::{Diagnostic, DiagnosticLevel};
pub use echo::{
    EchoVerdict, Provenance, Source, classify, is_echo_content, is_within_cooldown,
};
