//! Load and save paths between host text and the structured editor.

use tracing::{debug, warn};

use super::engine::{ComrakEngine, DocumentEngine, Notify};
use super::validate::validate_markdown;
use crate::error::SyncError;
use crate::limits::{MAX_CONTENT_SIZE_BYTES, check_content_size};
use crate::perf;
use crate::text::{add_placeholders, normalize_line_endings, serialize};

/// What the load path did with incoming text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The engine now holds the new text.
    Applied,
    /// The engine already serialized to this text; nothing was touched.
    Unchanged,
}

/// Load host text into the engine without raising an update notification.
///
/// Skips the set when the engine already serializes to `text`, so a no-op
/// update does not reset the cursor.
///
/// # Errors
///
/// Returns [`SyncError::Oversized`] if `text` is larger than `max_bytes`,
/// or whatever the engine reports.
pub fn load<E: DocumentEngine>(
    engine: &mut E,
    text: &str,
    max_bytes: usize,
) -> Result<LoadOutcome, SyncError> {
    let _scope = perf::scope("pipeline.load");
    check_content_size(text, max_bytes)?;
    for warning in validate_markdown(text, max_bytes).warnings {
        warn!(%warning, "markdown validation");
    }

    let text = normalize_line_endings(text);
    if save(engine)? == text {
        debug!(bytes = text.len(), "load skipped, content unchanged");
        return Ok(LoadOutcome::Unchanged);
    }

    engine.set_content(&add_placeholders(&text), Notify::Suppress)?;
    debug!(bytes = text.len(), "loaded content into editor");
    Ok(LoadOutcome::Applied)
}

/// Serialize the engine's document into host text.
///
/// # Errors
///
/// Propagates engine serialization failures.
pub fn save<E: DocumentEngine>(engine: &E) -> Result<String, SyncError> {
    let _scope = perf::scope("pipeline.save");
    let raw = engine.serialize_markdown()?;
    Ok(serialize(&raw))
}

/// Load `text` into a fresh engine and save it straight back.
///
/// # Example
///
/// ```
/// use velvet::document::roundtrip;
///
/// assert_eq!(roundtrip("Para 1\n\nPara 2\n").unwrap(), "Para 1\n\nPara 2\n");
/// ```
///
/// # Errors
///
/// Fails on oversized input or engine serialization errors.
pub fn roundtrip(text: &str) -> Result<String, SyncError> {
    roundtrip_with_limit(text, MAX_CONTENT_SIZE_BYTES)
}

/// [`roundtrip`] with a caller-chosen size ceiling.
///
/// # Errors
///
/// Returns [`SyncError::Oversized`] if `text` is larger than `max_bytes`,
/// or propagates engine serialization errors.
pub fn roundtrip_with_limit(text: &str, max_bytes: usize) -> Result<String, SyncError> {
    let mut engine = ComrakEngine::new();
    load(&mut engine, text, max_bytes)?;
    save(&engine)
}
