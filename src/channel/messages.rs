//! Tagged messages exchanged between the rendering side and the host side.
//!
//! Every message is a JSON object with a `type` tag and camelCase fields.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::scroll::ScrollState;

/// Rendering side to host side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderMessage {
    /// The editor is mounted and wants the document.
    Ready,
    /// Normalized markdown produced by the save path.
    Update { content: String },
    /// Something failed on the rendering side.
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stack: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ScrollSync {
        scroll_top: f64,
        scroll_height: f64,
        viewport_height: f64,
    },
}

impl RenderMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            stack: None,
        }
    }

    pub const fn scroll_sync(state: ScrollState) -> Self {
        Self::ScrollSync {
            scroll_top: state.scroll_top,
            scroll_height: state.scroll_height,
            viewport_height: state.viewport_height,
        }
    }
}

/// Host side to rendering side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
    /// New document text, with an optional scroll position to restore.
    #[serde(rename = "documentChanged", alias = "contentChanged", rename_all = "camelCase")]
    ContentChanged {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scroll_top: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Config { show_syntax_on_focus: bool },
    /// Scroll so that `line` of `total_lines` is at the top.
    #[serde(rename_all = "camelCase")]
    ScrollRestoreLine { line: f64, total_lines: usize },
}

const RENDER_KINDS: &[&str] = &["ready", "update", "error", "scrollSync"];
const HOST_KINDS: &[&str] = &[
    "documentChanged",
    "contentChanged",
    "config",
    "scrollRestoreLine",
];

/// Decode one rendering-side message.
///
/// # Errors
///
/// [`SyncError::UnknownKind`] for an unrecognized `type`, and
/// [`SyncError::Malformed`] for anything else that does not fit.
pub fn decode_render_message(raw: &str) -> Result<RenderMessage, SyncError> {
    decode(raw, RENDER_KINDS)
}

/// Decode one host-side message.
///
/// # Errors
///
/// Same as [`decode_render_message`].
pub fn decode_host_message(raw: &str) -> Result<HostMessage, SyncError> {
    decode(raw, HOST_KINDS)
}

fn decode<M: DeserializeOwned>(raw: &str, known: &[&str]) -> Result<M, SyncError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|err| SyncError::Malformed(err.to_string()))?;
    let kind = value
        .get("type")
        .ok_or_else(|| SyncError::Malformed("missing \"type\" field".to_string()))?
        .as_str()
        .ok_or_else(|| SyncError::Malformed("\"type\" is not a string".to_string()))?;
    if !known.contains(&kind) {
        return Err(SyncError::UnknownKind(kind.to_string()));
    }
    serde_json::from_value(value).map_err(|err| SyncError::Malformed(err.to_string()))
}
