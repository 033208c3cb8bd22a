//! Error taxonomy shared by both sides of the sync channel.

/// Errors raised while moving markdown between the host document and the
/// structured editor.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A channel message had the wrong shape or a field of the wrong type.
    #[error("Malformed message: {0}")]
    Malformed(String),
    /// A channel message carried a kind this side does not understand.
    #[error("Unknown message kind: {0}")]
    UnknownKind(String),
    /// Content is larger than the configured ceiling.
    #[error("Content exceeds maximum size ({limit})")]
    Oversized { size: usize, limit: String },
    /// A load or save was attempted before the editor engine was ready.
    #[error("Editor engine is not initialized")]
    Uninitialized,
    /// The editor engine could not be constructed.
    #[error("Editor failed to initialize: {0}")]
    Initialization(String),
    /// The engine could not turn its document back into markdown.
    #[error("Markdown serialization failed: {0}")]
    Serialization(String),
    /// A message referenced a document identity that is not open.
    #[error("Document is not open: {0}")]
    UnknownDocument(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversized_message_names_the_limit() {
        let err = SyncError::Oversized {
            size: 11 * 1024 * 1024,
            limit: "10 MB".to_string(),
        };
        assert_eq!(err.to_string(), "Content exceeds maximum size (10 MB)");
    }

    #[test]
    fn test_unknown_document_names_the_id() {
        let err = SyncError::UnknownDocument("notes.md".to_string());
        assert_eq!(err.to_string(), "Document is not open: notes.md");
    }
}
