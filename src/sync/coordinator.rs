//! Host-side orchestration of every open document.

use std::collections::HashMap;

use tracing::{debug, error, info, warn};

use super::diagnostic::{Diagnostic, DiagnosticLevel};
use super::echo::{EchoVerdict, Provenance, classify};
use crate::channel::{Debouncer, HostMessage, Outbox, RenderMessage, decode_render_message};
use crate::config::Settings;
use crate::error::SyncError;
use crate::host::{DocumentId, HostDocuments};
use crate::limits::check_content_size;
use crate::perf;
use crate::scroll::ScrollState;

/// Everything known about one open document. Dropped as a whole on close.
#[derive(Debug)]
struct DocumentState {
    outbox: Outbox<HostMessage>,
    provenance: Option<Provenance>,
    last_sent: Option<String>,
    scroll: Option<ScrollState>,
    /// Text-view line to restore once the editor reports ready.
    pending_scroll_line: Option<f64>,
    host_change: Debouncer<()>,
}

impl DocumentState {
    fn new(outbox: Outbox<HostMessage>, host_debounce_ms: u64) -> Self {
        Self {
            outbox,
            provenance: None,
            last_sent: None,
            scroll: None,
            pending_scroll_line: None,
            host_change: Debouncer::new(host_debounce_ms),
        }
    }
}

/// Keeps host documents and their rich editors in step.
///
/// Runs on a single thread. All time is passed in as `now_ms`.
#[derive(Debug)]
pub struct SyncCoordinator<H> {
    host: H,
    settings: Settings,
    documents: HashMap<DocumentId, DocumentState>,
    diagnostics: Vec<Diagnostic>,
}

impl<H: HostDocuments> SyncCoordinator<H> {
    pub fn new(host: H, settings: Settings) -> Self {
        Self {
            host,
            settings,
            documents: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    pub const fn host(&self) -> &H {
        &self.host
    }

    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start tracking `id`, sending to its editor through `outbox`.
    ///
    /// Reopening an open document starts it over with fresh state.
    pub fn open(&mut self, id: DocumentId, outbox: Outbox<HostMessage>) {
        debug!(document = %id, "open");
        perf::log_event("sync.open", id.as_str());
        self.documents.insert(
            id,
            DocumentState::new(outbox, self.settings.host_debounce_ms),
        );
    }

    /// Forget everything about `id`, including any pending timer. Idempotent.
    pub fn close(&mut self, id: &DocumentId) {
        let was_open = self.documents.remove(id).is_some();
        if was_open {
            debug!(document = %id, "close");
            perf::log_event("sync.close", id.as_str());
        }
    }

    pub fn is_open(&self, id: &DocumentId) -> bool {
        self.documents.contains_key(id)
    }

    /// Total entries across all per-document maps.
    pub fn residual_entries(&self) -> usize {
        self.documents.len()
    }

    /// Replace the settings and push the editor part to every open editor.
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        let config = settings.editor_config();
        for state in self.documents.values() {
            state.outbox.post(config.clone());
        }
    }

    /// Remember a line to scroll to once the editor for `id` is ready.
    ///
    /// The line lives with the open document, so a handoff for a document
    /// that is not open is dropped and `false` is returned.
    pub fn set_pending_scroll_line(&mut self, id: &DocumentId, line: f64) -> bool {
        let Some(state) = self.documents.get_mut(id) else {
            debug!(document = %id, line, "scroll handoff for unopened document dropped");
            return false;
        };
        state.pending_scroll_line = Some(line);
        true
    }

    /// The text-view line matching the editor's last reported scroll position.
    pub fn text_view_line(&self, id: &DocumentId, total_lines: usize) -> Option<usize> {
        let scroll = self.documents.get(id)?.scroll?;
        Some(scroll.top_line(total_lines))
    }

    /// User-facing messages raised since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Decode and handle one raw message from the editor of `id`.
    ///
    /// Malformed and unknown messages are logged and dropped.
    pub fn handle_raw_message(&mut self, id: &DocumentId, raw: &str, now_ms: u64) {
        let message = match decode_render_message(raw) {
            Ok(message) => message,
            Err(err) => {
                warn!(document = %id, %err, "ignoring editor message");
                perf::log_event("channel.drop", format!("doc={id} err={err}"));
                return;
            }
        };
        if let Err(err) = self.handle_message(id, message, now_ms) {
            debug!(document = %id, %err, "editor message rejected");
        }
    }

    /// Handle one message from the editor of `id`.
    ///
    /// # Errors
    ///
    /// [`SyncError::UnknownDocument`] if `id` is not open, and
    /// [`SyncError::Oversized`] for an update over the size limit (also
    /// raised as a diagnostic).
    pub fn handle_message(
        &mut self,
        id: &DocumentId,
        message: RenderMessage,
        now_ms: u64,
    ) -> Result<(), SyncError> {
        if !self.documents.contains_key(id) {
            return Err(SyncError::UnknownDocument(id.to_string()));
        }
        perf::log_event("channel.recv", format!("doc={id} msg={message:?}"));

        match message {
            RenderMessage::Ready => {
                self.send_initial_state(id);
                Ok(())
            }
            RenderMessage::Update { content } => self.apply_editor_update(id, content, now_ms),
            RenderMessage::Error { message, stack } => {
                error!(document = %id, %message, stack = stack.as_deref().unwrap_or(""), "editor error");
                self.diagnose(id, DiagnosticLevel::Error, format!("Editor error: {message}"));
                Ok(())
            }
            RenderMessage::ScrollSync {
                scroll_top,
                scroll_height,
                viewport_height,
            } => {
                let state = ScrollState::new(scroll_top, scroll_height, viewport_height);
                if !state.is_valid() {
                    debug!(document = %id, ?state, "ignoring invalid scroll state");
                    return Ok(());
                }
                if let Some(doc) = self.documents.get_mut(id) {
                    doc.scroll = Some(state);
                }
                Ok(())
            }
        }
    }

    /// Collect change events from the host and start their quiet periods.
    pub fn poll_host(&mut self, now_ms: u64) {
        for id in self.host.take_changes() {
            match self.documents.get_mut(&id) {
                Some(state) => state.host_change.queue((), now_ms),
                None => debug!(document = %id, "change for document that is not open"),
            }
        }
    }

    /// Examine host changes whose quiet period has passed.
    pub fn tick(&mut self, now_ms: u64) {
        let ready: Vec<DocumentId> = self
            .documents
            .iter_mut()
            .filter_map(|(id, state)| state.host_change.take_ready(now_ms).map(|()| id.clone()))
            .collect();
        for id in ready {
            self.on_host_change(&id, now_ms);
        }
    }

    /// Earliest time `tick` has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        self.documents
            .values()
            .filter_map(|state| state.host_change.deadline())
            .min()
    }

    fn send_initial_state(&mut self, id: &DocumentId) {
        let Some(text) = self.host.full_text(id) else {
            self.diagnose(id, DiagnosticLevel::Error, "Document is not available");
            return;
        };
        if let Err(err) = check_content_size(&text, self.settings.max_content_bytes) {
            warn!(document = %id, %err, "not sending document to editor");
            self.diagnose(id, DiagnosticLevel::Warning, err.to_string());
            return;
        }

        let total_lines = text.matches('\n').count() + 1;
        let config = self.settings.editor_config();
        let Some(state) = self.documents.get_mut(id) else {
            return;
        };
        let pending_line = state.pending_scroll_line.take();
        state.outbox.post(HostMessage::ContentChanged {
            content: text,
            scroll_top: None,
        });
        state.outbox.post(config);
        if let Some(line) = pending_line {
            state
                .outbox
                .post(HostMessage::ScrollRestoreLine { line, total_lines });
        }
    }

    fn apply_editor_update(
        &mut self,
        id: &DocumentId,
        content: String,
        now_ms: u64,
    ) -> Result<(), SyncError> {
        if let Err(err) = check_content_size(&content, self.settings.max_content_bytes) {
            warn!(document = %id, bytes = content.len(), "rejecting oversized update");
            self.diagnose(id, DiagnosticLevel::Warning, err.to_string());
            return Err(err);
        }

        let Some(state) = self.documents.get_mut(id) else {
            return Err(SyncError::UnknownDocument(id.to_string()));
        };
        state.provenance = Some(Provenance::webview(now_ms));
        state.last_sent = Some(content.clone());

        if self.host.full_text(id).as_deref() == Some(content.as_str()) {
            debug!(document = %id, "update matches host text, not writing");
            return Ok(());
        }
        match self.host.replace_full_text(id, &content) {
            Ok(()) => {
                perf::log_event("sync.write", format!("doc={id} bytes={}", content.len()));
            }
            Err(err) => {
                error!(document = %id, err = %format!("{err:#}"), "failed to apply editor update");
                self.diagnose(
                    id,
                    DiagnosticLevel::Error,
                    format!("Failed to apply edit: {err:#}"),
                );
            }
        }
        Ok(())
    }

    fn on_host_change(&mut self, id: &DocumentId, now_ms: u64) {
        let Some(current) = self.host.full_text(id) else {
            return;
        };
        let cooldown_ms = self.settings.cooldown_ms;
        let Some(state) = self.documents.get_mut(id) else {
            return;
        };
        let verdict = classify(
            &mut state.provenance,
            &mut state.last_sent,
            &current,
            now_ms,
            cooldown_ms,
        );
        debug!(document = %id, verdict = verdict.as_str(), "host change");
        perf::log_event("sync.verdict", format!("doc={id} verdict={}", verdict.as_str()));
        if verdict != EchoVerdict::External {
            return;
        }

        if !self.settings.auto_reload {
            info!(document = %id, "external change, auto-reload disabled");
            self.diagnose(
                id,
                DiagnosticLevel::Info,
                "File changed on disk; auto-reload is off",
            );
            return;
        }
        if let Err(err) = check_content_size(&current, self.settings.max_content_bytes) {
            warn!(document = %id, %err, "not reloading oversized document");
            self.diagnose(id, DiagnosticLevel::Warning, err.to_string());
            return;
        }

        let scroll_top = state.scroll.map(|scroll| scroll.scroll_top);
        state.outbox.post(HostMessage::ContentChanged {
            content: current,
            scroll_top,
        });
    }

    fn diagnose(&mut self, id: &DocumentId, level: DiagnosticLevel, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            level,
            document: id.clone(),
            message: message.into(),
        });
    }
}
