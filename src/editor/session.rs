//! Rendering side of one document: the structured editor's lifecycle.
//!
//! A session announces itself with `ready`, loads host text without echoing
//! it back, debounces saves into `update` messages and throttles scroll
//! reports. After `close` every late message or timer is a no-op.

use anyhow::Result;
use tracing::{debug, warn};

use crate::channel::{
    Debouncer, HostMessage, Outbox, RenderMessage, Throttle, decode_host_message,
};
use crate::config::Settings;
use crate::document::{DocumentEngine, LoadOutcome, load, save};
use crate::error::SyncError;
use crate::limits::check_content_size;
use crate::scroll::{ScrollState, line_to_offset};

/// Rendering-side state for one mounted editor.
///
/// Owns the engine, the save debounce and the scroll throttle. Everything is
/// released by [`close`](Self::close).
#[derive(Debug)]
pub struct EditorSession<E> {
    outbox: Outbox<RenderMessage>,
    engine: Option<E>,
    max_content_bytes: usize,
    show_syntax_on_focus: bool,
    save_debounce: Debouncer<()>,
    scroll_throttle: Throttle<ScrollState>,
    /// Scroll height and viewport height of the surface, once known.
    surface: Option<(f64, f64)>,
    pending_scroll_line: Option<(f64, usize)>,
    scroll_target: Option<f64>,
    closed: bool,
}

impl<E: DocumentEngine> EditorSession<E> {
    /// Build the engine and announce readiness, or report why it failed.
    pub fn open(
        outbox: Outbox<RenderMessage>,
        settings: &Settings,
        build: impl FnOnce() -> Result<E>,
    ) -> Self {
        let engine = match build() {
            Ok(engine) => {
                outbox.post(RenderMessage::Ready);
                Some(engine)
            }
            Err(err) => {
                let err = SyncError::Initialization(format!("{err:#}"));
                warn!(%err, "editor failed to start");
                outbox.post(RenderMessage::error(err.to_string()));
                None
            }
        };
        Self {
            outbox,
            engine,
            max_content_bytes: settings.max_content_bytes,
            show_syntax_on_focus: settings.show_syntax_on_focus,
            save_debounce: Debouncer::new(settings.save_debounce_ms),
            scroll_throttle: Throttle::new(settings.scroll_throttle_ms),
            surface: None,
            pending_scroll_line: None,
            scroll_target: None,
            closed: false,
        }
    }

    pub const fn is_open(&self) -> bool {
        !self.closed
    }

    pub const fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// The engine, for applying user edits.
    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.engine.as_mut()
    }

    pub const fn show_syntax_on_focus(&self) -> bool {
        self.show_syntax_on_focus
    }

    /// Decode and handle one raw host message. Bad messages are logged.
    pub fn handle_raw(&mut self, raw: &str) {
        match decode_host_message(raw) {
            Ok(message) => self.handle(message),
            Err(err) => warn!(%err, "ignoring host message"),
        }
    }

    pub fn handle(&mut self, message: HostMessage) {
        if self.closed {
            return;
        }
        match message {
            HostMessage::ContentChanged {
                content,
                scroll_top,
            } => self.load_content(&content, scroll_top),
            HostMessage::Config {
                show_syntax_on_focus,
            } => self.show_syntax_on_focus = show_syntax_on_focus,
            HostMessage::ScrollRestoreLine { line, total_lines } => {
                if let Some((height, viewport)) = self.surface {
                    self.scroll_target = Some(line_to_offset(line, total_lines, height, viewport));
                } else {
                    self.pending_scroll_line = Some((line, total_lines));
                }
            }
        }
    }

    /// Record the surface metrics, resolving a pending line restore.
    pub fn set_surface(&mut self, scroll_height: f64, viewport_height: f64) {
        self.surface = Some((scroll_height, viewport_height));
        if let Some((line, total_lines)) = self.pending_scroll_line.take() {
            self.scroll_target = Some(line_to_offset(
                line,
                total_lines,
                scroll_height,
                viewport_height,
            ));
        }
    }

    /// Offset the surface should scroll to, if one is waiting.
    pub fn take_scroll_target(&mut self) -> Option<f64> {
        self.scroll_target.take()
    }

    /// Feed a scroll event into the report throttle.
    pub fn on_scroll(&mut self, state: ScrollState, now_ms: u64) {
        if self.closed || !state.is_valid() {
            return;
        }
        self.surface = Some((state.scroll_height, state.viewport_height));
        self.scroll_throttle.queue(state, now_ms);
    }

    /// Run due timers: pick up engine updates, emit a debounced save and a
    /// throttled scroll report.
    pub fn tick(&mut self, now_ms: u64) {
        if self.closed {
            return;
        }
        if self.engine.as_mut().is_some_and(|engine| engine.take_update()) {
            self.save_debounce.queue((), now_ms);
        }
        if self.save_debounce.take_ready(now_ms).is_some() {
            self.emit_save();
        }
        if let Some(state) = self.scroll_throttle.take_ready(now_ms) {
            self.outbox.post(RenderMessage::scroll_sync(state));
        }
    }

    /// Earliest time `tick` has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.save_debounce.deadline(), self.scroll_throttle.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Cancel timers and drop the engine. Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.save_debounce.cancel();
        self.scroll_throttle.cancel();
        self.engine = None;
        self.pending_scroll_line = None;
        self.scroll_target = None;
        self.closed = true;
        debug!("editor session closed");
    }

    fn load_content(&mut self, content: &str, scroll_top: Option<f64>) {
        let Some(engine) = self.engine.as_mut() else {
            warn!(err = %SyncError::Uninitialized, "dropping content update");
            return;
        };
        match load(engine, content, self.max_content_bytes) {
            Ok(LoadOutcome::Applied | LoadOutcome::Unchanged) => {
                if let Some(top) = scroll_top.filter(|top| top.is_finite()) {
                    self.scroll_target = Some(top.max(0.0));
                }
            }
            Err(err) => {
                warn!(%err, "failed to load content");
                self.outbox.post(RenderMessage::error(err.to_string()));
            }
        }
    }

    fn emit_save(&mut self) {
        let Some(engine) = self.engine.as_ref() else {
            warn!(err = %SyncError::Uninitialized, "dropping save");
            return;
        };
        let result = save(engine).and_then(|content| {
            check_content_size(&content, self.max_content_bytes)?;
            Ok(content)
        });
        match result {
            Ok(content) => {
                self.outbox.post(RenderMessage::Update { content });
            }
            Err(err) => {
                warn!(%err, "save failed");
                self.outbox.post(RenderMessage::error(err.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{Inbox, channel};
    use crate::document::{ComrakEngine, Notify};

    fn open_session() -> (EditorSession<ComrakEngine>, Inbox<RenderMessage>) {
        let (outbox, inbox) = channel();
        let session = EditorSession::open(outbox, &Settings::default(), || Ok(ComrakEngine::new()));
        assert_eq!(inbox.drain(), vec![RenderMessage::Ready]);
        (session, inbox)
    }

    fn updates(inbox: &Inbox<RenderMessage>) -> Vec<String> {
        inbox
            .drain()
            .into_iter()
            .filter_map(|message| match message {
                RenderMessage::Update { content } => Some(content),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_failed_build_reports_error_instead_of_ready() {
        let (outbox, inbox) = channel();
        let session: EditorSession<ComrakEngine> =
            EditorSession::open(outbox, &Settings::default(), || {
                anyhow::bail!("mount point not found")
            });
        assert!(session.engine().is_none());
        let messages = inbox.drain();
        assert!(matches!(
            &messages[..],
            [RenderMessage::Error { message, .. }] if message.contains("mount point not found")
        ));
    }

    #[test]
    fn test_rapid_edits_emit_one_update() {
        let (mut session, inbox) = open_session();

        session.engine_mut().unwrap().replace("a");
        session.tick(0);
        session.engine_mut().unwrap().replace("ab");
        session.tick(20);
        session.tick(60);
        assert!(updates(&inbox).is_empty());

        session.tick(70);
        assert_eq!(updates(&inbox), vec!["ab\n".to_string()]);
        session.tick(500);
        assert!(updates(&inbox).is_empty());
    }

    #[test]
    fn test_loaded_content_is_not_echoed() {
        let (mut session, inbox) = open_session();
        session.handle(HostMessage::ContentChanged {
            content: "Para 1\n\nPara 2\n".to_string(),
            scroll_top: None,
        });
        session.tick(0);
        session.tick(1000);
        assert!(inbox.drain().is_empty());
        assert_eq!(
            session.engine().unwrap().document().navigable_nodes(),
            3
        );
    }

    #[test]
    fn test_edit_after_load_saves_without_placeholders() {
        let (mut session, inbox) = open_session();
        session.handle(HostMessage::ContentChanged {
            content: "Para 1\n\nPara 2\n".to_string(),
            scroll_top: None,
        });
        let engine = session.engine_mut().unwrap();
        let end = engine.content().chars().count();
        engine.insert(end, "\n\u{200B}\n\nPara 3\n");
        session.tick(0);
        session.tick(50);
        assert_eq!(updates(&inbox), vec!["Para 1\n\nPara 2\n\nPara 3\n".to_string()]);
    }

    #[test]
    fn test_oversized_content_reports_error() {
        let (outbox, inbox) = channel();
        let settings = Settings {
            max_content_bytes: 4,
            ..Settings::default()
        };
        let mut session = EditorSession::open(outbox, &settings, || Ok(ComrakEngine::new()));
        inbox.drain();

        session.handle(HostMessage::ContentChanged {
            content: "way too long".to_string(),
            scroll_top: None,
        });
        let messages = inbox.drain();
        assert!(matches!(
            &messages[..],
            [RenderMessage::Error { message, .. }] if message == "Content exceeds maximum size (4 Bytes)"
        ));
        assert_eq!(session.engine().unwrap().content(), "");
    }

    #[test]
    fn test_content_changed_sets_scroll_target() {
        let (mut session, _inbox) = open_session();
        session.handle(HostMessage::ContentChanged {
            content: "x\n".to_string(),
            scroll_top: Some(240.0),
        });
        assert_eq!(session.take_scroll_target(), Some(240.0));
        assert_eq!(session.take_scroll_target(), None);
    }

    #[test]
    fn test_scroll_restore_waits_for_surface() {
        let (mut session, _inbox) = open_session();
        session.handle(HostMessage::ScrollRestoreLine {
            line: 42.0,
            total_lines: 100,
        });
        assert_eq!(session.take_scroll_target(), None);

        session.set_surface(2000.0, 800.0);
        assert_eq!(session.take_scroll_target(), Some(840.0));
    }

    #[test]
    fn test_scroll_reports_are_throttled() {
        let (mut session, inbox) = open_session();
        for now in 0..10u32 {
            session.on_scroll(ScrollState::new(f64::from(now) * 10.0, 2000.0, 800.0), u64::from(now));
            session.tick(u64::from(now));
        }
        assert!(inbox.drain().is_empty());

        session.tick(100);
        assert_eq!(
            inbox.drain(),
            vec![RenderMessage::ScrollSync {
                scroll_top: 90.0,
                scroll_height: 2000.0,
                viewport_height: 800.0,
            }]
        );
    }

    #[test]
    fn test_config_message_updates_flag() {
        let (mut session, _inbox) = open_session();
        session.handle_raw(r#"{"type":"config","showSyntaxOnFocus":true}"#);
        assert!(session.show_syntax_on_focus());
        session.handle_raw(r#"{"type":"mystery"}"#);
        assert!(session.show_syntax_on_focus());
    }

    #[test]
    fn test_close_is_idempotent_and_cancels_timers() {
        let (mut session, inbox) = open_session();
        session.engine_mut().unwrap().replace("typed");
        session.tick(0);
        session.on_scroll(ScrollState::new(1.0, 100.0, 50.0), 0);

        session.close();
        session.close();
        session.tick(1000);
        assert!(!session.is_open());
        assert!(session.engine().is_none());
        assert_eq!(session.next_deadline(), None);
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn test_content_after_close_is_ignored() {
        let (mut session, inbox) = open_session();
        session.close();
        session.handle(HostMessage::ContentChanged {
            content: "late".to_string(),
            scroll_top: None,
        });
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn test_engine_update_with_suppressed_set_is_quiet() {
        let (mut session, inbox) = open_session();
        session
            .engine_mut()
            .unwrap()
            .set_content("quiet", Notify::Suppress)
            .unwrap();
        session.tick(0);
        session.tick(100);
        assert!(inbox.drain().is_empty());
    }
}
