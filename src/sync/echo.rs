//! Deciding whether a host change was caused by our own write.
//!
//! Timing is checked first and content second. A change inside the cooldown
//! window after a self-write is an echo even if the text differs. After the
//! window, a change whose text equals the last write is a late echo. Anything
//! else came from someone else.

/// Who last wrote the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The rich editor, through the save path.
    Webview,
    External,
}

/// The most recent write to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provenance {
    pub source: Source,
    pub timestamp_ms: u64,
}

impl Provenance {
    pub const fn webview(timestamp_ms: u64) -> Self {
        Self {
            source: Source::Webview,
            timestamp_ms,
        }
    }
}

/// Classification of a host change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoVerdict {
    /// Inside the cooldown window after a self-write.
    Echo,
    /// After the window, but the text is what we wrote.
    SlowEcho,
    External,
}

impl EchoVerdict {
    pub const fn is_echo(self) -> bool {
        matches!(self, Self::Echo | Self::SlowEcho)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Echo => "echo",
            Self::SlowEcho => "slow-echo",
            Self::External => "external",
        }
    }
}

/// Whether `now_ms` is strictly less than `cooldown_ms` after `last_update_ms`.
pub const fn is_within_cooldown(last_update_ms: u64, now_ms: u64, cooldown_ms: u64) -> bool {
    now_ms.saturating_sub(last_update_ms) < cooldown_ms
}

/// Whether the host text is exactly what was last sent.
pub fn is_echo_content(current: &str, last_sent: Option<&str>) -> bool {
    last_sent.is_some_and(|sent| sent == current)
}

/// Classify a host change and update the per-document records.
///
/// An echo inside the window keeps both records so later fires from the same
/// burst are also suppressed. A slow echo or an external change clears both.
pub fn classify(
    provenance: &mut Option<Provenance>,
    last_sent: &mut Option<String>,
    current: &str,
    now_ms: u64,
    cooldown_ms: u64,
) -> EchoVerdict {
    if let Some(record) = *provenance
        && record.source == Source::Webview
        && is_within_cooldown(record.timestamp_ms, now_ms, cooldown_ms)
    {
        return EchoVerdict::Echo;
    }

    let verdict = if is_echo_content(current, last_sent.as_deref()) {
        EchoVerdict::SlowEcho
    } else {
        EchoVerdict::External
    };
    *provenance = None;
    *last_sent = None;
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: u64 = 500;

    #[test]
    fn test_cooldown_boundary_is_exclusive() {
        assert!(is_within_cooldown(1000, 1000, COOLDOWN));
        assert!(is_within_cooldown(1000, 1499, COOLDOWN));
        assert!(!is_within_cooldown(1000, 1500, COOLDOWN));
    }

    #[test]
    fn test_cooldown_with_clock_behind_record() {
        assert!(is_within_cooldown(1000, 900, COOLDOWN));
    }

    #[test]
    fn test_echo_content_needs_a_snapshot() {
        assert!(is_echo_content("a", Some("a")));
        assert!(!is_echo_content("a", Some("b")));
        assert!(!is_echo_content("a", None));
        assert!(!is_echo_content("", None));
    }

    #[test]
    fn test_change_inside_window_is_echo_and_keeps_records() {
        let mut provenance = Some(Provenance::webview(1000));
        let mut sent = Some("ab\n".to_string());

        let verdict = classify(&mut provenance, &mut sent, "different\n", 1100, COOLDOWN);
        assert_eq!(verdict, EchoVerdict::Echo);
        assert!(provenance.is_some());
        assert!(sent.is_some());

        // A second debounced fire from the same burst is still an echo.
        let verdict = classify(&mut provenance, &mut sent, "ab\n", 1300, COOLDOWN);
        assert_eq!(verdict, EchoVerdict::Echo);
    }

    #[test]
    fn test_same_content_after_window_is_slow_echo() {
        let mut provenance = Some(Provenance::webview(1000));
        let mut sent = Some("ab\n".to_string());

        let verdict = classify(&mut provenance, &mut sent, "ab\n", 1600, COOLDOWN);
        assert_eq!(verdict, EchoVerdict::SlowEcho);
        assert_eq!(provenance, None);
        assert_eq!(sent, None);
    }

    #[test]
    fn test_different_content_after_window_is_external() {
        let mut provenance = Some(Provenance::webview(1000));
        let mut sent = Some("ab\n".to_string());

        let verdict = classify(&mut provenance, &mut sent, "edited\n", 1600, COOLDOWN);
        assert_eq!(verdict, EchoVerdict::External);
        assert_eq!(provenance, None);
        assert_eq!(sent, None);
    }

    #[test]
    fn test_no_records_is_external() {
        let verdict = classify(&mut None, &mut None, "anything", 0, COOLDOWN);
        assert_eq!(verdict, EchoVerdict::External);
    }

    #[test]
    fn test_external_provenance_does_not_suppress() {
        let mut provenance = Some(Provenance {
            source: Source::External,
            timestamp_ms: 1000,
        });
        let verdict = classify(&mut provenance, &mut None, "x", 1001, COOLDOWN);
        assert_eq!(verdict, EchoVerdict::External);
    }

    #[test]
    fn test_identical_text_after_slow_echo_is_external() {
        let mut provenance = Some(Provenance::webview(0));
        let mut sent = Some("same".to_string());
        assert_eq!(
            classify(&mut provenance, &mut sent, "same", 600, COOLDOWN),
            EchoVerdict::SlowEcho
        );
        assert_eq!(
            classify(&mut provenance, &mut sent, "same", 700, COOLDOWN),
            EchoVerdict::External
        );
    }
}
