//! Output normalization for markdown produced by the editor engine.

use std::sync::LazyLock;

use regex::Regex;

use super::fence::{Segment, split_fenced};
use super::placeholders::strip_placeholders;

/// Trailing spaces, tabs and `&nbsp;` entities at the end of each line.
static TRAILING_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:&nbsp;|[ \t])+$").expect("valid trailing whitespace pattern")
});

/// Convert CRLF line endings to LF.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Clean raw engine output.
///
/// Strips placeholders, normalizes line endings, removes trailing whitespace
/// and `&nbsp;` at line ends, trims the document and ends it with exactly one
/// newline. Whitespace-only input becomes the empty string.
pub fn postprocess(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let stripped = strip_placeholders(markdown);
    let unix = normalize_line_endings(&stripped);
    let cleaned = TRAILING_WHITESPACE.replace_all(&unix, "");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    format!("{trimmed}\n")
}

/// Undo the engine's doubled block separators outside fenced code.
///
/// The engine writes `\n\n` between blocks, and every blank line in the source
/// is a placeholder block of its own, so K blank lines come back as
/// `2 * (K + 1)` newlines. Each pair of newlines collapses to one, left to
/// right, so a run of `N` newlines becomes `N / 2 + N % 2`. A run of exactly
/// three becomes two. Closed fenced blocks are copied verbatim.
pub fn collapse_paragraph_gaps(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    for segment in split_fenced(markdown) {
        match segment {
            Segment::Fenced(block) => out.push_str(block),
            Segment::Prose(prose) => collapse_newline_runs(prose, &mut out),
        }
    }
    out
}

fn collapse_newline_runs(prose: &str, out: &mut String) {
    let mut run = 0usize;
    for ch in prose.chars() {
        if ch == '\n' {
            run += 1;
            continue;
        }
        push_newlines(out, run);
        run = 0;
        out.push(ch);
    }
    push_newlines(out, run);
}

fn push_newlines(out: &mut String, run: usize) {
    for _ in 0..run / 2 + run % 2 {
        out.push('\n');
    }
}

/// Turn raw engine markdown into the text written to the host document.
///
/// # Example
///
/// ```
/// use velvet::text::serialize;
///
/// let raw = "Para 1\n\n\u{200B}\n\nPara 2\n\n";
/// assert_eq!(serialize(raw), "Para 1\n\nPara 2\n");
/// assert_eq!(serialize(""), "");
/// ```
pub fn serialize(markdown: &str) -> String {
    let cleaned = postprocess(markdown);
    if cleaned.is_empty() {
        return cleaned;
    }
    collapse_paragraph_gaps(&cleaned)
}
