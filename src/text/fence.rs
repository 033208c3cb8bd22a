//! Fenced code block detection shared by placeholder insertion and gap
//! collapsing.
//!
//! A fence opens on a line whose first non-blank text, after any list item
//! marker, is three or more backticks or tildes. It closes only on a line made
//! of the same character, at least as long as the opener, followed by nothing
//! but whitespace. Indentation is accepted on both lines so fences nested in
//! list items are found too.

/// An open fence: its marker character and run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    /// Parse an opening fence from `line`.
    pub fn opening(line: &str) -> Option<Self> {
        let body = strip_container_prefix(line);
        let marker = body.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = body.chars().take_while(|c| *c == marker).count();
        (len >= 3).then_some(Self { marker, len })
    }

    /// Whether `line` closes this fence.
    pub fn is_closed_by(&self, line: &str) -> bool {
        let body = line.trim_start_matches(INDENT);
        let run = body.chars().take_while(|c| *c == self.marker).count();
        run >= self.len && body[run * self.marker.len_utf8()..].trim().is_empty()
    }
}

const INDENT: [char; 2] = [' ', '\t'];

/// Skip indentation and at most one list item marker.
fn strip_container_prefix(line: &str) -> &str {
    let rest = line.trim_start_matches(INDENT);
    list_marker_len(rest).map_or(rest, |len| rest[len..].trim_start_matches(INDENT))
}

/// Byte length of a bullet (`-`, `*`, `+`) or ordered (`12.`, `3)`) list
/// marker at the start of `text`. The marker must be followed by whitespace.
pub(crate) fn list_marker_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let len = match bytes.first()? {
        b'-' | b'*' | b'+' => 1,
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > 9 || !matches!(bytes.get(digits), Some(b'.' | b')')) {
                return None;
            }
            digits + 1
        }
        _ => return None,
    };
    matches!(bytes.get(len), Some(b' ' | b'\t')).then_some(len)
}

/// Line-by-line fence state machine.
#[derive(Debug, Default, Clone)]
pub struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    pub const fn new() -> Self {
        Self { open: None }
    }

    /// Feed the next line. Returns true when the line belongs to a fenced
    /// region, delimiters included.
    pub fn observe(&mut self, line: &str) -> bool {
        match self.open {
            Some(fence) => {
                if fence.is_closed_by(line) {
                    self.open = None;
                }
                true
            }
            None => {
                self.open = Fence::opening(line);
                self.open.is_some()
            }
        }
    }

    pub const fn is_open(&self) -> bool {
        self.open.is_some()
    }
}

/// A slice of markdown that is either ordinary prose or a closed fenced block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Prose(&'a str),
    /// From the first character of the opening line to the last character of
    /// the closing line (its newline excluded).
    Fenced(&'a str),
}

/// Split `text` into prose and closed fenced blocks.
///
/// A fence that never closes is left in the prose.
pub fn split_fenced(text: &str) -> Vec<Segment<'_>> {
    let lines = line_spans(text);
    let mut segments = Vec::new();
    let mut prose_start = 0;
    let mut idx = 0;

    while idx < lines.len() {
        let (start, end) = lines[idx];
        let Some(fence) = Fence::opening(&text[start..end]) else {
            idx += 1;
            continue;
        };
        let close = lines[idx + 1..]
            .iter()
            .position(|&(s, e)| fence.is_closed_by(&text[s..e]))
            .map(|offset| idx + 1 + offset);
        let Some(close_idx) = close else {
            idx += 1;
            continue;
        };

        if prose_start < start {
            segments.push(Segment::Prose(&text[prose_start..start]));
        }
        let fenced_end = lines[close_idx].1;
        segments.push(Segment::Fenced(&text[start..fenced_end]));
        prose_start = fenced_end;
        idx = close_idx + 1;
    }

    if prose_start < text.len() {
        segments.push(Segment::Prose(&text[prose_start..]));
    }
    segments
}

/// Byte spans of each line, newline excluded.
fn line_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (idx, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            spans.push((start, idx));
            start = idx + 1;
        }
    }
    spans.push((start, text.len()));
    spans
}
