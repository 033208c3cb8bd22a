//! Blank-line placeholders.
//!
//! A structured editor has no cursor position for a blank line between two
//! blocks; the gap is just margin. Each blank line is therefore expanded into a
//! paragraph holding a single zero-width space, which the editor treats as a
//! real, navigable node. The marker is stripped again on save.

use std::borrow::Cow;

use super::fence::{FenceTracker, list_marker_len};

/// Zero-width space standing in for a blank line.
pub const BLANK_LINE_PLACEHOLDER: char = '\u{200B}';

/// Insert a placeholder paragraph for every blank line outside fenced code.
///
/// Each blank line becomes `<blank>`, `<placeholder>`, and a closing `<blank>`
/// when the following line has content, so K consecutive blank lines yield K
/// placeholder paragraphs. A whitespace-only line counts as blank. Inside a
/// list item the placeholder is indented like the item's content so the item
/// is not cut short. The trailing newline of the file is never touched.
///
/// # Example
///
/// ```
/// use velvet::text::add_placeholders;
///
/// assert_eq!(add_placeholders("Para 1\n\nPara 2\n"), "Para 1\n\n\u{200B}\n\nPara 2\n");
/// ```
pub fn add_placeholders(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let lines: Vec<&str> = markdown.split('\n').collect();
    let last = lines.len() - 1;
    let mut fences = FenceTracker::new();
    let mut list_indent: Option<usize> = None;
    let mut out: Vec<Cow<'_, str>> = Vec::with_capacity(lines.len() * 2);

    for (idx, &line) in lines.iter().enumerate() {
        let was_in_fence = fences.is_open();
        let in_fence = fences.observe(line);
        if is_blank(line) && !in_fence && idx < last {
            let indent = list_indent.map_or(0, |indent| indent.min(next_indent(&lines[idx + 1..])));
            out.push(Cow::Borrowed(""));
            out.push(Cow::Owned(format!("{:indent$}{BLANK_LINE_PLACEHOLDER}", "")));
            // A following blank line pushes its own leading blank.
            if !is_blank(lines[idx + 1]) {
                out.push(Cow::Borrowed(""));
            }
            continue;
        }
        if !was_in_fence && !is_blank(line) {
            list_indent = track_list_indent(list_indent, line);
        }
        out.push(Cow::Borrowed(line));
    }

    out.join("\n")
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Leading columns of `line`, with tabs stopping every four columns.
fn leading_columns(line: &str) -> usize {
    let mut columns = 0;
    for ch in line.chars() {
        match ch {
            ' ' => columns += 1,
            '\t' => columns += 4 - columns % 4,
            _ => break,
        }
    }
    columns
}

/// Indentation of the next line with content, or zero at end of input.
fn next_indent(rest: &[&str]) -> usize {
    rest.iter()
        .find(|line| !is_blank(line))
        .map_or(0, |line| leading_columns(line))
}

/// Content column of the innermost list item `line` leaves open, if any.
///
/// A list marker line sets it; an unindented line without a marker ends the
/// list. Indented lines inherit the current value.
fn track_list_indent(current: Option<usize>, line: &str) -> Option<usize> {
    let columns = leading_columns(line);
    let rest = line.trim_start_matches([' ', '\t']);
    if let Some(marker) = list_marker_len(rest) {
        let gap = rest[marker..].chars().take_while(|c| *c == ' ').count();
        // Five or more spaces after a marker start indented code
        let gap = if (1..=4).contains(&gap) { gap } else { 1 };
        return Some(columns + marker + gap);
    }
    if columns == 0 { None } else { current }
}

/// Remove every placeholder character.
pub fn strip_placeholders(markdown: &str) -> String {
    markdown.replace(BLANK_LINE_PLACEHOLDER, "")
}

/// Whether `text` consists of nothing but a placeholder.
pub fn is_placeholder(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next() == Some(BLANK_LINE_PLACEHOLDER) && chars.next().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    const Z: &str = "\u{200B}";

    #[test]
    fn test_single_blank_line_gets_one_placeholder() {
        assert_eq!(
            add_placeholders("Para 1\n\nPara 2\n"),
            format!("Para 1\n\n{Z}\n\nPara 2\n")
        );
    }

    #[test]
    fn test_consecutive_blank_lines_get_one_placeholder_each() {
        assert_eq!(
            add_placeholders("Para 1\n\n\nPara 2\n"),
            format!("Para 1\n\n{Z}\n\n{Z}\n\nPara 2\n")
        );
        assert_eq!(
            add_placeholders("Para 1\n\n\n\nPara 2\n"),
            format!("Para 1\n\n{Z}\n\n{Z}\n\n{Z}\n\nPara 2\n")
        );
    }

    #[test]
    fn test_multiple_separators() {
        assert_eq!(
            add_placeholders("A\n\nB\n\nC\n"),
            format!("A\n\n{Z}\n\nB\n\n{Z}\n\nC\n")
        );
    }

    #[test]
    fn test_trailing_newline_untouched() {
        assert_eq!(add_placeholders("Solo paragraph\n"), "Solo paragraph\n");
        assert_eq!(add_placeholders("Line 1\nLine 2\n"), "Line 1\nLine 2\n");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(add_placeholders(""), "");
    }

    #[test]
    fn test_backtick_fence_body_is_untouched() {
        let input = "```\nline 1\n\nline 2\n```\n";
        assert_eq!(add_placeholders(input), input);
    }

    #[test]
    fn test_tilde_fence_body_is_untouched() {
        let input = "~~~\nline 1\n\nline 2\n~~~\n";
        assert_eq!(add_placeholders(input), input);
    }

    #[test]
    fn test_placeholders_around_but_not_inside_fence() {
        let input = "Before\n\n```\ncode\n\nmore code\n```\n\nAfter\n";
        assert_eq!(
            add_placeholders(input),
            format!("Before\n\n{Z}\n\n```\ncode\n\nmore code\n```\n\n{Z}\n\nAfter\n")
        );
    }

    #[test]
    fn test_tilde_does_not_close_backtick_fence() {
        let input = "```\ncode\n~~~\n\nstill inside\n```\n";
        assert_eq!(add_placeholders(input), input);
    }

    #[test]
    fn test_backtick_does_not_close_tilde_fence() {
        let input = "~~~\ncode\n```\n\nstill inside\n~~~\n";
        assert_eq!(add_placeholders(input), input);
    }

    #[test]
    fn test_whitespace_only_line_is_blank() {
        assert_eq!(add_placeholders("a\n   \nb\n"), format!("a\n\n{Z}\n\nb\n"));
        assert_eq!(add_placeholders("a\n\t\nb\n"), format!("a\n\n{Z}\n\nb\n"));
    }

    #[test]
    fn test_indented_fence_body_is_untouched() {
        let input = "Intro\n\n   ```\ncode\n\nmore\n   ```\n\nOutro\n";
        assert_eq!(
            add_placeholders(input),
            format!("Intro\n\n{Z}\n\n   ```\ncode\n\nmore\n   ```\n\n{Z}\n\nOutro\n")
        );
    }

    #[test]
    fn test_list_item_placeholder_follows_item_indent() {
        let input = "- item\n\n  ```\n  a\n\n  b\n  ```\n";
        assert_eq!(
            add_placeholders(input),
            format!("- item\n\n  {Z}\n\n  ```\n  a\n\n  b\n  ```\n")
        );
    }

    #[test]
    fn test_blank_line_leaving_a_list_is_unindented() {
        assert_eq!(
            add_placeholders("- a\n\nafter\n"),
            format!("- a\n\n{Z}\n\nafter\n")
        );
        assert_eq!(
            add_placeholders("1. a\n   b\n\n   c\n"),
            format!("1. a\n   b\n\n   {Z}\n\n   c\n")
        );
    }

    #[test]
    fn test_indented_code_outside_lists_keeps_column_zero_placeholder() {
        assert_eq!(
            add_placeholders("    one\n\n    two\n"),
            format!("    one\n\n{Z}\n\n    two\n")
        );
    }

    #[test]
    fn test_strip_removes_every_placeholder() {
        let loaded = add_placeholders("A\n\n\nB\n");
        assert_eq!(strip_placeholders(&loaded), "A\n\n\n\n\n\nB\n");
        assert!(!strip_placeholders(&loaded).contains(BLANK_LINE_PLACEHOLDER));
    }

    #[test]
    fn test_is_placeholder() {
        assert!(is_placeholder(Z));
        assert!(!is_placeholder(""));
        assert!(!is_placeholder("a"));
        assert!(!is_placeholder(&format!("{Z}{Z}")));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn placeholder_count_matches_blank_lines(blank in 1..8usize) {
                let input = format!("first{}last\n", "\n".repeat(blank + 1));
                let loaded = add_placeholders(&input);
                prop_assert_eq!(loaded.matches(BLANK_LINE_PLACEHOLDER).count(), blank);
            }

            #[test]
            fn fenced_body_is_byte_identical(
                body in proptest::collection::vec("[a-z ]{0,8}", 0..6),
                marker in prop::sample::select(vec!["```", "~~~"]),
            ) {
                let inner = body.join("\n\n");
                let input = format!("{marker}\n{inner}\n{marker}\n");
                prop_assert_eq!(add_placeholders(&input), input);
            }
        }
    }
}
