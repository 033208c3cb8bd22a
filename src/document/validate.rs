//! Cheap sanity checks run on markdown before it is loaded.

use crate::limits::check_content_size;

/// Problems found in a markdown source.
///
/// Errors block a load; warnings are only logged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check size against `limit` and look for unbalanced code fences and
/// square brackets.
pub fn validate_markdown(markdown: &str, limit: usize) -> ValidationReport {
    let mut report = ValidationReport::default();

    if let Err(err) = check_content_size(markdown, limit) {
        report.errors.push(err.to_string());
    }

    if markdown.matches("```").count() % 2 != 0 {
        report
            .warnings
            .push("Unmatched code block delimiters (```)".to_string());
    }

    let open = markdown.matches('[').count();
    let close = markdown.matches(']').count();
    if open != close {
        report
            .warnings
            .push("Unmatched square brackets".to_string());
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::MAX_CONTENT_SIZE_BYTES;

    #[test]
    fn test_clean_markdown_is_valid() {
        let report = validate_markdown("# Title\n\n[link](https://a.b)\n", MAX_CONTENT_SIZE_BYTES);
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_oversized_is_an_error() {
        let report = validate_markdown("abcdef", 4);
        assert!(!report.is_valid());
        assert_eq!(report.errors, vec!["Content exceeds maximum size (4 Bytes)"]);
    }

    #[test]
    fn test_unmatched_fence_is_a_warning() {
        let report = validate_markdown("```\ncode\n", MAX_CONTENT_SIZE_BYTES);
        assert!(report.is_valid());
        assert_eq!(report.warnings, vec!["Unmatched code block delimiters (```)"]);
    }

    #[test]
    fn test_unmatched_brackets_is_a_warning() {
        let report = validate_markdown("[open only\n", MAX_CONTENT_SIZE_BYTES);
        assert_eq!(report.warnings, vec!["Unmatched square brackets"]);
    }
}
