//! Hyperlink scheme validation.
//!
//! Every link in the structured document passes through [`is_safe_href`]
//! before it is allowed to become clickable.

/// Returns true only for `http://`, `https://` and plain `mailto:` targets.
///
/// Rejects the empty string, anything containing NUL, CR or LF, every other
/// scheme (`javascript:`, `data:`, `file:`, editor resource schemes), and
/// `mailto:` followed by another scheme-like token such as
/// `mailto:javascript:alert(1)`.
///
/// # Example
///
/// ```
/// use velvet::links::is_safe_href;
///
/// assert!(is_safe_href("https://example.com"));
/// assert!(is_safe_href("mailto:user@example.com"));
/// assert!(!is_safe_href("javascript:alert(1)"));
/// ```
pub fn is_safe_href(href: &str) -> bool {
    if href.is_empty() || href.contains(['\0', '\r', '\n']) {
        return false;
    }

    if has_prefix_ignore_case(href, "https://") || has_prefix_ignore_case(href, "http://") {
        return true;
    }

    if has_prefix_ignore_case(href, "mailto:") {
        return !starts_with_scheme(&href["mailto:".len()..]);
    }

    false
}

fn has_prefix_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Whether `text` starts with one or more ASCII letters followed by `:`.
fn starts_with_scheme(text: &str) -> bool {
    let letters = text.bytes().take_while(u8::is_ascii_alphabetic).count();
    letters > 0 && text.as_bytes().get(letters) == Some(&b':')
}
