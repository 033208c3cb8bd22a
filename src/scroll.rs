//! Mapping between a source line and a scroll offset on the rendering surface.
//!
//! Both directions share one linear model: line `N` of `T` sits at pixel
//! `(N / T) * scrollHeight`. The scrollable range is
//! `[0, scrollHeight - viewportHeight]`.

use serde::{Deserialize, Serialize};

/// Scroll metrics captured from the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollState {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub viewport_height: f64,
}

impl ScrollState {
    pub const fn new(scroll_top: f64, scroll_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            viewport_height,
        }
    }

    /// Whether every dimension is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        is_valid_scroll_dimension(self.scroll_top)
            && is_valid_scroll_dimension(self.scroll_height)
            && is_valid_scroll_dimension(self.viewport_height)
    }

    /// The source line at the top of the viewport.
    pub fn top_line(&self, total_lines: usize) -> usize {
        offset_to_line(
            self.scroll_top,
            self.scroll_height,
            self.viewport_height,
            total_lines,
        )
    }
}

/// Rejects NaN, infinities and negative values.
pub fn is_valid_scroll_dimension(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn scrollable_height(scroll_height: f64, viewport_height: f64) -> f64 {
    (scroll_height - viewport_height).max(0.0)
}

/// Scroll offset that places `line` at the top of the viewport.
///
/// Returns 0 for non-finite surface metrics or an empty document. Negative
/// (or NaN) lines are treated as line 0 and the result is clamped to the
/// scrollable range.
///
/// # Example
///
/// ```
/// use velvet::scroll::line_to_offset;
///
/// assert_eq!(line_to_offset(42.0, 100, 2000.0, 800.0), 840.0);
/// assert_eq!(line_to_offset(99.0, 100, 2000.0, 800.0), 1200.0);
/// ```
pub fn line_to_offset(
    line: f64,
    total_lines: usize,
    scroll_height: f64,
    viewport_height: f64,
) -> f64 {
    if !scroll_height.is_finite() || !viewport_height.is_finite() || total_lines == 0 {
        return 0.0;
    }

    let scrollable = scrollable_height(scroll_height, viewport_height);
    let line = if line.is_nan() { 0.0 } else { line.max(0.0) };
    #[allow(clippy::cast_precision_loss)]
    let raw = (line / total_lines as f64 * scroll_height).round();
    // NaN (an infinite line on a zero-height surface) falls to 0 here.
    raw.max(0.0).min(scrollable)
}

/// Source line at the top of the viewport for a given scroll offset.
///
/// Inverse of [`line_to_offset`]. The offset is clamped into the scrollable
/// range first, and the result into `[0, total_lines - 1]`.
///
/// # Example
///
/// ```
/// use velvet::scroll::offset_to_line;
///
/// assert_eq!(offset_to_line(840.0, 2000.0, 800.0, 100), 42);
/// assert_eq!(offset_to_line(-50.0, 2000.0, 800.0, 100), 0);
/// ```
pub fn offset_to_line(
    scroll_top: f64,
    scroll_height: f64,
    viewport_height: f64,
    total_lines: usize,
) -> usize {
    if !scroll_top.is_finite() || !scroll_height.is_finite() || !viewport_height.is_finite() {
        return 0;
    }
    if total_lines == 0 || scroll_height <= 0.0 {
        return 0;
    }

    let scrollable = scrollable_height(scroll_height, viewport_height);
    let top = scroll_top.clamp(0.0, scrollable);

    // Line counts stay well inside f64's exact integer range and `top` is
    // clamped non-negative.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let line = (top / scroll_height * total_lines as f64).round() as usize;
    line.min(total_lines - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_zero_is_line_zero() {
        assert_eq!(offset_to_line(0.0, 2000.0, 800.0, 100), 0);
    }

    #[test]
    fn test_max_offset_maps_to_line_at_top_of_last_page() {
        // 1200 of 2000 px: the last page starts at line 60.
        assert_eq!(offset_to_line(1200.0, 2000.0, 800.0, 100), 60);
    }

    #[test]
    fn test_offset_beyond_range_is_clamped() {
        assert_eq!(offset_to_line(2000.0, 2000.0, 800.0, 100), 60);
        assert_eq!(offset_to_line(-100.0, 2000.0, 800.0, 100), 0);
    }

    #[test]
    fn test_offset_degenerate_inputs() {
        assert_eq!(offset_to_line(0.0, 800.0, 800.0, 100), 0);
        assert_eq!(offset_to_line(500.0, 2000.0, 800.0, 1), 0);
        assert_eq!(offset_to_line(500.0, 2000.0, 800.0, 0), 0);
        assert_eq!(offset_to_line(f64::NAN, 2000.0, 800.0, 100), 0);
        assert_eq!(offset_to_line(10.0, f64::INFINITY, 800.0, 100), 0);
        assert_eq!(offset_to_line(10.0, 0.0, 0.0, 100), 0);
    }

    #[test]
    fn test_line_zero_is_offset_zero() {
        assert_eq!(line_to_offset(0.0, 100, 2000.0, 800.0), 0.0);
    }

    #[test]
    fn test_last_line_clamps_to_scrollable_height() {
        assert_eq!(line_to_offset(99.0, 100, 2000.0, 800.0), 1200.0);
        assert_eq!(line_to_offset(200.0, 100, 2000.0, 800.0), 1200.0);
    }

    #[test]
    fn test_middle_line_is_proportional() {
        // (50 / 101) * 2000 = 990.1
        assert_eq!(line_to_offset(50.0, 101, 2000.0, 800.0), 990.0);
        assert_eq!(line_to_offset(42.0, 100, 2000.0, 800.0), 840.0);
    }

    #[test]
    fn test_line_degenerate_inputs() {
        assert_eq!(line_to_offset(50.0, 100, 800.0, 800.0), 0.0);
        assert_eq!(line_to_offset(0.0, 1, 2000.0, 800.0), 0.0);
        assert_eq!(line_to_offset(0.0, 0, 2000.0, 800.0), 0.0);
        assert_eq!(line_to_offset(-5.0, 100, 2000.0, 800.0), 0.0);
        assert_eq!(line_to_offset(f64::NAN, 100, 2000.0, 800.0), 0.0);
        assert_eq!(line_to_offset(3.0, 100, f64::NAN, 800.0), 0.0);
        assert_eq!(line_to_offset(3.0, 100, 2000.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_round_trip_representative_tuples() {
        // (line, total, scroll height, viewport height, expected line)
        let cases = [
            (10.0, 100, 10_000.0, 500.0, 10),
            (0.0, 1, 2000.0, 800.0, 0),
            (5.0, 0, 2000.0, 800.0, 0),
            (40.0, 100, 800.0, 800.0, 0),
            (150.0, 100, 100_000.0, 100.0, 99),
            (37.0, 250, 20_000.0, 900.0, 37),
        ];
        for (line, total, height, viewport, expected) in cases {
            let offset = line_to_offset(line, total, height, viewport);
            assert_eq!(
                offset_to_line(offset, height, viewport, total),
                expected,
                "line={line} total={total} height={height} viewport={viewport}"
            );
        }
    }

    #[test]
    fn test_scroll_state_validity() {
        assert!(ScrollState::new(0.0, 1200.0, 600.0).is_valid());
        assert!(!ScrollState::new(-1.0, 1200.0, 600.0).is_valid());
        assert!(!ScrollState::new(0.0, f64::NAN, 600.0).is_valid());
        assert!(!ScrollState::new(0.0, 1200.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_scroll_state_top_line() {
        let state = ScrollState::new(840.0, 2000.0, 800.0);
        assert_eq!(state.top_line(100), 42);
    }

    #[test]
    fn test_scroll_state_wire_names() {
        let json = serde_json::to_value(ScrollState::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(json["scrollTop"], 1.0);
        assert_eq!(json["scrollHeight"], 2.0);
        assert_eq!(json["viewportHeight"], 3.0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn offset_stays_in_scrollable_range(
                line in -1000.0..100_000.0f64,
                total in 0..10_000usize,
                height in 0.0..1_000_000.0f64,
                viewport in 0.0..5000.0f64,
            ) {
                let offset = line_to_offset(line, total, height, viewport);
                prop_assert!(offset >= 0.0);
                prop_assert!(offset <= (height - viewport).max(0.0));
            }

            #[test]
            fn line_stays_in_document(
                top in -1000.0..1_000_000.0f64,
                height in 0.0..1_000_000.0f64,
                viewport in 0.0..5000.0f64,
                total in 1..10_000usize,
            ) {
                prop_assert!(offset_to_line(top, height, viewport, total) < total);
            }

            #[test]
            fn unclamped_lines_round_trip(
                total in 1..2000usize,
                line_seed in 0.0..1.0f64,
                px_per_line in 2.0..60.0f64,
            ) {
                #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let line = (line_seed * (total - 1) as f64).floor() as usize;
                #[allow(clippy::cast_precision_loss)]
                let height = total as f64 * px_per_line;
                // Viewport small enough that `line` is never clamped.
                #[allow(clippy::cast_precision_loss)]
                let viewport = (height - line as f64 * px_per_line - px_per_line).max(0.0) / 2.0;

                #[allow(clippy::cast_precision_loss)]
                let offset = line_to_offset(line as f64, total, height, viewport);
                prop_assert_eq!(offset_to_line(offset, height, viewport, total), line);
            }
        }
    }
}
