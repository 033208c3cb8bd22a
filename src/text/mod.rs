//! Pure string transforms between host markdown and editor markdown.
//!
//! - [`add_placeholders`] / [`strip_placeholders`]: make blank lines navigable
//! - [`serialize`]: clean engine output into byte-faithful file text
//! - [`fence`]: fenced code detection shared by both directions

pub mod fence;
mod normalize;
mod placeholders;

pub use normalize::{collapse_paragraph_gaps, normalize_line_endings, postprocess, serialize};
pub use placeholders::{
    BLANK_LINE_PLACEHOLDER, add_placeholders, is_placeholder, strip_placeholders,
};
