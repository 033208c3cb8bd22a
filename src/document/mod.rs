//! Structured markdown documents.
//!
//! This module handles:
//! - Parsing markdown with comrak into a typed block tree
//! - The [`DocumentEngine`] seam and its comrak implementation
//! - The load and save pipeline between host text and the editor

mod engine;
mod parser;
mod pipeline;
mod types;
mod validate;

pub use engine::{ComrakEngine, DocumentEngine, Notify};
pub use parser::{parse, render_commonmark};
pub use pipeline::{LoadOutcome, load, roundtrip, roundtrip_with_limit, save};
pub use types::{
    Block, ImageRef, LinkRef, List, ListItem, Marks, StructuredDocument, Table, TextRun,
};
pub use validate::{ValidationReport, validate_markdown};
