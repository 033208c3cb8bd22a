//! Structured document tree.

/// Inline formatting carried by a text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Marks {
    pub strong: bool,
    pub emphasis: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
}

/// A run of text sharing one set of marks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub marks: Marks,
}

impl TextRun {
    pub fn new(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }
}

/// An item of a bullet, ordered or task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// `Some` for task items, holding whether the box is ticked.
    pub checked: Option<bool>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Plain text of each cell, header row first.
    pub rows: Vec<Vec<String>>,
}

/// A block-level node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<TextRun>),
    /// A paragraph holding only the blank-line placeholder.
    Placeholder,
    Heading { level: u8, runs: Vec<TextRun> },
    List(List),
    BlockQuote(Vec<Block>),
    CodeBlock { info: String, literal: String },
    Table(Table),
    ThematicBreak,
    Html(String),
    /// Footnote definitions, front matter and other nodes kept only by the
    /// serializer.
    Other,
}

impl Block {
    /// Concatenated text of the block's own runs.
    pub fn text(&self) -> String {
        match self {
            Self::Paragraph(runs) | Self::Heading { runs, .. } => {
                runs.iter().map(|run| run.text.as_str()).collect()
            }
            Self::CodeBlock { literal, .. } => literal.clone(),
            _ => String::new(),
        }
    }
}

/// A hyperlink found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef {
    pub text: String,
    pub url: String,
    /// Whether the scheme passed validation and the link may be opened.
    pub clickable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub alt: String,
    pub src: String,
}

/// The editor's structured view of a markdown source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredDocument {
    blocks: Vec<Block>,
    links: Vec<LinkRef>,
    images: Vec<ImageRef>,
}

impl StructuredDocument {
    pub(crate) const fn new(blocks: Vec<Block>, links: Vec<LinkRef>, images: Vec<ImageRef>) -> Self {
        Self {
            blocks,
            links,
            images,
        }
    }

    /// Top-level blocks in document order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of top-level nodes a cursor can visit.
    pub fn navigable_nodes(&self) -> usize {
        self.blocks.len()
    }

    pub fn placeholder_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| matches!(block, Block::Placeholder))
            .count()
    }

    pub fn links(&self) -> &[LinkRef] {
        &self.links
    }

    /// Links whose scheme is safe to open.
    pub fn clickable_links(&self) -> impl Iterator<Item = &LinkRef> {
        self.links.iter().filter(|link| link.clickable)
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
