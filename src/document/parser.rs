//! Markdown parsing and serialization with comrak.

use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{Arena, Options, format_commonmark, parse_document};

use super::types::{
    Block, ImageRef, LinkRef, List, ListItem, Marks, StructuredDocument, Table, TextRun,
};
use crate::error::SyncError;
use crate::links::is_safe_href;
use crate::text::is_placeholder;

/// Parse markdown source into a structured document.
///
/// # Example
///
/// ```
/// use velvet::document::parse;
///
/// let doc = parse("Para 1\n\n\u{200B}\n\nPara 2\n");
/// assert_eq!(doc.navigable_nodes(), 3);
/// assert_eq!(doc.placeholder_count(), 1);
/// ```
pub fn parse(source: &str) -> StructuredDocument {
    let arena = Arena::new();
    let options = create_options();
    let root = parse_document(&arena, source, &options);

    let mut links = Vec::new();
    let mut images = Vec::new();
    let blocks = collect_blocks(root, &mut links, &mut images);
    StructuredDocument::new(blocks, links, images)
}

/// Re-emit markdown source as `CommonMark` the way the editor engine writes it.
///
/// # Errors
///
/// Returns [`SyncError::Serialization`] if comrak fails to format the tree.
pub fn render_commonmark(source: &str) -> Result<String, SyncError> {
    let arena = Arena::new();
    let options = create_options();
    let root = parse_document(&arena, source, &options);

    let mut out = Vec::new();
    format_commonmark(root, &options, &mut out)
        .map_err(|err| SyncError::Serialization(err.to_string()))?;
    String::from_utf8(out).map_err(|err| SyncError::Serialization(err.to_string()))
}

fn create_options() -> Options {
    let mut options = Options::default();

    // GFM extensions the editor surface supports
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;

    // No hard wrapping, and code is always written fenced
    options.render.width = 0;
    options.render.prefer_fenced = true;

    options
}

fn collect_blocks<'a>(
    parent: &'a AstNode<'a>,
    links: &mut Vec<LinkRef>,
    images: &mut Vec<ImageRef>,
) -> Vec<Block> {
    parent
        .children()
        .map(|child| convert_block(child, links, images))
        .collect()
}

fn convert_block<'a>(
    node: &'a AstNode<'a>,
    links: &mut Vec<LinkRef>,
    images: &mut Vec<ImageRef>,
) -> Block {
    match &node.data.borrow().value {
        NodeValue::Paragraph => {
            collect_inline_elements(node, links, images);
            let runs = collect_inline_runs(node);
            let text: String = runs.iter().map(|run| run.text.as_str()).collect();
            if is_placeholder(&text) {
                Block::Placeholder
            } else {
                Block::Paragraph(runs)
            }
        }
        NodeValue::Heading(heading) => {
            collect_inline_elements(node, links, images);
            Block::Heading {
                level: heading.level,
                runs: collect_inline_runs(node),
            }
        }
        NodeValue::List(list) => {
            let items = node
                .children()
                .map(|item| convert_item(item, links, images))
                .collect();
            Block::List(List {
                ordered: matches!(list.list_type, ListType::Ordered),
                items,
            })
        }
        NodeValue::BlockQuote => Block::BlockQuote(collect_blocks(node, links, images)),
        NodeValue::CodeBlock(code_block) => Block::CodeBlock {
            info: code_block.info.clone(),
            literal: code_block.literal.clone(),
        },
        NodeValue::Table(_) => {
            collect_inline_elements(node, links, images);
            Block::Table(collect_table(node))
        }
        NodeValue::ThematicBreak => Block::ThematicBreak,
        NodeValue::HtmlBlock(html) => Block::Html(html.literal.clone()),
        _ => Block::Other,
    }
}

fn convert_item<'a>(
    node: &'a AstNode<'a>,
    links: &mut Vec<LinkRef>,
    images: &mut Vec<ImageRef>,
) -> ListItem {
    let checked = match &node.data.borrow().value {
        NodeValue::TaskItem(symbol) => Some(symbol.is_some()),
        _ => None,
    };
    ListItem {
        checked,
        blocks: collect_blocks(node, links, images),
    }
}

fn collect_table<'a>(node: &'a AstNode<'a>) -> Table {
    let mut rows = Vec::new();
    for row in node.children() {
        if !matches!(row.data.borrow().value, NodeValue::TableRow(_)) {
            continue;
        }
        let cells = row
            .children()
            .filter(|cell| matches!(cell.data.borrow().value, NodeValue::TableCell))
            .map(extract_text)
            .collect();
        rows.push(cells);
    }
    Table { rows }
}

fn collect_inline_runs<'a>(node: &'a AstNode<'a>) -> Vec<TextRun> {
    let mut runs: Vec<TextRun> = Vec::new();
    for child in node.children() {
        collect_inline_runs_recursive(child, Marks::default(), &mut runs);
    }
    runs
}

fn push_run(runs: &mut Vec<TextRun>, text: &str, marks: Marks) {
    if let Some(last) = runs.last_mut()
        && last.marks == marks
    {
        last.text.push_str(text);
        return;
    }
    runs.push(TextRun::new(text, marks));
}

fn collect_inline_runs_recursive<'a>(node: &'a AstNode<'a>, marks: Marks, runs: &mut Vec<TextRun>) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => push_run(runs, text, marks),
        NodeValue::Code(code) => {
            let code_marks = Marks {
                code: true,
                ..marks
            };
            push_run(runs, &code.literal, code_marks);
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => push_run(runs, "\n", marks),
        NodeValue::Emph => {
            let next = Marks {
                emphasis: true,
                ..marks
            };
            for child in node.children() {
                collect_inline_runs_recursive(child, next, runs);
            }
        }
        NodeValue::Strong => {
            let next = Marks {
                strong: true,
                ..marks
            };
            for child in node.children() {
                collect_inline_runs_recursive(child, next, runs);
            }
        }
        NodeValue::Strikethrough => {
            let next = Marks {
                strikethrough: true,
                ..marks
            };
            for child in node.children() {
                collect_inline_runs_recursive(child, next, runs);
            }
        }
        NodeValue::Link(_) => {
            let next = Marks {
                link: true,
                ..marks
            };
            for child in node.children() {
                collect_inline_runs_recursive(child, next, runs);
            }
        }
        NodeValue::FootnoteReference(reference) => {
            push_run(runs, &format!("[^{}]", reference.name), marks);
        }
        _ => {
            for child in node.children() {
                collect_inline_runs_recursive(child, marks, runs);
            }
        }
    }
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_recursive(node, &mut text);
    text
}

fn extract_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => text.push_str(t),
        NodeValue::Code(c) => text.push_str(&c.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
        _ => {
            for child in node.children() {
                extract_text_recursive(child, text);
            }
        }
    }
}

/// Record links and images below `node`. Nested lists are visited by their
/// own blocks.
fn collect_inline_elements<'a>(
    node: &'a AstNode<'a>,
    links: &mut Vec<LinkRef>,
    images: &mut Vec<ImageRef>,
) {
    match &node.data.borrow().value {
        NodeValue::Image(image) => {
            images.push(ImageRef {
                alt: extract_text(node),
                src: image.url.clone(),
            });
        }
        NodeValue::Link(link) => {
            links.push(LinkRef {
                text: extract_text(node),
                url: link.url.clone(),
                clickable: is_safe_href(&link.url),
            });
        }
        _ => {
            for child in node.children() {
                collect_inline_elements(child, links, images);
            }
        }
    }
}
