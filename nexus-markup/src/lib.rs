//! Nexus Markup - Markdown-Subset Renderer
//!
//! Turns model output into display blocks one line at a time. There is no
//! multi-line state: consecutive table rows are separate blocks that the
//! caller lays out adjacently.
//!
//! Precedence per trimmed line, first match wins: blank, `|` row, `#`
//! header, list marker, paragraph. Rendering never fails.

pub mod block;
pub mod inline;

pub use block::{Heading, MarkupBlock, MAX_HEADER_TIER};
pub use inline::{InlineSpan, RichText};

/// Render `text` into one block per line.
pub fn render(text: &str) -> Vec<MarkupBlock> {
    text.split('\n').map(MarkupBlock::classify).collect()
}

/// Flatten blocks into plain text for terminals and logs.
pub fn to_plain_text(blocks: &[MarkupBlock]) -> String {
    blocks
        .iter()
        .map(|block| match block {
            MarkupBlock::Spacer => String::new(),
            MarkupBlock::Divider => "---".to_string(),
            MarkupBlock::TableRow(cells) => {
                let cells: Vec<String> = cells.iter().map(RichText::plain).collect();
                format!("| {} |", cells.join(" | "))
            }
            MarkupBlock::Header(heading) => heading.text.to_uppercase(),
            MarkupBlock::ListItem(text) => format!("• {}", text.plain()),
            MarkupBlock::Paragraph(text) => text.plain(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
