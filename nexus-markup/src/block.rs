//! Line classification into display blocks.

use crate::inline::RichText;
use serde::Serialize;

/// Highest visual header tier.
pub const MAX_HEADER_TIER: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Count of leading `#`, uncapped
    pub level: usize,
    pub text: String,
}

impl Heading {
    /// Display tier, `level` clamped to `1..=3`.
    pub fn tier(&self) -> usize {
        self.level.clamp(1, MAX_HEADER_TIER)
    }
}

/// One rendered line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MarkupBlock {
    Spacer,
    /// A `|---|` table separator line
    Divider,
    TableRow(Vec<RichText>),
    Header(Heading),
    ListItem(RichText),
    Paragraph(RichText),
}

impl MarkupBlock {
    /// Classify a single line. Never fails; anything unrecognised is a paragraph.
    pub fn classify(line: &str) -> Self {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return MarkupBlock::Spacer;
        }

        if trimmed.starts_with('|') {
            if trimmed.contains("---") {
                return MarkupBlock::Divider;
            }
            return MarkupBlock::TableRow(table_cells(trimmed));
        }

        if trimmed.starts_with('#') {
            let rest = trimmed.trim_start_matches('#');
            return MarkupBlock::Header(Heading {
                level: trimmed.len() - rest.len(),
                text: rest.trim_start().to_string(),
            });
        }

        if let Some(rest) = list_item_body(trimmed) {
            return MarkupBlock::ListItem(RichText::parse(rest));
        }

        MarkupBlock::Paragraph(RichText::parse(trimmed))
    }

    pub fn is_spacer(&self) -> bool {
        matches!(self, MarkupBlock::Spacer)
    }
}

/// Split a pipe row, dropping an empty leading and trailing cell.
fn table_cells(row: &str) -> Vec<RichText> {
    let mut cells: Vec<&str> = row.split('|').map(str::trim).collect();
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    cells.into_iter().map(RichText::parse).collect()
}

/// Body of a `* `, `- ` or `12.` list line.
fn list_item_body(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix("* ").or_else(|| line.strip_prefix("- ")) {
        return Some(rest.trim_start());
    }
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        return line[digits..].strip_prefix('.').map(str::trim_start);
    }
    None
}
