//! Inline emphasis: `**bold**` then `*italic*`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"));

static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+?)\*").expect("valid italic regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum InlineSpan {
    Text(String),
    Bold(String),
    Italic(String),
}

impl InlineSpan {
    pub fn as_str(&self) -> &str {
        match self {
            InlineSpan::Text(s) | InlineSpan::Bold(s) | InlineSpan::Italic(s) => s,
        }
    }
}

/// A run of inline spans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RichText {
    pub spans: Vec<InlineSpan>,
}

impl RichText {
    /// Resolve emphasis in `text`. Unmatched delimiters stay literal.
    pub fn parse(text: &str) -> Self {
        let mut spans = Vec::new();
        let mut last = 0;
        for caps in BOLD.captures_iter(text) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            push_italics(&mut spans, &text[last..whole.start()]);
            spans.push(InlineSpan::Bold(inner.as_str().to_string()));
            last = whole.end();
        }
        push_italics(&mut spans, &text[last..]);
        Self { spans }
    }

    /// The text with emphasis markers removed.
    pub fn plain(&self) -> String {
        self.spans.iter().map(InlineSpan::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn has_bold(&self) -> bool {
        self.spans.iter().any(|s| matches!(s, InlineSpan::Bold(_)))
    }
}

fn push_text(spans: &mut Vec<InlineSpan>, text: &str) {
    if !text.is_empty() {
        spans.push(InlineSpan::Text(text.to_string()));
    }
}

fn push_italics(spans: &mut Vec<InlineSpan>, text: &str) {
    let mut last = 0;
    for caps in ITALIC.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_text(spans, &text[last..whole.start()]);
        spans.push(InlineSpan::Italic(inner.as_str().to_string()));
        last = whole.end();
    }
    push_text(spans, &text[last..]);
}
