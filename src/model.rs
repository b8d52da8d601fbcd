//! In-memory article model produced by extraction and read by rendering.

use serde::{Deserialize, Serialize};

/// Heading of the synthesised section holding prose before the first heading.
pub const INTRODUCTION: &str = "Introduction";

/// Characters of reference text kept in a link label.
const LINK_LABEL_CHARS: usize = 50;

/// A heading plus the text blocks that follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Structural depth: 1 for the introduction, 2–4 for `h2`–`h4`.
    pub level: u8,
    pub heading: String,
    /// Paragraph-like blocks joined by a blank line.
    pub content: String,
}

impl Section {
    pub fn new(level: u8, heading: impl Into<String>, blocks: &[String]) -> Self {
        Self {
            level,
            heading: heading.into(),
            content: blocks.join("\n\n"),
        }
    }

    /// True for the synthesised introduction, the only level-1 section.
    pub fn is_introduction(&self) -> bool {
        self.level == 1 && self.heading == INTRODUCTION
    }

    /// Non-blank paragraphs of the content, in order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.content.split("\n\n").filter(|p| !p.trim().is_empty())
    }
}

/// A citation entry, optionally carrying an external URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub text: String,
    pub url: Option<String>,
}

impl Reference {
    /// Short label shown next to a reference link: the first 50 characters
    /// of the text followed by `...`.
    pub fn link_label(&self) -> String {
        let head: String = self.text.chars().take(LINK_LABEL_CHARS).collect();
        format!("{head}...")
    }
}

/// An extracted article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    /// Source article URL.
    pub url: String,
    pub sections: Vec<Section>,
    pub references: Vec<Reference>,
    /// Absolute, de-duplicated image URLs in source-priority order.
    pub images: Vec<String>,
}

impl Document {
    /// Whether any reference carries an external link.
    ///
    /// The renderer switches to the linked reference listing when this holds.
    pub fn has_reference_links(&self) -> bool {
        self.references.iter().any(|r| r.url.is_some())
    }

    /// The synthesised introduction, if the article opened with prose.
    pub fn introduction(&self) -> Option<&Section> {
        self.sections.first().filter(|s| s.is_introduction())
    }
}
