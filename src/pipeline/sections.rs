//! Section extraction: rebuild the heading hierarchy from the content tree.
//!
//! Articles mix two markup conventions. Older pages put `h2`–`h4` directly
//! under the content root; newer ones wrap each heading in a
//! `div.mw-heading` container. Each pass below handles one convention and
//! misses the other, so both run and their results are concatenated. The
//! union is deliberate: a heading visible to both passes yields two sections.
//!
//! ```text
//! content root ──▶ primary_sections    (direct children, accumulator fold)
//!              └─▶ container_sections  (heading containers + following siblings)
//! ```

use crate::model::{Section, INTRODUCTION};
use crate::pipeline::markup::MarkupNode;
use crate::pipeline::sanitize::{clean_heading, clean_text};

const HEADING_TAGS: [&str; 3] = ["h2", "h3", "h4"];
const BLOCK_TAGS: [&str; 3] = ["ul", "ol", "table"];
const HEADING_CONTAINER_CLASS: &str = "mw-heading";

/// Both passes, primary first. Never de-duplicated.
pub fn extract_sections<N: MarkupNode>(content_root: &N) -> Vec<Section> {
    let mut sections = primary_sections(content_root);
    sections.extend(container_sections(content_root));
    sections
}

// ── Primary pass ─────────────────────────────────────────────────────────

/// Section still receiving blocks during the scan.
#[derive(Debug, Clone, PartialEq)]
struct OpenSection {
    level: u8,
    heading: String,
    blocks: Vec<String>,
}

impl OpenSection {
    /// Emit the section, unless nothing was collected under its heading.
    fn close(self) -> Option<Section> {
        if self.blocks.is_empty() {
            None
        } else {
            Some(Section::new(self.level, self.heading, &self.blocks))
        }
    }
}

/// Accumulator threaded through the scan of the content root's children.
#[derive(Debug, Default, Clone, PartialEq)]
struct ScanState {
    /// Paragraphs seen before the first heading.
    intro: Vec<String>,
    open: Option<OpenSection>,
}

/// Scan the direct children of the content root, left to right.
pub fn primary_sections<N: MarkupNode>(content_root: &N) -> Vec<Section> {
    let mut emitted = Vec::new();
    let mut state = ScanState::default();

    for child in content_root.element_children() {
        let (next, completed) = step(state, &child);
        emitted.extend(completed);
        state = next;
    }
    emitted.extend(state.open.and_then(OpenSection::close));

    if state.intro.is_empty() {
        emitted
    } else {
        let mut sections = Vec::with_capacity(emitted.len() + 1);
        sections.push(Section::new(1, INTRODUCTION, &state.intro));
        sections.extend(emitted);
        sections
    }
}

/// Fold one child into the accumulator, returning the next state and the
/// section completed by this child, if any.
fn step<N: MarkupNode>(mut state: ScanState, node: &N) -> (ScanState, Option<Section>) {
    let tag = node.tag_name();

    if let Some(level) = heading_level(tag) {
        let completed = state.open.take().and_then(OpenSection::close);
        state.open = Some(OpenSection {
            level,
            heading: clean_heading(&node.text_content()),
            blocks: Vec::new(),
        });
        return (state, completed);
    }

    if tag == "p" {
        if let Some(text) = paragraph_text(node) {
            match state.open.as_mut() {
                Some(open) => open.blocks.push(text),
                None => state.intro.push(text),
            }
        }
    } else if BLOCK_TAGS.contains(&tag) {
        if let Some(open) = state.open.as_mut() {
            let text = clean_text(node.text_content().trim());
            if !text.trim().is_empty() {
                open.blocks.push(text);
            }
        }
    }

    (state, None)
}

// ── Secondary pass ───────────────────────────────────────────────────────

/// Sections introduced by `div.mw-heading` containers anywhere in the tree.
pub fn container_sections<N: MarkupNode>(content_root: &N) -> Vec<Section> {
    content_root
        .find_all("div", Some(HEADING_CONTAINER_CLASS))
        .iter()
        .filter_map(container_section)
        .collect()
}

fn container_section<N: MarkupNode>(container: &N) -> Option<Section> {
    let heading = container.find_first_of(&HEADING_TAGS)?;
    let level = heading_level(heading.tag_name())?;

    let blocks: Vec<String> = container
        .following_siblings()
        .iter()
        .take_while(|sibling| !bears_heading(*sibling))
        .filter(|sibling| sibling.tag_name() == "p")
        .filter_map(paragraph_text)
        .collect();

    if blocks.is_empty() {
        return None;
    }
    Some(Section::new(
        level,
        clean_heading(&heading.text_content()),
        &blocks,
    ))
}

fn bears_heading<N: MarkupNode>(node: &N) -> bool {
    node.is_one_of(&HEADING_TAGS) || node.find_first_of(&HEADING_TAGS).is_some()
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn heading_level(tag: &str) -> Option<u8> {
    if HEADING_TAGS.contains(&tag) {
        tag[1..].parse().ok()
    } else {
        None
    }
}

/// Sanitised paragraph text, or `None` for a blank paragraph.
fn paragraph_text<N: MarkupNode>(node: &N) -> Option<String> {
    let raw = node.text_content();
    if raw.trim().is_empty() {
        return None;
    }
    Some(clean_text(&raw).trim().to_string())
}
