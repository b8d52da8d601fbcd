//! Assemble a [`Document`] from a fetched article page.
//!
//! Locates the title and content area, then runs the three independent,
//! read-only passes (sections, references, images) over the same tree.

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::model::Document;
use crate::pipeline::images::collect_images;
use crate::pipeline::markup::{parse_page, MarkupNode};
use crate::pipeline::references::{resolve_references, ReferenceSource};
use crate::pipeline::sections::extract_sections;
use tracing::{debug, info};

/// A document plus how its references were found.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub document: Document,
    pub reference_source: ReferenceSource,
}

/// Parse `html` and extract the article model.
///
/// # Errors
/// [`ScrapeError::MissingElement`] when the page has no `h1#firstHeading`
/// or no `div#mw-content-text`; everything below those is best-effort.
pub fn extract_document(
    html: &str,
    url: &str,
    config: &ScrapeConfig,
) -> Result<Extraction, ScrapeError> {
    let page = parse_page(html);
    let root = page.root_element();

    let title = root
        .find_by_id("h1", "firstHeading")
        .ok_or_else(|| ScrapeError::MissingElement {
            what: "page title (h1#firstHeading)".into(),
        })?
        .text_content()
        .trim()
        .to_string();

    let content_area = root
        .find_by_id("div", "mw-content-text")
        .ok_or_else(|| ScrapeError::MissingElement {
            what: "content area (div#mw-content-text)".into(),
        })?;
    let content_root = content_area
        .find_first("div", Some("mw-parser-output"))
        .unwrap_or(content_area);

    let sections = extract_sections(&content_root);
    debug!("Extracted {} sections", sections.len());

    let (references, reference_source) =
        resolve_references(&root, &content_area, config.max_citations);
    let images = collect_images(&content_area, config);

    info!(
        "Extracted '{}': {} sections, {} references ({:?}), {} images",
        title,
        sections.len(),
        references.len(),
        reference_source,
        images.len()
    );

    Ok(Extraction {
        document: Document {
            title,
            url: url.to_string(),
            sections,
            references,
            images,
        },
        reference_source,
    })
}
