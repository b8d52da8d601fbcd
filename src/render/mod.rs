//! Document rendering: [`Document`] → paginated PDF.
//!
//! ```text
//!  Document ──► flow::layout_images ──► ImageRow*   (fetch, decode, pair)
//!      │                                   │
//!      └──────► flow::build_blocks ◄───────┘
//!                      │
//!                      ▼
//!               layout::paginate ──► Layout      (pages, anchors, outline)
//!                      │
//!                      ▼
//!               pdf::write_pdf ──► <topic>_enhanced_wikipedia.pdf
//! ```

pub mod flow;
pub mod layout;
pub mod pdf;
pub mod prepare;

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::model::Document;
use crate::output::RenderStats;
use crate::pipeline::fetch::Fetcher;
use std::path::Path;
use tracing::info;

/// Render `doc` to a PDF at `path`, fetching images through `fetcher`.
///
/// Image failures are collected in the returned stats; only failing to
/// serialise or write the file is an error.
pub fn render_pdf<F: Fetcher + ?Sized>(
    doc: &Document,
    fetcher: &F,
    config: &ScrapeConfig,
    path: &Path,
) -> Result<RenderStats, ScrapeError> {
    let (rows, failures) = if config.include_images {
        let images = flow::layout_images(&doc.images, fetcher, config);
        (Some(images.rows), images.failures)
    } else {
        (None, Vec::new())
    };
    let images_embedded = rows
        .iter()
        .flatten()
        .map(|row| row.images().len())
        .sum::<usize>();

    let blocks = flow::build_blocks(doc, rows);
    let layout = layout::paginate(blocks);
    pdf::write_pdf(&layout, &doc.title, path)?;

    info!(
        "PDF saved to '{}' ({} pages, {} images, {} image failures)",
        path.display(),
        layout.pages.len(),
        images_embedded,
        failures.len()
    );

    Ok(RenderStats {
        pages: layout.pages.len(),
        images_embedded,
        failures,
    })
}
