//! Run entry points: topic → PDF + summary CSV.
//!
//! [`scrape`] is the usual call; [`scrape_with`] takes the [`Fetcher`]
//! explicitly so the whole run can be driven from memory.

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::output::ScrapeOutput;
use crate::pipeline::extract::extract_document;
use crate::pipeline::fetch::{fetch_page, Fetcher, HttpFetcher};
use crate::pipeline::summary::{project_summary, write_summary_csv};
use crate::render::render_pdf;
use std::time::Instant;
use tracing::info;

/// Scrape `topic` over HTTP and write both artifacts into
/// `config.output_dir`.
///
/// # Errors
/// Fatal conditions only: an empty topic, a failed or non-2xx page fetch,
/// a page without title or content area, or a failed file write. Images
/// that cannot be fetched or decoded are skipped and reported in
/// `output.render.failures`.
pub fn scrape(topic: &str, config: &ScrapeConfig) -> Result<ScrapeOutput, ScrapeError> {
    let fetcher = HttpFetcher::new(config)?;
    scrape_with(topic, &fetcher, config)
}

/// [`scrape`] with a caller-supplied fetcher.
pub fn scrape_with<F: Fetcher + ?Sized>(
    topic: &str,
    fetcher: &F,
    config: &ScrapeConfig,
) -> Result<ScrapeOutput, ScrapeError> {
    let start = Instant::now();
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(ScrapeError::InvalidTopic {
            topic: topic.to_string(),
        });
    }

    // ── Step 1: Fetch the article ────────────────────────────────────────
    let url = config.article_url(topic);
    info!("Scraping '{}' from {}", topic, url);
    let html = fetch_page(fetcher, &url)?;

    // ── Step 2: Extract the document model ───────────────────────────────
    let extraction = extract_document(&html, &url, config)?;
    let document = extraction.document;

    std::fs::create_dir_all(&config.output_dir).map_err(|e| ScrapeError::OutputWriteFailed {
        path: config.output_dir.clone(),
        source: e,
    })?;

    // ── Step 3: Render the PDF ───────────────────────────────────────────
    let pdf_path = config.pdf_path(topic);
    let render = render_pdf(&document, fetcher, config, &pdf_path)?;

    // ── Step 4: Summary CSV ──────────────────────────────────────────────
    let summary = project_summary(&document);
    let csv_path = config.csv_path(topic);
    write_summary_csv(topic, &summary, &csv_path)?;

    let total_duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Scrape complete: '{}' in {}ms ({} sections, {} references, {}/{} images)",
        document.title,
        total_duration_ms,
        document.sections.len(),
        document.references.len(),
        render.images_embedded,
        document.images.len()
    );

    Ok(ScrapeOutput {
        document,
        reference_source: extraction.reference_source,
        summary,
        pdf_path,
        csv_path,
        render,
        total_duration_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::pipeline::fetch::FetchResponse;

    struct Unreachable;

    impl Fetcher for Unreachable {
        fn fetch(&self, _url: &str) -> Result<FetchResponse, FetchError> {
            Err(FetchError::Transport("no network in tests".into()))
        }
    }

    #[test]
    fn blank_topic_rejected_before_fetching() {
        let err = scrape_with("  ", &Unreachable, &ScrapeConfig::default()).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidTopic { .. }));
    }

    #[test]
    fn page_fetch_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScrapeConfig::builder().output_dir(dir.path()).build().unwrap();
        let err = scrape_with("Cat", &Unreachable, &config).unwrap_err();
        assert!(matches!(err, ScrapeError::FetchFailed { .. }));
        assert!(!config.pdf_path("Cat").exists());
    }
}
