//! # wiki2pdf
//!
//! Turn a Wikipedia article into an illustrated PDF (table of contents,
//! bookmarks, clickable links) and a one-row CSV summary.
//!
//! ## Pipeline Overview
//!
//! ```text
//! topic
//!  │
//!  ├─ 1. Fetch    GET <base_url><Topic_With_Underscores>
//!  ├─ 2. Extract  title, sections (two scans), references, image URLs
//!  ├─ 3. Images   fetch + decode, flatten alpha, pair up in rows
//!  ├─ 4. Render   paginate, write PDF with outline + named destinations
//!  └─ 5. Summary  condensed text → <topic>_wikipedia_summary.csv
//! ```
//!
//! Article-level failures (bad topic, HTTP error, page without content) are
//! fatal. Image failures are not: the image is skipped and recorded in
//! [`RenderStats::failures`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wiki2pdf::{scrape, ScrapeConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScrapeConfig::builder().output_dir("out").build()?;
//!     let output = scrape("Cat", &config)?;
//!     println!("{} sections → {}", output.document.sections.len(), output.pdf_path.display());
//!     for failure in &output.render.failures {
//!         eprintln!("{failure}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `wiki2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! wiki2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod scrape;
pub mod topic;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ScrapeConfig, ScrapeConfigBuilder, DEFAULT_BASE_URL};
pub use error::{FetchError, ImageError, ScrapeError};
pub use model::{Document, Reference, Section};
pub use output::{RenderStats, ScrapeOutput};
pub use pipeline::fetch::{FetchResponse, Fetcher, HttpFetcher};
pub use pipeline::references::ReferenceSource;
pub use progress::{NoopProgressCallback, ProgressCallback, RenderProgressCallback};
pub use scrape::{scrape, scrape_with};
pub use topic::{ArgTopic, PromptTopic, TopicProvider};
