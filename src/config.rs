//! Configuration types for an article scrape.
//!
//! Every knob lives in [`ScrapeConfig`], built via [`ScrapeConfigBuilder`].
//! Defaults reproduce the behaviour of the command-line tool exactly; the
//! builder exists so tests and embedders can tighten limits or point the
//! scraper at a mirror without touching code.

use crate::error::ScrapeError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default article base URL; the topic is appended to it.
pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org/wiki/";

/// Configuration for one scrape run.
///
/// # Example
/// ```rust
/// use wiki2pdf::ScrapeConfig;
///
/// let config = ScrapeConfig::builder()
///     .output_dir("out")
///     .timeout_secs(10)
///     .include_images(false)
///     .build()
///     .unwrap();
/// assert!(!config.include_images);
/// ```
#[derive(Clone)]
pub struct ScrapeConfig {
    /// Article base URL. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Directory receiving the PDF and CSV. Default: current directory.
    pub output_dir: PathBuf,

    /// Per-request timeout in seconds for the page and every image. Default: 30.
    pub timeout_secs: u64,

    /// `User-Agent` sent with every request.
    ///
    /// Wikimedia rejects requests without an identifying agent, so this is
    /// never empty.
    pub user_agent: String,

    /// Whether the renderer fetches and embeds images. Default: true.
    ///
    /// When false the "Images" block is omitted; the collected URLs are still
    /// reported in the document model.
    pub include_images: bool,

    /// Maximum thumbnail images taken from the content area. Default: 15.
    pub max_thumbnails: usize,

    /// Maximum images taken from the infobox. Default: 5.
    pub max_infobox_images: usize,

    /// Maximum `img` elements examined by the width scan. Default: 20.
    pub max_content_images: usize,

    /// Declared width an image must exceed to pass the width scan. Default: 100.
    pub min_content_image_width: u32,

    /// Maximum inline citations examined by the fallback reference strategy. Default: 30.
    pub max_citations: usize,

    /// Maximum width in points of each image in a side-by-side pair. Default: 250.
    pub pair_image_width: f32,

    /// Maximum width in points of an image rendered on its own. Default: 450.
    pub single_image_width: f32,

    /// Optional per-image progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("."),
            timeout_secs: 30,
            user_agent: concat!("wiki2pdf/", env!("CARGO_PKG_VERSION")).to_string(),
            include_images: true,
            max_thumbnails: 15,
            max_infobox_images: 5,
            max_content_images: 20,
            min_content_image_width: 100,
            max_citations: 30,
            pair_image_width: 250.0,
            single_image_width: 450.0,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ScrapeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrapeConfig")
            .field("base_url", &self.base_url)
            .field("output_dir", &self.output_dir)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("include_images", &self.include_images)
            .field("max_thumbnails", &self.max_thumbnails)
            .field("max_infobox_images", &self.max_infobox_images)
            .field("max_content_images", &self.max_content_images)
            .field("min_content_image_width", &self.min_content_image_width)
            .field("max_citations", &self.max_citations)
            .field("pair_image_width", &self.pair_image_width)
            .field("single_image_width", &self.single_image_width)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn RenderProgressCallback>"),
            )
            .finish()
    }
}

impl ScrapeConfig {
    /// Create a new builder for `ScrapeConfig`.
    pub fn builder() -> ScrapeConfigBuilder {
        ScrapeConfigBuilder {
            config: Self::default(),
        }
    }

    /// Article URL for `topic`. Spaces become underscores, as in article links.
    pub fn article_url(&self, topic: &str) -> String {
        format!("{}{}", self.base_url, topic.trim().replace(' ', "_"))
    }

    /// Path of the PDF artifact for `topic`.
    pub fn pdf_path(&self, topic: &str) -> PathBuf {
        self.output_dir.join(format!("{}_enhanced_wikipedia.pdf", file_stem(topic)))
    }

    /// Path of the CSV artifact for `topic`.
    pub fn csv_path(&self, topic: &str) -> PathBuf {
        self.output_dir.join(format!("{}_wikipedia_summary.csv", file_stem(topic)))
    }
}

/// `topic` as a single file-name component: path separators become `_`.
fn file_stem(topic: &str) -> String {
    topic.replace(['/', '\\'], "_")
}

/// Builder for [`ScrapeConfig`].
#[derive(Debug)]
pub struct ScrapeConfigBuilder {
    config: ScrapeConfig,
}

impl ScrapeConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs.max(1);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn include_images(mut self, v: bool) -> Self {
        self.config.include_images = v;
        self
    }

    pub fn max_thumbnails(mut self, n: usize) -> Self {
        self.config.max_thumbnails = n;
        self
    }

    pub fn max_infobox_images(mut self, n: usize) -> Self {
        self.config.max_infobox_images = n;
        self
    }

    pub fn max_content_images(mut self, n: usize) -> Self {
        self.config.max_content_images = n;
        self
    }

    pub fn min_content_image_width(mut self, px: u32) -> Self {
        self.config.min_content_image_width = px;
        self
    }

    pub fn max_citations(mut self, n: usize) -> Self {
        self.config.max_citations = n;
        self
    }

    pub fn pair_image_width(mut self, pt: f32) -> Self {
        self.config.pair_image_width = pt.clamp(20.0, 270.0);
        self
    }

    pub fn single_image_width(mut self, pt: f32) -> Self {
        self.config.single_image_width = pt.clamp(20.0, 552.0);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ScrapeConfig, ScrapeError> {
        let c = &self.config;
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(ScrapeError::InvalidConfig(format!(
                "base URL must be http(s), got '{}'",
                c.base_url
            )));
        }
        if c.user_agent.trim().is_empty() {
            return Err(ScrapeError::InvalidConfig(
                "user agent must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
