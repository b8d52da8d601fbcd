//! Error types for the wiki2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ScrapeError`] — **Fatal**: the run cannot produce its artifacts at all
//!   (page fetch failed, the article markup is missing its title, the PDF
//!   could not be written). Returned as `Err(ScrapeError)` from the top-level
//!   `scrape*` functions.
//!
//! * [`ImageError`] — **Non-fatal**: a single image could not be fetched or
//!   decoded. The image is skipped, the error is stored in
//!   [`crate::output::RenderStats`] and the PDF is still produced.
//!
//! [`FetchError`] is the transport-level failure returned by a
//! [`crate::pipeline::fetch::Fetcher`]; call sites turn it into one of the
//! two above depending on whether the page or an image was being fetched.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the wiki2pdf library.
#[derive(Debug, Error)]
pub enum ScrapeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The topic was empty after trimming.
    #[error("Invalid topic '{topic}': expected a non-empty article name")]
    InvalidTopic { topic: String },

    /// The article request never produced a response.
    #[error("Failed to fetch '{url}': {reason}")]
    FetchFailed { url: String, reason: String },

    /// The article request returned a non-success status.
    #[error("Failed to fetch page: {status} ({url})")]
    HttpStatus { url: String, status: u16 },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// A structural element every article carries was not found.
    #[error("Unexpected page structure: missing {what}")]
    MissingElement { what: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The PDF document could not be assembled or saved.
    #[error("Failed to write PDF '{path}': {detail}")]
    PdfWriteFailed { path: PathBuf, detail: String },

    /// Could not create the output directory or write a file in it.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The summary CSV could not be serialised.
    #[error("Failed to write CSV '{path}': {detail}")]
    CsvWriteFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single image.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ImageError {
    /// The request for the image bytes failed.
    #[error("Error processing image {url}: fetch failed: {detail}")]
    FetchFailed { url: String, detail: String },

    /// The image server answered with a non-success status.
    #[error("Error processing image {url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The bytes are not a decodable image.
    #[error("Error processing image {url}: decode failed: {detail}")]
    DecodeFailed { url: String, detail: String },

    /// Re-encoding for embedding failed.
    #[error("Error processing image {url}: encode failed: {detail}")]
    EncodeFailed { url: String, detail: String },
}

impl ImageError {
    /// URL of the image that failed.
    pub fn url(&self) -> &str {
        match self {
            ImageError::FetchFailed { url, .. }
            | ImageError::HttpStatus { url, .. }
            | ImageError::DecodeFailed { url, .. }
            | ImageError::EncodeFailed { url, .. } => url,
        }
    }
}

/// Transport failure reported by a fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request exceeded the configured timeout.
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Any other transport failure (DNS, TLS, connection reset, body read).
    #[error("{0}")]
    Transport(String),
}
