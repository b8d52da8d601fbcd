//! Retrieval: fetch a URL and return its status and raw bytes.
//!
//! Everything network-bound goes through the [`Fetcher`] trait so the rest of
//! the pipeline can run against in-memory pages in tests. [`HttpFetcher`] is
//! the production implementation on top of `reqwest::blocking`; requests are
//! issued one at a time, in pipeline order.

use crate::config::ScrapeConfig;
use crate::error::{FetchError, ScrapeError};
use std::time::Duration;
use tracing::debug;

/// Response status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub bytes: Vec<u8>,
}

impl FetchResponse {
    pub fn ok(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            bytes: bytes.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Retrieval capability used for the article page and every image.
///
/// A returned `Ok` may still carry a non-success status; interpreting it is
/// up to the caller.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// Blocking HTTP fetcher.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    /// Build a client honouring the timeout and user agent of `config`.
    pub fn new(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ScrapeError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            timeout_secs: config.timeout_secs,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    secs: self.timeout_secs,
                }
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .map_err(|e| FetchError::Transport(e.to_string()))?
            .to_vec();
        debug!("GET {} → {} ({} bytes)", url, status, bytes.len());

        Ok(FetchResponse { status, bytes })
    }
}

/// Fetch the article page, turning every failure into a fatal error.
pub fn fetch_page<F: Fetcher + ?Sized>(fetcher: &F, url: &str) -> Result<String, ScrapeError> {
    let response = fetcher.fetch(url).map_err(|e| ScrapeError::FetchFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if !response.is_success() {
        return Err(ScrapeError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    Ok(String::from_utf8_lossy(&response.bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OneShot(Result<FetchResponse, &'static str>);

    impl Fetcher for OneShot {
        fn fetch(&self, _url: &str) -> Result<FetchResponse, FetchError> {
            self.0
                .clone()
                .map_err(|e| FetchError::Transport(e.to_string()))
        }
    }

    #[test]
    fn success_range() {
        assert!(FetchResponse::ok("x").is_success());
        let not_found = FetchResponse {
            status: 404,
            bytes: vec![],
        };
        assert!(!not_found.is_success());
    }

    #[test]
    fn page_status_is_fatal() {
        let f = OneShot(Ok(FetchResponse {
            status: 404,
            bytes: b"gone".to_vec(),
        }));
        let err = fetch_page(&f, "https://w/Nope").unwrap_err();
        assert!(matches!(err, ScrapeError::HttpStatus { status: 404, .. }));
    }

    #[test]
    fn transport_failure_is_fatal() {
        let f = OneShot(Err("connection refused"));
        let err = fetch_page(&f, "https://w/Cat").unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn body_decoded_lossily() {
        let f = OneShot(Ok(FetchResponse::ok(vec![b'a', 0xFF, b'b'])));
        assert_eq!(fetch_page(&f, "https://w/Cat").unwrap(), "a\u{FFFD}b");
    }

    #[test]
    fn http_fetcher_builds_from_default_config() {
        assert!(HttpFetcher::new(&ScrapeConfig::default()).is_ok());
    }
}
