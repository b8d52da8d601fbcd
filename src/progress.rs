//! Progress-callback trait for per-image render events.
//!
//! Inject an [`Arc<dyn RenderProgressCallback>`] via
//! [`crate::config::ScrapeConfigBuilder::progress_callback`] to receive
//! events while the renderer downloads and lays out article images.
//!
//! Image downloads are the only slow part of a run, and a failed image is
//! reported here rather than aborting the document, so this is where a host
//! application prints its per-image diagnostics.
//!
//! # Example
//!
//! ```rust
//! use wiki2pdf::{RenderProgressCallback, ScrapeConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     rendered: AtomicUsize,
//! }
//!
//! impl RenderProgressCallback for CountingCallback {
//!     fn on_image_rendered(&self, index: usize, total: usize, url: &str) {
//!         self.rendered.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("image {}/{} done: {}", index + 1, total, url);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { rendered: AtomicUsize::new(0) });
//!
//! let config = ScrapeConfig::builder()
//!     .progress_callback(counter as Arc<dyn RenderProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the renderer as it processes each image.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Rendering is single-threaded, but the trait is
/// `Send + Sync` so a config holding it can be shared freely.
pub trait RenderProgressCallback: Send + Sync {
    /// Called once before the first image is fetched.
    fn on_render_start(&self, total_images: usize) {
        let _ = total_images;
    }

    /// Called before image `index` (0-based) is fetched as the current image.
    fn on_image_start(&self, index: usize, total: usize, url: &str) {
        let _ = (index, total, url);
    }

    /// Called when image `index` has been placed in the document.
    fn on_image_rendered(&self, index: usize, total: usize, url: &str) {
        let _ = (index, total, url);
    }

    /// Called when image `index` is skipped because it could not be fetched
    /// or decoded.
    fn on_image_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after every image has been attempted.
    fn on_render_complete(&self, rendered: usize, failed: usize) {
        let _ = (rendered, failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RenderProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ScrapeConfig`].
pub type ProgressCallback = Arc<dyn RenderProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        started_total: AtomicUsize,
        starts: AtomicUsize,
        rendered: AtomicUsize,
        errors: AtomicUsize,
        completed: AtomicUsize,
    }

    impl RenderProgressCallback for TrackingCallback {
        fn on_render_start(&self, total_images: usize) {
            self.started_total.store(total_images, Ordering::SeqCst);
        }

        fn on_image_start(&self, _index: usize, _total: usize, _url: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_image_rendered(&self, _index: usize, _total: usize, _url: &str) {
            self.rendered.fetch_add(1, Ordering::SeqCst);
        }

        fn on_image_error(&self, _index: usize, _total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_render_complete(&self, rendered: usize, _failed: usize) {
            self.completed.store(rendered, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_render_start(3);
        cb.on_image_start(0, 3, "https://a");
        cb.on_image_rendered(0, 3, "https://a");
        cb.on_image_error(1, 3, "boom");
        cb.on_render_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_render_start(2);
        tracker.on_image_start(0, 2, "https://a");
        tracker.on_image_rendered(0, 2, "https://a");
        tracker.on_image_start(1, 2, "https://b");
        tracker.on_image_error(1, 2, "HTTP 404");
        tracker.on_render_complete(1, 1);

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.rendered.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.completed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_render_start(10);
        cb.on_image_rendered(0, 10, "https://a");
    }
}
