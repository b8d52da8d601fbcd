//! Image collection from three locations of the article, in priority order.
//!
//! 1. thumbnails (`img.thumbimage`) in the content area
//! 2. images inside the infobox (`table.infobox`)
//! 3. any content image whose declared width exceeds the configured minimum
//!
//! All candidates run through one [`ImageSet`], so the final list holds each
//! normalised URL once, at the position of its first appearance.

use crate::config::ScrapeConfig;
use crate::pipeline::markup::MarkupNode;
use std::collections::HashSet;
use tracing::debug;

/// Insertion-ordered set of image URLs.
#[derive(Debug, Default, Clone)]
pub struct ImageSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `url` unless already present. Returns whether it was added.
    pub fn insert(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.order.push(url);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

/// Prefix protocol-relative and path-only sources with `https:`.
pub fn normalize_image_url(src: &str) -> String {
    if src.starts_with("http://") || src.starts_with("https://") {
        src.to_string()
    } else {
        format!("https:{src}")
    }
}

/// Collect de-duplicated image URLs from the content area.
pub fn collect_images<N: MarkupNode>(content_area: &N, config: &ScrapeConfig) -> Vec<String> {
    let mut set = ImageSet::new();

    let thumbnails = thumbnail_sources(content_area, config.max_thumbnails);
    let infobox = infobox_sources(content_area, config.max_infobox_images);
    let wide = wide_sources(
        content_area,
        config.max_content_images,
        config.min_content_image_width,
    );
    debug!(
        "Image candidates: {} thumbnails, {} infobox, {} wide",
        thumbnails.len(),
        infobox.len(),
        wide.len()
    );

    for src in thumbnails.into_iter().chain(infobox).chain(wide) {
        set.insert(normalize_image_url(&src));
    }
    set.into_vec()
}

fn thumbnail_sources<N: MarkupNode>(area: &N, limit: usize) -> Vec<String> {
    area.find_all("img", Some("thumbimage"))
        .iter()
        .take(limit)
        .filter_map(|img| img.attribute("src").map(str::to_string))
        .collect()
}

fn infobox_sources<N: MarkupNode>(area: &N, limit: usize) -> Vec<String> {
    let Some(infobox) = area.find_first("table", Some("infobox")) else {
        return Vec::new();
    };
    infobox
        .find_all("img", None)
        .iter()
        .take(limit)
        .filter_map(|img| img.attribute("src").map(str::to_string))
        .collect()
}

fn wide_sources<N: MarkupNode>(area: &N, limit: usize, min_width: u32) -> Vec<String> {
    area.find_all("img", None)
        .iter()
        .take(limit)
        .filter(|img| declared_width(*img).is_some_and(|w| w > min_width))
        .filter_map(|img| img.attribute("src").map(str::to_string))
        .collect()
}

fn declared_width<N: MarkupNode>(img: &N) -> Option<u32> {
    img.attribute("width")?.trim().parse().ok()
}
