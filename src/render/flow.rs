//! Document flow: the ordered blocks the layout engine places on pages.
//!
//! ```text
//!  Title
//!  Source URL            (link)
//!  Table of Contents     (one entry per section, link + page number)
//!  per section:
//!    Heading             (anchor → named destination + outline entry)
//!    Paragraph*
//!  Images                (rows from layout_images)
//!  References
//! ```

use crate::config::ScrapeConfig;
use crate::error::ImageError;
use crate::model::Document;
use crate::pipeline::fetch::Fetcher;
use crate::progress::{NoopProgressCallback, RenderProgressCallback};
use crate::render::prepare::{load_image, prepare_image, LoadedImage, PreparedImage};
use std::collections::HashSet;
use tracing::{debug, warn};

/// One unit of content in reading order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    SourceUrl(String),
    /// A bold heading that is neither bookmarked nor listed in the TOC.
    Header(String),
    TocEntry {
        level: u8,
        text: String,
        anchor: String,
    },
    Heading {
        level: u8,
        text: String,
        anchor: String,
    },
    Paragraph(String),
    Images(ImageRow),
    Reference {
        number: usize,
        text: String,
        url: Option<String>,
    },
    Spacer(f32),
}

/// A row of the image block. Each image is captioned with its source URL.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageRow {
    Single(PreparedImage),
    Pair(PreparedImage, PreparedImage),
}

impl ImageRow {
    pub fn images(&self) -> Vec<&PreparedImage> {
        match self {
            ImageRow::Single(a) => vec![a],
            ImageRow::Pair(a, b) => vec![a, b],
        }
    }
}

/// Outcome of the image pass.
#[derive(Debug, Default)]
pub struct ImageLayout {
    pub rows: Vec<ImageRow>,
    pub failures: Vec<ImageError>,
}

impl ImageLayout {
    pub fn embedded(&self) -> usize {
        self.rows.iter().map(|r| r.images().len()).sum()
    }
}

/// Caption placed under every image.
pub fn caption(url: &str) -> String {
    format!("Image source: {url}")
}

/// Fetch, decode and pair up `urls`.
///
/// Walks the list with a cursor. The image under the cursor is loaded first;
/// if it fails it is reported and skipped. Otherwise the following image is
/// tried: when it loads the two share a row and the cursor moves by two,
/// when it doesn't the current image gets a row of its own and the cursor
/// moves by one, so the failed image is attempted again as the current one.
pub fn layout_images<F: Fetcher + ?Sized>(
    urls: &[String],
    fetcher: &F,
    config: &ScrapeConfig,
) -> ImageLayout {
    let noop = NoopProgressCallback;
    let progress: &dyn RenderProgressCallback = match &config.progress_callback {
        Some(cb) => cb.as_ref(),
        None => &noop,
    };
    let total = urls.len();
    progress.on_render_start(total);

    let mut out = ImageLayout::default();
    let mut i = 0;
    while i < total {
        progress.on_image_start(i, total, &urls[i]);
        let current = match load_image(fetcher, &urls[i]) {
            Ok(img) => img,
            Err(e) => {
                report(&mut out, progress, i, total, e);
                i += 1;
                continue;
            }
        };

        let next = urls.get(i + 1).and_then(|url| match load_image(fetcher, url) {
            Ok(img) => Some(img),
            Err(e) => {
                debug!("Next image not available, placing current alone: {}", e);
                None
            }
        });

        match next {
            Some(next) => {
                place_pair(&mut out, progress, config, i, total, &current, &next);
                i += 2;
            }
            None => {
                place_single(&mut out, progress, config, i, total, &current);
                i += 1;
            }
        }
    }

    progress.on_render_complete(out.embedded(), out.failures.len());
    out
}

fn place_pair(
    out: &mut ImageLayout,
    progress: &dyn RenderProgressCallback,
    config: &ScrapeConfig,
    i: usize,
    total: usize,
    current: &LoadedImage,
    next: &LoadedImage,
) {
    match (
        prepare_image(current, config.pair_image_width),
        prepare_image(next, config.pair_image_width),
    ) {
        (Ok(a), Ok(b)) => {
            progress.on_image_rendered(i, total, &a.url);
            progress.on_image_rendered(i + 1, total, &b.url);
            out.rows.push(ImageRow::Pair(a, b));
        }
        // One side failed to encode: the survivor goes on alone.
        (Ok(_), Err(e)) => {
            place_single(out, progress, config, i, total, current);
            report(out, progress, i + 1, total, e);
        }
        (Err(e), Ok(_)) => {
            report(out, progress, i, total, e);
            place_single(out, progress, config, i + 1, total, next);
        }
        (Err(e1), Err(e2)) => {
            report(out, progress, i, total, e1);
            report(out, progress, i + 1, total, e2);
        }
    }
}

fn place_single(
    out: &mut ImageLayout,
    progress: &dyn RenderProgressCallback,
    config: &ScrapeConfig,
    i: usize,
    total: usize,
    image: &LoadedImage,
) {
    match prepare_image(image, config.single_image_width) {
        Ok(prepared) => {
            progress.on_image_rendered(i, total, &prepared.url);
            out.rows.push(ImageRow::Single(prepared));
        }
        Err(e) => report(out, progress, i, total, e),
    }
}

fn report(
    out: &mut ImageLayout,
    progress: &dyn RenderProgressCallback,
    i: usize,
    total: usize,
    error: ImageError,
) {
    warn!("{}", error);
    progress.on_image_error(i, total, &error.to_string());
    out.failures.push(error);
}

/// Anchor names handed out so far; repeats get `-2`, `-3`, … appended.
#[derive(Debug, Default)]
pub struct AnchorSet {
    used: HashSet<String>,
}

impl AnchorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unique anchor for a heading at `level`.
    pub fn anchor_for(&mut self, level: u8, heading: &str) -> String {
        let base = format!(
            "h{}-{}",
            level.min(3),
            heading.to_lowercase().replace(' ', "-")
        );
        let mut candidate = base.clone();
        let mut n = 2;
        while self.used.contains(&candidate) {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

/// Lay out the document as blocks. `images` is `None` when the image block
/// is disabled altogether.
pub fn build_blocks(doc: &Document, images: Option<Vec<ImageRow>>) -> Vec<Block> {
    let mut anchors = AnchorSet::new();
    let headings: Vec<(u8, &str, String)> = doc
        .sections
        .iter()
        .map(|s| (s.level, s.heading.as_str(), anchors.anchor_for(s.level, &s.heading)))
        .collect();

    let mut blocks = vec![
        Block::Title(doc.title.clone()),
        Block::Spacer(15.0),
        Block::SourceUrl(doc.url.clone()),
        Block::Spacer(20.0),
        Block::Header("Table of Contents".into()),
        Block::Spacer(10.0),
    ];
    blocks.extend(headings.iter().map(|(level, text, anchor)| Block::TocEntry {
        level: *level,
        text: text.to_string(),
        anchor: anchor.clone(),
    }));
    blocks.push(Block::Spacer(30.0));

    for (section, (level, text, anchor)) in doc.sections.iter().zip(&headings) {
        blocks.push(Block::Heading {
            level: *level,
            text: text.to_string(),
            anchor: anchor.clone(),
        });
        for para in section.paragraphs() {
            blocks.push(Block::Paragraph(para.to_string()));
            blocks.push(Block::Spacer(8.0));
        }
    }

    if let Some(rows) = images.filter(|_| !doc.images.is_empty()) {
        blocks.push(Block::Header("Images".into()));
        blocks.push(Block::Spacer(10.0));
        blocks.extend(rows.into_iter().map(Block::Images));
    }

    if !doc.references.is_empty() {
        blocks.push(Block::Header("References".into()));
        blocks.push(Block::Spacer(10.0));
        if doc.has_reference_links() {
            let linked = doc.references.iter().filter_map(|r| {
                r.url
                    .as_ref()
                    .map(|url| (r.link_label(), Some(url.clone())))
            });
            push_references(&mut blocks, linked);
        } else {
            let plain = doc.references.iter().map(|r| (r.text.clone(), None));
            push_references(&mut blocks, plain);
        }
    }

    blocks
}

fn push_references(
    blocks: &mut Vec<Block>,
    refs: impl Iterator<Item = (String, Option<String>)>,
) {
    for (n, (text, url)) in refs.enumerate() {
        blocks.push(Block::Reference {
            number: n + 1,
            text,
            url,
        });
        blocks.push(Block::Spacer(5.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::model::{Reference, Section, INTRODUCTION};
    use crate::pipeline::fetch::FetchResponse;
    use crate::render::prepare::encode_for_tests;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    struct FakeFetcher {
        bodies: HashMap<String, Vec<u8>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn new(entries: &[(&str, Option<Vec<u8>>)]) -> Self {
            Self {
                bodies: entries
                    .iter()
                    .filter_map(|(u, b)| b.clone().map(|b| (u.to_string(), b)))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl Fetcher for FakeFetcher {
        fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.bodies.get(url) {
                Some(b) => Ok(FetchResponse::ok(b.clone())),
                None => Err(FetchError::Transport("connection reset".into())),
            }
        }
    }

    fn jpeg(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([90, 120, 200])));
        encode_for_tests(&img, ImageFormat::Jpeg)
    }

    fn urls(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("https://img/{i}.jpg")).collect()
    }

    fn row_urls(layout: &ImageLayout) -> Vec<Vec<&str>> {
        layout
            .rows
            .iter()
            .map(|r| r.images().into_iter().map(|i| i.url.as_str()).collect())
            .collect()
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl RenderProgressCallback for Recorder {
        fn on_image_rendered(&self, index: usize, _total: usize, _url: &str) {
            self.0.lock().unwrap().push(format!("ok {index}"));
        }
        fn on_image_error(&self, index: usize, _total: usize, _error: &str) {
            self.0.lock().unwrap().push(format!("err {index}"));
        }
        fn on_render_complete(&self, rendered: usize, failed: usize) {
            self.0.lock().unwrap().push(format!("done {rendered}/{failed}"));
        }
    }

    #[test]
    fn failing_second_image_is_retried_as_current() {
        let list = urls(5);
        let fetcher = FakeFetcher::new(&[
            (list[0].as_str(), Some(jpeg(300, 200))),
            (list[1].as_str(), None),
            (list[2].as_str(), Some(jpeg(300, 200))),
            (list[3].as_str(), Some(jpeg(300, 200))),
            (list[4].as_str(), Some(jpeg(300, 200))),
        ]);
        let recorder = Arc::new(Recorder::default());
        let config = ScrapeConfig::builder()
            .progress_callback(recorder.clone())
            .build()
            .unwrap();

        let layout = layout_images(&list, &fetcher, &config);

        assert_eq!(
            row_urls(&layout),
            vec![
                vec!["https://img/1.jpg"],
                vec!["https://img/3.jpg", "https://img/4.jpg"],
                vec!["https://img/5.jpg"],
            ]
        );
        assert_eq!(layout.failures.len(), 1);
        assert_eq!(layout.failures[0].url(), "https://img/2.jpg");
        // Image 2 is tried once as "next" and once as "current".
        let calls = fetcher.calls.lock().unwrap();
        assert_eq!(calls.iter().filter(|u| u.ends_with("/2.jpg")).count(), 2);
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec!["ok 0", "err 1", "ok 2", "ok 3", "ok 4", "done 4/1"]
        );
    }

    #[test]
    fn widths_follow_row_kind() {
        let list = urls(3);
        let fetcher = FakeFetcher::new(&[
            (list[0].as_str(), Some(jpeg(1000, 500))),
            (list[1].as_str(), Some(jpeg(1000, 500))),
            (list[2].as_str(), Some(jpeg(1000, 500))),
        ]);
        let layout = layout_images(&list, &fetcher, &ScrapeConfig::default());
        match &layout.rows[..] {
            [ImageRow::Pair(a, b), ImageRow::Single(c)] => {
                assert_eq!((a.width, a.height), (250, 125));
                assert_eq!(b.width, 250);
                assert_eq!((c.width, c.height), (450, 225));
            }
            other => panic!("unexpected rows: {other:?}"),
        }
    }

    #[test]
    fn http_error_and_undecodable_bytes_are_skipped() {
        struct Mixed;
        impl Fetcher for Mixed {
            fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
                Ok(match url {
                    "https://img/1.jpg" => FetchResponse {
                        status: 404,
                        bytes: vec![],
                    },
                    "https://img/2.jpg" => FetchResponse::ok(b"not an image".to_vec()),
                    _ => FetchResponse::ok(jpeg(10, 10)),
                })
            }
        }
        let layout = layout_images(&urls(3), &Mixed, &ScrapeConfig::default());
        assert_eq!(row_urls(&layout), vec![vec!["https://img/3.jpg"]]);
        assert!(matches!(
            layout.failures[0],
            ImageError::HttpStatus { status: 404, .. }
        ));
        assert!(matches!(layout.failures[1], ImageError::DecodeFailed { .. }));
    }

    #[test]
    fn empty_list_produces_nothing() {
        let fetcher = FakeFetcher::new(&[]);
        let layout = layout_images(&[], &fetcher, &ScrapeConfig::default());
        assert!(layout.rows.is_empty());
        assert!(layout.failures.is_empty());
    }

    #[test]
    fn anchors_are_unique() {
        let mut set = AnchorSet::new();
        assert_eq!(set.anchor_for(2, "Early History"), "h2-early-history");
        assert_eq!(set.anchor_for(2, "Early History"), "h2-early-history-2");
        assert_eq!(set.anchor_for(2, "Early History"), "h2-early-history-3");
        assert_eq!(set.anchor_for(4, "Notes"), "h3-notes");
    }

    fn sample_doc(references: Vec<Reference>) -> Document {
        Document {
            title: "Cat".into(),
            url: "https://en.wikipedia.org/wiki/Cat".into(),
            sections: vec![
                Section::new(1, INTRODUCTION, &["Cats purr.".into()]),
                Section::new(2, "Diet", &["Meat.".into(), "Fish.".into()]),
            ],
            references,
            images: vec!["https://img/1.jpg".into()],
        }
    }

    #[test]
    fn block_order() {
        let blocks = build_blocks(&sample_doc(vec![]), Some(vec![]));
        let toc: Vec<&str> = blocks
            .iter()
            .filter_map(|b| match b {
                Block::TocEntry { anchor, .. } => Some(anchor.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(toc, vec!["h1-introduction", "h2-diet"]);
        let paragraphs = blocks
            .iter()
            .filter(|b| matches!(b, Block::Paragraph(_)))
            .count();
        assert_eq!(paragraphs, 3);
        assert!(blocks.contains(&Block::Header("Images".into())));
        assert!(!blocks.contains(&Block::Header("References".into())));
    }

    #[test]
    fn image_block_omitted_when_disabled() {
        let blocks = build_blocks(&sample_doc(vec![]), None);
        assert!(!blocks.contains(&Block::Header("Images".into())));
    }

    #[test]
    fn linked_references_skip_unlinked_entries() {
        let refs = vec![
            Reference {
                text: "Plain".into(),
                url: None,
            },
            Reference {
                text: "Linked source".into(),
                url: Some("https://example.org".into()),
            },
        ];
        let blocks = build_blocks(&sample_doc(refs), None);
        let listed: Vec<&Block> = blocks
            .iter()
            .filter(|b| matches!(b, Block::Reference { .. }))
            .collect();
        assert_eq!(
            listed,
            vec![&Block::Reference {
                number: 1,
                text: "Linked source...".into(),
                url: Some("https://example.org".into()),
            }]
        );
    }

    #[test]
    fn unlinked_references_listed_in_full() {
        let refs = vec![
            Reference {
                text: "First".into(),
                url: None,
            },
            Reference {
                text: "Second".into(),
                url: None,
            },
        ];
        let blocks = build_blocks(&sample_doc(refs), None);
        assert!(blocks.contains(&Block::Reference {
            number: 2,
            text: "Second".into(),
            url: None,
        }));
    }
}
