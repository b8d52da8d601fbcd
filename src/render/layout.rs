//! Pagination: blocks → positioned text, images and link areas per page.
//!
//! Coordinates are PDF user space (points, origin bottom-left). A single
//! cursor runs down the frame between the top and bottom margins; whatever
//! does not fit opens a new page. TOC page numbers are left symbolic
//! ([`DrawOp::PageRef`]) and resolved by the writer once every destination
//! is known.

use crate::render::flow::{caption, Block, ImageRow};
use crate::render::prepare::PreparedImage;
use std::collections::BTreeMap;

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN_X: f32 = 30.0;
pub const MARGIN_Y: f32 = 20.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;

const FRAME_TOP: f32 = PAGE_HEIGHT - MARGIN_Y;
const FRAME_BOTTOM: f32 = MARGIN_Y;
const FRAME_HEIGHT: f32 = FRAME_TOP - FRAME_BOTTOM;

const BODY_SIZE: f32 = 11.0;
const BODY_LEADING: f32 = 14.0;
const CAPTION_SIZE: f32 = 8.0;
const CAPTION_LEADING: f32 = 9.6;
const URL_SIZE: f32 = 9.0;
const TITLE_SIZE: f32 = 24.0;

const PAIR_COLUMN_WIDTH: f32 = 260.0;
const CELL_PADDING: f32 = 6.0;

/// The three Helvetica faces used by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
}

impl Font {
    pub const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Oblique];

    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Oblique => "F3",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Oblique => "Helvetica-Oblique",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub f32, pub f32, pub f32);

pub const BLACK: Color = Color(0.0, 0.0, 0.0);
pub const DARK_BLUE: Color = Color(0.0, 0.0, 0.545);
pub const BLUE: Color = Color(0.0, 0.0, 1.0);
pub const DARK_GREY: Color = Color(0.41, 0.41, 0.41);

/// Advance width of `c` in Helvetica, thousandths of an em.
pub fn char_width(c: char) -> u16 {
    match c {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | 'I' | '[' | '\\' | ']' | 'f' | 't' => 278,
        '"' => 355,
        '#' | '$' | '0'..='9' | '?' | '_' | 'L' | 'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n'
        | 'o' | 'p' | 'q' | 'u' => 556,
        '%' => 889,
        '&' | 'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 667,
        '\'' => 191,
        '(' | ')' | '-' | '`' | 'r' => 333,
        '*' => 389,
        '+' | '<' | '=' | '>' | '~' => 584,
        '@' => 1015,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 722,
        'F' | 'T' | 'Z' => 611,
        'G' | 'O' | 'Q' => 778,
        'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        'M' | 'm' => 833,
        'W' => 944,
        '^' => 469,
        'i' | 'j' | 'l' => 222,
        '{' | '}' => 334,
        '|' => 260,
        _ => 556,
    }
}

/// Rendered width of `text` in points.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    let width = units as f32 * size / 1000.0;
    match font {
        // Bold faces run wider; over-estimating keeps lines inside the frame.
        Font::Bold => width * 1.1,
        _ => width,
    }
}

/// Greedy word wrap. Whitespace collapses; words wider than a line are
/// broken between characters.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    wrap_text_indented(text, font, size, max_width, max_width)
}

/// Like [`wrap_text`], with a narrower first line.
pub fn wrap_text_indented(
    text: &str,
    font: Font,
    size: f32,
    first_width: f32,
    rest_width: f32,
) -> Vec<String> {
    let space = text_width(" ", font, size);
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_w = 0.0;
    let limit = |lines: &Vec<String>| {
        if lines.is_empty() {
            first_width
        } else {
            rest_width
        }
    };

    for word in text.split_whitespace() {
        let word_w = text_width(word, font, size);
        let max = limit(&lines);
        if !line.is_empty() && line_w + space + word_w <= max {
            line.push(' ');
            line.push_str(word);
            line_w += space + word_w;
            continue;
        }
        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            line_w = 0.0;
        }
        if word_w <= limit(&lines) {
            line.push_str(word);
            line_w = word_w;
            continue;
        }
        for c in word.chars() {
            let cw = text_width(c.encode_utf8(&mut [0; 4]), font, size);
            if !line.is_empty() && line_w + cw > limit(&lines) {
                lines.push(std::mem::take(&mut line));
                line_w = 0.0;
            }
            line.push(c);
            line_w += cw;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Shorten `text` with `...` until it fits `max_width`.
pub fn truncate_to_width(text: &str, font: Font, size: f32, max_width: f32) -> String {
    if text_width(text, font, size) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate = format!("{}...", chars.iter().collect::<String>().trim_end());
        if text_width(&candidate, font, size) <= max_width {
            return candidate;
        }
    }
    "...".to_string()
}

/// A positioned drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Color,
        text: String,
    },
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        /// Index into [`Layout::images`].
        image: usize,
    },
    /// Page number of `anchor`, right-aligned at `right`.
    PageRef {
        right: f32,
        y: f32,
        size: f32,
        anchor: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget {
    Uri(String),
    Anchor(String),
}

/// A clickable area, `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub rect: [f32; 4],
    pub target: LinkTarget,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
    pub links: Vec<Link>,
}

/// Where an anchor points: page index (0-based) and the y of its top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Destination {
    pub page: usize,
    pub top: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    pub level: u8,
    pub title: String,
    pub anchor: String,
}

/// The paginated document.
#[derive(Debug, Default)]
pub struct Layout {
    pub pages: Vec<Page>,
    pub images: Vec<PreparedImage>,
    pub destinations: BTreeMap<String, Destination>,
    /// Section headings in reading order.
    pub outline: Vec<OutlineEntry>,
}

impl Layout {
    /// 1-based page number of `anchor`.
    pub fn page_number(&self, anchor: &str) -> Option<usize> {
        self.destinations.get(anchor).map(|d| d.page + 1)
    }
}

struct HeadingStyle {
    size: f32,
    space_before: f32,
    space_after: f32,
}

fn heading_style(level: u8) -> HeadingStyle {
    match level {
        0 | 1 => HeadingStyle {
            size: 18.0,
            space_before: 15.0,
            space_after: 10.0,
        },
        2 => HeadingStyle {
            size: 16.0,
            space_before: 12.0,
            space_after: 8.0,
        },
        _ => HeadingStyle {
            size: 14.0,
            space_before: 10.0,
            space_after: 6.0,
        },
    }
}

/// (font size, left indent, leading) of a TOC line.
fn toc_style(level: u8) -> (f32, f32, f32) {
    match level {
        0 | 1 => (14.0, 20.0, 16.0),
        2 => (12.0, 40.0, 14.0),
        _ => (10.0, 60.0, 12.0),
    }
}

/// Place `blocks` on pages.
pub fn paginate(blocks: Vec<Block>) -> Layout {
    let mut p = Paginator::new();
    for block in blocks {
        match block {
            Block::Title(text) => p.title(&text),
            Block::SourceUrl(url) => p.source_url(&url),
            Block::Header(text) => p.heading(1, &text, None),
            Block::TocEntry {
                level,
                text,
                anchor,
            } => p.toc_entry(level, &text, anchor),
            Block::Heading {
                level,
                text,
                anchor,
            } => p.heading(level, &text, Some(anchor)),
            Block::Paragraph(text) => p.paragraph(&text),
            Block::Images(row) => p.image_row(row),
            Block::Reference { number, text, url } => p.reference(number, &text, url),
            Block::Spacer(h) => p.space(h),
        }
    }
    p.finish()
}

struct Paginator {
    layout: Layout,
    cursor: f32,
}

impl Paginator {
    fn new() -> Self {
        Self {
            layout: Layout {
                pages: vec![Page::default()],
                ..Layout::default()
            },
            cursor: FRAME_TOP,
        }
    }

    fn finish(self) -> Layout {
        self.layout
    }

    fn page_index(&self) -> usize {
        self.layout.pages.len() - 1
    }

    fn page(&mut self) -> &mut Page {
        let idx = self.page_index();
        &mut self.layout.pages[idx]
    }

    fn at_top(&self) -> bool {
        self.cursor >= FRAME_TOP
    }

    fn new_page(&mut self) {
        self.layout.pages.push(Page::default());
        self.cursor = FRAME_TOP;
    }

    /// Break the page unless `height` still fits below the cursor.
    fn ensure(&mut self, height: f32) {
        if self.cursor - height < FRAME_BOTTOM && !self.at_top() {
            self.new_page();
        }
    }

    /// Vertical gap; swallowed at the top of a page.
    fn space(&mut self, height: f32) {
        if self.at_top() {
            return;
        }
        if self.cursor - height < FRAME_BOTTOM {
            self.new_page();
        } else {
            self.cursor -= height;
        }
    }

    /// Emit one line of text at `x`; returns the baseline.
    fn line(
        &mut self,
        x: f32,
        text: &str,
        font: Font,
        size: f32,
        color: Color,
        leading: f32,
    ) -> f32 {
        self.ensure(leading);
        let y = self.cursor - size;
        self.page().ops.push(DrawOp::Text {
            x,
            y,
            font,
            size,
            color,
            text: text.to_string(),
        });
        self.cursor -= leading;
        y
    }

    fn link(&mut self, x: f32, y: f32, width: f32, size: f32, target: LinkTarget) {
        self.page().links.push(Link {
            rect: [x, y - size * 0.25, x + width, y + size],
            target,
        });
    }

    fn title(&mut self, text: &str) {
        for line in wrap_text(text, Font::Bold, TITLE_SIZE, CONTENT_WIDTH) {
            let w = text_width(&line, Font::Bold, TITLE_SIZE);
            let x = MARGIN_X + (CONTENT_WIDTH - w) / 2.0;
            self.line(x, &line, Font::Bold, TITLE_SIZE, DARK_BLUE, TITLE_SIZE * 1.2);
        }
        self.space(12.0);
    }

    fn source_url(&mut self, url: &str) {
        let label = "Source URL: ";
        let label_w = text_width(label, Font::Bold, URL_SIZE);
        let leading = URL_SIZE * 1.2;
        let lines = wrap_text_indented(
            url,
            Font::Regular,
            URL_SIZE,
            CONTENT_WIDTH - label_w,
            CONTENT_WIDTH,
        );

        self.ensure(leading);
        let y = self.cursor - URL_SIZE;
        self.page().ops.push(DrawOp::Text {
            x: MARGIN_X,
            y,
            font: Font::Bold,
            size: URL_SIZE,
            color: BLACK,
            text: label.to_string(),
        });
        for (i, line) in lines.iter().enumerate() {
            let x = if i == 0 { MARGIN_X + label_w } else { MARGIN_X };
            let y = self.line(x, line, Font::Regular, URL_SIZE, BLUE, leading);
            let w = text_width(line, Font::Regular, URL_SIZE);
            self.link(x, y, w, URL_SIZE, LinkTarget::Uri(url.to_string()));
        }
        if lines.is_empty() {
            self.cursor -= leading;
        }
    }

    fn toc_entry(&mut self, level: u8, text: &str, anchor: String) {
        let (size, indent, leading) = toc_style(level);
        let x = MARGIN_X + indent;
        let right = MARGIN_X + CONTENT_WIDTH;
        let number_room = text_width("0000", Font::Regular, size) + 10.0;
        let text = truncate_to_width(text, Font::Regular, size, right - x - number_room);

        let y = self.line(x, &text, Font::Regular, size, BLACK, leading);
        self.page().ops.push(DrawOp::PageRef {
            right,
            y,
            size,
            anchor: anchor.clone(),
        });
        self.link(x, y, right - x, size, LinkTarget::Anchor(anchor));
    }

    fn heading(&mut self, level: u8, text: &str, anchor: Option<String>) {
        let style = heading_style(level);
        let leading = style.size * 1.2;
        // Keep the heading together with the first line that follows it.
        self.ensure(style.space_before + leading + BODY_LEADING);
        if !self.at_top() {
            self.cursor -= style.space_before;
        }

        if let Some(anchor) = anchor {
            let dest = Destination {
                page: self.page_index(),
                top: self.cursor,
            };
            self.layout.destinations.insert(anchor.clone(), dest);
            self.layout.outline.push(OutlineEntry {
                level,
                title: text.to_string(),
                anchor,
            });
        }

        for line in wrap_text(text, Font::Bold, style.size, CONTENT_WIDTH) {
            self.line(MARGIN_X, &line, Font::Bold, style.size, DARK_BLUE, leading);
        }
        self.space(style.space_after);
    }

    fn paragraph(&mut self, text: &str) {
        for line in wrap_text(text, Font::Regular, BODY_SIZE, CONTENT_WIDTH) {
            self.line(MARGIN_X, &line, Font::Regular, BODY_SIZE, BLACK, BODY_LEADING);
        }
    }

    fn reference(&mut self, number: usize, text: &str, url: Option<String>) {
        let body = format!("{number}. {text}");
        let mut lines = wrap_text(&body, Font::Regular, BODY_SIZE, CONTENT_WIDTH);
        if lines.is_empty() {
            lines.push(format!("{number}."));
        }
        let last = lines.len() - 1;
        for (i, line) in lines.iter().enumerate() {
            let y = self.line(MARGIN_X, line, Font::Regular, BODY_SIZE, BLACK, BODY_LEADING);
            if i != last {
                continue;
            }
            let Some(url) = url.as_deref() else { continue };

            let tag = "[Link]";
            let tag_w = text_width(tag, Font::Regular, BODY_SIZE);
            let used = text_width(line, Font::Regular, BODY_SIZE)
                + text_width(" ", Font::Regular, BODY_SIZE);
            let (x, y) = if used + tag_w <= CONTENT_WIDTH {
                (MARGIN_X + used, y)
            } else {
                let y = self.line(MARGIN_X, "", Font::Regular, BODY_SIZE, BLACK, BODY_LEADING);
                (MARGIN_X, y)
            };
            self.page().ops.push(DrawOp::Text {
                x,
                y,
                font: Font::Regular,
                size: BODY_SIZE,
                color: BLUE,
                text: tag.to_string(),
            });
            self.link(x, y, tag_w, BODY_SIZE, LinkTarget::Uri(url.to_string()));
        }
    }

    fn add_image(&mut self, image: PreparedImage) -> usize {
        self.layout.images.push(image);
        self.layout.images.len() - 1
    }

    fn image_row(&mut self, row: ImageRow) {
        let max_h = FRAME_HEIGHT - 2.0 * CELL_PADDING - 4.0 * CAPTION_LEADING;
        match row {
            ImageRow::Single(img) => {
                let (w, h) = fit(img.width as f32, img.height as f32, CONTENT_WIDTH, max_h);
                let cap = wrap_text(&caption(&img.url), Font::Oblique, CAPTION_SIZE, CONTENT_WIDTH);
                let idx = self.add_image(img);

                self.ensure(h + 2.0 * CELL_PADDING);
                let x = MARGIN_X + (CONTENT_WIDTH - w) / 2.0;
                let y = self.cursor - CELL_PADDING - h;
                self.page().ops.push(DrawOp::Image {
                    x,
                    y,
                    width: w,
                    height: h,
                    image: idx,
                });
                self.cursor -= h + 2.0 * CELL_PADDING;

                self.space(6.0);
                self.caption_lines(&[(MARGIN_X, CONTENT_WIDTH, cap)]);
            }
            ImageRow::Pair(a, b) => {
                let left = MARGIN_X + (CONTENT_WIDTH - 2.0 * PAIR_COLUMN_WIDTH) / 2.0;
                let inner = PAIR_COLUMN_WIDTH - 2.0 * CELL_PADDING;
                let sizes = [
                    fit(a.width as f32, a.height as f32, inner, max_h),
                    fit(b.width as f32, b.height as f32, inner, max_h),
                ];
                let captions: Vec<Vec<String>> = [&a, &b]
                    .iter()
                    .map(|img| wrap_text(&caption(&img.url), Font::Oblique, CAPTION_SIZE, inner))
                    .collect();
                let ids = [self.add_image(a), self.add_image(b)];

                let row_h = sizes[0].1.max(sizes[1].1) + 2.0 * CELL_PADDING;
                self.ensure(row_h);
                for (col, ((w, h), idx)) in sizes.iter().zip(ids).enumerate() {
                    let col_x = left + col as f32 * PAIR_COLUMN_WIDTH;
                    let x = col_x + (PAIR_COLUMN_WIDTH - w) / 2.0;
                    let y = self.cursor - (row_h + h) / 2.0;
                    self.page().ops.push(DrawOp::Image {
                        x,
                        y,
                        width: *w,
                        height: *h,
                        image: idx,
                    });
                }
                self.cursor -= row_h;

                self.space(6.0);
                let cells: Vec<(f32, f32, Vec<String>)> = captions
                    .into_iter()
                    .enumerate()
                    .map(|(col, lines)| {
                        (
                            left + col as f32 * PAIR_COLUMN_WIDTH + CELL_PADDING,
                            inner,
                            lines,
                        )
                    })
                    .collect();
                self.caption_lines(&cells);
            }
        }
        self.space(15.0);
    }

    /// Centred caption cells laid side by side: `(x, width, lines)`.
    fn caption_lines(&mut self, cells: &[(f32, f32, Vec<String>)]) {
        let rows = cells.iter().map(|c| c.2.len()).max().unwrap_or(0);
        self.ensure(rows as f32 * CAPTION_LEADING);
        for row in 0..rows {
            let y = self.cursor - CAPTION_SIZE;
            for (x, width, lines) in cells {
                let Some(line) = lines.get(row) else { continue };
                let w = text_width(line, Font::Oblique, CAPTION_SIZE);
                let op = DrawOp::Text {
                    x: x + (width - w) / 2.0,
                    y,
                    font: Font::Oblique,
                    size: CAPTION_SIZE,
                    color: DARK_GREY,
                    text: line.clone(),
                };
                self.page().ops.push(op);
            }
            self.cursor -= CAPTION_LEADING;
        }
    }
}

/// Scale `(w, h)` down to fit the box, keeping the aspect ratio.
fn fit(w: f32, h: f32, max_w: f32, max_h: f32) -> (f32, f32) {
    let scale = (max_w / w).min(max_h / h).min(1.0);
    (w * scale, h * scale)
}
