//! PDF serialisation of a [`Layout`] with `lopdf`.
//!
//! Object graph:
//!
//! ```text
//! Catalog ─┬─ Pages ── Page* ── Contents, Annots (Link → URI | named dest)
//!          ├─ Outlines ── nested items (one per section heading)
//!          └─ Names/Dests ── anchor → [page /XYZ left top zoom]
//! ```
//!
//! Fonts are the base-14 Helvetica faces with `WinAnsiEncoding`; images are
//! XObjects shared through the page-tree resources.

use crate::error::ScrapeError;
use crate::render::layout::{
    text_width, Destination, DrawOp, Font, Layout, LinkTarget, OutlineEntry, Page, PAGE_HEIGHT,
    PAGE_WIDTH,
};
use crate::render::prepare::ImagePayload;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

const PRODUCER: &str = concat!("wiki2pdf ", env!("CARGO_PKG_VERSION"));

/// Serialise `layout` and write it to `path` (temp file + rename).
pub fn write_pdf(layout: &Layout, title: &str, path: &Path) -> Result<(), ScrapeError> {
    let bytes = encode_pdf(layout, title).map_err(|e| ScrapeError::PdfWriteFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let io_err = |source: std::io::Error| ScrapeError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let tmp_path = path.with_extension("pdf.tmp");
    std::fs::write(&tmp_path, &bytes).map_err(io_err)?;
    std::fs::rename(&tmp_path, path).map_err(io_err)?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Build the complete PDF file in memory.
pub fn encode_pdf(layout: &Layout, title: &str) -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_ids: Vec<ObjectId> = layout.pages.iter().map(|_| doc.new_object_id()).collect();

    // Resources shared by every page.
    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        let id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), id);
    }
    let mut xobjects = Dictionary::new();
    for (i, image) in layout.images.iter().enumerate() {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width),
            "Height" => i64::from(image.height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        };
        let stream = match &image.payload {
            ImagePayload::Jpeg(data) => {
                dict.set("Filter", "DCTDecode");
                let mut stream = Stream::new(dict, data.clone());
                stream.allows_compression = false;
                stream
            }
            ImagePayload::Rgb(data) => Stream::new(dict, data.clone()),
        };
        xobjects.set(image_name(i), doc.add_object(stream));
    }

    for (page, &page_id) in layout.pages.iter().zip(&page_ids) {
        let content = Content {
            operations: page_operations(page, layout),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let annots: Vec<Object> = page
            .links
            .iter()
            .map(|link| {
                let rect: Vec<Object> = link.rect.iter().map(|v| Object::Real(*v)).collect();
                let mut annot = dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Link",
                    "Rect" => rect,
                    "Border" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
                };
                match &link.target {
                    LinkTarget::Uri(uri) => annot.set(
                        "A",
                        dictionary! {
                            "S" => "URI",
                            "URI" => Object::string_literal(uri.as_bytes().to_vec()),
                        },
                    ),
                    LinkTarget::Anchor(anchor) => {
                        annot.set("Dest", Object::string_literal(anchor.as_bytes().to_vec()))
                    }
                }
                Object::Reference(doc.add_object(annot))
            })
            .collect();

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        if !annots.is_empty() {
            page_dict.set("Annots", annots);
        }
        doc.objects.insert(page_id, Object::Dictionary(page_dict));
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(PAGE_WIDTH),
                Object::Real(PAGE_HEIGHT),
            ],
            "Resources" => dictionary! {
                "Font" => fonts,
                "XObject" => xobjects,
            },
        }),
    );

    let dest_array = |d: &Destination| -> Object {
        vec![
            Object::Reference(page_ids[d.page]),
            "XYZ".into(),
            Object::Null,
            Object::Real(d.top),
            Object::Null,
        ]
        .into()
    };

    // Name trees must be sorted by key; BTreeMap iteration already is.
    let mut names = Vec::with_capacity(layout.destinations.len() * 2);
    for (anchor, dest) in &layout.destinations {
        names.push(Object::string_literal(anchor.as_bytes().to_vec()));
        names.push(dest_array(dest));
    }

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "Names" => dictionary! {
            "Dests" => dictionary! { "Names" => names },
        },
    };
    let explicit: BTreeMap<&str, Object> = layout
        .destinations
        .iter()
        .map(|(k, d)| (k.as_str(), dest_array(d)))
        .collect();
    if let Some(outlines_id) = write_outline(&mut doc, &layout.outline, &explicit) {
        catalog.set("Outlines", outlines_id);
        catalog.set("PageMode", "UseOutlines");
    }
    let catalog_id = doc.add_object(catalog);

    let info_id = doc.add_object(dictionary! {
        "Title" => text_string(title),
        "Producer" => text_string(PRODUCER),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf)?;
    Ok(buf)
}

fn image_name(index: usize) -> String {
    format!("Im{index}")
}

fn page_operations(page: &Page, layout: &Layout) -> Vec<Operation> {
    let mut ops = Vec::new();
    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                font,
                size,
                color,
                text,
            } => push_text(&mut ops, *x, *y, *font, *size, [color.0, color.1, color.2], text),
            DrawOp::PageRef {
                right,
                y,
                size,
                anchor,
            } => {
                let number = layout
                    .page_number(anchor)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "?".to_string());
                let x = right - text_width(&number, Font::Regular, *size);
                push_text(&mut ops, x, *y, Font::Regular, *size, [0.0; 3], &number);
            }
            DrawOp::Image {
                x,
                y,
                width,
                height,
                image,
            } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![
                        (*width).into(),
                        0.0_f32.into(),
                        0.0_f32.into(),
                        (*height).into(),
                        (*x).into(),
                        (*y).into(),
                    ],
                ));
                ops.push(Operation::new(
                    "Do",
                    vec![Object::Name(image_name(*image).into_bytes())],
                ));
                ops.push(Operation::new("Q", vec![]));
            }
        }
    }
    ops
}

fn push_text(
    ops: &mut Vec<Operation>,
    x: f32,
    y: f32,
    font: Font,
    size: f32,
    rgb: [f32; 3],
    text: &str,
) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![font.resource_name().into(), size.into()],
    ));
    ops.push(Operation::new(
        "rg",
        rgb.iter().map(|c| Object::Real(*c)).collect(),
    ));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(win_ansi(text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

/// Encode `text` for a `WinAnsiEncoding` font. Latin-1 passes through,
/// common typographic punctuation is mapped, everything else becomes `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}' => c as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

/// A PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(s: &str) -> Object {
    if s.is_ascii() {
        return Object::string_literal(s.as_bytes().to_vec());
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

struct OutlineNode<'a> {
    entry: &'a OutlineEntry,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Nest entries by level: each entry becomes a child of the closest earlier
/// entry with a lower level.
fn nest(entries: &[OutlineEntry]) -> (Vec<OutlineNode<'_>>, Vec<usize>) {
    let mut nodes: Vec<OutlineNode> = Vec::with_capacity(entries.len());
    let mut roots = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for entry in entries {
        while stack
            .last()
            .is_some_and(|&top| nodes[top].entry.level >= entry.level)
        {
            stack.pop();
        }
        let idx = nodes.len();
        let parent = stack.last().copied();
        nodes.push(OutlineNode {
            entry,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => nodes[p].children.push(idx),
            None => roots.push(idx),
        }
        stack.push(idx);
    }
    (nodes, roots)
}

fn descendants(nodes: &[OutlineNode], idx: usize) -> usize {
    nodes[idx]
        .children
        .iter()
        .map(|&c| 1 + descendants(nodes, c))
        .sum()
}

/// Write the outline tree; `None` when there are no entries.
fn write_outline(
    doc: &mut lopdf::Document,
    entries: &[OutlineEntry],
    dests: &BTreeMap<&str, Object>,
) -> Option<ObjectId> {
    if entries.is_empty() {
        return None;
    }
    let (nodes, roots) = nest(entries);
    let outlines_id = doc.new_object_id();
    let ids: Vec<ObjectId> = nodes.iter().map(|_| doc.new_object_id()).collect();

    let link_siblings = |dict: &mut Dictionary, siblings: &[usize], pos: usize| {
        if pos > 0 {
            dict.set("Prev", ids[siblings[pos - 1]]);
        }
        if let Some(&next) = siblings.get(pos + 1) {
            dict.set("Next", ids[next]);
        }
    };

    for (idx, node) in nodes.iter().enumerate() {
        let mut dict = dictionary! {
            "Title" => text_string(&node.entry.title),
            "Parent" => node.parent.map_or(outlines_id, |p| ids[p]),
        };
        let siblings = match node.parent {
            Some(p) => &nodes[p].children,
            None => &roots,
        };
        if let Some(pos) = siblings.iter().position(|&s| s == idx) {
            link_siblings(&mut dict, siblings, pos);
        }
        if let (Some(&first), Some(&last)) = (node.children.first(), node.children.last()) {
            dict.set("First", ids[first]);
            dict.set("Last", ids[last]);
            dict.set("Count", descendants(&nodes, idx) as i64);
        }
        if let Some(dest) = dests.get(node.entry.anchor.as_str()) {
            dict.set("Dest", dest.clone());
        }
        doc.objects.insert(ids[idx], Object::Dictionary(dict));
    }

    let (first, last) = (roots[0], roots[roots.len() - 1]);
    doc.objects.insert(
        outlines_id,
        Object::Dictionary(dictionary! {
            "Type" => "Outlines",
            "First" => ids[first],
            "Last" => ids[last],
            "Count" => nodes.len() as i64,
        }),
    );
    Some(outlines_id)
}
