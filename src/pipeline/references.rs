//! Reference resolution with two strategies.
//!
//! The reference list (`div.reflist`) is authoritative when present. Some
//! pages render citations without one; for those the inline citation markers
//! are followed back to their notes. The strategies are never blended: the
//! fallback only runs when the list produced nothing.

use crate::model::Reference;
use crate::pipeline::markup::MarkupNode;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which strategy produced a document's references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSource {
    /// Items of the page's reference list.
    ReferenceList,
    /// Notes reached through inline citation markers.
    Citations,
    /// Neither strategy found anything.
    None,
}

/// Resolve references, preferring the reference list.
///
/// * `page_root` — the whole page; reference lists and notes may sit outside
///   the content area.
/// * `content_area` — where inline citation markers are looked up.
pub fn resolve_references<N: MarkupNode>(
    page_root: &N,
    content_area: &N,
    max_citations: usize,
) -> (Vec<Reference>, ReferenceSource) {
    let listed = from_reference_list(page_root);
    if !listed.is_empty() {
        debug!("{} references from reference list", listed.len());
        return (listed, ReferenceSource::ReferenceList);
    }

    let cited = from_citations(page_root, content_area, max_citations);
    if cited.is_empty() {
        (cited, ReferenceSource::None)
    } else {
        debug!("{} references from inline citations", cited.len());
        (cited, ReferenceSource::Citations)
    }
}

/// Every item of the first reference list on the page.
pub fn from_reference_list<N: MarkupNode>(page_root: &N) -> Vec<Reference> {
    let Some(list) = page_root.find_first("div", Some("reflist")) else {
        return Vec::new();
    };
    list.find_all("li", None).iter().map(reference_from).collect()
}

/// Notes reached from the first `max_citations` inline citation markers.
///
/// A marker's first link points at `#<note id>`; markers without a link, or
/// whose note cannot be found, contribute nothing.
pub fn from_citations<N: MarkupNode>(
    page_root: &N,
    content_area: &N,
    max_citations: usize,
) -> Vec<Reference> {
    content_area
        .find_all("sup", Some("reference"))
        .iter()
        .take(max_citations)
        .filter_map(|citation| {
            let anchor = citation.find_first("a", None)?;
            let note_id = anchor.attribute("href").unwrap_or("").replace('#', "");
            if note_id.is_empty() {
                return None;
            }
            page_root.find_by_id("li", &note_id)
        })
        .map(|note| reference_from(&note))
        .collect()
}

fn reference_from<N: MarkupNode>(item: &N) -> Reference {
    let url = item
        .find_all("a", Some("external"))
        .into_iter()
        .find_map(|a| a.attribute("href").map(str::to_string));
    Reference {
        text: item.text_content(),
        url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::markup::parse_page;

    fn notes(n: usize) -> String {
        (1..=n)
            .map(|i| {
                format!(
                    r##"<li id="cite_note-{i}">Source {i}. <a class="external text" href="https://ex.org/{i}">link</a></li>"##
                )
            })
            .collect()
    }

    fn markers(n: usize) -> String {
        (1..=n)
            .map(|i| {
                format!(
                    r##"<p>Claim {i}.<sup class="reference"><a href="#cite_note-{i}">[{i}]</a></sup></p>"##
                )
            })
            .collect()
    }

    #[test]
    fn reference_list_wins() {
        let html = parse_page(&format!(
            r#"<div id="content">{}</div><div class="reflist"><ol>{}</ol></div>"#,
            markers(3),
            notes(2)
        ));
        let root = html.root_element();
        let content = root.find_by_id("div", "content").unwrap();

        let (refs, source) = resolve_references(&root, &content, 30);
        assert_eq!(source, ReferenceSource::ReferenceList);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].text, "Source 1. link");
        assert_eq!(refs[0].url.as_deref(), Some("https://ex.org/1"));
    }

    #[test]
    fn falls_back_to_citations_without_list() {
        let html = parse_page(&format!(
            r#"<div id="content">{}</div><ol class="references">{}</ol>"#,
            markers(5),
            notes(5)
        ));
        let root = html.root_element();
        let content = root.find_by_id("div", "content").unwrap();

        assert!(from_reference_list(&root).is_empty());
        let (refs, source) = resolve_references(&root, &content, 30);
        assert_eq!(source, ReferenceSource::Citations);
        assert_eq!(refs.len(), 5);
        assert_eq!(refs[4].text, "Source 5. link");
        assert_eq!(refs[4].url.as_deref(), Some("https://ex.org/5"));
    }

    #[test]
    fn citation_limit_applies() {
        let html = parse_page(&format!(
            r#"<div id="content">{}</div><ol>{}</ol>"#,
            markers(40),
            notes(40)
        ));
        let root = html.root_element();
        let content = root.find_by_id("div", "content").unwrap();
        assert_eq!(from_citations(&root, &content, 30).len(), 30);
    }

    #[test]
    fn unresolvable_citations_are_skipped() {
        let html = parse_page(
            r##"<div id="content">
                <sup class="reference"></sup>
                <sup class="reference"><a href="#missing">[1]</a></sup>
                <sup class="reference"><a>[2]</a></sup>
                <sup class="reference"><a href="#cite_note-1">[3]</a></sup>
            </div>
            <ol><li id="cite_note-1">Only one. No link here.</li></ol>"##,
        );
        let root = html.root_element();
        let content = root.find_by_id("div", "content").unwrap();

        let refs = from_citations(&root, &content, 30);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].url, None);
    }

    #[test]
    fn nothing_found() {
        let html = parse_page("<div id=\"content\"><p>No citations.</p></div>");
        let root = html.root_element();
        let content = root.find_by_id("div", "content").unwrap();
        let (refs, source) = resolve_references(&root, &content, 30);
        assert!(refs.is_empty());
        assert_eq!(source, ReferenceSource::None);
    }
}
