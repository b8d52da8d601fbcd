//! Read-only view over the parsed article tree.
//!
//! The extractors only need a handful of tree capabilities: element children,
//! following siblings, descendants, attribute lookup, text, and tag/class
//! filtering. [`MarkupNode`] names exactly that set so the extraction logic
//! does not depend on `scraper` directly; [`ElementRef`] is the one
//! production implementation.

use scraper::{ElementRef, Html};

/// A read-only element in a markup tree.
///
/// Only element nodes are ever returned; text and comment nodes are folded
/// into [`MarkupNode::text_content`].
pub trait MarkupNode: Sized + Clone {
    /// Lower-case tag name, e.g. `"p"` or `"h2"`.
    fn tag_name(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&str>;

    fn has_class(&self, class: &str) -> bool;

    /// Concatenated text of every descendant text node.
    fn text_content(&self) -> String;

    /// Direct element children in document order.
    fn element_children(&self) -> Vec<Self>;

    /// Element siblings after this one, in document order.
    fn following_siblings(&self) -> Vec<Self>;

    /// Every element below this one (excluding itself), in document order.
    fn element_descendants(&self) -> Vec<Self>;

    fn is_one_of(&self, tags: &[&str]) -> bool {
        tags.contains(&self.tag_name())
    }

    fn matches(&self, tag: &str, class: Option<&str>) -> bool {
        self.tag_name() == tag && class.map_or(true, |c| self.has_class(c))
    }

    /// Descendants with the given tag (and class, if given).
    fn find_all(&self, tag: &str, class: Option<&str>) -> Vec<Self> {
        self.element_descendants()
            .into_iter()
            .filter(|n| n.matches(tag, class))
            .collect()
    }

    /// First descendant with the given tag (and class, if given).
    fn find_first(&self, tag: &str, class: Option<&str>) -> Option<Self> {
        self.element_descendants()
            .into_iter()
            .find(|n| n.matches(tag, class))
    }

    /// First descendant whose tag is any of `tags`.
    fn find_first_of(&self, tags: &[&str]) -> Option<Self> {
        self.element_descendants()
            .into_iter()
            .find(|n| n.is_one_of(tags))
    }

    /// First descendant with the given tag and `id` attribute.
    fn find_by_id(&self, tag: &str, id: &str) -> Option<Self> {
        self.element_descendants()
            .into_iter()
            .find(|n| n.tag_name() == tag && n.attribute("id") == Some(id))
    }
}

impl<'a> MarkupNode for ElementRef<'a> {
    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn has_class(&self, class: &str) -> bool {
        self.value().classes().any(|c| c == class)
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }

    fn element_children(&self) -> Vec<Self> {
        self.children().filter_map(ElementRef::wrap).collect()
    }

    fn following_siblings(&self) -> Vec<Self> {
        self.next_siblings().filter_map(ElementRef::wrap).collect()
    }

    fn element_descendants(&self) -> Vec<Self> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .collect()
    }
}

/// Parse a full HTML page.
pub fn parse_page(html: &str) -> Html {
    Html::parse_document(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div id="main" class="a b">
            <p>One <b>bold</b></p>
            text node
            <ul><li id="x">Item</li></ul>
            <p class="b">Two</p>
        </div>
    </body></html>"#;

    #[test]
    fn children_skip_text_nodes() {
        let html = parse_page(PAGE);
        let root = html.root_element();
        let main = root.find_by_id("div", "main").expect("main div");
        let tags: Vec<String> = main
            .element_children()
            .iter()
            .map(|n| n.tag_name().to_string())
            .collect();
        assert_eq!(tags, vec!["p", "ul", "p"]);
    }

    #[test]
    fn text_content_flattens_inline_markup() {
        let html = parse_page(PAGE);
        let p = html.root_element().find_first("p", None).unwrap();
        assert_eq!(p.text_content(), "One bold");
    }

    #[test]
    fn class_filtering() {
        let html = parse_page(PAGE);
        let root = html.root_element();
        assert!(root.find_first("div", Some("b")).is_some());
        assert!(root.find_first("div", Some("c")).is_none());
        assert_eq!(root.find_all("p", Some("b")).len(), 1);
        assert_eq!(root.find_all("p", None).len(), 2);
    }

    #[test]
    fn following_siblings_in_order() {
        let html = parse_page(PAGE);
        let first = html.root_element().find_first("p", None).unwrap();
        let tags: Vec<String> = first
            .following_siblings()
            .iter()
            .map(|n| n.tag_name().to_string())
            .collect();
        assert_eq!(tags, vec!["ul", "p"]);
    }

    #[test]
    fn descendants_exclude_self() {
        let html = parse_page(PAGE);
        let li = html.root_element().find_by_id("li", "x").unwrap();
        assert!(li.element_descendants().is_empty());
        assert_eq!(li.attribute("id"), Some("x"));
    }
}
