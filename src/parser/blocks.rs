//! Typed walk over a parsed page: every element in source order, tagged with
//! the kind extractors care about. Anchors resolve to positions in this list
//! so "everything after X until Y" is an index range, not a tree traversal.

use scraper::{ElementRef, Html};

use super::text::clean_inline;
use crate::config::Anchor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    Table,
    List,
    ListItem,
    Other,
}

impl BlockKind {
    pub fn classify(tag: &str) -> BlockKind {
        match tag {
            "p" => BlockKind::Paragraph,
            "table" => BlockKind::Table,
            "ul" | "ol" | "dl" => BlockKind::List,
            "li" | "dt" | "dd" => BlockKind::ListItem,
            _ => match heading_level(tag) {
                Some(level) => BlockKind::Heading(level),
                None => BlockKind::Other,
            },
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, BlockKind::Heading(_))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
    pub kind: BlockKind,
    pub el: ElementRef<'a>,
}

/// An owned, parsed source page.
pub struct Page {
    html: Html,
}

impl Page {
    pub fn parse(source: &str) -> Self {
        Page {
            html: Html::parse_document(source),
        }
    }

    pub fn blocks(&self) -> Blocks<'_> {
        Blocks::classify(self.html.root_element())
    }
}

pub struct Blocks<'a> {
    items: Vec<Block<'a>>,
}

impl<'a> Blocks<'a> {
    pub fn classify(root: ElementRef<'a>) -> Self {
        let items = root
            .descendants()
            .filter_map(ElementRef::wrap)
            .map(|el| Block {
                kind: BlockKind::classify(el.value().name()),
                el,
            })
            .collect();
        Blocks { items }
    }

    pub fn get(&self, idx: usize) -> Option<&Block<'a>> {
        self.items.get(idx)
    }

    /// Blocks in `[start, end)`.
    pub fn range(&self, start: usize, end: usize) -> &[Block<'a>] {
        let end = end.min(self.items.len());
        &self.items[start.min(end)..end]
    }

    pub fn find(&self, anchor: &Anchor) -> Option<usize> {
        self.find_from(anchor, 0)
    }

    pub fn find_from(&self, anchor: &Anchor, from: usize) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, b)| anchor.matches(&b.el))
            .map(|(i, _)| i)
    }

    pub fn find_all(&self, anchor: &Anchor) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, b)| anchor.matches(&b.el))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn find_el(&self, anchor: &Anchor) -> Option<ElementRef<'a>> {
        self.find(anchor).map(|i| self.items[i].el)
    }

    pub fn position(&self, el: ElementRef<'a>) -> Option<usize> {
        self.items.iter().position(|b| same_node(b.el, el))
    }

    /// First element named `tag` strictly after `from` in source order.
    /// Descendants of the element at `from` count as "after".
    pub fn next_named(&self, from: usize, tag: &str) -> Option<ElementRef<'a>> {
        self.items
            .iter()
            .skip(from + 1)
            .find(|b| b.el.value().name() == tag)
            .map(|b| b.el)
    }

    /// Like [`next_named`](Self::next_named), starting from an element.
    pub fn next_named_after(&self, el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
        self.position(el).and_then(|i| self.next_named(i, tag))
    }

    /// First element after `from` that is not nested inside it.
    pub fn following(&self, from: usize) -> Option<ElementRef<'a>> {
        let origin = self.items.get(from)?.el;
        self.items
            .iter()
            .skip(from + 1)
            .find(|b| !is_descendant_of(b.el, origin))
            .map(|b| b.el)
    }
}

pub fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

pub fn same_node(a: ElementRef, b: ElementRef) -> bool {
    (*a).id() == (*b).id()
}

pub fn is_descendant_of(el: ElementRef, ancestor: ElementRef) -> bool {
    el.ancestors().any(|a| a.id() == (*ancestor).id())
}

/// Raw concatenated text of an element and its descendants.
pub fn raw_text(el: ElementRef) -> String {
    el.text().collect()
}

/// Text with invisibles removed and whitespace collapsed.
pub fn text_of(el: ElementRef) -> String {
    clean_inline(&raw_text(el))
}

/// Heading text without the wiki's "[edit]" link.
pub fn heading_text(el: ElementRef) -> String {
    let text = text_of(el);
    match text.strip_suffix("[edit]") {
        Some(rest) => rest.trim().to_string(),
        None => text,
    }
}

pub fn parent(el: ElementRef) -> Option<ElementRef> {
    el.parent().and_then(ElementRef::wrap)
}

pub fn next_sibling_named<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == tag)
}

pub fn next_sibling_element(el: ElementRef) -> Option<ElementRef> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// Descendants named `tag`, excluding `el` itself, in source order.
pub fn descendants_named<'a>(el: ElementRef<'a>, tag: &str) -> Vec<ElementRef<'a>> {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == tag)
        .collect()
}

pub fn first_named<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == tag)
}

pub fn has_class(el: ElementRef, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<html><body>
        <h2 id="top">Top <span>[edit]</span></h2>
        <p>one</p>
        <div id="box"><p>two</p><table><tr><td>cell</td></tr></table></div>
        <ul><li>item</li></ul>
        <h3>Next</h3>
    </body></html>"#;

    #[test]
    fn classifies_in_source_order() {
        let page = Page::parse(DOC);
        let blocks = page.blocks();
        let kinds: Vec<BlockKind> = (0..)
            .map_while(|i| blocks.get(i))
            .map(|b| b.kind)
            .filter(|k| *k != BlockKind::Other)
            .collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Heading(2),
                BlockKind::Paragraph,
                BlockKind::Paragraph,
                BlockKind::Table,
                BlockKind::List,
                BlockKind::ListItem,
                BlockKind::Heading(3),
            ]
        );
    }

    #[test]
    fn next_named_includes_descendants() {
        let page = Page::parse(DOC);
        let blocks = page.blocks();
        let div = blocks.find(&Anchor::tag_id("div", "box")).unwrap();
        let p = blocks.next_named(div, "p").unwrap();
        assert_eq!(text_of(p), "two");
        let table = blocks.next_named(div, "table").unwrap();
        assert_eq!(text_of(table), "cell");
    }

    #[test]
    fn following_skips_nested() {
        let page = Page::parse(DOC);
        let blocks = page.blocks();
        let div = blocks.find(&Anchor::tag_id("div", "box")).unwrap();
        let next = blocks.following(div).unwrap();
        assert_eq!(next.value().name(), "ul");
    }

    #[test]
    fn heading_text_drops_edit_link() {
        let page = Page::parse(DOC);
        let blocks = page.blocks();
        let h2 = blocks.find_el(&Anchor::tag_id("h2", "top")).unwrap();
        assert_eq!(heading_text(h2), "Top");
    }
}
