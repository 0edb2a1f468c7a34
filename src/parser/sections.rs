use scraper::ElementRef;

use super::blocks::{heading_level, heading_text, parent, raw_text, Block, BlockKind, Blocks};
use super::text::{join_paragraphs, paragraph_list};
use crate::config::Anchor;
use crate::error::{ExtractError, Result};

/// Raw text of every paragraph between two anchors, start inclusive, end
/// exclusive. The end anchor must occur after the start anchor.
pub fn paragraphs_between(
    blocks: &Blocks,
    start: &Anchor,
    end: &[&Anchor],
    field: &'static str,
) -> Result<Vec<String>> {
    let from = blocks
        .find(start)
        .ok_or_else(|| ExtractError::anchor(field, start))?;
    let to = end
        .iter()
        .find_map(|a| blocks.find_from(a, from + 1))
        .ok_or_else(|| ExtractError::anchor(field, describe_any(end)))?;

    Ok(blocks
        .range(from, to)
        .iter()
        .filter(|b| b.kind == BlockKind::Paragraph)
        .map(|b| raw_text(b.el))
        .collect())
}

/// Paragraph range as one cleaned block of text.
pub fn narrative(blocks: &Blocks, start: &Anchor, end: &Anchor, field: &'static str) -> Result<String> {
    paragraphs_between(blocks, start, &[end], field).map(|ps| join_paragraphs(&ps))
}

/// Paragraph range as a list of cleaned, non-empty paragraphs.
pub fn narrative_list(
    blocks: &Blocks,
    start: &Anchor,
    end: &[&Anchor],
    field: &'static str,
) -> Result<Vec<String>> {
    paragraphs_between(blocks, start, end, field).map(|ps| paragraph_list(&ps))
}

/// Blocks after `from` until the first one matching `stop` (exclusive).
pub fn until<'b, 'a>(
    blocks: &'b Blocks<'a>,
    from: usize,
    stop: impl Fn(&Block<'a>) -> bool,
) -> Vec<&'b Block<'a>> {
    let mut out = Vec::new();
    let mut i = from + 1;
    while let Some(block) = blocks.get(i) {
        if stop(block) {
            break;
        }
        out.push(block);
        i += 1;
    }
    out
}

/// Walk the siblings following `heading`, collecting titles of headings at
/// `title_level` and paragraph texts, until a heading of a higher level (or
/// `stop_title`). Deeper headings at other levels are passed over.
///
/// Titles and paragraphs are collected independently and returned in the
/// order seen; pairing them is left to the caller.
pub fn sibling_region(
    heading: ElementRef,
    stop_title: &str,
    title_level: u8,
) -> (Vec<String>, Vec<String>) {
    let own_level = heading_level(heading.value().name())
        .or_else(|| wrapped_heading_level(heading))
        .unwrap_or(2);
    let mut titles = Vec::new();
    let mut paragraphs = Vec::new();

    for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
        let name = sibling.value().name();
        if let Some(level) = heading_level(name).or_else(|| wrapped_heading_level(sibling)) {
            let text = heading_text(sibling);
            if level <= 2 || level < own_level || text == stop_title {
                break;
            }
            if level == title_level {
                titles.push(text);
            }
            continue;
        }
        if name == "p" {
            let text = raw_text(sibling).trim().to_string();
            if !text.is_empty() {
                paragraphs.push(text);
            }
        }
    }

    (titles, paragraphs)
}

/// Newer wiki skins wrap headings as `<div class="mw-heading"><hN>…</hN></div>`.
fn wrapped_heading_level(el: ElementRef) -> Option<u8> {
    if el.value().name() != "div" || !el.value().classes().any(|c| c.starts_with("mw-heading")) {
        return None;
    }
    el.children()
        .filter_map(ElementRef::wrap)
        .find_map(|c| heading_level(c.value().name()))
}

/// The heading that owns an anchor: the anchor itself or its nearest heading
/// ancestor, widened to the wrapper div when the skin wraps headings.
pub fn owning_heading(el: ElementRef) -> ElementRef {
    let heading = std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .find(|e| heading_level(e.value().name()).is_some());
    match heading {
        Some(h) => parent(h)
            .filter(|p| wrapped_heading_level(*p).is_some())
            .unwrap_or(h),
        None => el,
    }
}

fn describe_any(anchors: &[&Anchor]) -> String {
    anchors
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::blocks::{text_of, Page};

    const DOC: &str = r##"<html><body>
        <p>before</p>
        <a title="start">s</a>
        <p>First [1] paragraph.</p>
        <div><p>  Nested
           paragraph.</p></div>
        <p> </p>
        <a href="#end">e</a>
        <p>after</p>
    </body></html>"##;

    #[test]
    fn narrative_between_anchors() {
        let page = Page::parse(DOC);
        let blocks = page.blocks();
        let text = narrative(
            &blocks,
            &Anchor::link_title("start"),
            &Anchor::link_href("#end"),
            "introduction",
        )
        .unwrap();
        assert_eq!(text, "First paragraph. Nested paragraph.");
    }

    #[test]
    fn list_mode_drops_empty_paragraphs() {
        let page = Page::parse(DOC);
        let blocks = page.blocks();
        let list = narrative_list(
            &blocks,
            &Anchor::link_title("start"),
            &[&Anchor::link_href("#end")],
            "biology",
        )
        .unwrap();
        assert_eq!(list, vec!["First paragraph.", "Nested paragraph."]);
    }

    #[test]
    fn missing_anchor_is_reported() {
        let page = Page::parse(DOC);
        let blocks = page.blocks();
        let err = narrative(
            &blocks,
            &Anchor::link_title("start"),
            &Anchor::link_href("#nowhere"),
            "introduction",
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::AnchorNotFound { field: "introduction", .. }));
    }

    #[test]
    fn narrative_is_idempotent_under_renormalization() {
        let page = Page::parse(DOC);
        let blocks = page.blocks();
        let once = narrative(
            &blocks,
            &Anchor::link_title("start"),
            &Anchor::link_href("#end"),
            "introduction",
        )
        .unwrap();
        let twice = crate::parser::text::clean_narrative(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn sibling_region_stops_at_minor() {
        let doc = r#"<html><body>
            <h3><span id="Major">Major appearances</span></h3>
            <h5>Arc one</h5><p>Body one.</p>
            <h5>Arc two</h5><p>Body two.</p><p>More two.</p>
            <h4>Minor appearances</h4><p>Ignored.</p>
            <h2>Elsewhere</h2><p>Ignored too.</p>
        </body></html>"#;
        let page = Page::parse(doc);
        let blocks = page.blocks();
        let span = blocks.find_el(&Anchor::id("Major")).unwrap();
        let heading = owning_heading(span);
        assert_eq!(text_of(heading), "Major appearances");
        let (titles, paragraphs) = sibling_region(heading, "Minor appearances", 5);
        assert_eq!(titles, vec!["Arc one", "Arc two"]);
        assert_eq!(paragraphs, vec!["Body one.", "Body two.", "More two."]);
    }

    #[test]
    fn sibling_region_titles_only_at_title_level() {
        let doc = r#"<html><body>
            <h3><span id="Major">Major appearances</span></h3>
            <h4>Gallery</h4>
            <h5>Arc one</h5><p>Body one.</p>
            <h6>Side note</h6>
            <h5>Arc two</h5><p>Body two.</p>
            <h3>Minor appearances</h3><p>Ignored.</p>
        </body></html>"#;
        let page = Page::parse(doc);
        let blocks = page.blocks();
        let span = blocks.find_el(&Anchor::id("Major")).unwrap();
        let (titles, paragraphs) = sibling_region(owning_heading(span), "Minor appearances", 5);
        assert_eq!(titles, vec!["Arc one", "Arc two"]);
        assert_eq!(paragraphs, vec!["Body one.", "Body two."]);
    }

    #[test]
    fn until_stops_at_predicate() {
        let doc = "<html><body><h2 id='b'>B</h2><p>x</p><p>y</p><h3>C</h3><p>z</p></body></html>";
        let page = Page::parse(doc);
        let blocks = page.blocks();
        let start = blocks.find(&Anchor::id("b")).unwrap();
        let region = until(&blocks, start, |b| b.kind.is_heading());
        let ps: Vec<String> = region
            .iter()
            .filter(|b| b.kind == BlockKind::Paragraph)
            .map(|b| text_of(b.el))
            .collect();
        assert_eq!(ps, vec!["x", "y"]);
    }
}
