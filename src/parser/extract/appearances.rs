use scraper::ElementRef;

use super::locate;
use crate::config::{Anchor, BisafansAnchors, BulbapediaAnchors};
use crate::error::Result;
use crate::model::Appearance;
use crate::parser::blocks::{descendants_named, raw_text, text_of, Blocks};
use crate::parser::sections::{owning_heading, sibling_region};
use crate::parser::text::{clean_inline, dedup_ordered};

const ENTRY_SEPARATOR: &str = "; ";

/// Major appearances: sub-headings name the arcs, paragraphs describe them.
pub fn english(blocks: &Blocks, anchors: &BulbapediaAnchors) -> Result<Vec<Appearance>> {
    let anchor = locate(blocks, &anchors.major_appearances, "appearances")?;
    let (titles, paragraphs) = sibling_region(
        owning_heading(anchor),
        &anchors.minor_appearances_title,
        anchors.appearance_title_level,
    );
    Ok(pair_by_position(
        &titles,
        paragraphs.iter().map(|p| clean_inline(p)),
        &anchors.fallback_appearance_title,
    ))
}

/// The i-th paragraph belongs to the i-th title. Paragraphs past the last
/// title are appended to it, or to `fallback` when there are no titles.
pub fn pair_by_position(
    titles: &[String],
    paragraphs: impl IntoIterator<Item = String>,
    fallback: &str,
) -> Vec<Appearance> {
    let mut out: Vec<Appearance> = Vec::new();
    for (i, text) in paragraphs.into_iter().enumerate() {
        if text.is_empty() {
            continue;
        }
        let title = titles
            .get(i)
            .or_else(|| titles.last())
            .map(String::as_str)
            .unwrap_or(fallback);
        match out.iter_mut().find(|a| a.title == title) {
            Some(existing) => {
                existing.summary.push(' ');
                existing.summary.push_str(&text);
            }
            None => out.push(Appearance {
                title: title.to_string(),
                summary: text,
            }),
        }
    }
    out
}

/// Lists following every heading that matches `anchor`.
fn lists_after<'a>(blocks: &Blocks<'a>, anchor: &Anchor) -> Vec<ElementRef<'a>> {
    blocks
        .find_all(anchor)
        .into_iter()
        .filter_map(|i| blocks.following(i))
        .collect()
}

/// Episode lists alternate code and title items; keep the titles without
/// their leading token.
fn episodes(list: ElementRef) -> Vec<String> {
    descendants_named(list, "li")
        .into_iter()
        .skip(1)
        .step_by(2)
        .map(|li| {
            let text = text_of(li);
            match text.split_once(' ') {
                Some((_, rest)) => rest.to_string(),
                None => text,
            }
        })
        .collect()
}

/// First line of each film item.
fn films(list: ElementRef) -> Vec<String> {
    descendants_named(list, "li")
        .into_iter()
        .map(|li| {
            let raw = raw_text(li);
            let first = raw.trim().lines().next().unwrap_or_default();
            clean_inline(first)
        })
        .collect()
}

/// Series episodes and films, one appearance per category.
pub fn german(blocks: &Blocks, anchors: &BisafansAnchors) -> Vec<Appearance> {
    let sources: [(&Anchor, fn(ElementRef) -> Vec<String>); 2] =
        [(&anchors.series, episodes), (&anchors.films, films)];

    sources
        .into_iter()
        .filter_map(|(anchor, read)| {
            let entries = dedup_ordered(lists_after(blocks, anchor).into_iter().flat_map(read));
            if entries.is_empty() {
                return None;
            }
            Some(Appearance {
                title: anchor.text.clone().unwrap_or_default(),
                summary: entries.join(ENTRY_SEPARATOR),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(ts: &[&str]) -> Vec<String> {
        ts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn extra_paragraphs_join_last_title() {
        let out = pair_by_position(
            &titles(&["A", "B"]),
            ["a", "b", "c"].map(String::from),
            "Other",
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].summary, "b c");
    }

    #[test]
    fn untitled_paragraphs_go_to_fallback() {
        let out = pair_by_position(&[], ["x", "y"].map(String::from), "Other");
        assert_eq!(
            out,
            vec![Appearance {
                title: "Other".into(),
                summary: "x y".into()
            }]
        );
    }
}
