use super::{cells, locate, table_after};
use crate::config::{BisafansAnchors, BulbapediaAnchors};
use crate::error::Result;
use crate::parser::blocks::{descendants_named, first_named, has_class, parent, text_of, Blocks};
use crate::parser::text::dedup_ordered;

/// A chain is never empty: a creature with no relatives is its own chain.
fn self_inclusive(chain: Vec<String>, subject: &str) -> Vec<String> {
    if chain.is_empty() {
        vec![subject.to_string()]
    } else {
        chain
    }
}

/// Names from evolution-table cells holding at least two links. The first
/// link of such a cell carries the name.
pub fn english(blocks: &Blocks, anchors: &BulbapediaAnchors, subject: &str) -> Vec<String> {
    let Some(table) = blocks
        .find_el(&anchors.evolution)
        .and_then(|heading| table_after(blocks, heading))
    else {
        return self_inclusive(Vec::new(), subject);
    };

    let names = descendants_named(table, "tr")
        .into_iter()
        .skip(1)
        .flat_map(cells)
        .filter_map(|cell| {
            let links = descendants_named(cell, "a");
            (links.len() >= 2).then(|| text_of(links[0]))
        });
    self_inclusive(dedup_ordered(names), subject)
}

/// Entries of the evolution row, regional and mega variants excluded.
pub fn german(blocks: &Blocks, anchors: &BisafansAnchors, subject: &str) -> Vec<String> {
    let Some(row) = blocks.find_el(&anchors.evolution_row) else {
        return self_inclusive(Vec::new(), subject);
    };
    let names = descendants_named(row, "div")
        .into_iter()
        .filter(|div| has_class(*div, &anchors.evolution_entry_class))
        .map(text_of)
        .filter(|name| {
            !anchors
                .evolution_variant_prefixes
                .iter()
                .any(|prefix| name.contains(prefix.as_str()))
        });
    self_inclusive(dedup_ordered(names), subject)
}

fn without_subject(names: impl IntoIterator<Item = String>, subject: &str) -> Vec<String> {
    dedup_ordered(names.into_iter().filter(|n| n != subject))
}

/// Captions of the first table after the category label.
pub fn english_forms(blocks: &Blocks, anchors: &BulbapediaAnchors, subject: &str) -> Result<Vec<String>> {
    let label = locate(blocks, &anchors.category, "forms")?;
    let from = parent(label).unwrap_or(label);
    let Some(table) = blocks.next_named_after(from, "table") else {
        return Ok(Vec::new());
    };
    Ok(without_subject(
        descendants_named(table, "small").into_iter().map(text_of),
        subject,
    ))
}

/// Special-forms block: a gallery, a tab list, or a single form heading.
pub fn german_forms(blocks: &Blocks, anchors: &BisafansAnchors, subject: &str) -> Vec<String> {
    let Some(block) = blocks.find_el(&anchors.forms) else {
        return Vec::new();
    };

    let names: Vec<String> = match first_named(block, "h2") {
        None => descendants_named(block, "div")
            .into_iter()
            .find(|div| anchors.forms_gallery.matches(div))
            .map(|gallery| descendants_named(gallery, "a").into_iter().map(text_of).collect())
            .unwrap_or_default(),
        Some(heading) => {
            let tabs = descendants_named(block, "ul")
                .into_iter()
                .find(|ul| has_class(*ul, &anchors.forms_tabs_class));
            match tabs {
                Some(ul) => descendants_named(ul, "li").into_iter().map(text_of).collect(),
                None => vec![text_of(heading)],
            }
        }
    };
    without_subject(names, subject)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::blocks::Page;

    #[test]
    fn missing_section_is_self() {
        let page = Page::parse("<html><body><p>Nothing here.</p></body></html>");
        let blocks = page.blocks();
        assert_eq!(english(&blocks, &BulbapediaAnchors::default(), "Tauros"), vec!["Tauros"]);
        assert_eq!(german(&blocks, &BisafansAnchors::default(), "Tauros"), vec!["Tauros"]);
        assert!(german_forms(&blocks, &BisafansAnchors::default(), "Tauros").is_empty());
    }

    #[test]
    fn chain_has_no_duplicates_or_blanks() {
        let doc = r#"<html><body>
            <h3><span id="Evolution">Evolution</span></h3>
            <table>
              <tr><th>Header</th></tr>
              <tr><td><a>Eevee</a><a><img alt=""></a></td><td><a></a><a>x</a></td></tr>
              <tr><td><a>Vaporeon</a><a>y</a></td><td><a>Eevee</a><a>z</a></td></tr>
            </table>
        </body></html>"#;
        let page = Page::parse(doc);
        let blocks = page.blocks();
        assert_eq!(
            english(&blocks, &BulbapediaAnchors::default(), "Eevee"),
            vec!["Eevee", "Vaporeon"]
        );
    }

    #[test]
    fn german_variants_are_skipped() {
        let doc = r#"<html><body><div id="evoRow">
            <div class="valignBottom">Glumanda</div>
            <div class="valignBottom">Glutexo</div>
            <div class="valignBottom">Glurak</div>
            <div class="valignBottom">Mega-Glurak X</div>
            <div class="valignBottom">Gigadynamax-Glurak</div>
        </div></body></html>"#;
        let page = Page::parse(doc);
        let blocks = page.blocks();
        assert_eq!(
            german(&blocks, &BisafansAnchors::default(), "Glurak"),
            vec!["Glumanda", "Glutexo", "Glurak"]
        );
    }

    #[test]
    fn german_single_form_heading() {
        let doc = r#"<html><body><div id="sonder"><h2>Alola-Raichu</h2></div></body></html>"#;
        let page = Page::parse(doc);
        let blocks = page.blocks();
        assert_eq!(
            german_forms(&blocks, &BisafansAnchors::default(), "Raichu"),
            vec!["Alola-Raichu"]
        );
    }
}
