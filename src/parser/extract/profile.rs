//! German profile site: `dl.dl-horizontal` definition lists of label/value pairs.

use scraper::ElementRef;

use crate::config::BisafansAnchors;
use crate::error::{ExtractError, Result};
use crate::model::{GenderRatio, Physique};
use crate::parser::blocks::{descendants_named, next_sibling_element, text_of, Blocks};
use crate::parser::text::dedup_ordered;

/// Label → value element pairs of one definition list, in page order.
pub struct Profile<'a> {
    entries: Vec<(String, ElementRef<'a>)>,
}

impl<'a> Profile<'a> {
    /// The `n`-th profile list on the page.
    pub fn nth(
        blocks: &Blocks<'a>,
        anchors: &BisafansAnchors,
        n: usize,
        field: &'static str,
    ) -> Result<Self> {
        let list = blocks
            .find_all(&anchors.profile_list)
            .get(n)
            .and_then(|&i| blocks.get(i))
            .map(|b| b.el)
            .ok_or_else(|| ExtractError::anchor(field, format!("{} #{}", anchors.profile_list, n)))?;

        let entries = descendants_named(list, "dt")
            .into_iter()
            .filter_map(|dt| next_sibling_element(dt).map(|value| (text_of(dt), value)))
            .collect();
        Ok(Profile { entries })
    }

    pub fn value(&self, label: &str) -> Option<ElementRef<'a>> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, value)| *value)
    }

    pub fn text(&self, label: &str) -> Option<String> {
        self.value(label).map(text_of)
    }
}

fn main_profile<'a>(blocks: &Blocks<'a>, anchors: &BisafansAnchors, field: &'static str) -> Result<Profile<'a>> {
    Profile::nth(blocks, anchors, anchors.profile_index, field)
}

pub fn category(blocks: &Blocks, anchors: &BisafansAnchors) -> Result<String> {
    let profile = main_profile(blocks, anchors, "category")
        .map_err(|e| ExtractError::missing("category", e.to_string()))?;
    profile
        .text(&anchors.category_label)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ExtractError::missing("category", format!("no `{}` entry", anchors.category_label)))
}

/// Type labels are the alt texts of the type badges.
pub fn types(blocks: &Blocks, anchors: &BisafansAnchors) -> Result<Vec<String>> {
    let profile = main_profile(blocks, anchors, "types")
        .map_err(|e| ExtractError::missing("types", e.to_string()))?;
    let value = profile
        .value(&anchors.types_label)
        .ok_or_else(|| ExtractError::missing("types", format!("no `{}` entry", anchors.types_label)))?;

    let mut types = dedup_ordered(
        descendants_named(value, "img")
            .into_iter()
            .filter_map(|img| img.value().attr("alt"))
            .map(|alt| alt.trim().to_string()),
    );
    types.truncate(2);
    if types.is_empty() {
        return Err(ExtractError::missing("types", "no type badges"));
    }
    Ok(types)
}

pub fn gender(blocks: &Blocks, anchors: &BisafansAnchors) -> Result<GenderRatio> {
    let profile = main_profile(blocks, anchors, "gender_ratio")?;
    profile
        .text(&anchors.gender_label)
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| normalize_gender(&raw, &anchors.genderless))
        .ok_or_else(|| ExtractError::anchor("gender_ratio", &anchors.gender_label))
}

/// The German display lists the male share first with symbol glyphs. Glyphs
/// become words, tokens are reversed, then each dash-separated group is
/// reversed back so numbers lead again.
pub fn normalize_gender(raw: &str, genderless: &str) -> GenderRatio {
    if raw.contains(genderless) {
        return GenderRatio::Genderless(raw.trim().to_string());
    }
    let worded = raw.replace('♀', "weiblich").replace('♂', "männlich");
    let reversed: Vec<&str> = worded.split_whitespace().rev().collect();
    let parts = reversed
        .split(|token| *token == "-")
        .filter(|group| !group.is_empty())
        .map(|group| group.iter().rev().copied().collect::<Vec<_>>().join(" "))
        .collect();
    GenderRatio::Split(parts)
}

pub fn physique(blocks: &Blocks, anchors: &BisafansAnchors) -> Result<Physique> {
    let profile = main_profile(blocks, anchors, "physique")?;
    let measure = |label: &str| {
        profile
            .text(label)
            .filter(|t| !t.is_empty())
            .map(|t| {
                anchors
                    .unit_words
                    .iter()
                    .fold(t, |acc, (word, unit)| acc.replace(word.as_str(), unit))
            })
            .ok_or_else(|| ExtractError::anchor("physique", label))
    };
    Ok(Physique {
        height: measure(anchors.height_label.as_str())?,
        weight: measure(anchors.weight_label.as_str())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_order_and_glyphs_flip() {
        let g = normalize_gender("87.5% ♂ - 12.5% ♀", "Kein Geschlecht");
        assert_eq!(
            g,
            GenderRatio::Split(vec!["12.5% weiblich".into(), "87.5% männlich".into()])
        );
        assert_eq!(g.to_string(), "12.5% weiblich - 87.5% männlich");
    }

    #[test]
    fn genderless_passes_through() {
        let g = normalize_gender(" Kein Geschlecht ", "Kein Geschlecht");
        assert_eq!(g, GenderRatio::Genderless("Kein Geschlecht".into()));
    }

    #[test]
    fn single_gender() {
        let g = normalize_gender("100% ♂", "Kein Geschlecht");
        assert_eq!(g.to_string(), "100% männlich");
    }
}
