use super::{cells, locate, sibling_table};
use crate::config::{Anchor, BulbapediaAnchors};
use crate::error::{ExtractError, Result};
use crate::model::{Breeding, GenderRatio, Identity, Physique};
use crate::parser::blocks::{descendants_named, first_named, parent, text_of, Blocks};
use crate::parser::text::{clean_inline, dedup_ordered};

pub fn identity(blocks: &Blocks, anchors: &BulbapediaAnchors) -> Result<Identity> {
    let heading = blocks
        .find_el(&anchors.name)
        .ok_or_else(|| ExtractError::missing("identity", format!("no {}", anchors.name)))?;
    let title = text_of(heading);
    let name = title
        .strip_suffix(anchors.name_suffix.as_str())
        .unwrap_or(&title)
        .trim()
        .to_string();
    if name.is_empty() {
        return Err(ExtractError::missing("identity", "empty page title"));
    }

    let links = blocks.find_all(&anchors.dex_number);
    let raw = links
        .get(anchors.dex_number_occurrence)
        .and_then(|&i| blocks.get(i))
        .map(|b| text_of(b.el))
        .ok_or_else(|| {
            ExtractError::missing(
                "identity",
                format!("{} links to {}", links.len(), anchors.dex_number),
            )
        })?;
    let index = raw
        .trim_start_matches('#')
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ExtractError::missing("identity", format!("bad index number `{}`", raw)))?;

    Ok(Identity { name, index })
}

pub fn category(blocks: &Blocks, anchors: &BulbapediaAnchors) -> Result<String> {
    blocks
        .find_el(&anchors.category)
        .map(text_of)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ExtractError::missing("category", format!("no {}", anchors.category)))
}

/// The first two bold labels of the type table. Later ones belong to other forms.
pub fn types(blocks: &Blocks, anchors: &BulbapediaAnchors) -> Result<Vec<String>> {
    let table = blocks
        .find_el(&anchors.types)
        .and_then(sibling_table)
        .ok_or_else(|| ExtractError::missing("types", format!("no table after {}", anchors.types)))?;

    let types = dedup_ordered(
        descendants_named(table, "b")
            .into_iter()
            .take(2)
            .map(text_of)
            .filter(|t| *t != anchors.unknown_type),
    );
    if types.is_empty() {
        return Err(ExtractError::missing("types", "no type labels"));
    }
    Ok(types)
}

pub fn breeding(blocks: &Blocks, anchors: &BulbapediaAnchors) -> Result<Breeding> {
    let groups = blocks.find_el(&anchors.egg_group).and_then(sibling_table);
    let cycle = blocks
        .find_el(&anchors.egg_cycle)
        .and_then(parent)
        .and_then(parent)
        .and_then(|row| first_named(row, "td"));
    if groups.is_none() && cycle.is_none() {
        return Err(ExtractError::anchor("breeding", &anchors.egg_group));
    }

    let egg_groups = groups
        .map(|table| {
            dedup_ordered(
                descendants_named(table, "a")
                    .into_iter()
                    .map(text_of)
                    .filter(|g| !anchors.placeholder_egg_groups.contains(g)),
            )
        })
        .unwrap_or_default();
    let hatch_time = cycle.map(|td| clean_inline(&td.text().collect::<String>())).unwrap_or_default();

    Ok(Breeding { egg_groups, hatch_time })
}

/// Cells mentioning a sex or "unknown", split on commas.
pub fn gender(blocks: &Blocks, anchors: &BulbapediaAnchors) -> Result<GenderRatio> {
    let table = locate(blocks, &anchors.gender, "gender_ratio")?;
    let table = sibling_table(table).ok_or_else(|| ExtractError::anchor("gender_ratio", &anchors.gender))?;

    let parts: Vec<String> = cells(table)
        .into_iter()
        .map(text_of)
        .filter(|t| {
            let lower = t.to_lowercase();
            lower.contains("male") || lower.contains("unknown")
        })
        .flat_map(|t| {
            t.split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
        })
        .collect();

    if parts.is_empty() {
        return Err(ExtractError::anchor("gender_ratio", "cell with a ratio"));
    }
    if parts.iter().any(|p| p.to_lowercase().contains("unknown")) {
        return Ok(GenderRatio::Genderless(parts.join(", ")));
    }
    Ok(GenderRatio::Split(parts))
}

/// Second cell of each measurement table holds the metric value.
pub fn physique(blocks: &Blocks, anchors: &BulbapediaAnchors) -> Result<Physique> {
    let metric = |anchor: &Anchor, field: &'static str| -> Result<String> {
        let table = locate(blocks, anchor, field)?;
        sibling_table(table)
            .and_then(|t| cells(t).get(1).copied())
            .map(text_of)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ExtractError::anchor(field, "metric cell"))
    };
    Ok(Physique {
        height: metric(&anchors.height, "physique")?,
        weight: metric(&anchors.weight, "physique")?,
    })
}
