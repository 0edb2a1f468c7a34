use tracing::debug;

use super::cells;
use crate::config::{BisafansAnchors, BulbapediaAnchors};
use crate::error::{ExtractError, Result};
use crate::model::{Stat, Stats};
use crate::parser::blocks::{descendants_named, text_of, Blocks};
use crate::parser::text::leading_number;

/// Stat labels of both sites, compared lowercase with punctuation removed.
const STAT_LABELS: &[(&str, Stat)] = &[
    ("hp", Stat::Hp),
    ("kp", Stat::Hp),
    ("attack", Stat::Attack),
    ("angriff", Stat::Attack),
    ("defense", Stat::Defense),
    ("verteidigung", Stat::Defense),
    ("spatk", Stat::SpecialAttack),
    ("spattack", Stat::SpecialAttack),
    ("specialattack", Stat::SpecialAttack),
    ("spangriff", Stat::SpecialAttack),
    ("spdef", Stat::SpecialDefense),
    ("spdefense", Stat::SpecialDefense),
    ("specialdefense", Stat::SpecialDefense),
    ("spverteidigung", Stat::SpecialDefense),
    ("speed", Stat::Speed),
    ("initiative", Stat::Speed),
];

pub fn stat_for_label(label: &str) -> Option<Stat> {
    let key: String = label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    STAT_LABELS
        .iter()
        .find(|(l, _)| *l == key)
        .map(|(_, stat)| *stat)
}

/// Keep the last six parsed entries; earlier ones describe older generations.
fn latest(entries: Vec<(Stat, u32)>) -> Result<Stats> {
    let skip = entries.len().saturating_sub(Stat::ALL.len());
    let stats: Stats = entries.into_iter().skip(skip).collect();
    if stats.len() != Stat::ALL.len() {
        return Err(ExtractError::missing(
            "stats",
            format!("{} of {} stats found", stats.len(), Stat::ALL.len()),
        ));
    }
    Ok(stats)
}

/// English stat headers read `HP:` followed by the value.
pub fn english(blocks: &Blocks, anchors: &BulbapediaAnchors) -> Result<Stats> {
    let entries: Vec<(Stat, u32)> = blocks
        .find_all(&anchors.stats)
        .into_iter()
        .filter_map(|i| blocks.get(i))
        .filter_map(|b| {
            let text = text_of(b.el);
            let parsed = text.split_once(':').and_then(|(label, value)| {
                Some((stat_for_label(label)?, leading_number(value)?))
            });
            if parsed.is_none() {
                debug!(field = "stats", header = %text, "unreadable stat header");
            }
            parsed
        })
        .collect();
    latest(entries)
}

/// German stats table: label in the first cell, base value in the third.
pub fn german(blocks: &Blocks, anchors: &BisafansAnchors) -> Result<Stats> {
    let heading = blocks
        .find(&anchors.stats)
        .ok_or_else(|| ExtractError::missing("stats", format!("no {}", anchors.stats)))?;
    let table = blocks
        .following(heading)
        .ok_or_else(|| ExtractError::missing("stats", "nothing after stats heading"))?;

    let entries: Vec<(Stat, u32)> = descendants_named(table, "tr")
        .into_iter()
        .filter_map(|row| {
            let cells = cells(row);
            let label = text_of(*cells.first()?);
            let value = text_of(*cells.get(2)?);
            Some((stat_for_label(&label)?, leading_number(&value)?))
        })
        .collect();
    latest(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_of_both_sites() {
        assert_eq!(stat_for_label("HP"), Some(Stat::Hp));
        assert_eq!(stat_for_label("KP"), Some(Stat::Hp));
        assert_eq!(stat_for_label("Sp. Atk"), Some(Stat::SpecialAttack));
        assert_eq!(stat_for_label("Sp.\u{2011}Verteidigung"), Some(Stat::SpecialDefense));
        assert_eq!(stat_for_label("Initiative"), Some(Stat::Speed));
        assert_eq!(stat_for_label("Total"), None);
    }

    #[test]
    fn only_last_six_survive() {
        let mut entries: Vec<(Stat, u32)> = Stat::ALL.iter().map(|s| (*s, 1)).collect();
        entries.extend(Stat::ALL.iter().map(|s| (*s, 2)));
        let stats = latest(entries).unwrap();
        assert_eq!(stats.len(), 6);
        assert!(stats.values().all(|v| *v == 2));
    }

    #[test]
    fn five_stats_is_missing_field() {
        let entries: Vec<(Stat, u32)> = Stat::ALL[..5].iter().map(|s| (*s, 10)).collect();
        let err = latest(entries).unwrap_err();
        assert!(matches!(err, ExtractError::MissingField { field: "stats", .. }));
    }
}
