use scraper::ElementRef;
use tracing::debug;

use super::{locate, sibling_table};
use crate::config::{BisafansAnchors, BulbapediaAnchors};
use crate::error::{ExtractError, Result};
use crate::model::Abilities;
use crate::parser::blocks::{descendants_named, first_named, next_sibling_named, parent, text_of, Blocks};
use crate::parser::extract::profile::Profile;

/// Placeholder ability the English wiki lists for some entries. Never valid.
pub const SENTINEL_ABILITY: &str = "Cacophony";

/// Marker the English wiki puts in place of a repeated second ability.
const DUPLICATE_MARKER: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Empty,
    Exact(&'static str),
    Contains(&'static str),
    /// Equal to the subject's own name.
    SubjectName,
    /// `(Name)` for the subject's name.
    SubjectNameParenthesized,
    /// Starts with the subject's name and mentions a hidden ability.
    SubjectPrefixedHidden,
}

impl Label {
    pub fn matches(&self, label: &str, subject: &str) -> bool {
        match self {
            Label::Empty => label.is_empty(),
            Label::Exact(s) => label == *s,
            Label::Contains(s) => label.contains(s),
            Label::SubjectName => label == subject,
            Label::SubjectNameParenthesized => {
                label.strip_prefix('(').and_then(|l| l.strip_suffix(')')) == Some(subject)
            }
            Label::SubjectPrefixedHidden => {
                label.starts_with(subject) && label.contains("Hidden Ability")
            }
        }
    }
}

/// Where a single-ability row's ability goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Normal,
    /// Normal, unless the name is already listed.
    NormalIfNew,
    Hidden,
}

/// Single-ability rows, first match wins. Unmatched labels are dropped.
pub const SINGLE_RULES: &[(Label, Slot)] = &[
    (Label::SubjectName, Slot::Hidden),
    (Label::SubjectPrefixedHidden, Slot::Hidden),
    (Label::Contains("Hidden Ability"), Slot::Hidden),
    (Label::Empty, Slot::Normal),
    (Label::Exact("Land Forme"), Slot::Normal),
    (Label::Exact("Sky Forme"), Slot::Normal),
    (Label::Contains("Forme"), Slot::NormalIfNew),
    (Label::Contains("Chest Form"), Slot::Normal),
    (Label::Contains("Roaming Form"), Slot::Normal),
    (Label::Exact("Normal Form"), Slot::Normal),
];

/// How a compressed row with two abilities is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pair {
    Both,
    FirstOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairCondition {
    Label(Label),
    SecondIs(&'static str),
}

/// Two-ability rows, first match wins. Unmatched rows are dropped.
pub const PAIR_RULES: &[(PairCondition, Pair)] = &[
    (PairCondition::SecondIs(DUPLICATE_MARKER), Pair::FirstOnly),
    (PairCondition::Label(Label::SubjectNameParenthesized), Pair::Both),
    (PairCondition::Label(Label::Empty), Pair::Both),
    (PairCondition::Label(Label::Exact("(Teal Mask)")), Pair::FirstOnly),
];

pub fn classify_single(label: &str, subject: &str) -> Option<Slot> {
    SINGLE_RULES
        .iter()
        .find(|(pattern, _)| pattern.matches(label, subject))
        .map(|(_, slot)| *slot)
}

pub fn classify_pair(label: &str, second: &str, subject: &str) -> Option<Pair> {
    PAIR_RULES
        .iter()
        .find(|(condition, _)| match condition {
            PairCondition::Label(pattern) => pattern.matches(label, subject),
            PairCondition::SecondIs(marker) => second == *marker,
        })
        .map(|(_, pair)| *pair)
}

/// Collects abilities while keeping every name in at most one slot.
#[derive(Debug, Default)]
pub struct AbilitySet {
    abilities: Abilities,
}

impl AbilitySet {
    pub fn place(&mut self, name: &str, slot: Slot) {
        let name = name.trim();
        if name.is_empty() || name == SENTINEL_ABILITY || name == DUPLICATE_MARKER {
            return;
        }
        let normal = &mut self.abilities.normal;
        match slot {
            Slot::Hidden => {
                normal.retain(|n| n != name);
                self.abilities.hidden = Some(name.to_string());
            }
            Slot::Normal | Slot::NormalIfNew => {
                if self.abilities.hidden.as_deref() == Some(name) {
                    return;
                }
                if slot == Slot::NormalIfNew && normal.iter().any(|n| n == name) {
                    return;
                }
                normal.push(name.to_string());
            }
        }
    }

    pub fn finish(self) -> Abilities {
        self.abilities
    }
}

/// Ability table of the English infobox.
pub fn english(blocks: &Blocks, anchors: &BulbapediaAnchors, subject: &str) -> Result<Abilities> {
    let label = locate(blocks, &anchors.abilities, "abilities")?;
    // Some layouts nest the label one level deeper.
    let table = sibling_table(label)
        .or_else(|| parent(label).and_then(parent).and_then(|p| next_sibling_named(p, "table")))
        .ok_or_else(|| ExtractError::anchor("abilities", "table after ability label"))?;

    let mut set = AbilitySet::default();
    for cell in descendants_named(table, "td") {
        read_cell(cell, subject, &mut set);
    }
    Ok(set.finish())
}

fn read_cell(cell: ElementRef, subject: &str, set: &mut AbilitySet) {
    let spans: Vec<String> = descendants_named(cell, "span").into_iter().map(text_of).collect();
    if spans.is_empty() {
        return;
    }
    let label = first_named(cell, "small").map(text_of).unwrap_or_default();

    if let [only] = spans.as_slice() {
        match classify_single(&label, subject) {
            Some(slot) => set.place(only, slot),
            None => debug!(field = "abilities", label = %label, ability = %only, "unrecognized ability label"),
        }
        return;
    }

    match classify_pair(&label, &spans[1], subject) {
        Some(Pair::Both) => {
            set.place(&spans[0], Slot::Normal);
            set.place(&spans[1], Slot::Normal);
        }
        Some(Pair::FirstOnly) => set.place(&spans[0], Slot::Normal),
        None => debug!(field = "abilities", label = %label, "unrecognized ability row"),
    }
}

/// Ability list of the German profile: two normal slots and a hidden one.
pub fn german(blocks: &Blocks, anchors: &BisafansAnchors) -> Result<Abilities> {
    let profile = Profile::nth(blocks, anchors, anchors.ability_index, "abilities")?;
    let slot_text = |label: &str| {
        profile
            .text(label)
            .filter(|t| !t.is_empty() && *t != anchors.no_ability)
    };

    let normal: Vec<String> = anchors
        .ability_labels
        .iter()
        .filter_map(|l| slot_text(l.as_str()))
        .collect();
    let hidden = slot_text(anchors.hidden_ability_label.as_str());
    if normal.is_empty() && hidden.is_none() {
        return Err(ExtractError::anchor("abilities", &anchors.hidden_ability_label));
    }

    let mut set = AbilitySet::default();
    for name in &normal {
        set.place(name, Slot::Normal);
    }
    if let Some(name) = hidden {
        set.place(&name, Slot::Hidden);
    }
    Ok(set.finish())
}
