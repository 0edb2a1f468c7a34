//! Lore text, Pokédex entries and trivia.

use super::{cells, locate, table_after};
use crate::config::{BisafansAnchors, BulbapediaAnchors, PokewikiAnchors};
use crate::error::{ExtractError, Result};
use crate::model::DexEntry;
use crate::parser::blocks::{descendants_named, parent, raw_text, text_of, BlockKind, Blocks};
use crate::parser::sections::{narrative, narrative_list, until};
use crate::parser::text::{clean_inline, paragraph_list};

pub fn english_introduction(blocks: &Blocks, anchors: &BulbapediaAnchors) -> Result<String> {
    narrative(blocks, &anchors.intro_start, &anchors.intro_end, "introduction")
}

/// Paragraphs after the biology heading, up to the next heading.
pub fn english_biology(blocks: &Blocks, anchors: &BulbapediaAnchors) -> Result<Vec<String>> {
    let start = blocks
        .find(&anchors.biology)
        .ok_or_else(|| ExtractError::anchor("biology", &anchors.biology))?;
    let paragraphs: Vec<String> = until(blocks, start, |b| b.kind.is_heading())
        .into_iter()
        .filter(|b| b.kind == BlockKind::Paragraph)
        .map(|b| raw_text(b.el))
        .collect();
    Ok(paragraph_list(&paragraphs))
}

/// (version, entry) rows of the first table after the heading.
pub fn english_dex_entries(blocks: &Blocks, anchors: &BulbapediaAnchors) -> Result<Vec<DexEntry>> {
    let heading = locate(blocks, &anchors.dex_entries, "dex_entries")?;
    let table = table_after(blocks, heading)
        .ok_or_else(|| ExtractError::anchor("dex_entries", "table after heading"))?;
    Ok(descendants_named(table, "tr")
        .into_iter()
        .skip(1)
        .filter_map(|row| match cells(row).as_slice() {
            [version, text, ..] => Some(DexEntry {
                version: text_of(*version),
                text: text_of(*text),
            }),
            _ => None,
        })
        .collect())
}

pub fn english_trivia(blocks: &Blocks, anchors: &BulbapediaAnchors) -> Result<Vec<String>> {
    let heading = locate(blocks, &anchors.trivia, "trivia")?;
    let list = blocks
        .next_named_after(parent(heading).unwrap_or(heading), "ul")
        .ok_or_else(|| ExtractError::anchor("trivia", "list after heading"))?;
    Ok(descendants_named(list, "li")
        .into_iter()
        .map(text_of)
        .filter(|t| !t.is_empty())
        .collect())
}

pub fn german_introduction(blocks: &Blocks, anchors: &PokewikiAnchors) -> Result<String> {
    narrative(blocks, &anchors.intro_start, &anchors.intro_end, "introduction")
}

pub fn german_biology(blocks: &Blocks, anchors: &PokewikiAnchors) -> Result<Vec<String>> {
    let ends: Vec<_> = anchors.biology_end.iter().collect();
    narrative_list(blocks, &anchors.biology_start, &ends, "biology")
}

/// Non-empty lines of the block after the trivia heading.
pub fn german_trivia(blocks: &Blocks, anchors: &BisafansAnchors) -> Result<Vec<String>> {
    let heading = blocks
        .find(&anchors.trivia)
        .ok_or_else(|| ExtractError::anchor("trivia", &anchors.trivia))?;
    let block = blocks
        .following(heading)
        .ok_or_else(|| ExtractError::anchor("trivia", "block after heading"))?;
    Ok(raw_text(block)
        .lines()
        .map(clean_inline)
        .filter(|l| !l.is_empty())
        .collect())
}
