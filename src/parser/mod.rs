pub mod blocks;
pub mod extract;
pub mod sections;
pub mod text;

use tracing::{debug, info_span, warn};

use crate::config::{BisafansAnchors, BulbapediaAnchors, PokewikiAnchors};
use crate::error::{ExtractError, Result};
use crate::model::{CreatureRecord, Identity, Language};
use blocks::Page;
use extract::{abilities, appearances, evolution, infobox, moves, narrative, profile, stats};

/// Optional field: a miss is logged and the field left empty.
fn optional<T: Default>(result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
        warn!(field = e.field(), "{}", e);
        T::default()
    })
}

/// Optional field that many pages legitimately lack.
fn often_absent<T: Default>(result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
        debug!(field = e.field(), "{}", e);
        T::default()
    })
}

/// Two-pass pipeline for one English page: html → blocks → record.
/// Identity, category, types and stats are mandatory; any other miss
/// degrades to an empty value.
pub fn assemble_english(html: &str, anchors: &BulbapediaAnchors) -> Result<CreatureRecord> {
    let page = Page::parse(html);
    let blocks = page.blocks();

    let identity = infobox::identity(&blocks, anchors)?;
    let _span = info_span!("english", index = identity.index).entered();
    let name = identity.name.clone();

    Ok(CreatureRecord {
        language: Language::English,
        category: infobox::category(&blocks, anchors)?,
        types: infobox::types(&blocks, anchors)?,
        stats: stats::english(&blocks, anchors)?,
        introduction: optional(narrative::english_introduction(&blocks, anchors)),
        biology: optional(narrative::english_biology(&blocks, anchors)),
        abilities: optional(abilities::english(&blocks, anchors, &name)),
        breeding: optional(infobox::breeding(&blocks, anchors)),
        gender_ratio: optional(infobox::gender(&blocks, anchors).map(Some)),
        physique: optional(infobox::physique(&blocks, anchors).map(Some)),
        evolution_chain: evolution::english(&blocks, anchors, &name),
        forms: often_absent(evolution::english_forms(&blocks, anchors, &name)),
        moves: optional(moves::english(&blocks, anchors)),
        appearances: often_absent(appearances::english(&blocks, anchors)),
        dex_entries: optional(narrative::english_dex_entries(&blocks, anchors)),
        trivia: often_absent(narrative::english_trivia(&blocks, anchors)),
        identity,
    })
}

/// German record from the profile page and the wiki page of the same creature.
/// The German sites carry no reliable index, so identity comes from the caller.
pub fn assemble_german(
    profile_html: &str,
    wiki_html: &str,
    identity: Identity,
    profile_anchors: &BisafansAnchors,
    wiki_anchors: &PokewikiAnchors,
) -> Result<CreatureRecord> {
    if identity.index == 0 || identity.name.is_empty() {
        return Err(ExtractError::missing("identity", "German identity must be named and indexed"));
    }
    let _span = info_span!("german", index = identity.index).entered();

    let profile_page = Page::parse(profile_html);
    let p = profile_page.blocks();
    let wiki_page = Page::parse(wiki_html);
    let w = wiki_page.blocks();
    let name = identity.name.clone();

    Ok(CreatureRecord {
        language: Language::German,
        category: profile::category(&p, profile_anchors)?,
        types: profile::types(&p, profile_anchors)?,
        stats: stats::german(&p, profile_anchors)?,
        introduction: optional(narrative::german_introduction(&w, wiki_anchors)),
        biology: optional(narrative::german_biology(&w, wiki_anchors)),
        abilities: optional(abilities::german(&p, profile_anchors)),
        // Not published by the German sources.
        breeding: Default::default(),
        gender_ratio: optional(profile::gender(&p, profile_anchors).map(Some)),
        physique: optional(profile::physique(&p, profile_anchors).map(Some)),
        evolution_chain: evolution::german(&p, profile_anchors, &name),
        forms: evolution::german_forms(&p, profile_anchors, &name),
        moves: optional(moves::german(&p, profile_anchors)),
        appearances: appearances::german(&p, profile_anchors),
        dex_entries: Vec::new(),
        trivia: often_absent(narrative::german_trivia(&p, profile_anchors)),
        identity,
    })
}
