//! Bilingual record → output document. Both language branches share one shape;
//! optional containers are left out when empty.

use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::model::{BilingualRecord, CreatureRecord, Move, Stat};

type Out = Writer<Vec<u8>>;

fn open(w: &mut Out, name: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn close(w: &mut Out, name: &str) -> Result<()> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn leaf(w: &mut Out, name: &str, text: &str) -> Result<()> {
    open(w, name)?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    close(w, name)
}

/// `<name>…</name>` around whatever `body` writes.
fn element(w: &mut Out, name: &str, body: impl FnOnce(&mut Out) -> Result<()>) -> Result<()> {
    open(w, name)?;
    body(w)?;
    close(w, name)
}

/// Container of `item` leaves, omitted when `items` is empty.
fn leaf_list<S: AsRef<str>>(w: &mut Out, name: &str, item: &str, items: &[S]) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    element(w, name, |w| {
        for i in items {
            leaf(w, item, i.as_ref())?;
        }
        Ok(())
    })
}

pub fn to_xml(record: &BilingualRecord) -> Result<String> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    element(&mut w, "Pokemon", |w| {
        element(w, "Name", |w| {
            leaf(w, "English", record.english_name())?;
            leaf(w, "German", record.german_name())
        })?;
        leaf(w, "ID", &record.index.to_string())?;
        element(w, "Types", |w| {
            element(w, "EnglishType", |w| types(w, &record.english.types))?;
            element(w, "GermanType", |w| types(w, &record.german.types))
        })?;
        element(w, "EnglishData", |w| language_data(w, &record.english))?;
        element(w, "GermanData", |w| language_data(w, &record.german))
    })?;

    String::from_utf8(w.into_inner()).context("serialized document is not UTF-8")
}

fn types(w: &mut Out, types: &[String]) -> Result<()> {
    for t in types {
        leaf(w, "Type", t)?;
    }
    Ok(())
}

fn language_data(w: &mut Out, r: &CreatureRecord) -> Result<()> {
    leaf(w, "Category", &r.category)?;
    element(w, "EvolutionLine", |w| {
        for name in &r.evolution_chain {
            leaf(w, "Name", name)?;
        }
        Ok(())
    })?;
    leaf_list(w, "Forms", "Name", &r.forms)?;
    if !r.introduction.is_empty() {
        leaf(w, "Introduction", &r.introduction)?;
    }
    leaf_list(w, "Biology", "P", &r.biology)?;
    leaf_list(w, "Trivias", "Trivia", &r.trivia)?;
    if !r.dex_entries.is_empty() {
        element(w, "PokedexEntries", |w| {
            for entry in &r.dex_entries {
                element(w, "Entry", |w| {
                    leaf(w, "Version", &entry.version)?;
                    leaf(w, "Text", &entry.text)
                })?;
            }
            Ok(())
        })?;
    }
    element(w, "Game", |w| game(w, r))?;
    if !r.appearances.is_empty() {
        element(w, "Anime", |w| {
            for a in &r.appearances {
                element(w, "Appearance", |w| {
                    leaf(w, "Title", &a.title)?;
                    leaf(w, "Summary", &a.summary)
                })?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn game(w: &mut Out, r: &CreatureRecord) -> Result<()> {
    let abilities: Vec<(&str, bool)> = r
        .abilities
        .normal
        .iter()
        .map(|n| (n.as_str(), false))
        .chain(r.abilities.hidden.iter().map(|h| (h.as_str(), true)))
        .collect();
    if !abilities.is_empty() {
        element(w, "Abilities", |w| {
            for (name, hidden) in abilities {
                element(w, "Ability", |w| {
                    leaf(w, "Name", name)?;
                    leaf(w, "Hidden", if hidden { "true" } else { "false" })
                })?;
            }
            Ok(())
        })?;
    }

    element(w, "Stats", |w| {
        for stat in Stat::ALL {
            let value = r.stats.get(&stat).copied().unwrap_or_default();
            leaf(w, stat.element(), &value.to_string())?;
        }
        Ok(())
    })?;

    let breeding = &r.breeding;
    if !breeding.egg_groups.is_empty() || !breeding.hatch_time.is_empty() {
        element(w, "Breeding", |w| {
            for group in &breeding.egg_groups {
                leaf(w, "EggGroup", group)?;
            }
            if !breeding.hatch_time.is_empty() {
                leaf(w, "HatchTime", &breeding.hatch_time)?;
            }
            Ok(())
        })?;
    }

    if let Some(physique) = &r.physique {
        element(w, "Physique", |w| {
            leaf(w, "Height", &physique.height)?;
            leaf(w, "Weight", &physique.weight)
        })?;
    }

    let ratio = r.gender_ratio.as_ref().map(ToString::to_string).unwrap_or_default();
    if !ratio.is_empty() {
        leaf(w, "GenderRatio", &ratio)?;
    }

    let moves = &r.moves;
    if !moves.level_up.is_empty() || !moves.technical.is_empty() {
        element(w, "LearnableAttacks", |w| {
            attack_list(w, "LevelUp", &moves.level_up)?;
            attack_list(w, "TechnicalMachine", &moves.technical)
        })?;
    }
    Ok(())
}

fn attack_list(w: &mut Out, name: &str, moves: &[Move]) -> Result<()> {
    if moves.is_empty() {
        return Ok(());
    }
    element(w, name, |w| {
        for m in moves {
            element(w, "Attack", |w| {
                leaf(w, "Level", &m.learned_at)?;
                leaf(w, "MoveName", &m.name)?;
                leaf(w, "Type", &m.move_type)?;
                leaf(w, "Category", &m.category)?;
                leaf(w, "Power", &m.power.to_string())?;
                leaf(w, "Accuracy", &format!("{}%", m.accuracy))?;
                leaf(w, "PP", &m.pp.to_string())
            })?;
        }
        Ok(())
    })
}
