use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Language {
    English,
    German,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::German => "german",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub name: String,
    pub index: u32,
}

/// Normal abilities in page order plus an optional hidden one.
/// A name never sits in both positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Abilities {
    pub normal: Vec<String>,
    pub hidden: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl Stat {
    pub const ALL: [Stat; 6] = [
        Stat::Hp,
        Stat::Attack,
        Stat::Defense,
        Stat::SpecialAttack,
        Stat::SpecialDefense,
        Stat::Speed,
    ];

    /// Element name used in the output document.
    pub fn element(&self) -> &'static str {
        match self {
            Stat::Hp => "HP",
            Stat::Attack => "Attack",
            Stat::Defense => "Defense",
            Stat::SpecialAttack => "SpecialAttack",
            Stat::SpecialDefense => "SpecialDefense",
            Stat::Speed => "Speed",
        }
    }
}

pub type Stats = BTreeMap<Stat, u32>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Breeding {
    pub egg_groups: Vec<String>,
    pub hatch_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GenderRatio {
    Genderless(String),
    /// Percentage parts in display order, e.g. `["12.5% weiblich", "87.5% männlich"]`.
    Split(Vec<String>),
}

impl fmt::Display for GenderRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenderRatio::Genderless(label) => f.write_str(label),
            GenderRatio::Split(parts) => f.write_str(&parts.join(" - ")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Physique {
    pub height: String,
    pub weight: String,
}

/// One learnable move. `learned_at` is a level for level-up moves and the
/// machine id for technical-machine moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Move {
    pub learned_at: String,
    pub name: String,
    pub move_type: String,
    pub category: String,
    pub power: u32,
    pub accuracy: u32,
    pub pp: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MoveList {
    pub level_up: Vec<Move>,
    pub technical: Vec<Move>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Appearance {
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DexEntry {
    pub version: String,
    pub text: String,
}

/// Everything one source page (or page pair, for German) says about a creature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatureRecord {
    pub language: Language,
    pub identity: Identity,
    pub category: String,
    pub types: Vec<String>,
    pub introduction: String,
    pub biology: Vec<String>,
    pub abilities: Abilities,
    pub stats: Stats,
    pub breeding: Breeding,
    pub gender_ratio: Option<GenderRatio>,
    pub physique: Option<Physique>,
    pub evolution_chain: Vec<String>,
    pub forms: Vec<String>,
    pub moves: MoveList,
    pub appearances: Vec<Appearance>,
    pub dex_entries: Vec<DexEntry>,
    pub trivia: Vec<String>,
}

/// English and German records joined on the national index number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BilingualRecord {
    pub index: u32,
    pub english: CreatureRecord,
    pub german: CreatureRecord,
}

impl BilingualRecord {
    pub fn english_name(&self) -> &str {
        &self.english.identity.name
    }

    pub fn german_name(&self) -> &str {
        &self.german.identity.name
    }
}

/// Output file name, e.g. `0025.xml`.
pub fn output_file_name(index: u32) -> String {
    format!("{:04}.xml", index)
}
