use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::parser::blocks::text_of;

const DEFAULT_CONFIG_FILE: &str = "pokedex.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub anchors: Anchors,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Paths {
    pub bulbapedia_dir: PathBuf,
    pub bisafans_dir: PathBuf,
    pub pokewiki_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            bulbapedia_dir: PathBuf::from("data/bulbapedia_data"),
            bisafans_dir: PathBuf::from("data/bisafans_data"),
            pokewiki_dir: PathBuf::from("data/pokewiki_data"),
            output_dir: PathBuf::from("data/parsed_data"),
        }
    }
}

impl Config {
    /// Load from `path`, else `pokedex.toml` in the working directory, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => PathBuf::from(DEFAULT_CONFIG_FILE),
            None => return Ok(Config::default()),
        };
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// A markup landmark. Every set field must match; unset fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Anchor {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub title: Option<String>,
    pub href: Option<String>,
    pub class: Option<String>,
    pub style: Option<String>,
    pub text: Option<String>,
}

impl Anchor {
    pub fn id(id: &str) -> Self {
        Anchor {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn link_title(title: &str) -> Self {
        Anchor {
            tag: Some("a".into()),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn link_href(href: &str) -> Self {
        Anchor {
            tag: Some("a".into()),
            href: Some(href.into()),
            ..Default::default()
        }
    }

    pub fn tag_id(tag: &str, id: &str) -> Self {
        Anchor {
            tag: Some(tag.into()),
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn tag_class(tag: &str, class: &str) -> Self {
        Anchor {
            tag: Some(tag.into()),
            class: Some(class.into()),
            ..Default::default()
        }
    }

    pub fn tag_style(tag: &str, style: &str) -> Self {
        Anchor {
            tag: Some(tag.into()),
            style: Some(style.into()),
            ..Default::default()
        }
    }

    pub fn tag_text(tag: &str, text: &str) -> Self {
        Anchor {
            tag: Some(tag.into()),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, el: &ElementRef) -> bool {
        let v = el.value();
        let attr_eq = |want: &Option<String>, name: &str| match want {
            Some(w) => v.attr(name) == Some(w.as_str()),
            None => true,
        };
        if let Some(tag) = &self.tag {
            if v.name() != tag {
                return false;
            }
        }
        if let Some(class) = &self.class {
            if !v.classes().any(|c| c == class) {
                return false;
            }
        }
        if !(attr_eq(&self.id, "id")
            && attr_eq(&self.title, "title")
            && attr_eq(&self.href, "href")
            && attr_eq(&self.style, "style"))
        {
            return false;
        }
        match &self.text {
            Some(t) => text_of(*el) == *t,
            None => true,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag.as_deref().unwrap_or("*"))?;
        let attrs = [
            ("id", &self.id),
            ("title", &self.title),
            ("href", &self.href),
            ("class", &self.class),
            ("style", &self.style),
            ("text", &self.text),
        ];
        for (name, value) in attrs {
            if let Some(value) = value {
                write!(f, "[{}=\"{}\"]", name, value)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Anchors {
    pub bulbapedia: BulbapediaAnchors,
    pub bisafans: BisafansAnchors,
    pub pokewiki: PokewikiAnchors,
}

/// English wiki landmarks.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BulbapediaAnchors {
    pub name: Anchor,
    pub name_suffix: String,
    pub dex_number: Anchor,
    /// Which occurrence of `dex_number` carries the subject's own number.
    pub dex_number_occurrence: usize,
    pub category: Anchor,
    pub types: Anchor,
    pub unknown_type: String,
    pub abilities: Anchor,
    pub stats: Anchor,
    pub egg_group: Anchor,
    pub egg_cycle: Anchor,
    pub placeholder_egg_groups: Vec<String>,
    pub gender: Anchor,
    pub height: Anchor,
    pub weight: Anchor,
    pub intro_start: Anchor,
    pub intro_end: Anchor,
    pub biology: Anchor,
    pub evolution: Anchor,
    pub dex_entries: Anchor,
    pub major_appearances: Anchor,
    pub minor_appearances_title: String,
    /// Heading level of the arc titles inside the major appearances section.
    pub appearance_title_level: u8,
    pub fallback_appearance_title: String,
    pub level_up: Anchor,
    pub technical: Anchor,
    pub trivia: Anchor,
}

impl Default for BulbapediaAnchors {
    fn default() -> Self {
        BulbapediaAnchors {
            name: Anchor::tag_id("h1", "firstHeading"),
            name_suffix: "(Pokémon)".into(),
            dex_number: Anchor::link_title("List of Pokémon by National Pokédex number"),
            dex_number_occurrence: 1,
            category: Anchor::link_title("Pokémon category"),
            types: Anchor::link_title("Type"),
            unknown_type: "Unknown".into(),
            abilities: Anchor::link_title("Ability"),
            stats: Anchor::tag_style(
                "th",
                "padding-left: 0.2em; padding-right: 0.2em; display: flex; justify-content: space-between;",
            ),
            egg_group: Anchor::link_href("/wiki/Egg_Group"),
            egg_cycle: Anchor::link_href("/wiki/Egg_cycle"),
            placeholder_egg_groups: vec!["Cap".into(), "Cosplay".into()],
            gender: Anchor::link_title("List of Pokémon by gender ratio"),
            height: Anchor::link_title("List of Pokémon by height"),
            weight: Anchor::link_title("Weight"),
            intro_start: Anchor::link_title("List of Pokémon by base friendship"),
            intro_end: Anchor::link_href("#Biology"),
            biology: Anchor::id("Biology"),
            evolution: Anchor::tag_id("span", "Evolution"),
            dex_entries: Anchor::tag_id("span", "Pok.C3.A9dex_entries"),
            major_appearances: Anchor::id("Major_appearances"),
            minor_appearances_title: "Minor appearances".into(),
            appearance_title_level: 5,
            fallback_appearance_title: "Other".into(),
            level_up: Anchor::tag_id("span", "By_leveling_up"),
            technical: Anchor::tag_id("span", "By_TM"),
            trivia: Anchor::tag_id("span", "Trivia"),
        }
    }
}

/// German profile site landmarks and label texts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BisafansAnchors {
    pub profile_list: Anchor,
    pub profile_index: usize,
    pub ability_index: usize,
    pub category_label: String,
    pub types_label: String,
    pub gender_label: String,
    pub genderless: String,
    pub height_label: String,
    pub weight_label: String,
    pub unit_words: Vec<(String, String)>,
    pub ability_labels: Vec<String>,
    pub hidden_ability_label: String,
    pub no_ability: String,
    pub stats: Anchor,
    pub level_up: Anchor,
    pub technical: Anchor,
    pub fallback_move_type: String,
    pub fallback_move_category: String,
    pub evolution_row: Anchor,
    pub evolution_entry_class: String,
    pub evolution_variant_prefixes: Vec<String>,
    pub forms: Anchor,
    pub forms_gallery: Anchor,
    pub forms_tabs_class: String,
    pub series: Anchor,
    pub films: Anchor,
    pub trivia: Anchor,
}

impl Default for BisafansAnchors {
    fn default() -> Self {
        BisafansAnchors {
            profile_list: Anchor::tag_class("dl", "dl-horizontal"),
            profile_index: 0,
            ability_index: 1,
            category_label: "Art".into(),
            types_label: "Typ".into(),
            gender_label: "Geschlecht".into(),
            genderless: "Kein Geschlecht".into(),
            height_label: "Größe".into(),
            weight_label: "Gewicht".into(),
            unit_words: vec![
                ("Meter".into(), "m".into()),
                ("Kilogramm".into(), "kg".into()),
            ],
            ability_labels: vec!["Fähigkeit 1".into(), "Fähigkeit 2".into()],
            hidden_ability_label: "Versteckte Fähigkeit".into(),
            no_ability: "Keine".into(),
            stats: Anchor::tag_text("h3", "Statuswerte"),
            level_up: Anchor::tag_text("h4", "Durch Level-Up"),
            technical: Anchor::tag_text("h4", "Durch TMs"),
            fallback_move_type: "Psycho".into(),
            fallback_move_category: "Status".into(),
            evolution_row: Anchor::tag_id("div", "evoRow"),
            evolution_entry_class: "valignBottom".into(),
            evolution_variant_prefixes: vec![
                "Mega-".into(),
                "Gigadynamax-".into(),
                "Alola-".into(),
                "Galar-".into(),
            ],
            forms: Anchor::tag_id("div", "sonder"),
            forms_gallery: Anchor::tag_id("div", "bilderdex"),
            forms_tabs_class: "nav-tabs".into(),
            series: Anchor::tag_text("h4", "Serie"),
            films: Anchor::tag_text("h4", "Filme und Spezialfilme"),
            trivia: Anchor::tag_text("h3", "Trivia"),
        }
    }
}

/// German wiki landmarks for narrative text.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PokewikiAnchors {
    pub intro_start: Anchor,
    pub intro_end: Anchor,
    pub biology_start: Anchor,
    /// First one present in the page wins.
    pub biology_end: Vec<Anchor>,
}

impl Default for PokewikiAnchors {
    fn default() -> Self {
        PokewikiAnchors {
            intro_start: Anchor::tag_class("table", "infobox-pokemon"),
            intro_end: Anchor::tag_id("div", "toc"),
            biology_start: Anchor::tag_id("span", "Spezies"),
            biology_end: vec![
                Anchor::tag_id("span", "In_den_Hauptspielen"),
                Anchor::tag_id("span", "In_den_Spielen"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first_named<'a>(html: &'a Html, tag: &str) -> ElementRef<'a> {
        html.root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == tag)
            .unwrap()
    }

    #[test]
    fn anchor_matches_all_set_fields() {
        let html = Html::parse_document(r#"<a href="/wiki/Type" title="Type">Type</a>"#);
        let a = first_named(&html, "a");
        assert!(Anchor::link_title("Type").matches(&a));
        assert!(Anchor::link_href("/wiki/Type").matches(&a));
        assert!(!Anchor::link_title("Ability").matches(&a));
        assert!(!Anchor::tag_id("a", "Type").matches(&a));
    }

    #[test]
    fn anchor_text_and_class() {
        let html = Html::parse_document(
            r#"<dl class="dl-horizontal wide"><dt>Typ</dt></dl><h3> Statuswerte </h3>"#,
        );
        assert!(Anchor::tag_class("dl", "dl-horizontal").matches(&first_named(&html, "dl")));
        assert!(Anchor::tag_text("h3", "Statuswerte").matches(&first_named(&html, "h3")));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let raw = r#"
            [paths]
            output_dir = "out"

            [anchors.bulbapedia.trivia]
            tag = "span"
            id = "Fun_facts"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.paths.output_dir, PathBuf::from("out"));
        assert_eq!(config.paths.bisafans_dir, PathBuf::from("data/bisafans_data"));
        assert_eq!(config.anchors.bulbapedia.trivia, Anchor::tag_id("span", "Fun_facts"));
        assert_eq!(config.anchors.bulbapedia.biology, Anchor::id("Biology"));
        assert_eq!(config.anchors.bisafans.no_ability, "Keine");
    }

    #[test]
    fn anchor_display() {
        assert_eq!(Anchor::link_title("Type").to_string(), r#"a[title="Type"]"#);
        assert_eq!(Anchor::id("Biology").to_string(), r#"*[id="Biology"]"#);
    }
}
