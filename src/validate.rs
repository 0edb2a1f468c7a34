//! Structural check of produced documents against the fixed output schema.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

#[derive(Debug, Clone, Copy)]
enum Scalar {
    Text,
    Integer,
    Boolean,
    Percent,
}

impl Scalar {
    fn accepts(&self, value: &str) -> bool {
        match self {
            Scalar::Text => !value.is_empty(),
            Scalar::Integer => value.parse::<u32>().is_ok(),
            Scalar::Boolean => value == "true" || value == "false",
            Scalar::Percent => value
                .strip_suffix('%')
                .is_some_and(|n| n.parse::<u32>().is_ok()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Content {
    Scalar(Scalar),
    Children(&'static [Rule]),
}

/// One declared child: name, allowed occurrence range, content model.
#[derive(Debug, Clone, Copy)]
struct Rule {
    name: &'static str,
    min: usize,
    max: Option<usize>,
    content: Content,
}

const fn one(name: &'static str, content: Content) -> Rule {
    Rule { name, min: 1, max: Some(1), content }
}

const fn optional(name: &'static str, content: Content) -> Rule {
    Rule { name, min: 0, max: Some(1), content }
}

const fn many(name: &'static str, min: usize, content: Content) -> Rule {
    Rule { name, min, max: None, content }
}

const TEXT: Content = Content::Scalar(Scalar::Text);
const INT: Content = Content::Scalar(Scalar::Integer);

const NAMES: &[Rule] = &[one("English", TEXT), one("German", TEXT)];
const TYPE_LIST: &[Rule] = &[Rule { name: "Type", min: 1, max: Some(2), content: TEXT }];
const TYPES: &[Rule] = &[
    one("EnglishType", Content::Children(TYPE_LIST)),
    one("GermanType", Content::Children(TYPE_LIST)),
];
const NAME_LIST: &[Rule] = &[many("Name", 1, TEXT)];
const PARAGRAPHS: &[Rule] = &[many("P", 1, TEXT)];
const TRIVIAS: &[Rule] = &[many("Trivia", 1, TEXT)];
const DEX_ENTRY: &[Rule] = &[one("Version", TEXT), one("Text", TEXT)];
const DEX_ENTRIES: &[Rule] = &[many("Entry", 1, Content::Children(DEX_ENTRY))];
const ABILITY: &[Rule] = &[one("Name", TEXT), one("Hidden", Content::Scalar(Scalar::Boolean))];
const ABILITIES: &[Rule] = &[many("Ability", 1, Content::Children(ABILITY))];
const STATS: &[Rule] = &[
    one("HP", INT),
    one("Attack", INT),
    one("Defense", INT),
    one("SpecialAttack", INT),
    one("SpecialDefense", INT),
    one("Speed", INT),
];
const BREEDING: &[Rule] = &[many("EggGroup", 0, TEXT), optional("HatchTime", TEXT)];
const PHYSIQUE: &[Rule] = &[one("Height", TEXT), one("Weight", TEXT)];
const ATTACK: &[Rule] = &[
    one("Level", TEXT),
    one("MoveName", TEXT),
    one("Type", TEXT),
    one("Category", TEXT),
    one("Power", INT),
    one("Accuracy", Content::Scalar(Scalar::Percent)),
    one("PP", INT),
];
const ATTACK_LIST: &[Rule] = &[many("Attack", 1, Content::Children(ATTACK))];
const LEARNABLE: &[Rule] = &[
    optional("LevelUp", Content::Children(ATTACK_LIST)),
    optional("TechnicalMachine", Content::Children(ATTACK_LIST)),
];
const GAME: &[Rule] = &[
    optional("Abilities", Content::Children(ABILITIES)),
    one("Stats", Content::Children(STATS)),
    optional("Breeding", Content::Children(BREEDING)),
    optional("Physique", Content::Children(PHYSIQUE)),
    optional("GenderRatio", TEXT),
    optional("LearnableAttacks", Content::Children(LEARNABLE)),
];
const APPEARANCE: &[Rule] = &[one("Title", TEXT), one("Summary", TEXT)];
const ANIME: &[Rule] = &[many("Appearance", 1, Content::Children(APPEARANCE))];
const LANGUAGE_DATA: &[Rule] = &[
    one("Category", TEXT),
    one("EvolutionLine", Content::Children(NAME_LIST)),
    optional("Forms", Content::Children(NAME_LIST)),
    optional("Introduction", TEXT),
    optional("Biology", Content::Children(PARAGRAPHS)),
    optional("Trivias", Content::Children(TRIVIAS)),
    optional("PokedexEntries", Content::Children(DEX_ENTRIES)),
    one("Game", Content::Children(GAME)),
    optional("Anime", Content::Children(ANIME)),
];
const POKEMON: &[Rule] = &[
    one("Name", Content::Children(NAMES)),
    one("ID", INT),
    one("Types", Content::Children(TYPES)),
    one("EnglishData", Content::Children(LANGUAGE_DATA)),
    one("GermanData", Content::Children(LANGUAGE_DATA)),
];
const ROOT: Rule = one("Pokemon", Content::Children(POKEMON));

/// A schema violation at a slash-separated element path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

fn attach(node: Node, stack: &mut [Node], root: &mut Option<Node>) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => bail!("more than one root element"),
    }
    Ok(())
}

/// Read a document into a light element tree. Whitespace-only text is dropped.
fn read_tree(xml: &str) -> Result<Node> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => stack.push(Node {
                name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                ..Default::default()
            }),
            Ok(Event::Empty(e)) => {
                let node = Node {
                    name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    ..Default::default()
                };
                attach(node, &mut stack, &mut root)?;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape()?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(text.trim());
                }
            }
            Ok(Event::End(_)) => {
                let node = stack.pop().context("unbalanced end tag")?;
                attach(node, &mut stack, &mut root)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }
    if let Some(open) = stack.last() {
        bail!("unclosed element <{}>", open.name);
    }
    root.context("document has no root element")
}

fn check(node: &Node, rule: &Rule, path: &str, out: &mut Vec<Violation>) {
    let path = format!("{}/{}", path, node.name);
    match rule.content {
        Content::Scalar(kind) => {
            if !node.children.is_empty() {
                out.push(Violation {
                    path,
                    message: "expected text, found child elements".into(),
                });
            } else if !kind.accepts(&node.text) {
                out.push(Violation {
                    message: format!("invalid {:?} value {:?}", kind, node.text),
                    path,
                });
            }
        }
        Content::Children(rules) => check_sequence(&node.children, rules, &path, out),
    }
}

/// Children must follow the declared order, each name within its range.
fn check_sequence(children: &[Node], rules: &[Rule], path: &str, out: &mut Vec<Violation>) {
    let mut pos = 0;
    for rule in rules {
        let start = pos;
        while pos < children.len() && children[pos].name == rule.name {
            check(&children[pos], rule, path, out);
            pos += 1;
        }
        let count = pos - start;
        if count < rule.min || rule.max.is_some_and(|max| count > max) {
            out.push(Violation {
                path: format!("{}/{}", path, rule.name),
                message: format!("found {} occurrence(s)", count),
            });
        }
    }
    for extra in &children[pos..] {
        out.push(Violation {
            path: format!("{}/{}", path, extra.name),
            message: "unexpected element".into(),
        });
    }
}

pub fn validate_str(xml: &str) -> Result<Vec<Violation>> {
    let root = read_tree(xml)?;
    let mut out = Vec::new();
    if root.name != ROOT.name {
        out.push(Violation {
            path: format!("/{}", root.name),
            message: format!("root must be {}", ROOT.name),
        });
        return Ok(out);
    }
    check(&root, &ROOT, "", &mut out);
    Ok(out)
}

pub fn validate_file(path: &Path) -> Result<Vec<Violation>> {
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    validate_str(&xml).with_context(|| format!("Malformed document {}", path.display()))
}

/// Every `.xml` file in `dir`, sorted, with its violations.
pub fn validate_dir(dir: &Path) -> Result<Vec<(PathBuf, Vec<Violation>)>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "xml"))
        .collect();
    files.sort();

    files
        .into_iter()
        .map(|path| {
            let violations = match validate_file(&path) {
                Ok(v) => v,
                Err(e) => vec![Violation {
                    path: path.display().to_string(),
                    message: format!("{:#}", e),
                }],
            };
            Ok((path, violations))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Anchors;
    use crate::merge::merge;
    use crate::model::Identity;
    use crate::parser::{assemble_english, assemble_german};
    use crate::xml::to_xml;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    fn pikachu_xml() -> String {
        document(
            &fixture("bulbapedia_pikachu"),
            &fixture("bisafans_pikachu"),
            &fixture("pokewiki_pikachu"),
        )
    }

    fn document(bulbapedia: &str, bisafans: &str, pokewiki: &str) -> String {
        let anchors = Anchors::default();
        let english = assemble_english(bulbapedia, &anchors.bulbapedia).unwrap();
        let german = assemble_german(
            bisafans,
            pokewiki,
            Identity {
                name: "Pikachu".into(),
                index: 25,
            },
            &anchors.bisafans,
            &anchors.pokewiki,
        )
        .unwrap();
        to_xml(&merge(english, german).unwrap()).unwrap()
    }

    #[test]
    fn serialized_fixtures_have_no_violations() {
        let violations = validate_str(&pikachu_xml()).unwrap();
        assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn missing_optional_fields_still_validate() {
        let bulbapedia = fixture("bulbapedia_pikachu")
            .replace(r#"title="List of Pokémon by height""#, r#"title="Size""#)
            .replace(r#"title="List of Pokémon by gender ratio""#, r#"title="Sexes""#);
        let bisafans = fixture("bisafans_pikachu")
            .replace("<dd>50% ♂ - 50% ♀</dd>", "<dd> </dd>")
            .replace("<dd>0,4 Meter</dd>", "<dd></dd>")
            .replace("<tr><td>5</td>", "<tr><td></td>");
        let xml = document(&bulbapedia, &bisafans, &fixture("pokewiki_pikachu"));

        assert!(!xml.contains("<Physique>"));
        assert!(!xml.contains("<GenderRatio>"));
        assert!(!xml.contains("<Level></Level>"));
        assert!(xml.contains("<LearnableAttacks>"));
        let violations = validate_str(&xml).unwrap();
        assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn missing_and_malformed_elements_are_reported() {
        let xml = pikachu_xml()
            .replacen("<HP>35</HP>", "", 1)
            .replacen("<ID>25</ID>", "<ID>twenty-five</ID>", 1);
        let violations = validate_str(&xml).unwrap();
        let paths: Vec<&str> = violations.iter().map(|v| v.path.as_str()).collect();
        assert!(paths.contains(&"/Pokemon/ID"));
        assert!(paths.contains(&"/Pokemon/EnglishData/Game/Stats/HP"));
        assert!(!paths.contains(&"/Pokemon/GermanData/Game/Stats/HP"));
    }

    #[test]
    fn unexpected_element_is_reported() {
        let xml = "<Pokemon><Name><English>A</English><German>B</German></Name><Extra/></Pokemon>";
        let violations = validate_str(xml).unwrap();
        assert!(violations
            .iter()
            .any(|v| v.path == "/Pokemon/Extra" && v.message == "unexpected element"));
        assert!(violations.iter().any(|v| v.path == "/Pokemon/ID"));
    }

    #[test]
    fn directory_report_covers_each_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("0025.xml"), pikachu_xml()).unwrap();
        std::fs::write(dir.path().join("0026.xml"), "<Pokemon>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let report = validate_dir(dir.path()).unwrap();
        assert_eq!(report.len(), 2);
        assert!(report[0].1.is_empty());
        assert!(!report[1].1.is_empty());
    }
}
