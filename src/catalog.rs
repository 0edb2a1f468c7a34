//! Catalog discovery and the per-creature driver.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::{Config, Paths};
use crate::error::ExtractError;
use crate::merge::merge;
use crate::model::{output_file_name, BilingualRecord, Identity};
use crate::parser::{assemble_english, assemble_german};
use crate::xml::to_xml;

const CHUNK_SIZE: usize = 500;

/// The three source pages of one creature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub index: u32,
    pub german_name: String,
    pub bulbapedia: PathBuf,
    pub bisafans: PathBuf,
    pub pokewiki: PathBuf,
}

/// `0025_Pikachu.html` → (25, "Pikachu").
pub fn parse_file_name(path: &Path) -> Option<(u32, String)> {
    let stem = path.file_stem()?.to_str()?;
    let (index, name) = stem.split_once('_')?;
    let index: u32 = index.parse().ok()?;
    if index == 0 || name.is_empty() {
        return None;
    }
    Some((index, name.to_string()))
}

fn html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "html"))
        .collect();
    files.sort();
    Ok(files)
}

/// Sorted source listings zipped by position. The German profile file name
/// supplies the index and the German display name.
pub fn discover(paths: &Paths) -> Result<Vec<Entry>> {
    let bulbapedia = html_files(&paths.bulbapedia_dir)?;
    let bisafans = html_files(&paths.bisafans_dir)?;
    let pokewiki = html_files(&paths.pokewiki_dir)?;

    if bulbapedia.len() != bisafans.len() || bisafans.len() != pokewiki.len() {
        warn!(
            bulbapedia = bulbapedia.len(),
            bisafans = bisafans.len(),
            pokewiki = pokewiki.len(),
            "source directories differ in size; extra files are ignored"
        );
    }

    let entries = bisafans
        .into_iter()
        .zip(pokewiki)
        .zip(bulbapedia)
        .filter_map(|((bisafans, pokewiki), bulbapedia)| {
            let Some((index, german_name)) = parse_file_name(&bisafans) else {
                warn!(file = %bisafans.display(), "unrecognized file name, skipping");
                return None;
            };
            Some(Entry {
                index,
                german_name,
                bulbapedia,
                bisafans,
                pokewiki,
            })
        })
        .collect();
    Ok(entries)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Extract, assemble and merge one creature.
pub fn build(entry: &Entry, config: &Config) -> Result<BilingualRecord> {
    let anchors = &config.anchors;
    let english = assemble_english(&read(&entry.bulbapedia)?, &anchors.bulbapedia)?;
    let german = assemble_german(
        &read(&entry.bisafans)?,
        &read(&entry.pokewiki)?,
        Identity {
            name: entry.german_name.clone(),
            index: entry.index,
        },
        &anchors.bisafans,
        &anchors.pokewiki,
    )?;
    Ok(merge(english, german)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Written,
    Skipped,
    Failed,
}

/// Build and write one document. An existing output file means done.
pub fn process_entry(entry: &Entry, config: &Config) -> Outcome {
    let target = config.paths.output_dir.join(output_file_name(entry.index));
    if target.exists() {
        return Outcome::Skipped;
    }

    let result = build(entry, config).and_then(|record| {
        let xml = to_xml(&record)?;
        std::fs::write(&target, xml).with_context(|| format!("Failed to write {}", target.display()))
    });
    match result {
        Ok(()) => Outcome::Written,
        Err(e) => {
            let field = e
                .downcast_ref::<ExtractError>()
                .map_or("document", ExtractError::field);
            warn!(index = entry.index, field, "{:#}", e);
            Outcome::Failed
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BuildCounts {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BuildCounts {
    pub fn print(&self) {
        println!(
            "Wrote {} documents, {} already present, {} failed.",
            self.written, self.skipped, self.failed,
        );
    }
}

/// Process every entry, fanning out across creatures chunk by chunk.
pub fn run(entries: &[Entry], config: &Config) -> Result<BuildCounts> {
    let output_dir = &config.paths.output_dir;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = BuildCounts::default();
    for chunk in entries.chunks(CHUNK_SIZE) {
        let outcomes: Vec<Outcome> = chunk
            .par_iter()
            .map(|entry| process_entry(entry, config))
            .collect();
        for outcome in outcomes {
            match outcome {
                Outcome::Written => counts.written += 1,
                Outcome::Skipped => counts.skipped += 1,
                Outcome::Failed => counts.failed += 1,
            }
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    info!(
        written = counts.written,
        skipped = counts.skipped,
        failed = counts.failed,
        "batch finished"
    );
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn copy_fixture(name: &str, dir: &Path, file: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::copy(format!("tests/fixtures/{}.html", name), dir.join(file)).unwrap();
    }

    fn workspace(root: &Path) -> Config {
        let config = Config {
            paths: Paths {
                bulbapedia_dir: root.join("bulbapedia"),
                bisafans_dir: root.join("bisafans"),
                pokewiki_dir: root.join("pokewiki"),
                output_dir: root.join("out"),
            },
            ..Default::default()
        };
        copy_fixture("bulbapedia_pikachu", &config.paths.bulbapedia_dir, "0025_Pikachu.html");
        copy_fixture("bisafans_pikachu", &config.paths.bisafans_dir, "0025_Pikachu.html");
        copy_fixture("pokewiki_pikachu", &config.paths.pokewiki_dir, "0025_Pikachu.html");
        config
    }

    #[test]
    fn file_names_carry_index_and_name() {
        assert_eq!(
            parse_file_name(Path::new("data/bisafans_data/0025_Pikachu.html")),
            Some((25, "Pikachu".to_string()))
        );
        assert_eq!(
            parse_file_name(Path::new("0122_Pantimos.html")),
            Some((122, "Pantimos".to_string()))
        );
        assert_eq!(parse_file_name(Path::new("Pikachu.html")), None);
        assert_eq!(parse_file_name(Path::new("0000_Missing.html")), None);
    }

    #[test]
    fn discover_zips_sorted_listings() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace(dir.path());
        std::fs::write(config.paths.bisafans_dir.join("readme.txt"), "not a page").unwrap();

        let entries = discover(&config.paths).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].index, 25);
        assert_eq!(entries[0].german_name, "Pikachu");
    }

    #[test]
    fn run_writes_once_then_skips() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace(dir.path());
        let entries = discover(&config.paths).unwrap();

        let first = run(&entries, &config).unwrap();
        assert_eq!(first, BuildCounts { written: 1, skipped: 0, failed: 0 });
        let out = config.paths.output_dir.join("0025.xml");
        let xml = std::fs::read_to_string(&out).unwrap();
        assert!(xml.contains("<German>Pikachu</German>"));

        let second = run(&entries, &config).unwrap();
        assert_eq!(second, BuildCounts { written: 0, skipped: 1, failed: 0 });
    }

    #[test]
    fn broken_page_fails_without_halting() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace(dir.path());
        copy_fixture("bulbapedia_pikachu", &config.paths.bulbapedia_dir, "0026_Raichu.html");
        copy_fixture("bisafans_pikachu", &config.paths.bisafans_dir, "0026_Raichu.html");
        std::fs::write(config.paths.pokewiki_dir.join("0026_Raichu.html"), "").unwrap();
        // English page of 0026 claims index 25: merge must refuse it.
        let entries = discover(&config.paths).unwrap();
        assert_eq!(entries.len(), 2);

        let counts = run(&entries, &config).unwrap();
        assert_eq!(counts, BuildCounts { written: 1, skipped: 0, failed: 1 });
        assert!(!config.paths.output_dir.join("0026.xml").exists());
    }
}
