mod catalog;
mod config;
mod error;
mod merge;
mod model;
mod parser;
mod validate;
mod xml;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use config::Config;

#[derive(Parser)]
#[command(name = "pokedex_xml", about = "Bilingual Pokédex documents from saved wiki pages")]
struct Cli {
    /// Config file (default: ./pokedex.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, merge and write one document per creature
    Build {
        /// Max creatures to process (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Build one creature and print the merged record as JSON
    Show {
        /// National index number
        index: u32,
    },
    /// Check produced documents against the output schema
    Validate {
        /// Directory of documents (default: configured output directory)
        dir: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Build { limit } => {
            let mut entries = catalog::discover(&config.paths)?;
            if let Some(n) = limit {
                entries.truncate(n);
            }
            if entries.is_empty() {
                println!("No source pages found. Check the configured data directories.");
                return Ok(());
            }
            println!(
                "Building {} documents into {}...",
                entries.len(),
                config.paths.output_dir.display()
            );
            let counts = catalog::run(&entries, &config)?;
            counts.print();
            Ok(())
        }
        Commands::Show { index } => {
            let entries = catalog::discover(&config.paths)?;
            let entry = entries
                .iter()
                .find(|e| e.index == index)
                .with_context(|| format!("No source pages for index {}", index))?;
            let record = catalog::build(entry, &config)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Commands::Validate { dir } => {
            let dir = dir.unwrap_or_else(|| config.paths.output_dir.clone());
            let report = validate::validate_dir(&dir)?;
            let mut failed = 0;
            for (path, violations) in &report {
                if violations.is_empty() {
                    println!("ok    {}", path.display());
                } else {
                    failed += 1;
                    println!("FAIL  {}", path.display());
                    for v in violations {
                        println!("        {}", v);
                    }
                }
            }
            println!("\n{} documents, {} valid, {} invalid.", report.len(), report.len() - failed, failed);
            if failed > 0 {
                bail!("{} documents violate the schema", failed);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
