mod composition;
mod era;
mod mask;
mod matcher;
mod normalize;
mod numeral;
mod resolve;
mod rules;
mod surface;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use timex_types::Document;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use crate::era::EraTable;
use crate::normalize::Normalizer;
use crate::rules::RuleSet;

#[derive(Parser)]
#[command(
    name = "timex_norm",
    about = "Rule-based normalizer for Japanese temporal expressions"
)]
struct Cli {
    /// Rule table overriding the builtin one
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    /// Era table overriding the builtin one
    #[arg(long, global = true)]
    eras: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize one document JSON, pretty-printed to stdout
    Normalize {
        /// Path to a document file
        file: PathBuf,
    },
    /// Normalize every *.json under a directory, one JSON line per file
    Batch {
        /// Directory to walk
        dir: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let normalizer = build_normalizer(cli.rules.as_deref(), cli.eras.as_deref());

    match cli.command {
        Command::Normalize { file } => run_normalize(&normalizer, &file),
        Command::Batch { dir } => run_batch(&normalizer, &dir),
    }
}

fn build_normalizer(rules: Option<&Path>, eras: Option<&Path>) -> Normalizer {
    let rules = match rules {
        Some(path) => RuleSet::from_json_file(path).unwrap_or_else(|e| {
            eprintln!("Cannot load rule table {}: {e}", path.display());
            std::process::exit(1);
        }),
        None => RuleSet::builtin(),
    };
    let eras = match eras {
        Some(path) => EraTable::from_json_file(path).unwrap_or_else(|e| {
            eprintln!("Cannot load era table {}: {e}", path.display());
            std::process::exit(1);
        }),
        None => EraTable::builtin(),
    };
    Normalizer::with_tables(rules, eras)
}

fn read_document(path: &Path) -> Document {
    let json = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Cannot read {}: {e}", path.display());
        std::process::exit(1);
    });
    serde_json::from_str(&json).unwrap_or_else(|e| {
        eprintln!("Cannot parse {}: {e}", path.display());
        std::process::exit(1);
    })
}

fn run_normalize(normalizer: &Normalizer, file: &Path) {
    let doc = read_document(file);
    let timexes = normalizer.normalize(&doc);
    let json = serde_json::to_string_pretty(&timexes).expect("JSON serialization failed");
    println!("{json}");
}

fn run_batch(normalizer: &Normalizer, dir: &Path) {
    #[derive(serde::Serialize)]
    struct BatchLine<'a> {
        file: String,
        timexes: &'a [timex_types::TimexValue],
    }

    let mut n_files = 0usize;
    let mut n_timexes = 0usize;
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                eprintln!("Cannot walk {}: {e}", dir.display());
                continue;
            }
        };
        if !entry.file_type().is_file()
            || entry.path().extension().is_none_or(|ext| ext != "json")
        {
            continue;
        }
        let doc = read_document(entry.path());
        let timexes = normalizer.normalize(&doc);
        n_files += 1;
        n_timexes += timexes.len();
        let line = BatchLine {
            file: entry.path().display().to_string(),
            timexes: &timexes,
        };
        let json = serde_json::to_string(&line).expect("JSON serialization failed");
        println!("{json}");
    }
    eprintln!("Normalized {n_timexes} expressions across {n_files} files");
}
