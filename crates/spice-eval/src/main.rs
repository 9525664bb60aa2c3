//! SPICE evaluation tool.
//!
//! Scores candidate captions against reference captions by comparing the
//! propositions of their scene graphs. Graphs are produced by an external
//! parser; the `input` module documents the file format.
//!
//! # Usage
//!
//! ```bash
//! # Score a batch and print the report
//! spice-eval graphs.json
//!
//! # Write the per-item score log, with matched tuples
//! spice-eval graphs.json --output scores.json --detailed
//!
//! # Synonym-aware matching with idf weights and a novelty category
//! spice-eval graphs.json --synsets --idf --novelty-tuples train-tuples.json
//!
//! # Compare against a previous run
//! spice-eval graphs.json --baseline baseline-scores.json --json
//! ```

mod input;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use spice_core::config::{DEFAULT_BOOTSTRAP_SAMPLES, DEFAULT_BOOTSTRAP_SEED};
use spice_core::evaluation::ScoringSession;
use spice_core::filter::FilterRegistry;
use spice_core::tuples::TupleSet;
use spice_core::weighting::DocumentFrequencyTable;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Category name of the novelty filter.
const NOVEL_CATEGORY: &str = "Novel";

// =============================================================================
// CLI
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "spice-eval", version)]
#[command(about = "Score captions by the semantic propositions they share with references")]
struct Args {
    /// Scene graph items (JSON array of {image_id, test, refs})
    input: PathBuf,

    /// Write the per-item score log to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include candidate and reference tuples with truth values in the log
    #[arg(long)]
    detailed: bool,

    /// Match concepts by shared sense ids as well as word forms
    #[arg(long)]
    synsets: bool,

    /// Keep repeated mentions as separate graph nodes
    #[arg(long)]
    no_merge: bool,

    /// Weight propositions by inverse document frequency over the references
    #[arg(long)]
    idf: bool,

    /// Training tuple files for the Novel category
    #[arg(long, num_args = 1..)]
    novelty_tuples: Vec<PathBuf>,

    /// Score only the All category
    #[arg(long)]
    no_categories: bool,

    /// Score log of a baseline run to compare against
    #[arg(long)]
    baseline: Option<PathBuf>,

    /// Bootstrap resamples for the confidence interval
    #[arg(long, default_value_t = DEFAULT_BOOTSTRAP_SAMPLES)]
    bootstrap: usize,

    /// Bootstrap seed
    #[arg(long, default_value_t = DEFAULT_BOOTSTRAP_SEED)]
    seed: u64,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    run(&args)
}

// =============================================================================
// Scoring
// =============================================================================

fn build_filters(args: &Args) -> Result<FilterRegistry> {
    let mut filters = if args.no_categories {
        FilterRegistry::new()
    } else {
        FilterRegistry::standard()
    };
    if !args.novelty_tuples.is_empty() {
        let novelty = input::load_novelty_filter(&args.novelty_tuples)?;
        filters.register(NOVEL_CATEGORY, Arc::new(novelty))?;
    }
    Ok(filters)
}

fn progress_bar(len: usize, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(ProgressStyle::default_bar().template("{msg} [{bar:40}] {pos}/{len}")?);
    pb.set_message("Scoring");
    Ok(pb)
}

fn run(args: &Args) -> Result<()> {
    let items = input::load_items(&args.input, !args.no_merge)?;
    info!("Loaded {} items from {}", items.len(), args.input.display());

    let mut session = ScoringSession::new(build_filters(args)?).detailed(args.detailed);
    if args.idf {
        let references: Vec<TupleSet> = items
            .iter()
            .map(|item| TupleSet::from_graph(&item.reference))
            .collect();
        let table = DocumentFrequencyTable::from_documents(&references);
        info!("Built document frequencies over {} references", table.num_documents());
        session = session.with_weights(Arc::new(table));
    }

    let pb = progress_bar(items.len(), args.json)?;
    for item in &items {
        session.score(item.image_id.clone(), &item.test, &item.reference, args.synsets);
        pb.inc(1);
    }
    pb.finish_and_clear();

    if let Some(path) = &args.output {
        let log = session.to_json().context("Failed to serialize score log")?;
        fs::write(path, log).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote score log to {}", path.display());
    }

    let comparison = match &args.baseline {
        Some(path) => {
            let baseline = input::load_score_log(path)?;
            let name = path.display().to_string();
            Some(output::compare(&name, session.items(), &baseline))
        }
        None => None,
    };

    let summary = output::summarize(&session, args.bootstrap, args.seed, comparison)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        output::print_report(&session, &summary);
    }
    Ok(())
}
