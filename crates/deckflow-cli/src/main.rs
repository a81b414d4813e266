//! Deckflow - outline reconciliation CLI
//!
//! The `deckflow` command reconciles an agent-authored outline with an edited
//! copy, both given as JSON files.
//!
//! ## Commands
//!
//! - `diff`: Show what changed between the canonical and the edited outline
//! - `merge`: Fold the edits into the canonical outline
//! - `config`: Print the effective settings

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deckflow_core::{
    write_reconcile_report_json, DeckflowSettings, ReconcileReportArtifact, SessionReconciler,
};
use outline_reconcile::{compute_diff_with, DiffReport, MergeStrategy, Outline};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "deckflow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deckflow outline reconciliation", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Settings file (TOML)
    #[arg(short, long, global = true, env = "DECKFLOW_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff an edited outline against the canonical outline
    Diff {
        /// Canonical outline (JSON)
        canonical: PathBuf,

        /// Edited outline (JSON)
        target: PathBuf,

        /// Print the full diff report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Merge an edited outline into the canonical outline
    Merge {
        /// Canonical outline (JSON)
        canonical: PathBuf,

        /// Edited outline (JSON)
        target: PathBuf,

        /// Conflict strategy: target-wins, canonical-wins, merge-fields, ask-caller
        #[arg(short, long)]
        strategy: Option<MergeStrategy>,

        /// Write the merged outline here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a JSON reconciliation report here
        #[arg(long)]
        report: Option<PathBuf>,

        /// Session the merge belongs to
        #[arg(long, default_value = "cli")]
        session: String,
    },

    /// Print the effective settings as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref())?;

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        settings.log_level()?
    };
    deckflow_core::init_tracing(cli.json_logs || settings.logging.json, level);

    match cli.command {
        Commands::Diff {
            canonical,
            target,
            json,
        } => cmd_diff(&settings, &canonical, &target, json),
        Commands::Merge {
            canonical,
            target,
            strategy,
            output,
            report,
            session,
        } => {
            cmd_merge(
                &settings,
                &canonical,
                &target,
                strategy,
                output.as_deref(),
                report.as_deref(),
                &session,
            )
            .await
        }
        Commands::Config => cmd_config(&settings),
    }
}

fn load_settings(path: Option<&Path>) -> Result<DeckflowSettings> {
    match path {
        Some(path) => DeckflowSettings::load(path)
            .with_context(|| format!("Failed to load settings from {:?}", path)),
        None => DeckflowSettings::from_env().context("Invalid settings in environment"),
    }
}

fn cmd_diff(settings: &DeckflowSettings, canonical: &Path, target: &Path, json: bool) -> Result<()> {
    let canonical: Outline = read_json_file(canonical)?;
    let target: Outline = read_json_file(target)?;
    let diff = compute_diff_with(&canonical, &target, &settings.matching);

    if json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
    } else {
        println!("{}", render_diff_text(&diff));
    }
    Ok(())
}

async fn cmd_merge(
    settings: &DeckflowSettings,
    canonical_path: &Path,
    target_path: &Path,
    strategy: Option<MergeStrategy>,
    output: Option<&Path>,
    report: Option<&Path>,
    session: &str,
) -> Result<()> {
    let canonical: Outline = read_json_file(canonical_path)?;
    let target: Outline = read_json_file(target_path)?;

    let reconciler = SessionReconciler::from_settings(settings)?;
    let strategy = strategy.unwrap_or_else(|| reconciler.strategy());
    let outcome = reconciler
        .reconcile_with(session, &canonical, &target, strategy)
        .await;

    if let Some(report_path) = report {
        let artifact = ReconcileReportArtifact::new(
            session,
            &outcome.diff,
            &outcome.merge,
            chrono::Utc::now(),
        );
        write_reconcile_report_json(report_path, &artifact)?;
        info!(path = ?report_path, "wrote reconciliation report");
    }

    let Some(merged) = outcome.merge.merged_outline.as_ref() else {
        eprintln!("Merge failed ({}):", outcome.merge.strategy_used);
        for conflict in &outcome.merge.conflicts {
            eprintln!("  ! {}", conflict.reason);
        }
        anyhow::bail!("Merge failed for {:?}", canonical_path);
    };

    let rendered = serde_json::to_string_pretty(merged)?;
    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write merged outline: {:?}", path))?;
            println!(
                "Merged {} slides into {:?} ({})",
                merged.slides.len(),
                path,
                outcome.merge.strategy_used
            );
        }
        None => println!("{}", rendered),
    }

    if !outcome.merge.conflicts.is_empty() {
        eprintln!("Fields left for review:");
        for conflict in &outcome.merge.conflicts {
            eprintln!("  ? {}", render_conflict(conflict));
        }
    }

    let targets = outcome.reanalysis_targets();
    if !targets.is_empty() {
        eprintln!("Slides needing re-analysis:");
        for target in targets {
            eprintln!("  {} (position {})", target.slide_id, target.position);
        }
    }
    Ok(())
}

fn cmd_config(settings: &DeckflowSettings) -> Result<()> {
    print!("{}", settings.to_toml_string()?);
    Ok(())
}

fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
}

fn render_conflict(conflict: &outline_reconcile::MergeConflict) -> String {
    match (&conflict.slide_id, conflict.field) {
        (Some(slide_id), Some(field)) => format!(
            "{}.{}: {} -> {}",
            slide_id, field, conflict.canonical_value, conflict.target_value
        ),
        _ => conflict.reason.clone(),
    }
}

fn render_diff_text(diff: &DiffReport) -> String {
    let mut out = String::new();
    out.push_str("Outline Diff\n");
    out.push_str("============\n");
    if !diff.has_changes {
        out.push_str("no changes\n");
        return out.trim_end().to_string();
    }
    out.push_str(&format!("added: {}\n", diff.added_slides.len()));
    out.push_str(&format!("removed: {}\n", diff.removed_slide_ids.len()));
    out.push_str(&format!("modified: {}\n", diff.modified_slides.len()));
    out.push_str(&format!("reordered: {}\n", diff.reordered));

    if let Some(title) = &diff.new_title {
        out.push_str(&format!("\nTitle: {}\n", title));
    }
    if !diff.added_slides.is_empty() {
        out.push_str("\nAdded:\n");
        for slide in &diff.added_slides {
            out.push_str(&format!("  + {}\n", slide.title));
        }
    }
    if !diff.removed_slide_ids.is_empty() {
        out.push_str("\nRemoved:\n");
        for id in &diff.removed_slide_ids {
            out.push_str(&format!("  - {}\n", id));
        }
    }
    if !diff.modified_slides.is_empty() {
        out.push_str("\nModified:\n");
        for record in &diff.modified_slides {
            let fields: Vec<String> = record.changes.iter().map(|c| c.field.to_string()).collect();
            let marker = if record.needs_reanalysis { " *" } else { "" };
            out.push_str(&format!(
                "  ~ {} @{}: {}{}\n",
                record.slide_id,
                record.position_in_target,
                fields.join(", "),
                marker
            ));
        }
    }
    if let Some(order) = &diff.new_order {
        out.push_str(&format!("\nNew order: {}\n", order.join(", ")));
    }

    out.trim_end().to_string()
}
