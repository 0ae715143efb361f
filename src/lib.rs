//! docgen: AI-powered documentation for source files.
//!
//! `docgen` sends a source file to a chat-completions model, writes the
//! returned markdown next to your project, and records the pairing in a local
//! ledger so later runs can tell whether the docs still match the code.
//!
//! # Commands
//!
//! ```bash
//! # Write docs/example.md and start tracking example.py
//! docgen generate example.py
//!
//! # Ask the model whether docs still hold (skipped when the file is unchanged)
//! docgen check example.py
//!
//! # Show the ledger, optionally filtered
//! docgen list --status stale
//! ```
//!
//! # Ledger
//!
//! The ledger lives at `~/.docgen/docs.json` (or `$DOCGEN_HOME/docs.json`).
//! Freshness is decided by SHA-256 of the source bytes, never by timestamps.
//!
//! # Crate Structure
//!
//! - [`core::entry`](crate::core::entry): ledger record and status types
//! - [`core::store`](crate::core::store): the JSON ledger
//! - [`core::llm`](crate::core::llm): the model seam and its OpenAI implementation
//! - [`core::workflow`](crate::core::workflow): generate / check / list / remove / summarize
//! - [`core::tui`](crate::core::tui): operator-facing output

mod cli;
pub mod core;

use clap::Parser;
use cli::{Cli, Command, OutputFormat};
use crate::core::{
    config::{self, Config},
    entry::DocStatus,
    error::DocgenError,
    llm::{OpenAiGenerator, TextGenerator},
    store::LedgerStore,
    tui,
    workflow::{self, CheckOutcome, Workflow},
};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "warn,docgen=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run() -> Result<(), DocgenError> {
    let cli = Cli::parse();
    let dotenv = config::load_dotenv();
    init_logging(cli.verbose);
    match dotenv {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "loaded .env"),
        Ok(None) => {}
        Err(e) => tracing::warn!("ignoring .env: {}", e),
    }

    validate_args(&cli.command)?;
    let config = Config::load()?;
    tracing::debug!(
        home = %config.home.display(),
        config_file = %config.config_path().display(),
        model = %config.model,
        "configuration resolved"
    );

    let store = LedgerStore::in_dir(&config.home);
    let workflow = Workflow::new(store, OpenAiGenerator::new(&config)?);
    dispatch(cli.command, &workflow, &config)
}

/// Argument checks that need neither configuration nor the ledger, so a bad
/// path is reported as invalid input even when `config.toml` is broken.
fn validate_args(command: &Command) -> Result<(), DocgenError> {
    match command {
        Command::Generate { source_file, .. }
        | Command::Check { source_file }
        | Command::Summarize { source_file } => workflow::require_file(source_file),
        Command::List {
            status: Some(status),
            ..
        } => status.parse::<DocStatus>().map(|_| ()),
        Command::List { status: None, .. } | Command::Remove { .. } => Ok(()),
    }
}

fn dispatch<G: TextGenerator>(
    command: Command,
    workflow: &Workflow<G>,
    config: &Config,
) -> Result<(), DocgenError> {
    match command {
        Command::Generate {
            source_file,
            output_dir,
        } => {
            let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
            let outcome = workflow.generate(&source_file, &output_dir)?;
            let verb = if outcome.created { "Generated" } else { "Updated" };
            tui::success(&format!("{}: {}", verb, outcome.doc_path.display()));
        }
        Command::Check { source_file } => match workflow.check(&source_file)? {
            CheckOutcome::UpToDate => {
                tui::success(&format!(
                    "Docs are up to date for {}",
                    source_file.display()
                ));
            }
            CheckOutcome::Stale { report } => {
                tui::warning(&format!("Docs may be stale for {}", source_file.display()));
                tui::info(&report);
            }
        },
        Command::List { status, format } => {
            let listing = workflow.list(status.as_deref())?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&listing)?);
                }
                OutputFormat::Text if listing.entries.is_empty() => {
                    tui::warning("No documentation entries found");
                }
                OutputFormat::Text => tui::table(&listing.entries),
            }
        }
        Command::Remove {
            source_file,
            delete_doc,
        } => {
            let outcome = workflow.remove(&source_file, delete_doc)?;
            if outcome.removed > 1 {
                tui::success(&format!(
                    "Removed: {} ({} duplicate entries)",
                    source_file.display(),
                    outcome.removed
                ));
            } else {
                tui::success(&format!("Removed: {}", source_file.display()));
            }
            if let Some(doc) = outcome.deleted_doc {
                tui::info(&format!("Deleted {}", doc.display()));
            } else if delete_doc {
                tui::warning("Doc file was already gone");
            }
        }
        Command::Summarize { source_file } => {
            let summary = workflow.summarize(&source_file)?;
            tui::info(&summary);
        }
    }
    Ok(())
}
