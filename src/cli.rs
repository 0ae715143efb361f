//! CLI struct definitions for the docgen command-line interface.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "docgen",
    version = env!("CARGO_PKG_VERSION"),
    about = "AI-powered documentation generator."
)]
pub(crate) struct Cli {
    /// Enable debug logging on stderr (overridden by RUST_LOG).
    #[clap(long, short = 'v', global = true)]
    pub verbose: bool,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Generate documentation for a source file.
    Generate {
        /// Path to source file to document
        source_file: PathBuf,
        /// Output directory for docs (defaults to `docs`, or `output_dir` in config.toml)
        #[clap(long = "output", short = 'o')]
        output_dir: Option<PathBuf>,
    },
    /// Check if documentation is still accurate for a source file.
    Check {
        /// Source file to check docs against
        source_file: PathBuf,
    },
    /// List all generated documentation entries.
    List {
        /// Filter by status (current/stale/error)
        #[clap(long, short = 's')]
        status: Option<String>,
        /// Output format: 'text' or 'json'.
        #[clap(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Stop tracking a source file.
    Remove {
        /// Tracked source file
        source_file: PathBuf,
        /// Also delete the generated markdown file
        #[clap(long)]
        delete_doc: bool,
    },
    /// Print a one-paragraph summary of a source file.
    Summarize {
        /// Path to source file to summarize
        source_file: PathBuf,
    },
}
