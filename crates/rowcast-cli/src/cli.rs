//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rowcast: typed ingestion for tabular data
#[derive(Parser)]
#[command(name = "rowcast")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe a file and print its synthesized schema
    Schema {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Rows to probe for type guessing and the preview scan
        #[arg(long, default_value = "1000")]
        probe: usize,

        /// Distinct nominal values kept per column before the preview
        /// degrades to a lower bound
        #[arg(long, default_value = "100")]
        max_values: usize,

        /// Treat the first row as data, not column names
        #[arg(long)]
        no_header: bool,

        /// Explicit chrono date pattern (e.g. "%d.%m.%Y")
        #[arg(long)]
        date_format: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Translate a file into a typed table and report the outcome
    Translate {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Abort on the first unconvertible cell instead of recording it
        #[arg(long)]
        strict: bool,

        /// Maximum data rows to materialize
        #[arg(long)]
        max_rows: Option<usize>,

        /// Treat the first row as data, not column names
        #[arg(long)]
        no_header: bool,

        /// Explicit chrono date pattern (e.g. "%d.%m.%Y")
        #[arg(long)]
        date_format: Option<String>,

        /// Reuse a saved column configuration instead of guessing
        #[arg(long)]
        config: Option<PathBuf>,

        /// Save the guessed column configuration for later runs
        #[arg(long)]
        save_config: Option<PathBuf>,
    },
}
