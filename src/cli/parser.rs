use crate::models::Mode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface definition for tcxlog
/// CLI application to collect TCX workout data into a workbook and a SQLite document store
#[derive(Parser)]
#[command(
    name = "tcxlog",
    version = env!("CARGO_PKG_VERSION"),
    about = "Ingest TCX workout files into an Excel workbook and a SQLite document store, then summarize them",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Show the effective configuration
    Config {
        /// Print the current configuration to stdout
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,
    },

    /// Print the internal log table
    Log {
        /// Print rows from the internal `log` table
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Ingest a TCX file, or every .tcx file of a directory
    Ingest {
        /// TCX file or directory containing TCX files
        input: PathBuf,

        /// Workbook to write (default: `output` from the configuration)
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,

        /// Which records to produce: summary, detail (alias: detailed) or both
        #[arg(long, short = 'm', value_enum)]
        mode: Option<Mode>,

        /// Write only the workbook, skip the document store
        #[arg(long = "no-store")]
        no_store: bool,
    },

    /// Per-file totals and record holders from the document store
    Summary,

    /// Sampled per-trackpoint view from the document store
    Detail {
        /// Only show this source file
        #[arg(long, value_name = "NAME")]
        source: Option<String>,

        /// Print the structured rows (with merge info) as JSON
        #[arg(long)]
        json: bool,
    },
}
