//! CLI parse: clap types for cratepack. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cratepack CLI - build and verify training-module crates
#[derive(Parser)]
#[command(name = "cratepack")]
#[command(about = "Build and verify integrity-checked training-module crates")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Suppress all logging
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build one module source directory into a crate
    Build {
        /// Module source directory
        source: PathBuf,

        /// Output directory (defaults to the configured crates directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Build every module subdirectory, isolating per-module failures
    Batch {
        /// Directory containing module source directories
        modules_dir: PathBuf,

        /// Output directory (defaults to the configured crates directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Verify a crate's content digests against its manifest
    Verify {
        /// Crate file path, or a module identifier resolved via the crates directory
        target: String,

        /// Crates directory to resolve identifiers in
        #[arg(long)]
        crates_dir: Option<PathBuf>,
    },
    /// Print a crate's manifest summary
    Inspect {
        /// Crate file path, or a module identifier resolved via the crates directory
        target: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Crates directory to resolve identifiers in
        #[arg(long)]
        crates_dir: Option<PathBuf>,
    },
    /// List crates discovered in the crates directory
    List {
        /// Crates directory to scan
        #[arg(long)]
        crates_dir: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
