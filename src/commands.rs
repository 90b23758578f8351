//! CLI command definitions
//!
//! Defines the clap commands for the akane CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run YAML suite files
    Run {
        /// Suite files, each run as an independent suite
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Configuration file (default: the per-user config.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate YAML suite files without running them
    Check {
        /// Suite files to validate
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}
