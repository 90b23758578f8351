//! CLI command handling
//!
//! Dispatches CLI commands and turns their results into a failure count.

use std::path::Path;

use colored::Colorize;

use crate::commands::Commands;
use crate::common::{Config, Result};
use crate::testing;

/// Dispatch a CLI command, returning the number of failures
pub fn dispatch(command: Commands) -> Result<usize> {
    match command {
        Commands::Run { paths, config } => {
            let config = match config {
                Some(path) => Config::load_from(&path)?,
                None => Config::load()?,
            };
            config.exec.resolve_shell()?;

            let mut failures = 0;
            for path in &paths {
                failures += run_one(path, &config);
            }
            Ok(failures)
        }

        Commands::Check { paths } => {
            let mut failures = 0;
            for path in &paths {
                match testing::load_scenario(path) {
                    Ok(scenario) => println!(
                        "{} {} ({} steps)",
                        "✓".green(),
                        path.display(),
                        scenario.step_count()
                    ),
                    Err(e) => {
                        println!("{} {}: {}", "✗".red(), path.display(), e);
                        failures += 1;
                    }
                }
            }
            Ok(failures)
        }
    }
}

/// Run one suite file; a file that cannot be loaded counts as one failure
fn run_one(path: &Path, config: &Config) -> usize {
    match testing::run_scenario(path, config) {
        Ok(failures) => {
            println!();
            failures
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "suite file could not be run");
            println!("{} {}: {}\n", "✗".red(), path.display(), e);
            1
        }
    }
}
