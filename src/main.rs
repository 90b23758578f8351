//! akane - run YAML suites of setup, test and teardown commands
//!
//! The process exit code is the number of failed steps, clamped to 255.

use std::process::ExitCode;

use akane::{cli, commands::Commands, common::logging, exit_code};
use clap::Parser;

#[derive(Parser)]
#[command(name = "akane", about = "Run setup/test/teardown procedures")]
#[command(version, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    match cli::dispatch(cli.command) {
        Ok(failures) => exit_code(failures),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
