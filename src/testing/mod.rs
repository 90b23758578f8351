//! YAML suite files
//!
//! A declarative front-end over [`Suite`](crate::procedures::Suite): each
//! step of a suite file runs an external command and checks its exit code
//! and output.

mod config;
mod runner;

pub use config::*;
pub use runner::{load_scenario, register_scenario, run_scenario};
