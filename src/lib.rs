//! akane - simple, strongly typed setup/test/teardown procedures
//!
//! Register functions on a [`Suite`], then run them with
//! [`Suite::run_all`]: setups first (the first failure cancels the run),
//! then every test, then every teardown, followed by a summary. The
//! returned failure count is meant to become the process exit code.
//!
//! ```no_run
//! use akane::{assertions::assert_eq, exit_code, Suite};
//!
//! fn main() -> std::process::ExitCode {
//!     let mut suite = Suite::new();
//!     suite.test(Some("arithmetic"), || assert_eq(4, 2 + 2, None));
//!     suite.test(Some("explicit failure"), || (false, "whoops"));
//!     exit_code(suite.run_all())
//! }
//! ```

pub mod assertions;
pub mod cli;
pub mod commands;
pub mod common;
pub mod helper;
pub mod procedures;
pub mod testing;

pub use common::{Config, Error, Result};
pub use helper::{exec, exec_process, Exec, ProcessOutput, RawOutput};
pub use procedures::{exit_code, IntoOutcome, Outcome, PhaseKind, PhaseResult, Registered, Suite};
