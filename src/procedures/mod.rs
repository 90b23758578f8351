//! Setup, test and teardown procedures
//!
//! Functions are registered on a [`Suite`] and executed phase by phase.
//! Each invocation is classified into an [`Outcome`] and reported on the
//! console as it happens.

mod console;
mod outcome;
mod registry;
mod runner;
mod suite;

pub use outcome::{IntoOutcome, Outcome, RETURNED_FALSE};
pub use registry::{PhaseKind, Registered};
pub use runner::{run_phase, PhaseResult};
pub use suite::{exit_code, Suite};
