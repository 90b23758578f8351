//! Suite orchestration
//!
//! A [`Suite`] owns its registry and report sink. `run_all` sequences the
//! phases: setups fail fast and cancel the run, every test always runs,
//! and teardowns run on every exit path from the test phase.

use std::cell::RefCell;
use std::io::Write;
use std::process::ExitCode;
use std::rc::Rc;

use super::console::Console;
use super::outcome::IntoOutcome;
use super::registry::{PhaseKind, Registered, Registry};
use super::runner::{run_phase, PhaseResult};
use crate::common::config::OutputConfig;

/// Independent set of setup, test and teardown functions
pub struct Suite {
    console: Rc<RefCell<Console>>,
    registry: Registry,
}

impl Default for Suite {
    fn default() -> Self {
        Self::new()
    }
}

impl Suite {
    /// Suite reporting to stdout with default output settings
    pub fn new() -> Self {
        Self::with_config(&OutputConfig::default())
    }

    /// Suite reporting to stdout
    pub fn with_config(config: &OutputConfig) -> Self {
        Self::from_console(Console::stdout(config))
    }

    /// Suite reporting to an arbitrary sink
    pub fn with_writer(out: Box<dyn Write>, config: &OutputConfig, color: bool) -> Self {
        Self::from_console(Console::new(out, config, color))
    }

    fn from_console(console: Console) -> Self {
        let console = Rc::new(RefCell::new(console));
        Self {
            registry: Registry::new(Rc::clone(&console)),
            console,
        }
    }

    /// Register a function for `kind`
    pub fn register<F, R>(&mut self, kind: PhaseKind, name: Option<&str>, function: F) -> Registered
    where
        F: Fn() -> R + 'static,
        R: IntoOutcome,
    {
        self.registry.register(kind, name, function)
    }

    /// Register a setup function
    ///
    /// Setups run in registration order and the first failure cancels the
    /// whole run, teardowns included.
    pub fn setup<F, R>(&mut self, name: Option<&str>, function: F) -> Registered
    where
        F: Fn() -> R + 'static,
        R: IntoOutcome,
    {
        self.register(PhaseKind::Setup, name, function)
    }

    /// Register a test function
    ///
    /// A test fails when it returns `false`, `(false, message)`, an `Err`,
    /// or panics. Failing tests never stop the remaining tests.
    pub fn test<F, R>(&mut self, name: Option<&str>, function: F) -> Registered
    where
        F: Fn() -> R + 'static,
        R: IntoOutcome,
    {
        self.register(PhaseKind::Test, name, function)
    }

    /// Register a teardown function
    pub fn teardown<F, R>(&mut self, name: Option<&str>, function: F) -> Registered
    where
        F: Fn() -> R + 'static,
        R: IntoOutcome,
    {
        self.register(PhaseKind::Teardown, name, function)
    }

    pub fn registered(&self, kind: PhaseKind) -> &[Registered] {
        self.registry.sequence(kind)
    }

    /// Print a title block ahead of the run
    pub fn header(&self, title: &str, description: Option<&str>) {
        self.console.borrow_mut().header(title, description);
    }

    /// Run all setups, stopping at the first failure
    pub fn run_setups(&self) -> PhaseResult {
        run_phase(self.registry.sequence(PhaseKind::Setup), true)
    }

    /// Run all tests in registration order
    pub fn run_tests(&self) -> PhaseResult {
        run_phase(self.registry.sequence(PhaseKind::Test), false)
    }

    /// Run all teardowns in registration order
    pub fn run_teardowns(&self) -> PhaseResult {
        run_phase(self.registry.sequence(PhaseKind::Teardown), false)
    }

    /// Run setups, tests and teardowns, then print a summary
    ///
    /// Returns the setup failure count when setup failed, otherwise the
    /// number of failed tests plus failed teardowns.
    pub fn run_all(&self) -> usize {
        let setups = self.run_setups();
        if !setups.is_success() {
            self.console.borrow_mut().canceled();
            tracing::info!(failed = setups.failed, "setup failed, run canceled");
            return setups.failed;
        }

        let guard = TeardownGuard::arm(self);
        self.console.borrow_mut().delimiter();
        let tests = self.run_tests();
        let teardowns = guard.finish();

        self.console
            .borrow_mut()
            .summary(tests.successful, tests.failed, teardowns.failed);
        tracing::info!(
            tests_successful = tests.successful,
            tests_failed = tests.failed,
            teardowns_failed = teardowns.failed,
            "run finished"
        );

        tests.failed + teardowns.failed
    }

    fn delimited_teardowns(&self) -> PhaseResult {
        self.console.borrow_mut().delimiter();
        self.run_teardowns()
    }
}

/// Runs the teardown phase when dropped unless [`finish`](Self::finish)
/// already did
struct TeardownGuard<'a> {
    suite: &'a Suite,
    armed: bool,
}

impl<'a> TeardownGuard<'a> {
    fn arm(suite: &'a Suite) -> Self {
        Self { suite, armed: true }
    }

    fn finish(mut self) -> PhaseResult {
        self.armed = false;
        self.suite.delimited_teardowns()
    }
}

impl Drop for TeardownGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("test phase unwound, running teardowns");
            self.suite.delimited_teardowns();
        }
    }
}

/// Convert a failure count into a process exit code
///
/// Counts above 255 are clamped so they never wrap around to success.
pub fn exit_code(failures: usize) -> ExitCode {
    ExitCode::from(u8::try_from(failures).unwrap_or(u8::MAX))
}
