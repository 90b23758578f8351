//! Phase runner

use super::registry::Registered;

/// Tally of one phase run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseResult {
    pub successful: usize,
    pub failed: usize,
}

impl PhaseResult {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

impl From<PhaseResult> for (usize, usize) {
    fn from(result: PhaseResult) -> Self {
        (result.successful, result.failed)
    }
}

/// Run a sequence of registered functions in order
///
/// With `fail_fast` the remaining functions are skipped after the first
/// failure. The runner itself never fails.
pub fn run_phase(sequence: &[Registered], fail_fast: bool) -> PhaseResult {
    let mut result = PhaseResult::default();

    for registered in sequence {
        if registered.invoke().is_success() {
            result.successful += 1;
        } else {
            result.failed += 1;
            if fail_fast {
                tracing::debug!(name = %registered.name(), "stopping phase after first failure");
                break;
            }
        }
    }

    result
}
