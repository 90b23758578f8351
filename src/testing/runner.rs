//! Suite file runner
//!
//! Registers every step of a suite file as a setup, test or teardown
//! function on a [`Suite`] and drives it with `run_all`.

use std::path::Path;

use crate::assertions::{assert_eq, assert_true};
use crate::common::config::{Config, ExecConfig};
use crate::common::{Error, Result};
use crate::helper::{Exec, ProcessOutput};
use crate::procedures::{PhaseKind, Suite};

use super::config::{Expectation, Scenario, Step, StepCommand};

/// Load and validate a suite file
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
    let scenario = Scenario::parse(&content).map_err(|e| match e {
        Error::Yaml(e) => Error::Config(format!(
            "Failed to parse suite file '{}': {}",
            path.display(),
            e
        )),
        other => other,
    })?;
    tracing::debug!(path = %path.display(), steps = scenario.step_count(), "loaded suite file");
    Ok(scenario)
}

/// Register all steps of `scenario` on `suite`
pub fn register_scenario(suite: &mut Suite, scenario: &Scenario, exec: &ExecConfig) -> Result<()> {
    let phases = [
        (PhaseKind::Setup, &scenario.setup),
        (PhaseKind::Test, &scenario.tests),
        (PhaseKind::Teardown, &scenario.teardown),
    ];

    for (kind, steps) in phases {
        for step in steps {
            let command = build_command(step, &scenario.env, exec)?;
            let expect = step.expect.as_ref().map(ExpectationCheck::from).unwrap_or_default();
            let label = step.label();
            suite.register(kind, Some(&label), move || run_step(&command, &expect));
        }
    }
    Ok(())
}

/// Load, register and run a suite file, returning the failure count
pub fn run_scenario(path: &Path, config: &Config) -> Result<usize> {
    let scenario = load_scenario(path)?;
    let mut suite = Suite::with_config(&config.output);
    register_scenario(&mut suite, &scenario, &config.exec)?;

    suite.header(&scenario.name, scenario.description.as_deref());
    Ok(suite.run_all())
}

fn build_command(
    step: &Step,
    env: &std::collections::BTreeMap<String, String>,
    exec: &ExecConfig,
) -> Result<Exec> {
    let mut command = match step.command()? {
        StepCommand::Shell(script) => Exec::shell_with(exec, script),
        StepCommand::Run(argv) => Exec::new(argv),
    };
    for (key, value) in env.iter().chain(&step.env) {
        command = command.env(key, value);
    }
    if let Some(input) = &step.input {
        command = command.input(input.as_bytes());
    }
    let checks_exit_code = step.expect.as_ref().is_some_and(|e| e.exit_code.is_some());
    if checks_exit_code {
        command = command.unchecked();
    }
    Ok(command)
}

/// Owned copy of a step's expectations, moved into the registered closure
#[derive(Debug, Clone, Default)]
struct ExpectationCheck {
    exit_code: Option<i32>,
    stdout: Option<String>,
    stdout_contains: Option<String>,
    stderr: Option<String>,
    stderr_contains: Option<String>,
}

impl From<&Expectation> for ExpectationCheck {
    fn from(e: &Expectation) -> Self {
        Self {
            exit_code: e.exit_code,
            stdout: e.stdout.clone(),
            stdout_contains: e.stdout_contains.clone(),
            stderr: e.stderr.clone(),
            stderr_contains: e.stderr_contains.clone(),
        }
    }
}

fn run_step(command: &Exec, expect: &ExpectationCheck) -> Result<()> {
    let output = command.output()?;
    tracing::trace!(stdout = %output.stdout, stderr = %output.stderr, "captured output");
    check_output(&output, expect)
}

fn check_output(output: &ProcessOutput, expect: &ExpectationCheck) -> Result<()> {
    if let Some(code) = expect.exit_code {
        assert_eq(code, output.code, Some("exit code"))?;
    }
    if let Some(stdout) = &expect.stdout {
        assert_eq(stdout.as_str(), output.stdout.as_str(), Some("stdout"))?;
    }
    if let Some(needle) = &expect.stdout_contains {
        assert_true(
            output.stdout.contains(needle.as_str()),
            Some(&format!("stdout contains '{}'", needle)),
        )?;
    }
    if let Some(stderr) = &expect.stderr {
        assert_eq(stderr.as_str(), output.stderr.as_str(), Some("stderr"))?;
    }
    if let Some(needle) = &expect.stderr_contains {
        assert_true(
            output.stderr.contains(needle.as_str()),
            Some(&format!("stderr contains '{}'", needle)),
        )?;
    }
    Ok(())
}
