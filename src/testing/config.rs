//! Suite file configuration types
//!
//! Defines the data structures for deserializing YAML suite files.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::common::{Error, Result};

/// A complete suite loaded from a YAML file
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Name of the suite
    pub name: String,
    /// Optional description of what the suite verifies
    pub description: Option<String>,
    /// Environment variables passed to every command
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Steps run before the tests; the first failure cancels the run
    #[serde(default)]
    pub setup: Vec<Step>,
    #[serde(default)]
    pub tests: Vec<Step>,
    /// Steps run after the tests, whether they passed or not
    #[serde(default)]
    pub teardown: Vec<Step>,
}

/// A single command registered as setup, test or teardown
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Display name; defaults to the command text
    pub name: Option<String>,
    /// Script run through the configured shell
    pub shell: Option<String>,
    /// Argument vector executed directly
    pub run: Option<Vec<String>>,
    /// Text written to the command's stdin
    pub input: Option<String>,
    /// Additional environment variables for this step only
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Expectations on the finished command
    pub expect: Option<Expectation>,
}

/// Expectations for a finished command
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    /// Expected exit code; without it any non-zero exit fails the step
    pub exit_code: Option<i32>,
    /// Expected exact stdout
    pub stdout: Option<String>,
    /// Expected substring of stdout
    pub stdout_contains: Option<String>,
    /// Expected exact stderr
    pub stderr: Option<String>,
    /// Expected substring of stderr
    pub stderr_contains: Option<String>,
}

/// What a step executes
#[derive(Debug, Clone, Copy)]
pub enum StepCommand<'a> {
    Shell(&'a str),
    Run(&'a [String]),
}

impl Step {
    /// Resolve the command of this step
    ///
    /// Exactly one of `shell` and `run` must be given, and `run` must not
    /// be empty.
    pub fn command(&self) -> Result<StepCommand<'_>> {
        match (&self.shell, &self.run) {
            (Some(script), None) => Ok(StepCommand::Shell(script)),
            (None, Some(argv)) if !argv.is_empty() => Ok(StepCommand::Run(argv)),
            (None, Some(_)) => Err(Error::Config(format!(
                "step '{}' has an empty 'run' list",
                self.label()
            ))),
            (Some(_), Some(_)) => Err(Error::Config(format!(
                "step '{}' sets both 'shell' and 'run'",
                self.label()
            ))),
            (None, None) => Err(Error::Config(format!(
                "step '{}' needs either 'shell' or 'run'",
                self.label()
            ))),
        }
    }

    /// Name shown in the report
    pub fn label(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match (&self.shell, &self.run) {
            (Some(script), _) => script.clone(),
            (None, Some(argv)) => argv.join(" "),
            (None, None) => "<unnamed>".to_string(),
        }
    }
}

impl Scenario {
    /// Parse and validate a suite from YAML text
    pub fn parse(content: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        for step in self.setup.iter().chain(&self.tests).chain(&self.teardown) {
            step.command()?;
        }
        Ok(())
    }

    /// Total number of steps across all phases
    pub fn step_count(&self) -> usize {
        self.setup.len() + self.tests.len() + self.teardown.len()
    }
}
