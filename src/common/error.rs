//! Error types for akane
//!
//! Every error raised inside a registered function ends up as the failure
//! message of that function, so the `Display` output of each variant is
//! written to be read on a single report line.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for akane
#[derive(Error, Debug)]
pub enum Error {
    // === Procedure Errors ===
    #[error("{0}")]
    Assertion(String),

    #[error("{0}")]
    Failed(String),

    // === Command Errors ===
    #[error("command '{command}' returned non-zero exit status {code}")]
    CommandFailed {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("failed to execute command '{command}': {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: io::Error,
    },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a generic failure from anything printable
    pub fn failed(message: impl std::fmt::Display) -> Self {
        Self::Failed(message.to_string())
    }

    /// Create a command failed error from a rendered command line
    pub fn command_failed(command: &str, code: i32, stdout: String, stderr: String) -> Self {
        Self::CommandFailed {
            command: command.to_string(),
            code,
            stdout,
            stderr,
        }
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Exit code carried by a failed external command
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::CommandFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Self::Failed(message)
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Self::Failed(message.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for Error {
    fn from(e: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Failed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_display() {
        let err = Error::command_failed("false", 1, String::new(), String::new());
        assert_eq!(
            err.to_string(),
            "command 'false' returned non-zero exit status 1"
        );
        assert_eq!(err.exit_code(), Some(1));
    }

    #[test]
    fn test_failed_from_str() {
        let err: Error = "boom".into();
        assert!(matches!(err, Error::Failed(_)));
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.exit_code(), None);
    }
}
