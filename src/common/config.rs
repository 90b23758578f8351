//! Configuration file handling

use serde::Deserialize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Console report settings
    #[serde(default)]
    pub output: OutputConfig,

    /// External command settings
    #[serde(default)]
    pub exec: ExecConfig,
}

/// When to emit ANSI colors in the report
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Color only when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve the mode against the current stdout and `NO_COLOR`
    pub fn enabled(self) -> bool {
        match self {
            ColorMode::Auto => {
                std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
            }
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Console report configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Column width of the "Running ..." start line
    #[serde(default = "default_name_width")]
    pub name_width: usize,

    /// Length of the delimiter printed between phases
    #[serde(default = "default_delimiter_width")]
    pub delimiter_width: usize,

    #[serde(default)]
    pub color: ColorMode,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            name_width: default_name_width(),
            delimiter_width: default_delimiter_width(),
            color: ColorMode::default(),
        }
    }
}

fn default_name_width() -> usize {
    60
}
fn default_delimiter_width() -> usize {
    65
}

/// External command configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExecConfig {
    /// Shell used for `shell:` steps and `Exec::shell`
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Arguments placed between the shell and the script
    #[serde(default = "default_shell_args")]
    pub shell_args: Vec<String>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            shell_args: default_shell_args(),
        }
    }
}

fn default_shell() -> String {
    "sh".to_string()
}
fn default_shell_args() -> Vec<String> {
    vec!["-c".to_string()]
}

impl ExecConfig {
    /// Locate the configured shell
    ///
    /// Absolute paths are taken as-is, bare names are searched in PATH.
    pub fn resolve_shell(&self) -> Result<PathBuf> {
        let shell = Path::new(&self.shell);
        if shell.is_absolute() {
            return Ok(shell.to_path_buf());
        }
        which::which(&self.shell)
            .map_err(|e| Error::Config(format!("shell '{}' not found: {}", self.shell, e)))
    }
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        tracing::debug!(?config, "loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.output.name_width, 60);
        assert_eq!(config.output.delimiter_width, 65);
        assert_eq!(config.output.color, ColorMode::Auto);
        assert_eq!(config.exec.shell, "sh");
        assert_eq!(config.exec.shell_args, vec!["-c".to_string()]);
    }

    #[test]
    fn test_parse_partial_file() {
        let config = Config::parse(
            r#"
            [output]
            name_width = 40
            color = "never"
            "#,
        )
        .unwrap();
        assert_eq!(config.output.name_width, 40);
        assert_eq!(config.output.delimiter_width, 65);
        assert!(!config.output.color.enabled());
        assert_eq!(config.exec.shell, "sh");
    }

    #[test]
    fn test_explicit_color_modes() {
        let config = Config::parse("[output]\ncolor = \"always\"").unwrap();
        assert_eq!(config.output.color, ColorMode::Always);
        assert!(config.output.color.enabled());
        assert!(!ColorMode::Never.enabled());
    }

    #[test]
    fn test_parse_invalid_file() {
        let err = Config::parse("[output]\nname_width = \"wide\"").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = Config::load_from(Path::new("/nonexistent/akane/config.toml")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_shell() {
        let exec = ExecConfig::default();
        assert!(exec.resolve_shell().unwrap().ends_with("sh"));

        let exec = ExecConfig {
            shell: "definitely-not-a-shell-akane".to_string(),
            shell_args: Vec::new(),
        };
        assert!(matches!(exec.resolve_shell(), Err(Error::Config(_))));
    }
}
