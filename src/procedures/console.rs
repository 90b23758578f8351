//! Console report
//!
//! Writes the human-readable progress lines and the final summary.

use std::io::{self, Write};

use colored::{ColoredString, Colorize};

use super::outcome::Outcome;
use super::registry::PhaseKind;
use crate::common::config::OutputConfig;

/// Report sink shared by a suite and its registered handles
pub struct Console {
    out: Box<dyn Write>,
    name_width: usize,
    delimiter_width: usize,
    color: bool,
}

impl Console {
    /// Console writing to stdout with the given settings
    pub fn stdout(config: &OutputConfig) -> Self {
        Self::new(Box::new(io::stdout()), config, config.color.enabled())
    }

    /// Console writing to an arbitrary sink
    ///
    /// With `color` set, styling is forced on even when stdout is not a
    /// terminal.
    pub fn new(out: Box<dyn Write>, config: &OutputConfig, color: bool) -> Self {
        if color {
            colored::control::set_override(true);
        }
        Self {
            out,
            name_width: config.name_width,
            delimiter_width: config.delimiter_width,
            color,
        }
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn emit(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to write report output");
        }
    }

    /// Print the start line of one invocation, without a line break
    ///
    /// `"<verb> <name>"` is padded to the configured width; names that do
    /// not fit are cut and end in `…`.
    pub fn start(&mut self, kind: PhaseKind, name: &str) {
        let verb = kind.verb();
        let room = self.name_width.saturating_sub(verb.chars().count() + 1);
        let name = fit(name, room);
        let padding = room.saturating_sub(name.chars().count());
        let line = format!(
            "{} {}{} ... ",
            verb,
            self.paint(&name, |s| s.cyan()),
            " ".repeat(padding)
        );
        self.emit(&line);
    }

    /// Finish the start line with the status token
    pub fn finish(&mut self, outcome: &Outcome) {
        let line = match outcome {
            Outcome::Success => format!("{}\n", self.paint("ok", |s| s.green().bold())),
            Outcome::Failure(message) => format!(
                "{}\n{}\n",
                self.paint("failed", |s| s.red().bold()),
                self.paint(&format!("  error: {}", message), |s| s.red())
            ),
        };
        self.emit(&line);
    }

    pub fn delimiter(&mut self) {
        let line = format!(
            "{}\n",
            self.paint(&"-".repeat(self.delimiter_width), |s| s.dimmed())
        );
        self.emit(&line);
    }

    pub fn canceled(&mut self) {
        let line = format!(
            "\n{}\n",
            self.paint("Execution has been canceled because setup failed.", |s| s.red())
        );
        self.emit(&line);
    }

    /// Print the summary block after teardown
    pub fn summary(&mut self, tests_successful: usize, tests_failed: usize, teardowns_failed: usize) {
        let mut block = String::from("\n");
        if tests_failed == 0 {
            let text = format!("All {} tests were successful.", tests_successful);
            block.push_str(&self.paint(&text, |s| s.green()));
        } else {
            let text = format!(
                "{} tests failed and {} tests were successful.",
                tests_failed, tests_successful
            );
            block.push_str(&self.paint(&text, |s| s.red()));
        }
        block.push('\n');

        if teardowns_failed != 0 {
            let text = format!("{} teardown steps failed.", teardowns_failed);
            block.push_str(&self.paint(&text, |s| s.red()));
            block.push('\n');
        }
        self.emit(&block);
    }

    /// Print a free-form header line (suite name, description)
    pub fn header(&mut self, title: &str, description: Option<&str>) {
        let mut block = format!("{}\n", self.paint(title, |s| s.blue().bold()));
        if let Some(desc) = description {
            block.push_str(&format!("  {}\n", self.paint(desc, |s| s.dimmed())));
        }
        block.push('\n');
        self.emit(&block);
    }
}

/// Cut `text` to at most `width` characters
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}


#[cfg(test)]
mod tests {
    use super::testing::SharedBuffer;
    use super::*;

    fn buffered_console() -> (Console, SharedBuffer) {
        let buffer = SharedBuffer::default();
        let console = Console::new(Box::new(buffer.clone()), &OutputConfig::default(), false);
        (console, buffer)
    }

    #[test]
    fn test_start_line_is_padded() {
        let (mut console, buffer) = buffered_console();
        console.start(PhaseKind::Test, "env");
        let line = buffer.contents();
        assert!(line.starts_with("Running test env "));
        assert!(line.ends_with(" ... "));
        assert_eq!(line.chars().count(), 60 + " ... ".len());
    }

    #[test]
    fn test_start_line_truncates_long_names() {
        let (mut console, buffer) = buffered_console();
        console.start(PhaseKind::Setup, &"x".repeat(200));
        let line = buffer.contents();
        assert_eq!(line.chars().count(), 60 + " ... ".len());
        assert!(line.contains('…'));
    }

    #[test]
    fn test_failure_prints_indented_error() {
        let (mut console, buffer) = buffered_console();
        console.finish(&Outcome::failure("whoops"));
        assert_eq!(buffer.contents(), "failed\n  error: whoops\n");
    }

    #[test]
    fn test_summary_lines() {
        let (mut console, buffer) = buffered_console();
        console.summary(3, 0, 0);
        assert_eq!(buffer.contents(), "\nAll 3 tests were successful.\n");

        let (mut console, buffer) = buffered_console();
        console.summary(1, 2, 1);
        assert_eq!(
            buffer.contents(),
            "\n2 tests failed and 1 tests were successful.\n1 teardown steps failed.\n"
        );
    }

    #[test]
    fn test_forced_color_emits_ansi() {
        let buffer = SharedBuffer::default();
        let mut console = Console::new(Box::new(buffer.clone()), &OutputConfig::default(), true);
        console.finish(&Outcome::Success);
        let output = buffer.contents();
        assert!(output.contains("\u{1b}["), "expected ANSI escapes in {:?}", output);
        assert!(output.contains("ok"));
    }

    #[test]
    fn test_plain_console_has_no_ansi() {
        let (mut console, buffer) = buffered_console();
        console.finish(&Outcome::Success);
        assert_eq!(buffer.contents(), "ok\n");
    }

    #[test]
    fn test_delimiter_width() {
        let (mut console, buffer) = buffered_console();
        console.delimiter();
        assert_eq!(buffer.contents(), format!("{}\n", "-".repeat(65)));
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("short", 10), "short");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("abc", 0), "");
    }
}
