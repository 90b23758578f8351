//! External process execution
//!
//! Commands run synchronously to completion with their output captured.
//! A non-zero exit status is reported as [`Error::CommandFailed`] unless
//! the command is marked [`unchecked`](Exec::unchecked).

use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;

use crate::common::config::ExecConfig;
use crate::common::{Error, Result};

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Exit code; on Unix a signal-terminated child reports `-signal`
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Captured result of a finished command, byte for byte
///
/// Use this for children whose output is not UTF-8 text.
#[derive(Debug, Clone)]
pub struct RawOutput {
    pub code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RawOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Decode both streams, replacing invalid UTF-8 with U+FFFD
    pub fn into_text(self) -> ProcessOutput {
        ProcessOutput {
            code: self.code,
            stdout: lossy(self.stdout),
            stderr: lossy(self.stderr),
        }
    }
}

/// Builder for one external command
#[derive(Debug, Clone)]
pub struct Exec {
    program: OsString,
    args: Vec<OsString>,
    input: Option<Vec<u8>>,
    env: Vec<(OsString, OsString)>,
    current_dir: Option<PathBuf>,
    unchecked: bool,
}

impl Exec {
    /// Command from an argument vector; the first element is the program
    ///
    /// An empty vector yields a command that fails to spawn.
    pub fn new<I, S>(cmd: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut parts = cmd.into_iter().map(Into::into);
        Self {
            program: parts.next().unwrap_or_default(),
            args: parts.collect(),
            input: None,
            env: Vec::new(),
            current_dir: None,
            unchecked: false,
        }
    }

    /// Run `script` through the default shell (`sh -c`)
    pub fn shell(script: impl Into<OsString>) -> Self {
        Self::shell_with(&ExecConfig::default(), script)
    }

    /// Run `script` through the configured shell
    pub fn shell_with(config: &ExecConfig, script: impl Into<OsString>) -> Self {
        let mut exec = Self::new(std::iter::once(OsString::from(&config.shell)));
        exec.args.extend(config.shell_args.iter().map(OsString::from));
        exec.args.push(script.into());
        exec
    }

    /// Bytes written to the child's stdin; stdin is empty otherwise
    pub fn input(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Do not treat a non-zero exit status as an error
    pub fn unchecked(mut self) -> Self {
        self.unchecked = true;
        self
    }

    /// Command line as shown in error messages
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command.envs(self.env.iter().map(|(k, v)| (k, v)));
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command.stdin(if self.input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        command
    }

    fn spawn(&self, mut command: Command) -> Result<Child> {
        tracing::debug!(command = %self.display(), "spawning");
        command.spawn().map_err(|source| Error::CommandSpawn {
            command: self.display(),
            source,
        })
    }

    /// Write the configured input on a separate thread so a child that
    /// fills its output pipes cannot deadlock against us
    fn feed_stdin(&self, child: &mut Child) -> Option<thread::JoinHandle<std::io::Result<()>>> {
        let input = self.input.clone()?;
        let mut stdin = child.stdin.take()?;
        Some(thread::spawn(move || stdin.write_all(&input)))
    }

    fn check(&self, status: ExitStatus, stdout: Vec<u8>, stderr: Vec<u8>) -> Result<RawOutput> {
        let code = exit_code(status);
        tracing::debug!(command = %self.display(), code, "finished");
        if code != 0 && !self.unchecked {
            return Err(Error::command_failed(
                &self.display(),
                code,
                lossy(stdout),
                lossy(stderr),
            ));
        }
        Ok(RawOutput {
            code,
            stdout,
            stderr,
        })
    }

    /// Run to completion with stdout and stderr captured separately
    pub fn output(&self) -> Result<ProcessOutput> {
        self.output_raw().map(RawOutput::into_text)
    }

    /// Like [`output`](Self::output), but keeps both streams as bytes
    pub fn output_raw(&self) -> Result<RawOutput> {
        let mut command = self.command();
        command.stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut child = self.spawn(command)?;
        let writer = self.feed_stdin(&mut child);
        let output = child.wait_with_output()?;
        join_writer(writer)?;

        self.check(output.status, output.stdout, output.stderr)
    }

    /// Run to completion with stderr merged into stdout
    ///
    /// Returns the combined output in the order the child wrote it.
    pub fn run(&self) -> Result<String> {
        self.run_raw().map(lossy)
    }

    /// Like [`run`](Self::run), but returns the combined output as bytes
    pub fn run_raw(&self) -> Result<Vec<u8>> {
        let (reader, writer) = std::io::pipe()?;
        let mut command = self.command();
        command.stdout(writer.try_clone()?).stderr(writer);

        let mut child = self.spawn(command)?;
        let stdin_writer = self.feed_stdin(&mut child);
        let collected = collect(reader, &mut child);
        let joined = join_writer(stdin_writer);
        let (combined, status) = collected?;
        joined?;

        self.check(status, combined, Vec::new())
            .map(|output| output.stdout)
    }
}

/// Drain `reader` and reap `child`
///
/// The child is waited on even when reading fails.
fn collect(mut reader: impl Read, child: &mut Child) -> Result<(Vec<u8>, ExitStatus)> {
    let mut combined = Vec::new();
    let read = reader.read_to_end(&mut combined);
    drop(reader);
    let status = child.wait()?;
    read?;
    Ok((combined, status))
}

fn lossy(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

fn join_writer(writer: Option<thread::JoinHandle<std::io::Result<()>>>) -> Result<()> {
    let Some(writer) = writer else {
        return Ok(());
    };
    match writer.join() {
        Ok(Ok(())) => Ok(()),
        // The child may exit without reading its input
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(Error::failed("stdin writer thread panicked")),
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signal| -signal))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// Run a command and return stdout and stderr merged
pub fn exec<I, S>(cmd: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    Exec::new(cmd).run()
}

/// Run a command and return its separately captured output
pub fn exec_process<I, S>(cmd: I) -> Result<ProcessOutput>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    Exec::new(cmd).output()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_exec_echo() {
        let out = Exec::new(["sh", "-c", "echo $AKANE_FOO"])
            .env("AKANE_FOO", "bar")
            .run()
            .unwrap();
        assert_eq!(out, "bar\n");
    }

    #[test]
    fn test_stdin_input() {
        let out = Exec::new(["cat"]).input("foo bar baz").run().unwrap();
        assert_eq!(out, "foo bar baz");
    }

    #[test]
    fn test_stderr_is_merged() {
        let out = exec(["sh", "-c", "echo err >&2"]).unwrap();
        assert_eq!(out, "err\n");
    }

    #[test]
    fn test_split_output() {
        let out = exec_process(["sh", "-c", "echo from stderr >&2; echo from stdout"]).unwrap();
        assert_eq!(out.stdout, "from stdout\n");
        assert_eq!(out.stderr, "from stderr\n");
        assert!(out.success());
    }

    #[test]
    fn test_non_zero_exit_is_error() {
        let err = Exec::shell("echo partial; exit 3").output().unwrap_err();
        match err {
            Error::CommandFailed { code, stdout, .. } => {
                assert_eq!(code, 3);
                assert_eq!(stdout, "partial\n");
            }
            other => panic!("Expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_unchecked_returns_code() {
        let out = Exec::shell("exit 4").unchecked().output().unwrap();
        assert_eq!(out.code, 4);
        assert!(!out.success());
    }

    #[test]
    fn test_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = Exec::new(["pwd"]).current_dir(dir.path()).run().unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(
            PathBuf::from(out.trim_end()).canonicalize().unwrap(),
            expected
        );
    }

    #[test]
    fn test_missing_program() {
        let err = exec(["akane-definitely-missing-program"]).unwrap_err();
        assert!(matches!(err, Error::CommandSpawn { .. }));
    }

    #[test]
    fn test_raw_output_keeps_bytes() {
        let out = Exec::new(["printf", "\\377\\376"]).run_raw().unwrap();
        assert_eq!(out, vec![0xff, 0xfe]);

        let out = Exec::new(["printf", "\\377\\376"]).output_raw().unwrap();
        assert_eq!(out.stdout, vec![0xff, 0xfe]);
        assert!(out.stderr.is_empty());

        let text = out.into_text();
        assert_eq!(text.stdout, "\u{fffd}\u{fffd}");
    }

    #[test]
    fn test_raw_non_zero_exit_is_error() {
        let err = Exec::shell("printf '\\377'; exit 2").run_raw().unwrap_err();
        assert_eq!(err.exit_code(), Some(2));
    }

    #[test]
    fn test_child_reaped_when_read_fails() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("pipe gone"))
            }
        }

        let mut child = Command::new("sh")
            .args(["-c", "sleep 0.2"])
            .spawn()
            .unwrap();
        let err = collect(Broken, &mut child).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn test_display() {
        let exec = Exec::shell("echo hi");
        assert_eq!(exec.display(), "sh -c echo hi");
    }
}
