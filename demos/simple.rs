//! Minimal akane suite
//!
//! Sets an environment variable, checks it from Rust and from child
//! processes, exercises stdin and stderr capture, fails once on purpose and
//! cleans up again. Run with `cargo run --example simple`; the exit code is
//! the number of failed steps.

use std::env;
use std::process::ExitCode;

use akane::assertions::assert_eq;
use akane::{exec, exit_code, Exec, Suite};

fn init_env_vars() {
    env::set_var("FOO", "bar");
}

fn delete_env_vars() {
    env::remove_var("FOO");
}

fn main() -> ExitCode {
    let mut suite = Suite::new();

    suite.setup(None, init_env_vars);

    suite.test(Some("environment variables"), || -> Result<bool, env::VarError> {
        Ok(env::var("FOO")? == "bar")
    });

    suite.test(Some("environment in shell"), || -> akane::Result<()> {
        let res = exec(["bash", "-c", "echo $FOO"])?;
        assert_eq("bar\n", res.as_str(), None)
    });

    suite.test(Some("stdin to cat"), || -> akane::Result<()> {
        let res = Exec::new(["cat"]).input("foo bar baz").run()?;
        assert_eq("foo bar baz", res.as_str(), None)
    });

    suite.test(Some("capture stderr"), || -> akane::Result<()> {
        let res = exec(["sh", "-c", "echo err >&2"])?;
        assert_eq("err\n", res.as_str(), None)
    });

    suite.test(Some("split stdout and stderr"), || -> akane::Result<()> {
        let res = akane::exec_process(["sh", "-c", "echo from stderr >&2; echo from stdout"])?;
        assert_eq("from stdout\n", res.stdout.as_str(), None)?;
        assert_eq("from stderr\n", res.stderr.as_str(), None)
    });

    suite.test(Some("this is supposed to fail"), || (false, "whoops"));

    suite.teardown(Some("environment variables"), delete_env_vars);

    exit_code(suite.run_all())
}
