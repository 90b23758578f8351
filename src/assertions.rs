//! Assertion helpers
//!
//! Each helper returns `Err(Error::Assertion)` instead of panicking, so a
//! test can propagate it with `?` and have the message reported.

use std::fmt::Display;

use crate::common::{Error, Result};

fn failure(body: &str, msg: Option<&str>) -> Error {
    let header = match msg {
        Some(msg) => format!("assertion failed: ({})", msg),
        None => "assertion failed:".to_string(),
    };
    Error::Assertion(format!("{}\n{}", header, body))
}

fn escape(value: impl Display) -> String {
    value.to_string().replace('\n', "\\n")
}

/// Assert that `expected` and `recovered` are equal
pub fn assert_eq<E, R>(expected: E, recovered: R, msg: Option<&str>) -> Result<()>
where
    E: PartialEq<R> + Display,
    R: Display,
{
    if expected == recovered {
        return Ok(());
    }
    let body = format!(
        " | expected:  {}\n | recovered: {}",
        escape(expected),
        escape(recovered)
    );
    Err(failure(&body, msg))
}

/// Assert that `value` is `true`
pub fn assert_true(value: bool, msg: Option<&str>) -> Result<()> {
    if value {
        Ok(())
    } else {
        Err(failure(" | expected to be True", msg))
    }
}

/// Assert that `value` is `false`
pub fn assert_false(value: bool, msg: Option<&str>) -> Result<()> {
    if value {
        Err(failure(" | expected to be False", msg))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_eq_passes() {
        assert!(assert_eq("bar", "bar", None).is_ok());
        assert!(assert_eq(42, 42, Some("answer")).is_ok());
        assert!(assert_eq(String::from("x"), "x", None).is_ok());
    }

    #[test]
    fn test_assert_eq_message_escapes_newlines() {
        let err = assert_eq("bar\n", "baz\n", None).unwrap_err();
        assert!(matches!(err, Error::Assertion(_)));
        assert_eq!(
            err.to_string(),
            "assertion failed:\n | expected:  bar\\n\n | recovered: baz\\n"
        );
    }

    #[test]
    fn test_assert_eq_with_label() {
        let err = assert_eq(1, 2, Some("counter")).unwrap_err();
        assert!(err.to_string().starts_with("assertion failed: (counter)\n"));
    }

    #[test]
    fn test_assert_bools() {
        assert!(assert_true(true, None).is_ok());
        assert!(assert_false(false, None).is_ok());
        assert_eq!(
            assert_true(false, None).unwrap_err().to_string(),
            "assertion failed:\n | expected to be True"
        );
        assert_eq!(
            assert_false(true, Some("flag")).unwrap_err().to_string(),
            "assertion failed: (flag)\n | expected to be False"
        );
    }
}
