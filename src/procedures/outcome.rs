//! Outcome classification
//!
//! Registered functions may return any type implementing [`IntoOutcome`].
//! The implementations below cover the accepted shapes: `()`, `bool`,
//! `(bool, message)`, an explicit [`Outcome`] and `Result` over any of them.

use std::any::Any;
use std::fmt;

use crate::common::Error;

/// Message used when a function returns a bare `false`
pub const RETURNED_FALSE: &str = "test returned false";

/// Classified result of invoking one registered function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(String),
}

impl Outcome {
    /// Create a failure with the given message
    pub fn failure(message: impl Into<String>) -> Self {
        Outcome::Failure(message.into())
    }

    /// Classify an error raised by a registered function
    ///
    /// Failed external commands are prefixed with their exit code.
    pub fn from_error(error: &Error) -> Self {
        match error.exit_code() {
            Some(code) => Outcome::Failure(format!("command error: [{}] {}", code, error)),
            None => Outcome::Failure(error.to_string()),
        }
    }

    /// Classify the payload of a panic caught while invoking a function
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "function panicked".to_string()
        };
        Outcome::Failure(message)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Failure message, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Success => None,
            Outcome::Failure(message) => Some(message),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "ok"),
            Outcome::Failure(message) => write!(f, "failed: {}", message),
        }
    }
}

/// Conversion from a registered function's return value into an [`Outcome`]
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for Outcome {
    fn into_outcome(self) -> Outcome {
        self
    }
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Outcome {
        Outcome::Success
    }
}

impl IntoOutcome for bool {
    fn into_outcome(self) -> Outcome {
        if self {
            Outcome::Success
        } else {
            Outcome::failure(RETURNED_FALSE)
        }
    }
}

impl<S: Into<String>> IntoOutcome for (bool, S) {
    fn into_outcome(self) -> Outcome {
        match self {
            (true, _) => Outcome::Success,
            (false, message) => Outcome::Failure(message.into()),
        }
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoOutcome,
    E: fmt::Display + 'static,
{
    fn into_outcome(self) -> Outcome {
        match self {
            Ok(value) => value.into_outcome(),
            Err(e) => match (&e as &dyn Any).downcast_ref::<Error>() {
                Some(error) => Outcome::from_error(error),
                None => Outcome::Failure(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_is_success() {
        assert_eq!(().into_outcome(), Outcome::Success);
    }

    #[test]
    fn test_bool() {
        assert_eq!(true.into_outcome(), Outcome::Success);
        assert_eq!(
            false.into_outcome(),
            Outcome::Failure("test returned false".to_string())
        );
    }

    #[test]
    fn test_pair() {
        assert_eq!((false, "whoops").into_outcome(), Outcome::failure("whoops"));
        assert_eq!((true, "ignored").into_outcome(), Outcome::Success);
        assert_eq!(
            (false, String::from("owned")).into_outcome().message(),
            Some("owned")
        );
    }

    #[test]
    fn test_result_ok_classifies_inner_value() {
        let ok: Result<(), Error> = Ok(());
        assert_eq!(ok.into_outcome(), Outcome::Success);

        let ok_false: Result<bool, Error> = Ok(false);
        assert_eq!(ok_false.into_outcome(), Outcome::failure(RETURNED_FALSE));
    }

    #[test]
    fn test_generic_error_uses_description() {
        let err: Result<(), &str> = Err("disk on fire");
        assert_eq!(err.into_outcome(), Outcome::failure("disk on fire"));

        let err: Result<(), Error> = Err(Error::Assertion("assertion failed:".into()));
        assert_eq!(err.into_outcome(), Outcome::failure("assertion failed:"));
    }

    #[test]
    fn test_std_errors_use_description() {
        let err: Result<(), std::num::ParseIntError> = "x".parse::<i32>().map(|_| ());
        assert_eq!(
            err.into_outcome(),
            Outcome::failure("invalid digit found in string")
        );

        let err: Result<(), std::env::VarError> = Err(std::env::VarError::NotPresent);
        assert_eq!(
            err.into_outcome(),
            Outcome::failure("environment variable not found")
        );

        let err: Result<(), Box<dyn std::error::Error>> = Err("not send".into());
        assert_eq!(err.into_outcome(), Outcome::failure("not send"));
    }

    #[test]
    fn test_user_error_type() {
        #[derive(Debug)]
        struct Unreachable(u16);

        impl fmt::Display for Unreachable {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "port {} unreachable", self.0)
            }
        }

        let err: Result<bool, Unreachable> = Err(Unreachable(8080));
        assert_eq!(err.into_outcome(), Outcome::failure("port 8080 unreachable"));
    }

    #[test]
    fn test_command_error_includes_exit_code() {
        let err: Result<(), Error> = Err(Error::command_failed(
            "ls /missing",
            2,
            String::new(),
            String::new(),
        ));
        let message = err.into_outcome().message().unwrap().to_string();
        assert!(message.starts_with("command error: [2] "));
        assert!(message.contains("exit status 2"));
    }

    #[test]
    fn test_panic_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(Outcome::from_panic(payload.as_ref()), Outcome::failure("static message"));

        let payload: Box<dyn Any + Send> = Box::new(format!("formatted {}", 42));
        assert_eq!(Outcome::from_panic(payload.as_ref()), Outcome::failure("formatted 42"));

        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(
            Outcome::from_panic(payload.as_ref()),
            Outcome::failure("function panicked")
        );
    }
}
