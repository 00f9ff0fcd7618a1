//! Error types for generation, shrinking, and property execution.

use std::fmt;

/// Everything that can go wrong while building or running a property.
#[derive(Debug, Clone)]
pub enum PropertyError {
    /// A `prop_assert!`/`prop_expect!`-style check failed inside a run.
    ExpectationFailed {
        message: String,
        file: &'static str,
        line: u32,
    },
    /// A generator combinator was misused (invalid weight, empty interval, a
    /// `filter` predicate rejecting its own head, a mismatched arity).
    InvalidArgument { message: String },
    /// `filter`/`such_that` could not find an accepted value within the
    /// configured attempt budget.
    FilterExhausted { attempts: usize },
    /// A statistics assertion (`GE`/`LE`/`IN_RANGE`) registered via
    /// `prop_stat_assert_*` did not hold after the run completed.
    StatAssertionFailed {
        key: String,
        message: String,
    },
    /// The user's property closure panicked; the payload is captured as text.
    UserPanic { message: String },
    /// A configuration value failed validation (see [`crate::config`]).
    ConfigError { message: String, field: &'static str },
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyError::ExpectationFailed { message, file, line } => {
                write!(f, "expectation failed at {file}:{line}: {message}")
            }
            PropertyError::InvalidArgument { message } => {
                write!(f, "invalid argument: {message}")
            }
            PropertyError::FilterExhausted { attempts } => {
                write!(f, "filter rejected {attempts} consecutive candidates")
            }
            PropertyError::StatAssertionFailed { key, message } => {
                write!(f, "statistic assertion on '{key}' failed: {message}")
            }
            PropertyError::UserPanic { message } => {
                write!(f, "property panicked: {message}")
            }
            PropertyError::ConfigError { message, field } => {
                write!(f, "configuration error in '{field}': {message}")
            }
        }
    }
}

impl std::error::Error for PropertyError {}

impl PropertyError {
    pub fn expectation_failed(message: impl Into<String>, file: &'static str, line: u32) -> Self {
        Self::ExpectationFailed { message: message.into(), file, line }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument { message: message.into() }
    }

    pub fn config_error(field: &'static str, message: impl Into<String>) -> Self {
        Self::ConfigError { message: message.into(), field }
    }
}

/// Outcome of evaluating a single run of the property closure.
///
/// Mirrors the exception-based control flow of the source implementation
/// (`Success`/`Discard`/assertion failure) as an explicit sum type: nothing
/// here ever unwinds except a genuine user panic, which the runner catches
/// with `catch_unwind` and folds into `Fail`.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The run passed; count it towards `num_runs`.
    Pass,
    /// Re-draw; this run does not count towards `num_runs`.
    Discard,
    /// The run trivially succeeds and skips remaining checks.
    Success,
    /// The run failed; carries the first captured error.
    Fail(PropertyError),
}

/// A discard/success signal a property closure can raise deliberately,
/// e.g. via `prop_discard()` / `prop_success()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Discard,
    Success,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let err = PropertyError::expectation_failed("x > 0", "foo.rs", 12);
        assert_eq!(err.to_string(), "expectation failed at foo.rs:12: x > 0");
    }

    #[test]
    fn config_error_names_field() {
        let err = PropertyError::config_error("num_runs", "must be > 0");
        assert!(err.to_string().contains("num_runs"));
    }
}
