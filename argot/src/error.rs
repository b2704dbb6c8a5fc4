//! Errors and warnings reported while resolving a command line.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// Defines the possible errors that may occur during the parsing of a command line.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// A required flag has not been given.
    #[error("missing required flag {0}")]
    MissingFlag(String),

    /// A required value has not been given, either to a flag or as a positional argument.
    #[error("missing required argument {0}")]
    MissingRequiredArgument(String),

    /// The raw value cannot be converted to the bound type.
    #[error("invalid value `{raw}`: expected {expected}")]
    InvalidFormat {
        /// Raw value as given on the command line.
        raw: String,
        /// Human readable description of the expected format.
        expected: &'static str,
    },

    /// A validator rejected the raw value.
    #[error("invalid value `{raw}`: {reason}")]
    Validation {
        /// Raw value as given on the command line.
        raw: String,
        /// Reason given by the validator.
        reason: String,
    },

    /// A subcommand name does not match any child of the current command.
    #[error("unrecognized subcommand {0}")]
    UnrecognizedSubcommand(String),

    /// The input ended before a runnable command was selected.
    #[error("incomplete command `{path}`")]
    IncompleteCommand {
        /// Names of the commands selected so far, separated by spaces.
        path: String,
        /// Rendered help of the last selected command.
        help: String,
    },

    /// A help flag has been given. Holds the rendered help text.
    #[error("{0}")]
    HelpRequested(String),

    /// A user callback failed.
    #[error("{0}")]
    Callback(String),

    /// More than one error occurred.
    #[error(transparent)]
    Multiple(#[from] MultiError),
}

impl Error {
    /// Build a validation error.
    pub fn validation(raw: &str, reason: impl Into<String>) -> Self {
        Error::Validation {
            raw: String::from(raw),
            reason: reason.into(),
        }
    }

    /// Retrieve the individual errors, flattening [`Error::Multiple`].
    pub fn causes(&self) -> &[Error] {
        match self {
            Error::Multiple(errors) => errors.as_slice(),
            error => core::slice::from_ref(error),
        }
    }
}

/// An aggregate of errors, de-duplicated by message.
#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MultiError {
    errors: Vec<Error>,
}

impl MultiError {
    /// Create an empty aggregate.
    pub const fn new() -> Self {
        MultiError { errors: Vec::new() }
    }

    /// Add an error, unless an error with the same message is already present. Nested
    /// aggregates are flattened.
    pub fn push(&mut self, error: Error) {
        if let Error::Multiple(inner) = error {
            for error in inner.errors {
                self.push(error);
            }
            return;
        }

        let message = error.to_string();
        if self.errors.iter().any(|x| x.to_string() == message) {
            return;
        }

        self.errors.push(error);
    }

    /// Number of distinct errors.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check if no error has been collected.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Retrieve the collected errors.
    #[inline(always)]
    pub fn as_slice(&self) -> &[Error] {
        &self.errors
    }

    /// Convert into a result: `Ok` when empty, the error itself when alone, or
    /// [`Error::Multiple`] otherwise.
    pub fn into_result(mut self) -> Result<(), Error> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(Error::Multiple(self)),
        }
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} errors occurred:", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  * {error}")?;
        }
        Ok(())
    }
}

impl core::error::Error for MultiError {}

/// Defines a non-fatal problem found in the input. Warnings never abort parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Warning {
    /// A short flag is not declared in any reachable scope.
    UnrecognizedShortFlag(char),

    /// A long flag is not declared in any reachable scope.
    UnrecognizedLongFlag(String),

    /// A flag without argument has been given a value.
    UnexpectedValue {
        /// Flag as written on the command line.
        flag: String,
        /// Ignored value.
        value: String,
    },

    /// Plain text that no positional argument accepts.
    UnexpectedArgument(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnrecognizedShortFlag(short) => write!(f, "unrecognized short flag -{short}"),
            Warning::UnrecognizedLongFlag(long) => write!(f, "unrecognized long flag --{long}"),
            Warning::UnexpectedValue { flag, value } => {
                write!(f, "flag {flag} does not take a value, ignoring `{value}`")
            }
            Warning::UnexpectedArgument(raw) => write!(f, "unexpected argument `{raw}`"),
        }
    }
}
