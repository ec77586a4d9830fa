/*!
Error types for [`flagship`][crate].

Tokenizing and arity errors are produced by [`clap`] and wrapped in
[`Error::Clap`]. Everything that happens after clap hands back its matches
(converting strings into typed values, noticing that a required value is
absent) is described by the types here.
 */

use std::borrow::Cow;

use joinery::JoinableIterator as _;

use crate::parameter::Arity;

/**
A required [`Parameter`][crate::parameter::Parameter] was absent from the
command-line arguments.

This type contains no data because a parameter type doesn't know which field
it's associated with. [`extract`][crate::command::extract] turns it into an
[`Error::Required`] with that context attached.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredError;

/// Something went wrong turning raw argument strings into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    /// The argument was valid UTF-8, but it failed to parse into an instance
    /// of the type
    #[error("failed to parse {arg:?}: {message}")]
    Parse { arg: String, message: String },

    /// The argument wasn't valid UTF-8 and should be
    #[error("{arg:?} isn't valid UTF-8")]
    InvalidUtf8 { arg: String },

    /// The argument wasn't one of a fixed set of choices
    #[error(
        "{arg:?} isn't one of {{{}}}",
        expected.iter().join_with(", ")
    )]
    ShouldBe {
        arg: String,
        expected: &'static [&'static str],
    },

    /// The number of values doesn't match the arity of the type
    #[error("expected {expected} values, got {got}")]
    WrongCount { expected: Arity, got: usize },

    /// A switch was handed to a type that only accepts values
    #[error("this parameter doesn't work as a switch")]
    NotASwitch,

    /// Something else went wrong
    #[error("{0}")]
    Custom(String),
}

impl ParameterError {
    pub fn parse_error(arg: &str, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            arg: arg.to_owned(),
            message: message.to_string(),
        }
    }

    pub fn custom(message: impl std::fmt::Display) -> Self {
        Self::Custom(message.to_string())
    }
}

/// Errors from building a parser out of flag descriptions, or from parsing
/// command-line arguments with it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// clap rejected the arguments, or help / version output was requested
    #[error(transparent)]
    Clap(#[from] clap::Error),

    /// A value was given for a field, but it couldn't be converted
    #[error("{field}: {error}")]
    Parameter {
        field: &'static str,
        error: ParameterError,
    },

    /// A required field wasn't present
    #[error("required argument `{field}` was absent")]
    Required { field: &'static str },

    /// Two flags share an id, long name, or short name. This usually happens
    /// when several groups are combined into one parser, or when a parameter
    /// takes a name clap uses for itself, like `help`. `first` is the earlier
    /// owner of the name.
    #[error("conflicting flag {name}: defined by both `{first}` and `{second}`")]
    Conflict {
        name: Cow<'static, str>,
        first: Cow<'static, str>,
        second: &'static str,
    },

    /// A positional that takes a variable number of values must be the last
    /// positional, or the values that follow it can't be assigned.
    #[error(
        "positional argument `{field}` takes a variable number of values, \
        so it must be the last positional argument"
    )]
    VariadicPositional { field: &'static str },

    /// An optional positional comes before a required one, so the required
    /// one could never be filled without the optional one.
    #[error(
        "optional positional argument `{optional}` comes before \
        required positional argument `{required}`"
    )]
    OptionalPositional {
        optional: &'static str,
        required: &'static str,
    },

    /// A positional that takes a fixed number of values (a tuple or an array)
    /// has to be the last positional, or second to last before a required one.
    #[error(
        "positional argument `{field}` takes several values, so it must be \
        the last positional argument or come just before a required one"
    )]
    FixedPositional { field: &'static str },
}

impl Error {
    /// True if this error is actually a request for help or version output,
    /// which clap reports as an error.
    pub fn is_informational(&self) -> bool {
        match self {
            Error::Clap(err) => matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp
                    | clap::error::ErrorKind::DisplayVersion
                    | clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ),
            _ => false,
        }
    }

    /// Convert into a [`clap::Error`] rendered against `command`, so that
    /// flagship's own errors are printed the same way as clap's.
    pub fn into_clap(self, command: &mut clap::Command) -> clap::Error {
        use clap::error::ErrorKind;

        match self {
            Error::Clap(err) => err,
            error @ Error::Parameter { .. } => {
                command.error(ErrorKind::ValueValidation, error.to_string())
            }
            error @ Error::Required { .. } => {
                command.error(ErrorKind::MissingRequiredArgument, error.to_string())
            }
            error @ (Error::Conflict { .. }
            | Error::VariadicPositional { .. }
            | Error::OptionalPositional { .. }
            | Error::FixedPositional { .. }) => {
                command.error(ErrorKind::ArgumentConflict, error.to_string())
            }
        }
    }
}
