//! Error types for flag registration, dispatch and service hooks.
//!
//! Every failure is a value. Nothing in this crate panics on user input or
//! terminates the process; the caller decides how an outcome maps to an exit
//! code and a message.

use thiserror::Error;

/// Why a call to [`parse`](crate::parse) did not produce a
/// [`CommandContext`](crate::CommandContext).
///
/// The variants are mutually exclusive. [`EscapeInvoked`](Self::EscapeInvoked)
/// and [`HelpRequested`](Self::HelpRequested) are deliberate requests from the
/// user rather than failures; [`is_help`](Self::is_help) groups them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The argument vector was empty.
    #[error("no args to parse")]
    NoArguments,

    /// The first argument matched no registered command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Flag tokens for the matched command were malformed. `detail` is the
    /// tokenizer message verbatim.
    #[error("{command}: {detail}")]
    Syntax { command: String, detail: String },

    /// The first positional argument was the command's escape word. `args`
    /// holds the positionals that followed it.
    #[error("{command}: escape word invoked")]
    EscapeInvoked { command: String, args: Vec<String> },

    /// `-help` or `-h` was given and the command does not define such a flag.
    #[error("{command}: help requested")]
    HelpRequested { command: String },

    /// A command with an empty name was reached while matching.
    #[error("missing command name")]
    MissingCommandName,
}

impl ParseError {
    /// Returns `true` for outcomes that ask for help instead of reporting a
    /// failure.
    pub fn is_help(&self) -> bool {
        matches!(self, Self::EscapeInvoked { .. } | Self::HelpRequested { .. })
    }

    /// Name of the command the outcome refers to, when one was matched.
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Syntax { command, .. }
            | Self::EscapeInvoked { command, .. }
            | Self::HelpRequested { command } => Some(command),
            Self::UnknownCommand(name) => Some(name),
            Self::NoArguments | Self::MissingCommandName => None,
        }
    }
}

/// Flag registration failures. The schema is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    /// The default value is not a string, bool or integer.
    #[error("unsupported flag type {found} for flag -{name}")]
    UnsupportedType { name: String, found: String },

    /// The name is empty, starts with `-` or contains `=`.
    #[error("invalid flag name: {0:?}")]
    InvalidName(String),
}

/// Failures reported by a command's [`Service`](crate::Service) hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The command has no service attached.
    #[error("no service attached to command {0}")]
    Missing(String),

    /// The service failed to connect.
    #[error("service connect failed: {0}")]
    Connect(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_like_outcomes() {
        let escape = ParseError::EscapeInvoked {
            command: "deploy".into(),
            args: vec![],
        };
        let help = ParseError::HelpRequested {
            command: "deploy".into(),
        };
        assert!(escape.is_help());
        assert!(help.is_help());
        assert!(!ParseError::NoArguments.is_help());
        assert!(!ParseError::UnknownCommand("x".into()).is_help());
    }

    #[test]
    fn messages() {
        assert_eq!(ParseError::NoArguments.to_string(), "no args to parse");
        assert_eq!(
            ParseError::MissingCommandName.to_string(),
            "missing command name"
        );
        let err = ParseError::Syntax {
            command: "run".into(),
            detail: "flag provided but not defined: -x".into(),
        };
        assert_eq!(err.to_string(), "run: flag provided but not defined: -x");
        assert_eq!(err.command(), Some("run"));
    }
}
