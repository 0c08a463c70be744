//! Manifest validation.
//!
//! Catches entries that would load but behave surprisingly: commands that can
//! never match, flags that can never be set, defaults with no flag kind.
//!
//! # Examples
//!
//! ```
//! use subcmd_manifest::{CommandEntry, Manifest, ValidationError, validate_manifest};
//!
//! let mut manifest = Manifest::new("ship");
//! manifest.commands.push(CommandEntry::new("deploy"));
//! assert!(validate_manifest(&manifest).is_empty());
//!
//! manifest.commands.push(CommandEntry::new("deploy"));
//! assert_eq!(
//!     validate_manifest(&manifest),
//!     vec![ValidationError::DuplicateCommand("deploy".into())]
//! );
//! ```

use std::collections::HashSet;

use subcmd_core::{FlagValue, is_valid_flag_name};
use thiserror::Error;

use crate::manifest::{CommandEntry, Manifest};

/// Manifest validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `program` is empty or whitespace-only.
    #[error("program name cannot be empty")]
    EmptyProgram,
    /// A command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// A later command shares a name with an earlier one and is unreachable.
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),
    /// An escape word is present but empty.
    #[error("empty escape word in command {0}")]
    EmptyEscapeWord(String),
    /// A flag name is empty, starts with `-` or contains `=`.
    #[error("invalid flag name {flag:?} in command {command}")]
    InvalidFlagName { command: String, flag: String },
    /// Two flags of one command share a name.
    #[error("duplicate flag -{flag} in command {command}")]
    DuplicateFlag { command: String, flag: String },
    /// A default value is not a string, bool or integer.
    #[error("unsupported default type {found} for flag -{flag} in command {command}")]
    UnsupportedDefault {
        command: String,
        flag: String,
        found: String,
    },
}

/// Validates a manifest and returns every problem found, in manifest order.
pub fn validate_manifest(manifest: &Manifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if manifest.program.trim().is_empty() {
        errors.push(ValidationError::EmptyProgram);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for command in &manifest.commands {
        if command.name.trim().is_empty() {
            errors.push(ValidationError::EmptyCommandName);
            continue;
        }
        // dispatch matches names exactly, so only exact repeats are shadowed
        if !seen.insert(command.name.as_str()) {
            errors.push(ValidationError::DuplicateCommand(command.name.clone()));
        }
        errors.extend(validate_command(command));
    }

    errors
}

fn validate_command(command: &CommandEntry) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if command.escape_word.as_deref() == Some("") {
        errors.push(ValidationError::EmptyEscapeWord(command.name.clone()));
    }

    let mut seen = HashSet::new();
    for flag in &command.flags {
        if !is_valid_flag_name(&flag.name) {
            errors.push(ValidationError::InvalidFlagName {
                command: command.name.clone(),
                flag: flag.name.clone(),
            });
            continue;
        }
        if !seen.insert(flag.name.as_str()) {
            errors.push(ValidationError::DuplicateFlag {
                command: command.name.clone(),
                flag: flag.name.clone(),
            });
        }
        if let Err(found) = FlagValue::try_from(&flag.default) {
            errors.push(ValidationError::UnsupportedDefault {
                command: command.name.clone(),
                flag: flag.name.clone(),
                found: found.to_string(),
            });
        }
    }

    errors
}
