//! Sub-command argument parsing.
//!
//! This crate turns a program's argument list into a matched sub-command
//! with bound flags and positional arguments:
//!
//! - [`FlagSchema`]: typed flag registry (string, bool, int) for one
//!   command.
//! - [`CommandSpec`]: a named command with flags, a usage template, an escape word,
//!   a handler and an optional [`Service`] hook.
//! - [`parse`] / [`Dispatcher`]: first-match dispatch on the first argument,
//!   then single-dash flag parsing ([`tokens`]) of the rest.
//! - [`CommandContext`]: the result of a successful parse; runs the handler
//!   with [`submit`](CommandContext::submit).
//! - [`Binder`]: declarative mapping of bound flags onto a struct.
//! - [`describe`]: usage text with a two-column flag listing.
//! - [`stdio`]: stdin/stdout helpers for handlers.
//!
//! Every non-success outcome is a [`ParseError`] value; nothing here exits
//! the process.
//!
//! # Example
//!
//! ```
//! use subcmd_core::*;
//!
//! let dispatcher = Dispatcher::new("ship")
//!     .command(
//!         CommandSpec::new("deploy")
//!             .with_description("Deploy a build")
//!             .with_flag("env", "staging", "target environment")
//!             .with_flag("force", false, "skip checks")
//!             .with_escape_word("halp")
//!             .with_handler(|ctx| if ctx.args().is_empty() { 2 } else { 0 }),
//!     );
//!
//! let ctx = dispatcher.parse(&["deploy", "-force", "web"]).unwrap();
//! assert!(ctx.get_bool("force"));
//! assert_eq!(ctx.get_string("env"), "staging");
//! assert_eq!(ctx.submit(), 0);
//!
//! assert!(matches!(
//!     dispatcher.parse(&["deploy", "halp"]),
//!     Err(ParseError::EscapeInvoked { .. })
//! ));
//! assert_eq!(
//!     dispatcher.parse(&["rollback"]).unwrap_err(),
//!     ParseError::UnknownCommand("rollback".into())
//! );
//! ```

mod bind;
mod command;
mod dispatch;
mod error;
mod flags;
pub mod stdio;
pub mod tokens;
mod usage;

pub use bind::{Bindable, Binder};
pub use command::{CommandContext, CommandSpec, DEFAULT_ESCAPE_WORD, Handler, Service};
pub use dispatch::{Dispatcher, parse};
pub use error::{FlagError, ParseError, ServiceError};
pub use flags::{
    FlagDef, FlagKey, FlagKind, FlagSchema, FlagValue, FlagValues, is_valid_flag_name,
};
pub use tokens::TokenError;
pub use usage::{command_listing, describe, flag_listing};
