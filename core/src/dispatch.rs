//! Sub-command matching and dispatch.

use crate::command::{CommandContext, CommandSpec};
use crate::error::ParseError;
use crate::tokens::{TokenError, parse_tokens};
use crate::usage;

/// Matches `args[0]` against `specs` and parses the rest of `args` with the
/// matched command's flags.
///
/// `args` excludes the program name. Specs are tried in order and the first
/// one whose name equals `args[0]` wins; later specs with the same name are
/// unreachable.
///
/// # Errors
///
/// See [`ParseError`]. Escape-word interception is reported as
/// [`ParseError::EscapeInvoked`], never as a success.
///
/// # Examples
///
/// ```
/// use subcmd_core::{CommandSpec, ParseError, parse};
///
/// let specs = [CommandSpec::new("deploy").with_flag("env", "staging", "")];
///
/// let ctx = parse(&["deploy", "-env", "prod", "web"], &specs).unwrap();
/// assert_eq!(ctx.get_string("env"), "prod");
/// assert_eq!(ctx.args(), ["web"]);
///
/// assert_eq!(
///     parse(&["deploy", "help", "env"], &specs).unwrap_err(),
///     ParseError::EscapeInvoked { command: "deploy".into(), args: vec!["env".into()] }
/// );
/// ```
pub fn parse<'a, S: AsRef<str>>(
    args: &[S],
    specs: &'a [CommandSpec],
) -> Result<CommandContext<'a>, ParseError> {
    let outcome = dispatch(args, specs);
    match &outcome {
        Ok(ctx) => tracing::debug!(command = ctx.name(), args = ctx.args().len(), "parsed"),
        Err(err) => tracing::debug!(%err, "parse outcome"),
    }
    outcome
}

fn dispatch<'a, S: AsRef<str>>(
    args: &[S],
    specs: &'a [CommandSpec],
) -> Result<CommandContext<'a>, ParseError> {
    let Some((first, rest)) = args.split_first() else {
        return Err(ParseError::NoArguments);
    };
    let first = first.as_ref();

    for spec in specs {
        if spec.name().is_empty() {
            return Err(ParseError::MissingCommandName);
        }
        if spec.name() != first {
            continue;
        }

        let tokens = parse_tokens(spec.schema(), rest).map_err(|err| match err {
            TokenError::Help => ParseError::HelpRequested {
                command: spec.name().to_string(),
            },
            TokenError::Syntax(detail) => ParseError::Syntax {
                command: spec.name().to_string(),
                detail,
            },
        })?;

        if let (Some(word), Some(head)) = (spec.escape_word(), tokens.positionals.first()) {
            if head == word {
                return Err(ParseError::EscapeInvoked {
                    command: spec.name().to_string(),
                    args: tokens.positionals[1..].to_vec(),
                });
            }
        }

        return Ok(CommandContext::new(spec, tokens.flags, tokens.positionals));
    }

    Err(ParseError::UnknownCommand(first.to_string()))
}

/// An ordered command set bound to a program name.
///
/// # Examples
///
/// ```
/// use subcmd_core::{CommandSpec, Dispatcher};
///
/// let dispatcher = Dispatcher::new("ship")
///     .command(CommandSpec::new("deploy").with_handler(|_| 0))
///     .command(CommandSpec::new("status").with_handler(|_| 3));
///
/// let ctx = dispatcher.parse(&["status"]).unwrap();
/// assert_eq!(ctx.submit(), 3);
/// assert!(dispatcher.usage().contains("deploy"));
/// ```
#[derive(Debug)]
pub struct Dispatcher {
    program: String,
    specs: Vec<CommandSpec>,
}

impl Dispatcher {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            specs: Vec::new(),
        }
    }

    /// Adds a command (builder form).
    pub fn command(mut self, spec: CommandSpec) -> Self {
        self.register(spec);
        self
    }

    /// Adds a command after any already registered. A name that is already
    /// taken is kept but can never match.
    pub fn register(&mut self, spec: CommandSpec) {
        if self.find(spec.name()).is_some() {
            tracing::warn!(command = spec.name(), "duplicate command name is unreachable");
        }
        self.specs.push(spec);
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn specs(&self) -> &[CommandSpec] {
        &self.specs
    }

    /// Returns the command that `name` dispatches to.
    pub fn find(&self, name: &str) -> Option<&CommandSpec> {
        self.specs.iter().find(|s| s.name() == name)
    }

    pub fn parse<S: AsRef<str>>(&self, args: &[S]) -> Result<CommandContext<'_>, ParseError> {
        parse(args, &self.specs)
    }

    /// Program-level usage listing every command.
    pub fn usage(&self) -> String {
        usage::command_listing(&self.program, &self.specs)
    }

    /// Usage text of one command.
    pub fn describe(&self, name: &str) -> Option<String> {
        self.find(name).map(|spec| usage::describe(spec, &self.program))
    }
}
