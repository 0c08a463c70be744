use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use subcmd_core::{
    Bindable, Binder, CommandContext, CommandSpec, Dispatcher, ParseError, Service, ServiceError,
    stdio,
};
use subcmd_manifest::{Manifest, ManifestError};
use tracing_subscriber::EnvFilter;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_PROGRAM: &str = "subcmd-demo";

/// Environment variable naming the upstream the `ping` command connects to.
const UPSTREAM_VAR: &str = "SUBCMD_DEMO_UPSTREAM";

/// Exit code for usage errors: no command, unknown command, bad flags.
const EXIT_USAGE: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "subcmd-demo")]
#[command(about = "Dispatch a sub-command from the built-in set or a command manifest")]
#[command(version)]
struct Cli {
    /// YAML or JSON manifest to load commands from instead of the built-in set.
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Write the active command set as a manifest to this path and exit.
    #[arg(long)]
    export: Option<PathBuf>,
    /// Program name shown in usage text (default: the manifest's program).
    #[arg(long)]
    program: Option<String>,
    /// Log filter, e.g. `debug` or `subcmd_core=trace` (overrides RUST_LOG).
    #[arg(long)]
    log_level: Option<String>,
    /// Sub-command followed by its own flags and arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let dispatcher = match build_dispatcher(&cli) {
        Ok(dispatcher) => dispatcher,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    if let Some(path) = &cli.export {
        if let Err(err) = Manifest::from_dispatcher(&dispatcher).save(path) {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
        tracing::info!(
            path = %path.display(),
            commands = dispatcher.specs().len(),
            "manifest exported"
        );
        return;
    }

    std::process::exit(run(&dispatcher, &cli.args));
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_dispatcher(cli: &Cli) -> Result<Dispatcher, ManifestError> {
    let Some(path) = &cli.manifest else {
        let program = cli.program.as_deref().unwrap_or(DEFAULT_PROGRAM);
        return Ok(builtin_commands(program));
    };

    let manifest = Manifest::load_validated(path)?;
    let program = cli.program.as_deref().unwrap_or(&manifest.program);
    tracing::debug!(path = %path.display(), commands = manifest.commands.len(), "manifest loaded");

    Ok(manifest
        .to_specs()
        .into_iter()
        .fold(Dispatcher::new(program), |dispatcher, spec| {
            dispatcher.command(spec.with_handler(print_context))
        }))
}

/// Parses `args`, runs the matched handler and returns the process exit code.
fn run(dispatcher: &Dispatcher, args: &[String]) -> i32 {
    match dispatcher.parse(args) {
        Ok(ctx) => ctx.submit(),
        Err(err) => report(dispatcher, &err),
    }
}

fn report(dispatcher: &Dispatcher, err: &ParseError) -> i32 {
    match err {
        ParseError::EscapeInvoked { command, .. } | ParseError::HelpRequested { command } => {
            let text = dispatcher
                .describe(command)
                .unwrap_or_else(|| dispatcher.usage());
            print_line(&text)
        }
        ParseError::NoArguments | ParseError::UnknownCommand(_) => {
            eprintln!("error: {err}");
            eprintln!("{}", dispatcher.usage());
            EXIT_USAGE
        }
        ParseError::Syntax { command, .. } => {
            eprintln!("error: {err}");
            if let Some(text) = dispatcher.describe(command) {
                eprintln!("{text}");
            }
            EXIT_USAGE
        }
        ParseError::MissingCommandName => {
            eprintln!("error: {err}");
            1
        }
    }
}

/// Writes `line` to stdout and returns the exit code for the outcome.
fn print_line(line: &str) -> i32 {
    exit_code(writeln!(io::stdout().lock(), "{line}"))
}

/// A reader that closed the pipe early (`| head`) ends output normally.
fn exit_code(written: io::Result<()>) -> i32 {
    match written {
        Ok(()) => 0,
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => 0,
        Err(err) => {
            eprintln!("error: writing output: {err}");
            1
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in commands
// ---------------------------------------------------------------------------

fn builtin_commands(program: &str) -> Dispatcher {
    Dispatcher::new(program)
        .command(
            CommandSpec::new("echo")
                .with_description("Print arguments joined by a separator")
                .with_usage("usage: {program} echo [flags] [words...]\n\nflags:\n{flags}")
                .with_flag("sep", " ", "separator between words")
                .with_flag("upper", false, "print in upper case")
                .with_flag("n", 1, "number of times to print the line")
                .with_handler(echo),
        )
        .command(
            CommandSpec::new("count")
                .with_description("Count arguments, or stdin lines when no arguments are given")
                .with_flag("blank", false, "include blank lines")
                .with_handler(count),
        )
        .command(
            CommandSpec::new("ping")
                .with_description("Connect to the upstream service")
                .with_escape_word("halp")
                .with_service(Arc::new(EnvUpstream { var: UPSTREAM_VAR }))
                .with_handler(ping),
        )
        .command(
            CommandSpec::new("version")
                .with_description("Print the version")
                .without_escape_word()
                .with_handler(|_| print_line(&format!("{DEFAULT_PROGRAM} {PACKAGE_VERSION}"))),
        )
}

#[derive(Debug, Default)]
struct EchoOpts {
    sep: String,
    upper: bool,
    times: i64,
}

impl Bindable for EchoOpts {
    fn binder() -> Binder<Self> {
        Binder::<Self>::new()
            .string("sep", |o, v| o.sep = v)
            .bool("upper", |o, v| o.upper = v)
            .int("n", |o, v| o.times = v)
    }
}

fn echo(ctx: &CommandContext<'_>) -> i32 {
    let opts: EchoOpts = ctx.extract();
    let mut line = ctx.args().join(&opts.sep);
    if opts.upper {
        line = line.to_uppercase();
    }
    let mut out = io::stdout().lock();
    exit_code((0..opts.times.max(0)).try_for_each(|_| writeln!(out, "{line}")))
}

fn count(ctx: &CommandContext<'_>) -> i32 {
    let records = if ctx.args().is_empty() {
        match stdio::stdin_args() {
            Ok(records) => records,
            Err(err) => {
                eprintln!("error: reading stdin: {err}");
                return 1;
            }
        }
    } else {
        ctx.args().to_vec()
    };

    let include_blank = ctx.get_bool("blank");
    let total = records
        .iter()
        .filter(|record| include_blank || !record.trim().is_empty())
        .count();

    if stdio::has_pipe() {
        print_line(&total.to_string())
    } else {
        print_line(&format!("{total} records"))
    }
}

/// Upstream whose address comes from an environment variable.
struct EnvUpstream {
    var: &'static str,
}

impl Service for EnvUpstream {
    fn connect(&self) -> Result<(), ServiceError> {
        match std::env::var(self.var) {
            Ok(addr) if !addr.trim().is_empty() => {
                tracing::debug!(%addr, "upstream connected");
                Ok(())
            }
            _ => Err(ServiceError::Connect(format!("{} is not set", self.var))),
        }
    }
}

fn ping(ctx: &CommandContext<'_>) -> i32 {
    match ctx.connect() {
        Ok(()) => print_line("pong"),
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

/// Handler for manifest commands: prints the bound flags and arguments as
/// JSON.
fn print_context(ctx: &CommandContext<'_>) -> i32 {
    let flags: serde_json::Map<String, serde_json::Value> = ctx
        .flags()
        .iter()
        .map(|(name, value)| (name.to_string(), serde_json::Value::from(value)))
        .collect();
    let set: Vec<&str> = ctx
        .flags()
        .iter()
        .map(|(name, _)| name)
        .filter(|name| ctx.is_set(name))
        .collect();

    let report = serde_json::json!({
        "command": ctx.name(),
        "flags": flags,
        "set": set,
        "args": ctx.args(),
    });
    match serde_json::to_string_pretty(&report) {
        Ok(text) => print_line(&text),
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}
