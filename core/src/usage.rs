//! Usage text for single commands and for a command set.

use crate::command::CommandSpec;
use crate::flags::{FlagSchema, FlagValue};

/// Renders a command's usage text for `program`.
///
/// `{program}` in the template becomes the invocation name. The flag
/// listing replaces `{flags}`, or is appended on its own lines when the
/// template has no such placeholder.
///
/// # Examples
///
/// ```
/// use subcmd_core::{CommandSpec, describe};
///
/// let spec = CommandSpec::new("deploy")
///     .with_usage("usage: {program} deploy [flags] target")
///     .with_flag("env", "staging", "target environment")
///     .with_flag("force", false, "skip checks");
///
/// assert_eq!(
///     describe(&spec, "ship"),
///     "usage: ship deploy [flags] target\n    -env  target environment (default \"staging\")\n    -force  skip checks"
/// );
/// ```
pub fn describe(spec: &CommandSpec, program: &str) -> String {
    let listing = flag_listing(spec.schema());
    let template = match spec.usage() {
        Some(usage) => usage.to_string(),
        None => format!("usage: {{program}} {} [flags]", spec.name()),
    };
    let text = template.replace("{program}", program);

    if text.contains("{flags}") {
        text.replace("{flags}", &listing)
    } else if listing.is_empty() {
        text
    } else {
        format!("{text}\n{listing}")
    }
}

/// One `    -name  description` line per flag, in registration order.
/// Non-zero defaults are noted after the description.
pub fn flag_listing(schema: &FlagSchema) -> String {
    schema
        .iter()
        .map(|def| {
            let mut line = format!("    -{}", def.name);
            if !def.description.is_empty() {
                line.push_str("  ");
                line.push_str(&def.description);
            }
            if !def.default.is_zero() {
                match &def.default {
                    FlagValue::String(s) => line.push_str(&format!(" (default {s:?})")),
                    other => line.push_str(&format!(" (default {other})")),
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Top-level listing: a usage line, then one aligned line per command.
pub fn command_listing(program: &str, specs: &[CommandSpec]) -> String {
    let mut out = format!("usage: {program} <command> [flags] [args]");
    if specs.is_empty() {
        return out;
    }

    let width = specs.iter().map(|s| s.name().len()).max().unwrap_or(0);
    out.push_str("\n\ncommands:");
    for spec in specs {
        let line = format!("  {:width$}  {}", spec.name(), spec.description());
        out.push('\n');
        out.push_str(line.trim_end());
    }
    out
}
