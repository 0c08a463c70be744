//! Single-dash flag tokenizer.
//!
//! Consumes an argument slice against a [`FlagSchema`] and stops at the first
//! token that is not a flag. The accepted syntax:
//!
//! - `-name value` and `-name=value` for string and int flags
//! - `-name` alone sets a bool flag; `-name=false` clears it
//! - `--name` is accepted as a synonym of `-name`
//! - `--` ends flag parsing and is consumed
//! - `-` alone, or any token not starting with `-`, ends flag parsing and is
//!   kept as the first positional
//!
//! Nothing is ever written to the process's output streams.

use thiserror::Error;

use crate::flags::{FlagKind, FlagSchema, FlagValue, FlagValues};

/// Tokenizer failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Malformed flag syntax or value; the message names the flag.
    #[error("{0}")]
    Syntax(String),
    /// `-help` or `-h` was given but is not a registered flag.
    #[error("help requested")]
    Help,
}

/// Flags and positionals produced by [`parse_tokens`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    pub flags: FlagValues,
    pub positionals: Vec<String>,
}

/// Parses `args` against `schema`.
///
/// # Errors
///
/// Returns [`TokenError::Syntax`] for bad flag syntax, undefined flags,
/// missing arguments and values that do not coerce to the flag's kind, and
/// [`TokenError::Help`] for an unregistered `-help`/`-h`.
///
/// # Examples
///
/// ```
/// use subcmd_core::FlagSchema;
/// use subcmd_core::tokens::parse_tokens;
///
/// let mut schema = FlagSchema::new();
/// schema.register_int("n", 1, "count").unwrap();
///
/// let tokens = parse_tokens(&schema, &["-n=4", "file.txt"]).unwrap();
/// assert_eq!(tokens.flags.get_int("n"), 4);
/// assert_eq!(tokens.positionals, vec!["file.txt"]);
/// ```
pub fn parse_tokens<S: AsRef<str>>(
    schema: &FlagSchema,
    args: &[S],
) -> Result<Tokens, TokenError> {
    let mut flags = FlagValues::from_schema(schema);
    let mut rest = args.iter().map(AsRef::as_ref);
    let mut positionals = Vec::new();

    while let Some(token) = rest.next() {
        let Some(body) = flag_body(token) else {
            positionals.push(token.to_string());
            break;
        };
        let body = match body {
            FlagBody::Terminator => break,
            FlagBody::Flag(body) => body,
        };
        if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
            return Err(TokenError::Syntax(format!("bad flag syntax: {token}")));
        }

        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        let Some(def) = schema.lookup(name) else {
            if name == "help" || name == "h" {
                return Err(TokenError::Help);
            }
            return Err(TokenError::Syntax(format!(
                "flag provided but not defined: -{name}"
            )));
        };

        let value = match def.kind() {
            FlagKind::Bool => match inline {
                Some(raw) => FlagValue::Bool(parse_bool(raw).ok_or_else(|| {
                    TokenError::Syntax(format!(
                        "invalid boolean value {raw:?} for -{name}: parse error"
                    ))
                })?),
                None => FlagValue::Bool(true),
            },
            kind => {
                let raw = match inline {
                    Some(raw) => raw,
                    None => rest.next().ok_or_else(|| {
                        TokenError::Syntax(format!("flag needs an argument: -{name}"))
                    })?,
                };
                coerce(kind, name, raw)?
            }
        };
        flags.set(name, value);
    }

    positionals.extend(rest.map(str::to_string));
    Ok(Tokens { flags, positionals })
}

enum FlagBody<'a> {
    Terminator,
    Flag(&'a str),
}

fn flag_body(token: &str) -> Option<FlagBody<'_>> {
    if token.len() < 2 || !token.starts_with('-') {
        return None;
    }
    match token.strip_prefix("--") {
        Some("") => Some(FlagBody::Terminator),
        Some(body) => Some(FlagBody::Flag(body)),
        None => Some(FlagBody::Flag(&token[1..])),
    }
}

fn coerce(kind: FlagKind, name: &str, raw: &str) -> Result<FlagValue, TokenError> {
    match kind {
        FlagKind::String => Ok(FlagValue::String(raw.to_string())),
        FlagKind::Int => parse_int(raw).map(FlagValue::Int).map_err(|reason| {
            TokenError::Syntax(format!("invalid value {raw:?} for flag -{name}: {reason}"))
        }),
        FlagKind::Bool => parse_bool(raw).map(FlagValue::Bool).ok_or_else(|| {
            TokenError::Syntax(format!(
                "invalid boolean value {raw:?} for -{name}: parse error"
            ))
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parses a signed integer with an optional `0x`/`0o`/`0b`/`0` base prefix
/// and `_` separators between digits.
fn parse_int(raw: &str) -> Result<i64, &'static str> {
    const PARSE: &str = "parse error";
    const RANGE: &str = "value out of range";

    let (negative, unsigned) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let lower = unsigned.to_ascii_lowercase();
    let (radix, digits, prefixed) = if let Some(d) = lower.strip_prefix("0x") {
        (16, d, true)
    } else if let Some(d) = lower.strip_prefix("0o") {
        (8, d, true)
    } else if let Some(d) = lower.strip_prefix("0b") {
        (2, d, true)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..], true)
    } else {
        (10, lower.as_str(), false)
    };

    if digits.contains('_') {
        if !prefixed && digits.starts_with('_') {
            return Err(PARSE);
        }
        if digits.ends_with('_') || digits.contains("__") {
            return Err(PARSE);
        }
    }
    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(PARSE);
    }

    let magnitude = u64::from_str_radix(&digits, radix).map_err(|_| RANGE)?;
    if negative {
        if magnitude > i64::MAX as u64 + 1 {
            return Err(RANGE);
        }
        Ok((magnitude as i64).wrapping_neg())
    } else {
        i64::try_from(magnitude).map_err(|_| RANGE)
    }
}
