//! Manifest file model and conversion into command specs.
//!
//! # Example YAML
//!
//! ```yaml
//! program: deployctl
//! commands:
//!   - name: deploy
//!     description: Deploy a build
//!     usage: "usage: {program} deploy [flags] target\n{flags}"
//!     escape_word: halp
//!     flags:
//!       - name: env
//!         default: staging
//!         description: target environment
//!       - name: retries
//!         default: 3
//!       - name: dry-run
//!         default: false
//!   - name: status
//!     escape_word: null
//! ```
//!
//! A flag's kind comes from the YAML type of its `default`. An omitted
//! `escape_word` means `help`; an explicit `null` disables it.

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use subcmd_core::{CommandSpec, DEFAULT_ESCAPE_WORD, Dispatcher, FlagError};

use crate::error::{ManifestError, Result};
use crate::validate::validate_manifest;

/// On-disk encoding, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// `.json` selects JSON; anything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// One flag of a command entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagEntry {
    /// Flag name without the leading dash.
    pub name: String,
    /// Default value; a string, bool or integer.
    pub default: serde_json::Value,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// One command of a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Usage template with `{program}` and `{flags}` placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(default = "default_escape_word")]
    pub escape_word: Option<String>,
    #[serde(default)]
    pub flags: Vec<FlagEntry>,
}

fn default_escape_word() -> Option<String> {
    Some(DEFAULT_ESCAPE_WORD.to_string())
}

impl CommandEntry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            usage: None,
            escape_word: default_escape_word(),
            flags: Vec::new(),
        }
    }

    /// Builds a spec without a handler.
    ///
    /// Flags whose default has an unsupported type, or whose name is
    /// unusable, are logged and left out.
    pub fn to_spec(&self) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.name).with_description(&self.description);
        if let Some(usage) = &self.usage {
            spec = spec.with_usage(usage);
        }
        spec = match &self.escape_word {
            Some(word) => spec.with_escape_word(word),
            None => spec.without_escape_word(),
        };

        for flag in &self.flags {
            let registered = spec
                .schema_mut()
                .register_flag(&flag.name, &flag.default, &flag.description);
            if let Err(err @ FlagError::InvalidName(_)) = registered {
                tracing::warn!(command = %self.name, %err, "flag skipped");
            }
        }
        spec
    }

    /// Captures a spec's name, texts, escape word and flags.
    pub fn from_spec(spec: &CommandSpec) -> Self {
        Self {
            name: spec.name().to_string(),
            description: spec.description().to_string(),
            usage: spec.usage().map(str::to_string),
            escape_word: spec.escape_word().map(str::to_string),
            flags: spec
                .schema()
                .iter()
                .map(|def| FlagEntry {
                    name: def.name.clone(),
                    default: serde_json::Value::from(&def.default),
                    description: def.description.clone(),
                })
                .collect(),
        }
    }
}

/// A program's command set as configuration.
///
/// # Examples
///
/// ```
/// use subcmd_manifest::Manifest;
///
/// let manifest = Manifest::from_yaml_str(r#"
/// program: deployctl
/// commands:
///   - name: deploy
///     flags:
///       - { name: env, default: staging }
///       - { name: ratio, default: 0.5 }
/// "#).unwrap();
///
/// let dispatcher = manifest.to_dispatcher();
/// let ctx = dispatcher.parse(&["deploy", "-env", "prod"]).unwrap();
/// assert_eq!(ctx.get_string("env"), "prod");
/// // floats are not a flag kind; the flag is skipped
/// assert!(ctx.spec().schema().lookup("ratio").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Invocation name substituted for `{program}`.
    pub program: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub commands: Vec<CommandEntry>,
}

impl Manifest {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            description: None,
            commands: Vec::new(),
        }
    }

    /// Loads a manifest, choosing JSON or YAML from the extension.
    ///
    /// The result is not validated; see [`load_validated`](Self::load_validated).
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ManifestError::IoError) if the file cannot be
    /// read, or a [`JsonError`](ManifestError::JsonError) /
    /// [`YamlError`](ManifestError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let manifest = match Format::from_path(path) {
            Format::Json => serde_json::from_reader(reader)?,
            Format::Yaml => serde_yaml::from_reader(reader)?,
        };
        tracing::debug!(path = %path.display(), "manifest loaded");
        Ok(manifest)
    }

    /// Loads a manifest and rejects it if validation finds problems.
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load), plus [`Invalid`](ManifestError::Invalid).
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self> {
        let manifest = Self::load(path)?;
        manifest.validated()
    }

    /// Writes the manifest, choosing JSON or YAML from the extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ManifestError::IoError) if the file cannot be
    /// written, or a serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        match Format::from_path(path) {
            Format::Json => serde_json::to_writer_pretty(writer, self)?,
            Format::Yaml => serde_yaml::to_writer(writer, self)?,
        }
        Ok(())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Returns `self` if [`validate_manifest`] finds nothing.
    pub fn validated(self) -> Result<Self> {
        let errors = validate_manifest(&self);
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ManifestError::Invalid(errors))
        }
    }

    /// Looks up a command entry by name (first match).
    pub fn find(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Specs for every command, in manifest order.
    pub fn to_specs(&self) -> Vec<CommandSpec> {
        self.commands.iter().map(CommandEntry::to_spec).collect()
    }

    /// A dispatcher over [`to_specs`](Self::to_specs).
    pub fn to_dispatcher(&self) -> Dispatcher {
        self.to_specs()
            .into_iter()
            .fold(Dispatcher::new(&self.program), Dispatcher::command)
    }

    /// Captures a dispatcher's command set.
    pub fn from_dispatcher(dispatcher: &Dispatcher) -> Self {
        Self {
            program: dispatcher.program().to_string(),
            description: None,
            commands: dispatcher.specs().iter().map(CommandEntry::from_spec).collect(),
        }
    }
}
