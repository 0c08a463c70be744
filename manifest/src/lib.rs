//! Command manifests for `subcmd` dispatchers.
//!
//! A manifest declares a program's sub-commands and their flags in YAML or
//! JSON, so a command set can be configured instead of compiled in.
//!
//! # Quick start
//!
//! ```no_run
//! use subcmd_manifest::Manifest;
//!
//! let manifest = Manifest::load_validated("commands.yml").unwrap();
//! let dispatcher = manifest.to_dispatcher();
//! match dispatcher.parse(&std::env::args().skip(1).collect::<Vec<_>>()) {
//!     Ok(ctx) => println!("{} with {} args", ctx.name(), ctx.args().len()),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```
//!
//! Flag kinds follow the type of each flag's `default` (string, bool or
//! integer). Other types are reported by [`validate_manifest`] and skipped
//! with a warning when specs are built.

mod error;
mod manifest;
mod validate;

pub use error::{ManifestError, Result};
pub use manifest::{CommandEntry, FlagEntry, Format, Manifest};
pub use validate::{ValidationError, validate_manifest};
