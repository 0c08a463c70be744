//! Declarative mapping of bound flag values onto caller structs.
//!
//! A [`Binder`] is a table of `(flag name, kind, setter)` entries. Binding
//! walks the table and runs each setter whose flag is bound with the same
//! kind; everything else is skipped, so a bad entry never touches another
//! field.
//!
//! # Examples
//!
//! ```
//! use subcmd_core::{Binder, CommandSpec, parse};
//!
//! #[derive(Default)]
//! struct DeployOpts {
//!     env: String,
//!     dry_run: bool,
//!     retries: i64,
//! }
//!
//! let specs = [CommandSpec::new("deploy")
//!     .with_flag("env", "staging", "")
//!     .with_flag("dry-run", false, "")
//!     .with_flag("retries", 3, "")];
//!
//! let ctx = parse(&["deploy", "-env", "prod", "-dry-run"], &specs).unwrap();
//!
//! let binder = Binder::<DeployOpts>::new()
//!     .string("env", |o, v| o.env = v)
//!     .bool("dry-run", |o, v| o.dry_run = v)
//!     .int("retries", |o, v| o.retries = v);
//!
//! let mut opts = DeployOpts::default();
//! assert_eq!(ctx.bind(&binder, &mut opts), 3);
//! assert_eq!(opts.env, "prod");
//! assert!(opts.dry_run);
//! assert_eq!(opts.retries, 3);
//! ```

use std::fmt;

use crate::flags::{FlagKind, FlagValue, FlagValues};

enum Setter<T> {
    String(fn(&mut T, String)),
    Bool(fn(&mut T, bool)),
    Int(fn(&mut T, i64)),
}

impl<T> Setter<T> {
    fn kind(&self) -> FlagKind {
        match self {
            Self::String(_) => FlagKind::String,
            Self::Bool(_) => FlagKind::Bool,
            Self::Int(_) => FlagKind::Int,
        }
    }

    /// Runs the setter if `value` has the matching kind.
    fn apply(&self, target: &mut T, value: &FlagValue) -> bool {
        match (self, value) {
            (Self::String(set), FlagValue::String(v)) => set(target, v.clone()),
            (Self::Bool(set), FlagValue::Bool(v)) => set(target, *v),
            (Self::Int(set), FlagValue::Int(v)) => set(target, *v),
            _ => return false,
        }
        true
    }
}

struct Field<T> {
    flag: String,
    setter: Setter<T>,
}

/// Field-mapping table from flag names to setters on `T`.
pub struct Binder<T> {
    fields: Vec<Field<T>>,
}

impl<T> Binder<T> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Maps a string flag onto a field.
    pub fn string(self, flag: &str, set: fn(&mut T, String)) -> Self {
        self.field(flag, Setter::String(set))
    }

    /// Maps a bool flag onto a field.
    pub fn bool(self, flag: &str, set: fn(&mut T, bool)) -> Self {
        self.field(flag, Setter::Bool(set))
    }

    /// Maps an int flag onto a field.
    pub fn int(self, flag: &str, set: fn(&mut T, i64)) -> Self {
        self.field(flag, Setter::Int(set))
    }

    fn field(mut self, flag: &str, setter: Setter<T>) -> Self {
        self.fields.push(Field {
            flag: flag.to_string(),
            setter,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copies values into `target` and returns how many fields were set.
    ///
    /// Entries whose flag is not bound, or is bound with a different kind,
    /// leave their field untouched.
    pub fn bind(&self, values: &FlagValues, target: &mut T) -> usize {
        let mut bound = 0;
        for field in &self.fields {
            let Some(value) = values.value(&field.flag) else {
                continue;
            };
            if field.setter.apply(target, value) {
                bound += 1;
            } else {
                tracing::debug!(
                    flag = %field.flag,
                    expected = %field.setter.kind(),
                    found = %value.kind(),
                    "flag kind does not match field, skipped"
                );
            }
        }
        bound
    }
}

impl<T> Default for Binder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Binder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.fields
                    .iter()
                    .map(|field| (field.flag.as_str(), field.setter.kind())),
            )
            .finish()
    }
}

/// Types that always bind from the same table.
pub trait Bindable: Sized {
    fn binder() -> Binder<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlagSchema;

    #[derive(Debug, Default, PartialEq)]
    struct Opts {
        name: String,
        verbose: bool,
        count: i64,
        untagged: String,
    }

    impl Bindable for Opts {
        fn binder() -> Binder<Self> {
            Binder::<Self>::new()
                .string("name", |o, v| o.name = v)
                .bool("verbose", |o, v| o.verbose = v)
                .int("count", |o, v| o.count = v)
        }
    }

    fn values() -> FlagValues {
        let mut schema = FlagSchema::new();
        schema.register_string("name", "anon", "").unwrap();
        schema.register_bool("verbose", true, "").unwrap();
        schema.register_int("count", 7, "").unwrap();
        FlagValues::from_schema(&schema)
    }

    #[test]
    fn test_bind_all_fields() {
        let mut opts = Opts {
            untagged: "keep".into(),
            ..Default::default()
        };
        assert_eq!(Opts::binder().bind(&values(), &mut opts), 3);
        assert_eq!(
            opts,
            Opts {
                name: "anon".into(),
                verbose: true,
                count: 7,
                untagged: "keep".into(),
            }
        );
    }

    #[test]
    fn test_kind_mismatch_leaves_fields_untouched() {
        let binder = Binder::<Opts>::new()
            .int("name", |o, v| o.count = v)
            .bool("count", |o, v| o.verbose = v)
            .string("verbose", |o, v| o.name = v)
            .string("name", |o, v| o.untagged = v);

        let mut opts = Opts {
            name: "before".into(),
            count: -1,
            ..Default::default()
        };
        assert_eq!(binder.bind(&values(), &mut opts), 1);
        assert_eq!(opts.name, "before");
        assert_eq!(opts.count, -1);
        assert!(!opts.verbose);
        assert_eq!(opts.untagged, "anon");
    }

    #[test]
    fn test_unknown_flags_are_skipped() {
        let binder = Binder::<Opts>::new().string("missing", |o, v| o.name = v);
        let mut opts = Opts {
            name: "unchanged".into(),
            ..Default::default()
        };
        assert_eq!(binder.bind(&values(), &mut opts), 0);
        assert_eq!(opts.name, "unchanged");
    }

    #[test]
    fn test_empty_binder_is_noop() {
        let binder: Binder<Opts> = Binder::default();
        let mut opts = Opts::default();
        assert!(binder.is_empty());
        assert_eq!(binder.bind(&values(), &mut opts), 0);
        assert_eq!(opts, Opts::default());
    }

    #[test]
    fn test_debug_lists_entries() {
        let out = format!("{:?}", Opts::binder());
        assert_eq!(out, r#"[("name", String), ("verbose", Bool), ("count", Int)]"#);
    }
}
