//! Typed flag registry and per-parse bound values.
//!
//! A [`FlagSchema`] holds the flags a single command accepts. Each flag has a
//! name, a default [`FlagValue`] whose variant fixes the coercion kind, and a
//! description used by the usage listing. Parsing never mutates the schema:
//! the tokenizer starts from [`FlagValues::from_schema`] and overrides the
//! values it sees on the command line.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FlagError;

/// Coercion kind of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    /// Free-form text value.
    String,
    /// Switch; present on the command line means `true`.
    Bool,
    /// Signed integer value.
    Int,
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
        })
    }
}

/// A flag value tagged with its kind.
///
/// # Examples
///
/// ```
/// use subcmd_core::{FlagKind, FlagValue};
///
/// let v = FlagValue::from("staging");
/// assert_eq!(v.kind(), FlagKind::String);
/// assert_eq!(v.as_str(), Some("staging"));
/// assert_eq!(FlagValue::from(3).as_int(), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl FlagValue {
    /// Returns the coercion kind of this value.
    pub fn kind(&self) -> FlagKind {
        match self {
            Self::String(_) => FlagKind::String,
            Self::Bool(_) => FlagKind::Bool,
            Self::Int(_) => FlagKind::Int,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns `true` for `""`, `false` and `0`.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::Bool(b) => !b,
            Self::Int(i) => *i == 0,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FlagValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

/// Converts a dynamic value; the error names the unsupported type.
impl TryFrom<&serde_json::Value> for FlagValue {
    type Error = &'static str;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::String(s) => Ok(Self::String(s.clone())),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Number(n) => n.as_i64().map(Self::Int).ok_or(json_type_name(value)),
            other => Err(json_type_name(other)),
        }
    }
}

impl From<&FlagValue> for serde_json::Value {
    fn from(value: &FlagValue) -> Self {
        match value {
            FlagValue::String(s) => Self::String(s.clone()),
            FlagValue::Bool(b) => Self::Bool(*b),
            FlagValue::Int(i) => Self::from(*i),
        }
    }
}

/// Handle returned by registration, used for typed lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlagKey {
    name: String,
    kind: FlagKind,
}

impl FlagKey {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FlagKind {
        self.kind
    }
}

/// A registered flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagDef {
    /// Name without the leading dash.
    pub name: String,
    /// Default value; its variant is the flag's kind.
    pub default: FlagValue,
    /// One-line description for the usage listing.
    pub description: String,
}

impl FlagDef {
    pub fn kind(&self) -> FlagKind {
        self.default.kind()
    }
}

/// Ordered registry of the flags one command accepts.
///
/// A name is registered under exactly one kind. Registering a name again
/// replaces the previous definition (kind included) and keeps its position
/// in the listing.
///
/// # Examples
///
/// ```
/// use subcmd_core::FlagSchema;
///
/// let mut schema = FlagSchema::new();
/// schema.register_string("env", "staging", "target environment").unwrap();
/// schema.register_bool("dry-run", false, "print actions only").unwrap();
///
/// assert_eq!(schema.get_string("env"), "staging");
/// assert!(!schema.get_bool("dry-run"));
/// assert_eq!(schema.get_int("missing"), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSchema {
    defs: Vec<FlagDef>,
}

impl FlagSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a flag with an already-tagged default value.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError::InvalidName`] if `name` is empty, starts with
    /// `-` or contains `=`.
    pub fn register(
        &mut self,
        name: &str,
        default: impl Into<FlagValue>,
        description: &str,
    ) -> Result<FlagKey, FlagError> {
        validate_name(name)?;
        let def = FlagDef {
            name: name.to_string(),
            default: default.into(),
            description: description.to_string(),
        };
        let key = FlagKey {
            name: def.name.clone(),
            kind: def.kind(),
        };
        match self.defs.iter_mut().find(|d| d.name == name) {
            Some(existing) => *existing = def,
            None => self.defs.push(def),
        }
        Ok(key)
    }

    pub fn register_string(
        &mut self,
        name: &str,
        default: &str,
        description: &str,
    ) -> Result<FlagKey, FlagError> {
        self.register(name, default, description)
    }

    pub fn register_bool(
        &mut self,
        name: &str,
        default: bool,
        description: &str,
    ) -> Result<FlagKey, FlagError> {
        self.register(name, default, description)
    }

    pub fn register_int(
        &mut self,
        name: &str,
        default: i64,
        description: &str,
    ) -> Result<FlagKey, FlagError> {
        self.register(name, default, description)
    }

    /// Registers a flag whose kind is taken from the runtime type of a
    /// dynamic value, typically read from configuration.
    ///
    /// Strings, booleans and integers map to the matching kind. Anything
    /// else is reported with a `warn` diagnostic and the schema is left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError::UnsupportedType`] for floats, out-of-range
    /// integers, nulls, arrays and objects, and [`FlagError::InvalidName`]
    /// for unusable names.
    ///
    /// # Examples
    ///
    /// ```
    /// use subcmd_core::{FlagError, FlagSchema};
    /// use serde_json::json;
    ///
    /// let mut schema = FlagSchema::new();
    /// assert!(schema.register_flag("retries", &json!(3), "attempts").is_ok());
    /// assert!(matches!(
    ///     schema.register_flag("ratio", &json!(0.5), "fraction"),
    ///     Err(FlagError::UnsupportedType { .. })
    /// ));
    /// assert!(schema.lookup("ratio").is_none());
    /// ```
    pub fn register_flag(
        &mut self,
        name: &str,
        default: &serde_json::Value,
        description: &str,
    ) -> Result<FlagKey, FlagError> {
        let value = FlagValue::try_from(default).map_err(|found| {
            tracing::warn!(flag = name, found, "unsupported flag type");
            FlagError::UnsupportedType {
                name: name.to_string(),
                found: found.to_string(),
            }
        })?;
        self.register(name, value, description)
    }

    /// Looks up a flag definition by name.
    pub fn lookup(&self, name: &str) -> Option<&FlagDef> {
        self.defs.iter().find(|d| d.name == name)
    }

    /// Iterates flags in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FlagDef> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Default of a string flag, or `""` when absent.
    pub fn get_string(&self, name: &str) -> &str {
        string_or_zero(self.lookup(name).map(|d| &d.default))
    }

    /// Default of a bool flag, or `false` when absent.
    pub fn get_bool(&self, name: &str) -> bool {
        bool_or_zero(self.lookup(name).map(|d| &d.default))
    }

    /// Default of an int flag, or `0` when absent.
    pub fn get_int(&self, name: &str) -> i64 {
        int_or_zero(self.lookup(name).map(|d| &d.default))
    }
}

/// Flag values bound by one parse.
///
/// Every flag of the schema is present, starting at its default. Values
/// overridden on the command line are also recorded as explicitly set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagValues {
    values: BTreeMap<String, FlagValue>,
    set: BTreeSet<String>,
}

impl FlagValues {
    /// Seeds values from a schema's defaults.
    pub fn from_schema(schema: &FlagSchema) -> Self {
        Self {
            values: schema
                .iter()
                .map(|d| (d.name.clone(), d.default.clone()))
                .collect(),
            set: BTreeSet::new(),
        }
    }

    pub(crate) fn set(&mut self, name: &str, value: FlagValue) {
        self.values.insert(name.to_string(), value);
        self.set.insert(name.to_string());
    }

    /// Returns the bound value of a flag regardless of kind.
    pub fn value(&self, name: &str) -> Option<&FlagValue> {
        self.values.get(name)
    }

    /// Returns the bound value for a registration handle, if the kind still
    /// matches.
    pub fn get(&self, key: &FlagKey) -> Option<&FlagValue> {
        self.value(key.name()).filter(|v| v.kind() == key.kind())
    }

    /// Returns `true` if the flag appeared on the command line.
    pub fn is_set(&self, name: &str) -> bool {
        self.set.contains(name)
    }

    pub fn get_string(&self, name: &str) -> &str {
        string_or_zero(self.value(name))
    }

    pub fn get_bool(&self, name: &str) -> bool {
        bool_or_zero(self.value(name))
    }

    pub fn get_int(&self, name: &str) -> i64 {
        int_or_zero(self.value(name))
    }

    /// Iterates bound values sorted by flag name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Returns `true` if `name` can be registered and reached from the command
/// line: non-empty, no leading `-`, no `=`.
pub fn is_valid_flag_name(name: &str) -> bool {
    !(name.is_empty() || name.starts_with('-') || name.contains('='))
}

fn validate_name(name: &str) -> Result<(), FlagError> {
    if !is_valid_flag_name(name) {
        return Err(FlagError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "unsigned integer out of range",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn string_or_zero(value: Option<&FlagValue>) -> &str {
    value.and_then(FlagValue::as_str).unwrap_or("")
}

fn bool_or_zero(value: Option<&FlagValue>) -> bool {
    value.and_then(FlagValue::as_bool).unwrap_or(false)
}

fn int_or_zero(value: Option<&FlagValue>) -> i64 {
    value.and_then(FlagValue::as_int).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_register_typed() {
        let mut schema = FlagSchema::new();
        let key = schema.register_int("int", 3, "test int flag").unwrap();

        assert_eq!(key.name(), "int");
        assert_eq!(key.kind(), FlagKind::Int);
        assert_eq!(schema.get_int("int"), 3);
        assert_eq!(schema.lookup("int").unwrap().description, "test int flag");
    }

    #[test]
    fn test_absent_names_return_zero_values() {
        let schema = FlagSchema::new();
        assert_eq!(schema.get_string("nope"), "");
        assert!(!schema.get_bool("nope"));
        assert_eq!(schema.get_int("nope"), 0);
    }

    #[test]
    fn test_kind_mismatch_reads_as_zero() {
        let mut schema = FlagSchema::new();
        schema.register_string("name", "x", "").unwrap();
        assert_eq!(schema.get_int("name"), 0);
        assert!(!schema.get_bool("name"));
    }

    #[test]
    fn test_reregister_overwrites_and_keeps_position() {
        let mut schema = FlagSchema::new();
        schema.register_string("a", "one", "").unwrap();
        schema.register_string("b", "two", "").unwrap();
        schema.register_bool("a", true, "now a switch").unwrap();

        assert_eq!(schema.len(), 2);
        let names: Vec<_> = schema.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(schema.lookup("a").unwrap().kind(), FlagKind::Bool);
        assert_eq!(schema.get_string("a"), "");
        assert!(schema.get_bool("a"));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut schema = FlagSchema::new();
        for bad in ["", "-x", "a=b"] {
            assert_eq!(
                schema.register_bool(bad, true, ""),
                Err(FlagError::InvalidName(bad.to_string()))
            );
        }
        assert!(schema.is_empty());
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_register_flag_unsupported_emits_warning() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let mut schema = FlagSchema::new();
        let result = tracing::subscriber::with_default(subscriber, || {
            schema.register_flag("ratio", &json!(0.5), "")
        });
        assert!(result.is_err());

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("unsupported flag type"), "{output}");
        assert!(output.contains("flag=\"ratio\""), "{output}");
        assert!(output.contains("found=\"float\""), "{output}");
    }

    #[test]
    fn test_register_flag_dispatches_on_runtime_type() {
        let mut schema = FlagSchema::new();
        schema.register_flag("s", &json!("v"), "").unwrap();
        schema.register_flag("b", &json!(true), "").unwrap();
        schema.register_flag("i", &json!(-4), "").unwrap();

        assert_eq!(schema.get_string("s"), "v");
        assert!(schema.get_bool("b"));
        assert_eq!(schema.get_int("i"), -4);
    }

    #[test]
    fn test_register_flag_unsupported_leaves_schema_unchanged() {
        let mut schema = FlagSchema::new();
        schema.register_string("keep", "k", "").unwrap();
        let before = schema.clone();

        for value in [json!(1.5), json!(null), json!([1]), json!({"a": 1}), json!(u64::MAX)] {
            let err = schema.register_flag("float", &value, "").unwrap_err();
            assert!(matches!(err, FlagError::UnsupportedType { .. }));
        }

        assert_eq!(schema, before);
        assert_eq!(schema.get_int("float"), 0);
        assert_eq!(schema.get_string("float"), "");
    }

    #[test]
    fn test_unsupported_type_message() {
        let mut schema = FlagSchema::new();
        let err = schema.register_flag("ratio", &json!(0.25), "").unwrap_err();
        assert_eq!(err.to_string(), "unsupported flag type float for flag -ratio");
    }

    #[test]
    fn test_values_start_from_defaults() {
        let mut schema = FlagSchema::new();
        let key = schema.register_string("dstring", "default", "").unwrap();
        schema.register_bool("dbool", true, "").unwrap();

        let mut values = FlagValues::from_schema(&schema);
        assert_eq!(values.get_string("dstring"), "default");
        assert!(values.get_bool("dbool"));
        assert!(!values.is_set("dstring"));

        values.set("dstring", FlagValue::from("other"));
        assert!(values.is_set("dstring"));
        assert_eq!(values.get(&key), Some(&FlagValue::from("other")));
        // schema defaults are untouched
        assert_eq!(schema.get_string("dstring"), "default");
    }

    #[test]
    fn test_json_conversions() {
        assert_eq!(FlagValue::try_from(&json!("x")), Ok(FlagValue::from("x")));
        assert_eq!(FlagValue::try_from(&json!(false)), Ok(FlagValue::from(false)));
        assert_eq!(FlagValue::try_from(&json!(12)), Ok(FlagValue::from(12)));
        assert_eq!(FlagValue::try_from(&json!(1.0)), Err("float"));
        assert_eq!(FlagValue::try_from(&json!(null)), Err("null"));

        assert_eq!(serde_json::Value::from(&FlagValue::from(5)), json!(5));
        assert_eq!(serde_json::Value::from(&FlagValue::from("s")), json!("s"));
    }

    #[test]
    fn test_flag_value_serde_untagged() {
        let values: Vec<FlagValue> = serde_json::from_str(r#"["x", true, 7]"#).unwrap();
        assert_eq!(
            values,
            vec![FlagValue::from("x"), FlagValue::from(true), FlagValue::from(7)]
        );
    }
}
