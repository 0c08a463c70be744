//! Sub-command definitions and the context produced by a successful parse.

use std::fmt;
use std::sync::Arc;

use crate::bind::{Bindable, Binder};
use crate::error::{FlagError, ServiceError};
use crate::flags::{FlagKey, FlagSchema, FlagValue, FlagValues};

/// Escape word used when none is configured.
pub const DEFAULT_ESCAPE_WORD: &str = "help";

/// Function executed for a matched command; returns a process exit code.
pub type Handler = Box<dyn Fn(&CommandContext<'_>) -> i32 + Send + Sync>;

/// Late-bound external context a handler can ask for, such as a client
/// connection.
pub trait Service: Send + Sync {
    fn connect(&self) -> Result<(), ServiceError>;
}

/// A named sub-command: its flags, escape word, handler and service hook.
///
/// Built once during registration and then only read: parsing takes specs by
/// shared reference and binds values into a fresh [`CommandContext`].
///
/// # Examples
///
/// ```
/// use subcmd_core::CommandSpec;
///
/// let spec = CommandSpec::new("deploy")
///     .with_description("Deploy a build")
///     .with_usage("usage: {program} deploy [flags] target\n{flags}")
///     .with_flag("env", "staging", "target environment")
///     .with_flag("dry-run", false, "print actions only")
///     .with_handler(|ctx| if ctx.get_bool("dry-run") { 0 } else { 1 });
///
/// assert_eq!(spec.name(), "deploy");
/// assert_eq!(spec.escape_word(), Some("help"));
/// assert_eq!(spec.schema().len(), 2);
/// ```
pub struct CommandSpec {
    name: String,
    description: String,
    usage: Option<String>,
    escape_word: Option<String>,
    schema: FlagSchema,
    handler: Option<Handler>,
    service: Option<Arc<dyn Service>>,
}

impl CommandSpec {
    /// Creates a command with the default escape word and no flags.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            usage: None,
            escape_word: Some(DEFAULT_ESCAPE_WORD.to_string()),
            schema: FlagSchema::new(),
            handler: None,
            service: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Sets the usage template. `{program}` is replaced with the invocation
    /// name and `{flags}` with the flag listing.
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = Some(usage.to_string());
        self
    }

    pub fn with_escape_word(mut self, word: &str) -> Self {
        self.escape_word = Some(word.to_string());
        self
    }

    /// Disables escape-word interception.
    pub fn without_escape_word(mut self) -> Self {
        self.escape_word = None;
        self
    }

    pub fn with_schema(mut self, schema: FlagSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Registers a flag, logging and skipping it if the name is unusable.
    pub fn with_flag(
        mut self,
        name: &str,
        default: impl Into<FlagValue>,
        description: &str,
    ) -> Self {
        if let Err(err) = self.flag(name, default, description) {
            tracing::warn!(command = %self.name, %err, "flag not registered");
        }
        self
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CommandContext<'_>) -> i32 + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    pub fn with_service(mut self, service: Arc<dyn Service>) -> Self {
        self.service = Some(service);
        self
    }

    /// Registers a flag and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError::InvalidName`] for unusable names.
    pub fn flag(
        &mut self,
        name: &str,
        default: impl Into<FlagValue>,
        description: &str,
    ) -> Result<FlagKey, FlagError> {
        self.schema.register(name, default, description)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub fn escape_word(&self) -> Option<&str> {
        self.escape_word.as_deref()
    }

    pub fn schema(&self) -> &FlagSchema {
        &self.schema
    }

    pub fn schema_mut(&mut self) -> &mut FlagSchema {
        &mut self.schema
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub fn service(&self) -> Option<&dyn Service> {
        self.service.as_deref()
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("usage", &self.usage)
            .field("escape_word", &self.escape_word)
            .field("schema", &self.schema)
            .field("handler", &self.handler.is_some())
            .field("service", &self.service.is_some())
            .finish()
    }
}

/// A matched command with its bound flags and positional arguments.
///
/// Produced fresh by every successful [`parse`](crate::parse).
#[derive(Debug)]
pub struct CommandContext<'a> {
    spec: &'a CommandSpec,
    flags: FlagValues,
    args: Vec<String>,
}

impl<'a> CommandContext<'a> {
    pub(crate) fn new(spec: &'a CommandSpec, flags: FlagValues, args: Vec<String>) -> Self {
        Self { spec, flags, args }
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    pub fn spec(&self) -> &'a CommandSpec {
        self.spec
    }

    /// Positional arguments left after flag parsing, in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn flags(&self) -> &FlagValues {
        &self.flags
    }

    pub fn get(&self, key: &FlagKey) -> Option<&FlagValue> {
        self.flags.get(key)
    }

    pub fn get_string(&self, name: &str) -> &str {
        self.flags.get_string(name)
    }

    pub fn get_bool(&self, name: &str) -> bool {
        self.flags.get_bool(name)
    }

    pub fn get_int(&self, name: &str) -> i64 {
        self.flags.get_int(name)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.flags.is_set(name)
    }

    /// Runs the command's handler and returns its exit code, or `-1` when
    /// the command has no handler.
    pub fn submit(&self) -> i32 {
        match &self.spec.handler {
            Some(handler) => {
                let code = handler(self);
                tracing::debug!(command = self.name(), code, "handler finished");
                code
            }
            None => -1,
        }
    }

    pub fn service(&self) -> Option<&dyn Service> {
        self.spec.service()
    }

    /// Connects the command's service hook.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Missing`] if no service is attached, or the
    /// service's own error.
    pub fn connect(&self) -> Result<(), ServiceError> {
        match self.service() {
            Some(service) => service.connect(),
            None => Err(ServiceError::Missing(self.name().to_string())),
        }
    }

    /// Copies bound flag values into `target`; returns the number of fields
    /// set.
    pub fn bind<T>(&self, binder: &Binder<T>, target: &mut T) -> usize {
        binder.bind(&self.flags, target)
    }

    /// Builds a `T` from its default and its own binder.
    pub fn extract<T: Bindable + Default>(&self) -> T {
        let mut target = T::default();
        self.bind(&T::binder(), &mut target);
        target
    }
}
