use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use subcmd_core::{
    Bindable, Binder, CommandSpec, Dispatcher, FlagError, FlagSchema, ParseError, Service,
    ServiceError, describe, parse,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn subcmd() -> CommandSpec {
    CommandSpec::new("subcmd")
        .with_usage("{program} subcmd help document\n{flags}")
        .with_flag("string", "", "test string flag")
        .with_flag("dstring", "default", "test string flag, default")
        .with_flag("bool", false, "test bool flag")
        .with_flag("dbool", true, "test bool flag, default")
        .with_flag("int", 3, "test int flag")
        .with_escape_word("halp")
}

#[derive(Debug, Default, PartialEq)]
struct SubOpts {
    string: String,
    dstring: String,
    bool: bool,
    int: i64,
}

impl Bindable for SubOpts {
    fn binder() -> Binder<Self> {
        Binder::<Self>::new()
            .string("string", |o, v| o.string = v)
            .string("dstring", |o, v| o.dstring = v)
            .bool("bool", |o, v| o.bool = v)
            .int("int", |o, v| o.int = v)
    }
}

struct Flip(AtomicBool);

impl Service for Flip {
    fn connect(&self) -> Result<(), ServiceError> {
        self.0.store(true, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[test]
fn test_outcome_sequence_on_one_spec() {
    let specs = [subcmd()];

    let empty: Vec<String> = Vec::new();
    assert_eq!(parse(&empty, &specs).unwrap_err(), ParseError::NoArguments);

    let err = parse(&["subcmd", "-b", "foo", "bar", "-a"], &specs).unwrap_err();
    assert!(matches!(err, ParseError::Syntax { .. }));

    let err = parse(&["subcmd", "halp", "beep", "beep"], &specs).unwrap_err();
    assert!(matches!(err, ParseError::EscapeInvoked { .. }));

    let err = parse(&["wat", "waaat", "no", "nooo"], &specs).unwrap_err();
    assert_eq!(err, ParseError::UnknownCommand("wat".into()));

    let ctx = parse(
        &["subcmd", "-string", "value", "-bool", "pos1", "pos2"],
        &specs,
    )
    .unwrap();
    assert_eq!(ctx.args(), ["pos1", "pos2"]);
    assert_eq!(ctx.get_string("string"), "value");
    assert_eq!(ctx.get_string("dstring"), "default");
    assert!(ctx.get_bool("bool"));
    assert!(ctx.get_bool("dbool"));
    assert!(describe(ctx.spec(), "prog").starts_with("prog subcmd help document"));
}

#[test]
fn test_unknown_command_for_any_spec_set() {
    let specs = [
        CommandSpec::new("alpha"),
        CommandSpec::new("beta"),
        subcmd(),
    ];
    for token in ["gamma", "ALPHA", "-alpha", "sub"] {
        assert_eq!(
            parse(&[token, "x"], &specs).unwrap_err(),
            ParseError::UnknownCommand(token.to_string())
        );
    }
}

#[test]
fn test_owned_string_arguments() {
    let argv = vec!["subcmd".to_string(), "--".to_string(), "-int".to_string()];
    let specs = [subcmd()];
    let ctx = parse(&argv, &specs).unwrap();
    assert_eq!(ctx.args(), ["-int"]);
    assert_eq!(ctx.get_int("int"), 3);
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

#[test]
fn test_extract_struct() {
    let specs = [subcmd()];
    let ctx = parse(&["subcmd", "-int", "-12", "-string", "s"], &specs).unwrap();
    let opts: SubOpts = ctx.extract();
    assert_eq!(
        opts,
        SubOpts {
            string: "s".into(),
            dstring: "default".into(),
            bool: false,
            int: -12,
        }
    );
}

#[test]
fn test_bind_mismatch_does_not_corrupt_other_fields() {
    let specs = [subcmd()];
    let ctx = parse(&["subcmd", "-string", "s"], &specs).unwrap();

    let binder = Binder::<SubOpts>::new()
        .int("string", |o, v| o.int = v)
        .string("string", |o, v| o.string = v);
    let mut opts = SubOpts {
        int: 99,
        dstring: "kept".into(),
        ..Default::default()
    };
    assert_eq!(ctx.bind(&binder, &mut opts), 1);
    assert_eq!(opts.int, 99);
    assert_eq!(opts.dstring, "kept");
    assert_eq!(opts.string, "s");
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[test]
fn test_unsupported_default_type_is_skipped() {
    let mut schema = FlagSchema::new();
    let err = schema
        .register_flag("ratio", &serde_json::json!(0.5), "fraction")
        .unwrap_err();
    assert!(matches!(err, FlagError::UnsupportedType { .. }));
    assert!(schema.is_empty());

    let spec = CommandSpec::new("calc").with_schema(schema);
    let err = parse(&["calc", "-ratio", "1"], std::slice::from_ref(&spec)).unwrap_err();
    assert_eq!(
        err,
        ParseError::Syntax {
            command: "calc".into(),
            detail: "flag provided but not defined: -ratio".into(),
        }
    );
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[test]
fn test_dispatcher_runs_handler_with_service() {
    let flip = Arc::new(Flip(AtomicBool::new(false)));
    let dispatcher = Dispatcher::new("prog").command(
        CommandSpec::new("sync")
            .with_service(flip.clone())
            .with_handler(|ctx| match ctx.connect() {
                Ok(()) => 0,
                Err(_) => 1,
            }),
    );

    let ctx = dispatcher.parse(&["sync"]).unwrap();
    assert_eq!(ctx.submit(), 0);
    assert!(flip.0.load(Ordering::SeqCst));
}

#[test]
fn test_dispatcher_usage_is_stable() {
    let dispatcher = Dispatcher::new("prog")
        .command(subcmd().with_description("exercise every flag kind"))
        .command(CommandSpec::new("x"));
    assert_eq!(dispatcher.usage(), dispatcher.usage());
    assert_eq!(
        dispatcher.usage(),
        "usage: prog <command> [flags] [args]\n\ncommands:\n  subcmd  exercise every flag kind\n  x"
    );
}
