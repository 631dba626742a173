use std::sync::{Arc, Mutex};

use super::*;
use crate::command::CommandBuilder;
use crate::error::SlotKind;
use crate::host::BufferSink;

struct Record {
    label: &'static str,
    order: Arc<Mutex<Vec<&'static str>>>,
}

impl Middleware for Record {
    fn handle(&self, ctx: &InvocationContext<'_>, next: Next<'_>) -> anyhow::Result<()> {
        self.order.lock().unwrap().push(self.label);
        next.run(ctx)
    }
}

struct Deny;

impl Middleware for Deny {
    fn handle(&self, ctx: &InvocationContext<'_>, _next: Next<'_>) -> anyhow::Result<()> {
        ctx.log("denied");
        Ok(())
    }
}

fn card_tree(seen: Arc<Mutex<Vec<String>>>) -> CommandNode {
    let add_seen = Arc::clone(&seen);
    let list_seen = seen;
    CommandBuilder::new("card")
        .with_description("Manage cards")
        .use_help_middleware()
        .with_sub_command("add")
        .use_help_middleware()
        .with_name_argument()
        .parent()
        .set_handler(move |ctx| {
            let name = ctx.required_argument::<String>("name")?;
            add_seen.lock().unwrap().push(format!("add {name}"));
            Ok(())
        })
        .parent()
        .with_sub_command("list")
        .use_help_middleware()
        .with_option::<i64>("page")
        .with_default_value("1")
        .with_aliases(["p"])
        .parent()
        .with_option::<i64>("page-size")
        .with_default_value("50")
        .with_aliases(["ps"])
        .parent()
        .set_handler(move |ctx| {
            let page = ctx.required_option::<i64>("page")?;
            let size = ctx.required_option::<i64>("page-size")?;
            list_seen.lock().unwrap().push(format!("list {page} {size}"));
            Ok(())
        })
        .parent()
        .build()
        .unwrap()
}

fn recorded() -> (Arc<Mutex<Vec<String>>>, CommandNode) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let tree = card_tree(Arc::clone(&seen));
    (seen, tree)
}

#[test]
fn resolve_descends_by_exact_names() {
    let (_, tree) = recorded();
    let (node, consumed) = resolve(&tree, &["list", "extra"]);
    assert_eq!(node.path(), "card list");
    assert_eq!(consumed, 1);

    let (node, consumed) = resolve(&tree, &["LIST"]);
    assert_eq!(node.path(), "card");
    assert_eq!(consumed, 0);
}

#[test]
fn defaults_fill_missing_options() {
    let (seen, tree) = recorded();
    let sink = BufferSink::new();
    dispatch(&tree, &["list"], &sink).unwrap();
    dispatch(&tree, &["list", "-p", "3"], &sink).unwrap();
    dispatch(&tree, &["list", "--page-size=10", "--page", "2"], &sink).unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["list 1 50", "list 3 50", "list 2 10"]
    );
}

#[test]
fn repeated_option_keeps_last_value() {
    let (seen, tree) = recorded();
    dispatch(&tree, &["list", "-p", "2", "--page", "7"], &BufferSink::new()).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["list 7 50"]);
}

#[test]
fn help_short_circuits_handler_and_binding() {
    let (seen, tree) = recorded();
    let sink = BufferSink::new();
    // `bogus` would fail binding; help claims the call first.
    dispatch(&tree, &["list", "bogus", "--help"], &sink).unwrap();
    assert!(seen.lock().unwrap().is_empty());
    assert!(sink.contains("Usage: card list"));
    assert!(sink.contains("--page, -p <int>"));
}

#[test]
fn help_on_router_without_handler() {
    let (_, tree) = recorded();
    let sink = BufferSink::new();
    dispatch(&tree, &["-h"], &sink).unwrap();
    assert!(sink.contains("Subcommands:"));
}

#[test]
fn help_after_double_dash_is_positional() {
    let (seen, tree) = recorded();
    dispatch(&tree, &["add", "--", "--help"], &BufferSink::new()).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["add --help"]);
}

#[test]
fn help_token_taken_as_option_value_is_not_a_trigger() {
    let (seen, tree) = recorded();
    let sink = BufferSink::new();
    let err = dispatch(&tree, &["list", "--page", "-h"], &sink).unwrap_err();
    assert!(matches!(
        err,
        DispatchError::InvalidValue { ref name, ref source, .. } if name == "page" && source.token == "-h"
    ));
    assert!(!sink.contains("Usage: card list"));

    dispatch(&tree, &["list", "--page=2", "-h"], &sink).unwrap();
    assert!(sink.contains("Usage: card list"));
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn router_without_handler_reports_missing_subcommand() {
    let (_, tree) = recorded();
    let err = dispatch::<&str>(&tree, &[], &BufferSink::new()).unwrap_err();
    assert!(matches!(
        err,
        DispatchError::NoSuchCommand { ref path, token: None, .. } if path == "card"
    ));

    let err = dispatch(&tree, &["lst"], &BufferSink::new()).unwrap_err();
    match err {
        DispatchError::NoSuchCommand {
            token, suggestion, ..
        } => {
            assert_eq!(token.as_deref(), Some("lst"));
            assert_eq!(suggestion.as_deref(), Some("list"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn invalid_option_value_names_slot() {
    let (seen, tree) = recorded();
    let err = dispatch(&tree, &["list", "-p", "abc"], &BufferSink::new()).unwrap_err();
    match err {
        DispatchError::InvalidValue {
            slot, name, source, ..
        } => {
            assert_eq!(slot, SlotKind::Option);
            assert_eq!(name, "page");
            assert_eq!(source.token, "abc");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn unknown_flag_carries_suggestion() {
    let (_, tree) = recorded();
    let err = dispatch(&tree, &["list", "--pag", "2"], &BufferSink::new()).unwrap_err();
    match err {
        DispatchError::UnrecognizedOption {
            flag, suggestion, ..
        } => {
            assert_eq!(flag, "--pag");
            assert_eq!(suggestion.as_deref(), Some("--page"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn option_without_value_is_rejected() {
    let (_, tree) = recorded();
    let err = dispatch(&tree, &["list", "--page"], &BufferSink::new()).unwrap_err();
    assert!(matches!(
        err,
        DispatchError::MissingOptionValue { ref option, .. } if option == "page"
    ));
}

#[test]
fn extra_positional_is_rejected() {
    let (_, tree) = recorded();
    let err = dispatch(&tree, &["add", "a", "b"], &BufferSink::new()).unwrap_err();
    assert!(matches!(
        err,
        DispatchError::TooManyArguments { expected: 1, ref token, .. } if token == "b"
    ));
}

#[test]
fn negative_number_binds_as_argument() {
    let node = CommandBuilder::new("shift")
        .with_argument::<i64>("by")
        .parent()
        .set_handler(|ctx| {
            anyhow::ensure!(*ctx.required_argument::<i64>("by")? == -3);
            Ok(())
        })
        .build()
        .unwrap();
    dispatch(&node, &["-3"], &BufferSink::new()).unwrap();
}

#[test]
fn handler_error_is_wrapped_with_command_path() {
    let node = CommandBuilder::new("boom")
        .set_handler(|_| anyhow::bail!("storage offline"))
        .build()
        .unwrap();
    let err = dispatch::<&str>(&node, &[], &BufferSink::new()).unwrap_err();
    assert_eq!(err.to_string(), "command 'boom' failed: storage offline");
}

#[test]
fn dispatch_error_from_handler_passes_through() {
    let node = CommandBuilder::new("need")
        .with_option::<i64>("count")
        .parent()
        .set_handler(|ctx| {
            ctx.required_option::<i64>("count")?;
            Ok(())
        })
        .build()
        .unwrap();
    let err = dispatch::<&str>(&node, &[], &BufferSink::new()).unwrap_err();
    assert!(matches!(
        err,
        DispatchError::MissingRequiredValue { ref name, .. } if name == "count"
    ));
}

#[test]
fn handler_panic_is_contained() {
    let node = CommandBuilder::new("panic")
        .set_handler(|_| panic!("handler exploded"))
        .build()
        .unwrap();
    let err = dispatch::<&str>(&node, &[], &BufferSink::new()).unwrap_err();
    match err {
        DispatchError::HandlerPanicked { command, message } => {
            assert_eq!(command, "panic");
            assert_eq!(message, "handler exploded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn middleware_runs_in_registration_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let inner = Arc::clone(&order);
    let node = CommandBuilder::new("ordered")
        .use_middleware(Record {
            label: "first",
            order: Arc::clone(&order),
        })
        .use_middleware(Record {
            label: "second",
            order: Arc::clone(&order),
        })
        .set_handler(move |_| {
            inner.lock().unwrap().push("handler");
            Ok(())
        })
        .build()
        .unwrap();
    dispatch::<&str>(&node, &[], &BufferSink::new()).unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "handler"]);
}

#[test]
fn middleware_can_short_circuit() {
    let ran = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&ran);
    let node = CommandBuilder::new("guarded")
        .use_middleware(Deny)
        .set_handler(move |_| {
            *flag.lock().unwrap() = true;
            Ok(())
        })
        .build()
        .unwrap();
    let sink = BufferSink::new();
    dispatch::<&str>(&node, &[], &sink).unwrap();
    assert!(!*ran.lock().unwrap());
    assert_eq!(sink.lines(), vec!["denied"]);
}

#[test]
fn own_help_option_is_not_intercepted() {
    let node = CommandBuilder::new("manual")
        .use_help_middleware()
        .with_option::<String>("help")
        .parent()
        .set_handler(|ctx| {
            ctx.log(format!("topic {}", ctx.required_option::<String>("help")?));
            Ok(())
        })
        .build()
        .unwrap();
    let sink = BufferSink::new();
    dispatch(&node, &["--help", "intro"], &sink).unwrap();
    assert_eq!(sink.lines(), vec!["topic intro"]);
}
