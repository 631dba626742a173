//! Behavioural guarantees of building, dispatching and suggesting, exercised
//! through the public API only.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use stoker::{
    BufferSink, CommandBuilder, CommandNode, CommandRegistry, ConstructionError, DispatchError,
    ParsedValue, SlotKind, SourceUnavailable, StaticSuggestions, SuggestionSource, dispatch,
    resolve, suggest,
};

type Captured = Arc<Mutex<Vec<(String, BTreeMap<String, ParsedValue>, BTreeMap<String, ParsedValue>)>>>;

/// `card add <name>` and `card list [--page|-p 1] [--page-size|-ps 50]`,
/// recording every invocation's path, arguments and options.
fn card(captured: &Captured, page_default: &str) -> CommandNode {
    let add = Arc::clone(captured);
    let list = Arc::clone(captured);
    CommandBuilder::new("card")
        .with_sub_command("add")
        .with_name_argument()
        .with_suggestions(StaticSuggestions::new(["Fireball", "IceBolt"]))
        .parent()
        .set_handler(move |ctx| {
            add.lock().unwrap().push((
                ctx.command_path().to_string(),
                ctx.arguments().clone(),
                ctx.options().clone(),
            ));
            Ok(())
        })
        .parent()
        .with_sub_command("list")
        .with_option::<i64>("page")
        .with_default_value(page_default)
        .with_aliases(["p"])
        .parent()
        .with_option::<i64>("page-size")
        .with_default_value("50")
        .with_aliases(["ps"])
        .parent()
        .set_handler(move |ctx| {
            list.lock().unwrap().push((
                ctx.command_path().to_string(),
                ctx.arguments().clone(),
                ctx.options().clone(),
            ));
            Ok(())
        })
        .parent()
        .build()
        .unwrap()
}

fn captured() -> Captured {
    Arc::new(Mutex::new(Vec::new()))
}

fn int(values: &BTreeMap<String, ParsedValue>, name: &str) -> i64 {
    *values[name].get::<i64>().unwrap()
}

// ============================================
// Resolution
// ============================================

#[test]
fn greedy_descent_reaches_exactly_one_node() {
    let tree = card(&captured(), "1");
    for (tokens, path) in [
        (vec!["add", "Fireball"], "card add"),
        (vec!["list", "-p", "2"], "card list"),
        (vec!["list"], "card list"),
        (vec!["ad"], "card"),
    ] {
        let (node, _) = resolve(&tree, &tokens);
        assert_eq!(node.path(), path, "tokens {tokens:?}");
    }
}

#[test]
fn child_name_wins_over_local_argument() {
    let seen = captured();
    let local = Arc::clone(&seen);
    let tree = CommandBuilder::new("deck")
        .with_argument::<String>("filter")
        .with_default_value("all")
        .parent()
        .set_handler(move |ctx| {
            local
                .lock()
                .unwrap()
                .push((ctx.command_path().to_string(), ctx.arguments().clone(), BTreeMap::new()));
            Ok(())
        })
        .with_sub_command("shuffle")
        .set_handler(|ctx| {
            ctx.log("shuffled");
            Ok(())
        })
        .parent()
        .build()
        .unwrap();

    let sink = BufferSink::new();
    dispatch(&tree, &["shuffle"], &sink).unwrap();
    assert_eq!(sink.lines(), vec!["shuffled"]);

    dispatch(&tree, &["rares"], &sink).unwrap();
    let calls = seen.lock().unwrap();
    assert_eq!(calls[0].0, "deck");
    assert_eq!(calls[0].1["filter"].get::<String>().unwrap(), "rares");
}

// ============================================
// Binding
// ============================================

#[test]
fn alias_and_full_name_yield_identical_context() {
    let seen = captured();
    let tree = card(&seen, "1");
    let sink = BufferSink::new();
    dispatch(&tree, &["list", "-p", "2", "-ps", "10"], &sink).unwrap();
    dispatch(&tree, &["list", "--page", "2", "--page-size", "10"], &sink).unwrap();
    dispatch(&tree, &["list", "--page=2", "-ps=10"], &sink).unwrap();

    let calls = seen.lock().unwrap();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], calls[1]);
    assert_eq!(calls[1], calls[2]);
}

#[test]
fn defaults_appear_and_only_changed_default_differs() {
    let before = captured();
    let after = captured();
    let sink = BufferSink::new();
    dispatch(&card(&before, "1"), &["list"], &sink).unwrap();
    dispatch(&card(&after, "4"), &["list"], &sink).unwrap();

    let before = before.lock().unwrap()[0].2.clone();
    let after = after.lock().unwrap()[0].2.clone();
    let (before, after) = (&before, &after);
    assert_eq!(int(before, "page"), 1);
    assert_eq!(int(after, "page"), 4);
    assert!(before["page"].is_default());
    assert_eq!(before["page-size"], after["page-size"]);
    assert_eq!(int(after, "page-size"), 50);
}

#[test]
fn non_numeric_int_is_a_parse_error_not_zero() {
    let seen = captured();
    let tree = card(&seen, "1");
    let err = dispatch(&tree, &["list", "-p", "abc"], &BufferSink::new()).unwrap_err();
    match err {
        DispatchError::InvalidValue {
            slot, name, source, ..
        } => {
            assert_eq!(slot, SlotKind::Option);
            assert_eq!(name, "page");
            assert_eq!(source.token, "abc");
            assert_eq!(source.expected, "int");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn add_and_list_round_trip() {
    let seen = captured();
    let tree = card(&seen, "1");
    let sink = BufferSink::new();
    dispatch(&tree, &["add", "Fireball"], &sink).unwrap();
    dispatch(&tree, &["list", "-p", "2"], &sink).unwrap();

    let calls = seen.lock().unwrap();
    let (path, arguments, options) = &calls[0];
    assert_eq!(path, "card add");
    assert_eq!(arguments.len(), 1);
    assert_eq!(arguments["name"].get::<String>().unwrap(), "Fireball");
    assert!(options.is_empty());

    let (path, arguments, options) = &calls[1];
    assert_eq!(path, "card list");
    assert!(arguments.is_empty());
    assert_eq!(options.len(), 2);
    assert_eq!(int(options, "page"), 2);
    assert_eq!(int(options, "page-size"), 50);
}

// ============================================
// Suggestions
// ============================================

#[derive(Clone)]
struct Roster(Arc<Mutex<Option<Vec<String>>>>);

impl SuggestionSource for Roster {
    fn suggestions(&self) -> Result<Vec<String>, SourceUnavailable> {
        self.0
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SourceUnavailable::new("not initialized"))
    }
}

#[test]
fn suggestions_are_verbatim_and_empty_when_uninitialized() {
    let tree = card(&captured(), "1");
    assert_eq!(suggest(&tree, &["add", ""]), vec!["Fireball", "IceBolt"]);

    let roster = Roster(Arc::new(Mutex::new(None)));
    let relics = CommandBuilder::new("relic")
        .with_sub_command("remove")
        .with_name_argument()
        .with_suggestions(roster.clone())
        .parent()
        .set_handler(|_| Ok(()))
        .parent()
        .build()
        .unwrap();
    assert!(suggest(&relics, &["remove", ""]).is_empty());

    *roster.0.lock().unwrap() = Some(vec!["Anchor".to_string(), "Vajra".to_string()]);
    assert_eq!(suggest(&relics, &["remove", ""]), vec!["Anchor", "Vajra"]);
}

// ============================================
// Failures
// ============================================

#[test]
fn unknown_top_level_command_leaves_registry_usable() {
    let seen = captured();
    let registry = CommandRegistry::with_commands([card(&seen, "1")]).unwrap();
    let sink = BufferSink::new();

    let err = registry.dispatch(&["bogus"], &sink).unwrap_err();
    assert!(matches!(
        err,
        DispatchError::NoSuchCommand { ref token, .. } if token.as_deref() == Some("bogus")
    ));

    registry.dispatch(&["card", "add", "Fireball"], &sink).unwrap();
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["card"]);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn colliding_aliases_fail_at_build() {
    let err = CommandBuilder::new("list")
        .with_option::<i64>("page")
        .with_aliases(["p"])
        .parent()
        .with_option::<i64>("pages")
        .with_aliases(["p"])
        .parent()
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        ConstructionError::DuplicateAlias { ref alias, .. } if alias == "p"
    ));
}

#[test]
fn bad_default_fails_at_build() {
    let err = CommandBuilder::new("list")
        .with_option::<i64>("page")
        .with_default_value("first")
        .parent()
        .build()
        .unwrap_err();
    assert!(matches!(err, ConstructionError::InvalidDefault { ref name, .. } if name == "page"));
}

// ============================================
// Concurrency
// ============================================

#[test]
fn built_tree_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CommandNode>();
    assert_send_sync::<CommandRegistry>();

    let seen = captured();
    let tree = card(&seen, "1");
    std::thread::scope(|scope| {
        for page in 1..=8 {
            let tree = &tree;
            scope.spawn(move || {
                let page = page.to_string();
                dispatch(tree, &["list", "-p", page.as_str()], &BufferSink::new()).unwrap();
            });
        }
    });

    let mut pages: Vec<i64> = seen
        .lock()
        .unwrap()
        .iter()
        .map(|(_, _, options)| int(options, "page"))
        .collect();
    pages.sort_unstable();
    assert_eq!(pages, (1..=8).collect::<Vec<_>>());
}
