//! Help text generation for command nodes.

use super::node::CommandNode;

/// Render the help page for one node: usage, subcommands, arguments, options.
pub fn render_help(node: &CommandNode) -> String {
    let mut help = String::new();
    if node.description().is_empty() {
        help.push_str(&format!("{}\n", node.path()));
    } else {
        help.push_str(&format!("{} - {}\n", node.path(), node.description()));
    }
    help.push_str(&format!("\nUsage: {}\n", usage(node)));

    if node.has_children() {
        help.push_str("\nSubcommands:\n");
        let width = node.children().map(|c| c.name().len()).max().unwrap_or(0);
        for child in node.children() {
            help.push_str(&format!(
                "  {:<width$}  {}\n",
                child.name(),
                child.description()
            ));
        }
    }

    if !node.arguments().is_empty() {
        help.push_str("\nArguments:\n");
        let rows: Vec<(String, String)> = node
            .arguments()
            .iter()
            .map(|arg| {
                (
                    format!("<{}>", arg.name()),
                    describe(arg.description(), arg.type_tag(), arg.default_value()),
                )
            })
            .collect();
        push_rows(&mut help, &rows);
    }

    let mut options = node.options().peekable();
    if options.peek().is_some() {
        help.push_str("\nOptions:\n");
        let rows: Vec<(String, String)> = options
            .map(|opt| {
                let mut flags = format!("--{}", opt.name());
                for alias in opt.aliases() {
                    flags.push_str(&format!(", -{alias}"));
                }
                flags.push_str(&format!(" <{}>", opt.type_tag()));
                (
                    flags,
                    describe(opt.description(), opt.type_tag(), opt.default_value()),
                )
            })
            .collect();
        push_rows(&mut help, &rows);
    }

    help
}

/// One-line usage synopsis, e.g. `card list [--page <int>] [--page-size <int>]`.
pub fn usage(node: &CommandNode) -> String {
    let mut parts = vec![node.path().to_string()];
    if node.has_children() {
        parts.push(if node.handler().is_some() {
            "[<subcommand>]".to_string()
        } else {
            "<subcommand>".to_string()
        });
    }
    for arg in node.arguments() {
        if arg.default_value().is_some() {
            parts.push(format!("[<{}>]", arg.name()));
        } else {
            parts.push(format!("<{}>", arg.name()));
        }
    }
    for opt in node.options() {
        parts.push(format!("[--{} <{}>]", opt.name(), opt.type_tag()));
    }
    parts.join(" ")
}

fn describe(description: &str, type_tag: &str, default: Option<&str>) -> String {
    let mut text = if description.is_empty() {
        format!("({type_tag})")
    } else {
        format!("{description} ({type_tag})")
    };
    if let Some(default) = default {
        text.push_str(&format!(" [default: {default}]"));
    }
    text
}

fn push_rows(help: &mut String, rows: &[(String, String)]) {
    let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
    for (left, right) in rows {
        help.push_str(&format!("  {left:<width$}  {right}\n"));
    }
}
