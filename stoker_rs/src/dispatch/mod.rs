//! Resolver and dispatcher.
//!
//! One call walks the tree by exact child names, binds the rest of the tokens,
//! runs the node's middleware in order and finally its handler:
//!
//! ```text
//! tokens ──► descend (exact child names) ──► interception check
//!                                                 │
//!                         ┌───────────────────────┴──────────────┐
//!                         ▼                                      ▼
//!                  bind + parse + defaults              (trigger, no binding)
//!                         │                                      │
//!                         └──────────► middleware ─► handler ◄───┘
//! ```
//!
//! Every failure comes back as a [`DispatchError`], including handler errors
//! and handler panics.

mod bind;
mod context;
mod middleware;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::command::CommandNode;
use crate::error::DispatchError;
use crate::host::LogSink;
use crate::suggest::closest_match;

pub(crate) use bind::{Flag, classify};
pub use context::InvocationContext;
pub use middleware::{HelpMiddleware, Middleware, Next};

/// Greedy descent: follow exact child-name matches from `root`.
///
/// Returns the deepest node reached and how many tokens were consumed. A child
/// match always wins over binding the token as an argument.
pub fn resolve<'n, S: AsRef<str>>(root: &'n CommandNode, tokens: &[S]) -> (&'n CommandNode, usize) {
    let mut node = root;
    let mut cursor = 0;
    while let Some(child) = tokens.get(cursor).and_then(|token| node.child(token.as_ref())) {
        node = child;
        cursor += 1;
    }
    (node, cursor)
}

/// Dispatch `tokens` (not including `root`'s own name) against `root`.
///
/// # Errors
///
/// See [`DispatchError`]; nothing here panics or mutates the tree.
pub fn dispatch<S: AsRef<str>>(
    root: &CommandNode,
    tokens: &[S],
    sink: &dyn LogSink,
) -> Result<(), DispatchError> {
    let (node, consumed) = resolve(root, tokens);
    let rest = &tokens[consumed..];
    let trigger = find_trigger(node, rest);
    tracing::debug!(
        command = %node.path(),
        remaining = rest.len(),
        trigger = trigger.as_deref().unwrap_or(""),
        "resolved command"
    );

    if node.handler().is_none() && trigger.is_none() {
        let token = rest.first().map(|t| t.as_ref().to_string());
        let suggestion = token
            .as_deref()
            .and_then(|t| closest_match(t, node.children().map(CommandNode::name)));
        return Err(DispatchError::NoSuchCommand {
            path: node.path().to_string(),
            token,
            suggestion,
        });
    }

    let ctx = match trigger {
        Some(trigger) => InvocationContext::new(
            node,
            Default::default(),
            Default::default(),
            Some(trigger),
            sink,
        ),
        None => {
            let bound = bind::bind(node, rest)?;
            InvocationContext::new(node, bound.arguments, bound.options, None, sink)
        }
    };

    run_chain(node, &ctx)
}

/// First remaining token some middleware of `node` claims. Tokens after a bare
/// `--` and tokens bound as an option's value are never triggers.
fn find_trigger<S: AsRef<str>>(node: &CommandNode, rest: &[S]) -> Option<String> {
    if node.middleware().is_empty() {
        return None;
    }
    let mut tokens = rest.iter().map(|token| token.as_ref());
    while let Some(token) = tokens.next() {
        if token == "--" {
            break;
        }
        if node.middleware().iter().any(|m| m.intercepts(node, token)) {
            return Some(token.to_string());
        }
        if let Flag::Option { inline: None, .. } = classify(node, token) {
            tokens.next();
        }
    }
    None
}

fn run_chain(node: &CommandNode, ctx: &InvocationContext<'_>) -> Result<(), DispatchError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        Next::new(node.middleware(), node.handler()).run(ctx)
    }));

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => {
            tracing::warn!(command = %node.path(), "command failed: {err:#}");
            Err(match err.downcast::<DispatchError>() {
                Ok(dispatch) => dispatch,
                Err(error) => DispatchError::Handler {
                    command: node.path().to_string(),
                    error,
                },
            })
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!(command = %node.path(), "command panicked: {message}");
            Err(DispatchError::HandlerPanicked {
                command: node.path().to_string(),
                message,
            })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests;
