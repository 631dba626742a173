//! Middleware chain around handler execution.

use std::sync::Arc;

use super::context::InvocationContext;
use crate::command::{CommandNode, Handler, render_help};

/// Wraps handler execution. Call `next.run(ctx)` to continue, or return
/// without calling it to short-circuit.
pub trait Middleware: Send + Sync {
    fn handle(&self, ctx: &InvocationContext<'_>, next: Next<'_>) -> anyhow::Result<()>;

    /// Claim a trigger token. When any remaining token is claimed, token
    /// binding is skipped and the chain runs with [`InvocationContext::trigger`]
    /// set, even on nodes without a handler.
    fn intercepts(&self, _node: &CommandNode, _token: &str) -> bool {
        false
    }
}

impl<F> Middleware for F
where
    F: Fn(&InvocationContext<'_>, Next<'_>) -> anyhow::Result<()> + Send + Sync,
{
    fn handle(&self, ctx: &InvocationContext<'_>, next: Next<'_>) -> anyhow::Result<()> {
        self(ctx, next)
    }
}

/// The rest of the chain after the current middleware.
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    handler: Option<&'a Handler>,
}

impl<'a> Next<'a> {
    pub(crate) fn new(chain: &'a [Arc<dyn Middleware>], handler: Option<&'a Handler>) -> Self {
        Self { chain, handler }
    }

    /// Run the remaining middleware, then the handler.
    pub fn run(self, ctx: &InvocationContext<'_>) -> anyhow::Result<()> {
        match self.chain.split_first() {
            Some((current, rest)) => current.handle(ctx, Next::new(rest, self.handler)),
            None => match self.handler {
                Some(handler) => handler(ctx),
                None => anyhow::bail!("'{}' has no handler", ctx.command_path()),
            },
        }
    }
}

/// Prints the node's help instead of running the handler when `--help` or
/// `-h` is present. A node that declares its own `help` option or `h` alias
/// keeps that spelling for itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct HelpMiddleware;

impl Middleware for HelpMiddleware {
    fn handle(&self, ctx: &InvocationContext<'_>, next: Next<'_>) -> anyhow::Result<()> {
        match ctx.trigger() {
            Some(trigger) if self.intercepts(ctx.node(), trigger) => {
                for line in render_help(ctx.node()).lines() {
                    ctx.log(line);
                }
                Ok(())
            }
            _ => next.run(ctx),
        }
    }

    fn intercepts(&self, node: &CommandNode, token: &str) -> bool {
        match token {
            "--help" => node.option("help").is_none(),
            "-h" => node.option_by_alias("h").is_none(),
            _ => false,
        }
    }
}
