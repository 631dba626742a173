//! Narrow interfaces to the host the command framework runs inside.
//!
//! The framework only ever talks to its host through these traits: handlers
//! report through a [`LogSink`] and resolve domain objects through an
//! [`IdentifierRegistry`]. How the host reaches its own state is an adapter
//! concern and stays behind those implementations.

use std::sync::Mutex;

/// Where command output goes. The only channel handlers report results on.
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str);
}

impl<T: LogSink + ?Sized> LogSink for &T {
    fn log(&self, message: &str) {
        (**self).log(message)
    }
}

/// Forwards every line to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, message: &str) {
        tracing::info!(target: "stoker::console", "{}", message);
    }
}

/// Prints every line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn log(&self, message: &str) {
        println!("{message}");
    }
}

/// Captures lines in memory. Used by tests and by hosts that render output
/// themselves.
#[derive(Debug, Default)]
pub struct BufferSink {
    lines: Mutex<Vec<String>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Drain captured lines.
    pub fn take(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|mut lines| std::mem::take(&mut *lines))
            .unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl LogSink for BufferSink {
    fn log(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }
}

/// How an identifier passed to an [`IdentifierRegistry`] should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    /// Human readable name, matched case-insensitively.
    ReadableId,
    /// Stable unique key.
    Guid,
}

/// Lookup of domain objects by identifier. Called by handlers, never by the
/// dispatcher itself.
pub trait IdentifierRegistry: Send + Sync {
    type Item;

    /// Every identifier of the given kind, in registry order.
    fn all_identifiers(&self, kind: IdentifierKind) -> Vec<String>;

    /// Resolve one identifier; `None` when it is unknown.
    fn lookup(&self, id: &str, kind: IdentifierKind) -> Option<Self::Item>;
}
