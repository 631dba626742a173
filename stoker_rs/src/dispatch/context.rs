//! Per-call invocation context handed to middleware and handlers.

use std::any::Any;
use std::collections::BTreeMap;

use crate::command::CommandNode;
use crate::error::{DispatchError, SlotKind};
use crate::host::LogSink;
use crate::value::ParsedValue;

/// Resolved arguments and options of one dispatch call.
///
/// Created by the resolver, borrowed by every middleware and the handler,
/// dropped when the call returns. Absent values mean "not provided";
/// required-ness is the handler's call.
pub struct InvocationContext<'a> {
    node: &'a CommandNode,
    arguments: BTreeMap<String, ParsedValue>,
    options: BTreeMap<String, ParsedValue>,
    trigger: Option<String>,
    sink: &'a dyn LogSink,
}

impl<'a> InvocationContext<'a> {
    pub(crate) fn new(
        node: &'a CommandNode,
        arguments: BTreeMap<String, ParsedValue>,
        options: BTreeMap<String, ParsedValue>,
        trigger: Option<String>,
        sink: &'a dyn LogSink,
    ) -> Self {
        Self {
            node,
            arguments,
            options,
            trigger,
            sink,
        }
    }

    /// The command this call resolved to.
    pub fn node(&self) -> &'a CommandNode {
        self.node
    }

    pub fn command_path(&self) -> &'a str {
        self.node.path()
    }

    pub fn arguments(&self) -> &BTreeMap<String, ParsedValue> {
        &self.arguments
    }

    pub fn options(&self) -> &BTreeMap<String, ParsedValue> {
        &self.options
    }

    pub fn has_argument(&self, name: &str) -> bool {
        self.arguments.contains_key(name)
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Typed argument value; `None` when absent or declared with another type.
    pub fn argument<T: Any>(&self, name: &str) -> Option<&T> {
        self.arguments.get(name).and_then(|value| value.get::<T>())
    }

    /// Typed option value; `None` when absent or declared with another type.
    pub fn option<T: Any>(&self, name: &str) -> Option<&T> {
        self.options.get(name).and_then(|value| value.get::<T>())
    }

    /// Argument the handler cannot do without.
    ///
    /// # Errors
    ///
    /// [`DispatchError::MissingRequiredValue`] when absent,
    /// [`DispatchError::WrongValueType`] when it was not parsed as `T`.
    pub fn required_argument<T: Any>(&self, name: &str) -> Result<&T, DispatchError> {
        self.required(SlotKind::Argument, name)
    }

    /// Option the handler cannot do without. Same errors as
    /// [`required_argument`](Self::required_argument).
    pub fn required_option<T: Any>(&self, name: &str) -> Result<&T, DispatchError> {
        self.required(SlotKind::Option, name)
    }

    fn required<T: Any>(&self, slot: SlotKind, name: &str) -> Result<&T, DispatchError> {
        let values = match slot {
            SlotKind::Argument => &self.arguments,
            SlotKind::Option => &self.options,
        };
        let value = values
            .get(name)
            .ok_or_else(|| DispatchError::MissingRequiredValue {
                command: self.command_path().to_string(),
                slot,
                name: name.to_string(),
            })?;
        value.get::<T>().ok_or_else(|| DispatchError::WrongValueType {
            command: self.command_path().to_string(),
            slot,
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Token claimed by a middleware (e.g. `--help`), if one intercepted this call.
    pub fn trigger(&self) -> Option<&str> {
        self.trigger.as_deref()
    }

    /// Report a line through the host's log sink.
    pub fn log(&self, message: impl AsRef<str>) {
        self.sink.log(message.as_ref());
    }

    pub fn sink(&self) -> &'a dyn LogSink {
        self.sink
    }
}

impl std::fmt::Debug for InvocationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationContext")
            .field("command", &self.node.path())
            .field("arguments", &self.arguments)
            .field("options", &self.options)
            .field("trigger", &self.trigger)
            .finish()
    }
}
