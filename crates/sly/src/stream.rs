//! Push-based command streams.
//!
//! A `PushStream` is an ordered, append-only, emit-once channel. The
//! producer writes commands in program order and terminates the stream
//! exactly once, either with an error or with normal completion. Every
//! attached handler sees every event synchronously, in emission order;
//! the stream keeps no history, so handlers attached after the first
//! write have missed those events for good.
//!
//! Termination rules:
//! - `write` on a terminated stream panics. A late write always means
//!   the pipeline wiring is broken, not that the template is bad.
//! - `write_error` and `close` on a terminated stream are no-ops, so
//!   redundant termination from defensive wiring is harmless.

use std::fmt;

use crate::commands::Command;

/// Consumer of stream events.
///
/// Implementations must forward `on_error` to their own downstream
/// handlers rather than swallow it; errors never fail silently.
pub trait StreamHandler {
    /// A command was written to the stream.
    fn on_emit(&mut self, command: &Command);

    /// The stream terminated with an unrecoverable fault.
    fn on_error(&mut self, error: &StreamError);

    /// The stream completed normally.
    fn on_done(&mut self);
}

impl<T: StreamHandler + ?Sized> StreamHandler for &mut T {
    fn on_emit(&mut self, command: &Command) {
        (**self).on_emit(command);
    }

    fn on_error(&mut self, error: &StreamError) {
        (**self).on_error(error);
    }

    fn on_done(&mut self) {
        (**self).on_done();
    }
}

impl<T: StreamHandler + ?Sized> StreamHandler for Box<T> {
    fn on_emit(&mut self, command: &Command) {
        (**self).on_emit(command);
    }

    fn on_error(&mut self, error: &StreamError) {
        (**self).on_error(error);
    }

    fn on_done(&mut self) {
        (**self).on_done();
    }
}

/// An unrecoverable per-stream fault, with an optional source position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamError {
    pub message: String,
    /// 0-based line in the template source, when known.
    pub line: Option<u32>,
    /// 0-based column in the template source, when known.
    pub column: Option<u32>,
}

impl StreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn at(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, "{}:{}: {}", line, column, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// A non-fatal diagnostic collected on the stream.
///
/// Warnings do not terminate the stream; the compiler service drains
/// them into the compile report after the pipeline finishes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamWarning {
    pub message: String,
    /// The raw template fragment the warning is about.
    pub fragment: String,
}

impl StreamWarning {
    pub fn new(message: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fragment: fragment.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StreamState {
    Open,
    Done,
    Failed,
}

/// An ordered, single-pass, push-based command channel.
pub struct PushStream<'h> {
    handlers: Vec<Box<dyn StreamHandler + 'h>>,
    warnings: Vec<StreamWarning>,
    state: StreamState,
}

impl<'h> PushStream<'h> {
    /// Create an empty, open stream with no handlers.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            warnings: Vec::new(),
            state: StreamState::Open,
        }
    }

    /// Attach a handler. Events written before attachment are not
    /// replayed; this pipeline always attaches before driving.
    pub fn attach(&mut self, handler: impl StreamHandler + 'h) {
        self.handlers.push(Box::new(handler));
    }

    /// Attach an already-boxed handler.
    pub fn attach_boxed(&mut self, handler: Box<dyn StreamHandler + 'h>) {
        self.handlers.push(handler);
    }

    /// Append a command, forwarding it to every handler in attach order.
    ///
    /// # Panics
    ///
    /// Panics if the stream has already terminated.
    pub fn write(&mut self, command: Command) {
        assert!(
            self.state == StreamState::Open,
            "write on a terminated command stream"
        );
        for handler in &mut self.handlers {
            handler.on_emit(&command);
        }
    }

    /// Record a non-fatal warning on the stream.
    pub fn warn(&mut self, warning: StreamWarning) {
        self.warnings.push(warning);
    }

    /// Signal an unrecoverable fault and terminate the stream.
    /// No-op if the stream has already terminated.
    pub fn write_error(&mut self, error: StreamError) {
        if self.state != StreamState::Open {
            return;
        }
        self.state = StreamState::Failed;
        for handler in &mut self.handlers {
            handler.on_error(&error);
        }
    }

    /// Signal normal completion and terminate the stream. Idempotent.
    pub fn close(&mut self) {
        if self.state != StreamState::Open {
            return;
        }
        self.state = StreamState::Done;
        for handler in &mut self.handlers {
            handler.on_done();
        }
    }

    /// Whether the stream has been terminated, by error or completion.
    pub fn is_terminated(&self) -> bool {
        self.state != StreamState::Open
    }

    /// Whether the stream terminated with an error.
    pub fn is_failed(&self) -> bool {
        self.state == StreamState::Failed
    }

    /// Drain the warnings collected so far.
    pub fn take_warnings(&mut self) -> Vec<StreamWarning> {
        std::mem::take(&mut self.warnings)
    }
}

impl Default for PushStream<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// A handler that records everything it receives.
///
/// Used as the backend in tests and as a buffering consumer by hosts
/// that want the optimized command sequence as a vector.
#[derive(Default)]
pub struct CommandRecorder {
    commands: Vec<Command>,
    errors: Vec<StreamError>,
    done: bool,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }

    pub fn errors(&self) -> &[StreamError] {
        &self.errors
    }

    /// Whether the stream completed normally.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl StreamHandler for CommandRecorder {
    fn on_emit(&mut self, command: &Command) {
        self.commands.push(command.clone());
    }

    fn on_error(&mut self, error: &StreamError) {
        self.errors.push(error.clone());
    }

    fn on_done(&mut self) {
        self.done = true;
    }
}
