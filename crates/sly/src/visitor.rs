//! Stack-based dispatch of commands to context-dependent handlers.
//!
//! A `StatefulVisitor` forwards every command verbatim to whichever
//! handler is currently active. Handlers suspend each other by pushing
//! onto a stack and resume the outer handler by popping, which lets a
//! single linear command stream be processed by logically different
//! grammars depending on structural context (inside a loop body,
//! inside a dropped region, and so on).
//!
//! Transitions are returned from `CommandVisitor::command` as a
//! `Control` value rather than performed through shared references, so
//! push/pop/replace are plain value operations on an owned stack.

use smallvec::SmallVec;

use crate::commands::Command;

/// Transition requested by a handler after processing one command.
pub enum Control<Ctx> {
    /// Keep the current handler active.
    Stay,
    /// Suspend the current handler and activate the given one.
    Push(Box<dyn CommandVisitor<Ctx>>),
    /// Discard the current handler and resume the most recently
    /// suspended one.
    Pop,
    /// Discard the current handler and activate the given one, leaving
    /// the suspended stack untouched.
    Replace(Box<dyn CommandVisitor<Ctx>>),
}

/// A command handler that can take part in stacked dispatch.
///
/// `Ctx` is whatever shared state the handler family works against,
/// typically the output stream plus bookkeeping.
pub trait CommandVisitor<Ctx> {
    /// Process one command and request the next transition.
    fn command(&mut self, ctx: &mut Ctx, command: &Command) -> Control<Ctx>;

    /// The stream completed while this handler was active.
    fn done(&mut self, ctx: &mut Ctx) {
        let _ = ctx;
    }
}

/// Routes commands to the active handler of an owned handler stack.
///
/// The visitor performs no interpretation of its own. Driving it
/// before `initialize_with`, initializing it twice, or popping an
/// empty stack are fatal wiring bugs and panic.
pub struct StatefulVisitor<Ctx> {
    active: Option<Box<dyn CommandVisitor<Ctx>>>,
    stack: SmallVec<[Box<dyn CommandVisitor<Ctx>>; 4]>,
}

impl<Ctx> StatefulVisitor<Ctx> {
    /// Create an uninitialized visitor.
    pub fn new() -> Self {
        Self {
            active: None,
            stack: SmallVec::new(),
        }
    }

    /// Install the initial handler. Must be called exactly once,
    /// before the first command.
    pub fn initialize_with(&mut self, handler: Box<dyn CommandVisitor<Ctx>>) {
        assert!(
            self.active.is_none(),
            "stateful visitor initialized twice"
        );
        self.active = Some(handler);
    }

    /// Suspend the active handler and activate `handler`.
    pub fn push(&mut self, handler: Box<dyn CommandVisitor<Ctx>>) {
        let suspended = self.take_active();
        self.stack.push(suspended);
        self.active = Some(handler);
    }

    /// Discard the active handler and resume the most recently
    /// suspended one.
    pub fn pop(&mut self) {
        self.take_active();
        let resumed = self.stack.pop().expect("handler stack underflow");
        self.active = Some(resumed);
    }

    /// Atomically swap the active handler, returning the one that was
    /// replaced for optional inspection.
    pub fn replace(
        &mut self,
        handler: Box<dyn CommandVisitor<Ctx>>,
    ) -> Box<dyn CommandVisitor<Ctx>> {
        let replaced = self.take_active();
        self.active = Some(handler);
        replaced
    }

    /// Forward one command to the active handler and apply the
    /// transition it returns.
    pub fn on_command(&mut self, ctx: &mut Ctx, command: &Command) {
        let mut active = self.take_active();
        match active.command(ctx, command) {
            Control::Stay => self.active = Some(active),
            Control::Push(next) => {
                self.stack.push(active);
                self.active = Some(next);
            }
            Control::Pop => {
                let resumed = self.stack.pop().expect("handler stack underflow");
                self.active = Some(resumed);
            }
            Control::Replace(next) => self.active = Some(next),
        }
    }

    /// Forward stream completion to the active handler.
    pub fn on_done(&mut self, ctx: &mut Ctx) {
        let mut active = self.take_active();
        active.done(ctx);
        self.active = Some(active);
    }

    /// Number of suspended handlers.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn take_active(&mut self) -> Box<dyn CommandVisitor<Ctx>> {
        self.active
            .take()
            .expect("stateful visitor driven before initialize_with")
    }
}

impl<Ctx> Default for StatefulVisitor<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}
