//! Dead code removal.
//!
//! Tracks variable bindings whose folded expression is a compile-time
//! constant. A conditional whose outcome is statically false drops its
//! whole bracketed region from the output; a statically true
//! conditional emits its body and drops the guard pair.
//!
//! The pass runs on a `StatefulVisitor`: the emitting handler does the
//! bookkeeping, and entering a statically dead region pushes a
//! transient dropping handler that swallows commands until the
//! matching `Conditional::End`, then pops.

use std::collections::HashMap;

use crate::commands::{Command, Conditional, Loop, Procedure, VariableBinding};
use crate::stream::{PushStream, StreamError, StreamHandler};
use crate::visitor::{CommandVisitor, Control, StatefulVisitor};

use super::StreamPass;

pub struct DeadCodeRemoval;

impl StreamPass for DeadCodeRemoval {
    fn name(&self) -> &'static str {
        "dead-code-removal"
    }

    fn handler<'h>(&self, out: PushStream<'h>) -> Box<dyn StreamHandler + 'h> {
        let mut visitor = StatefulVisitor::new();
        visitor.initialize_with(Box::new(Emitting::new()));
        Box::new(DeadCodeHandler {
            visitor,
            ctx: TruthContext {
                out,
                scoped: Vec::new(),
                frames: Vec::new(),
                globals: HashMap::new(),
            },
        })
    }
}

/// Shared state of the handler family: the output stream plus the
/// compile-time truth values of bindings currently in scope.
struct TruthContext<'h> {
    out: PushStream<'h>,
    /// Scoped names, innermost last. `None` marks a binding whose
    /// value is not a compile-time constant (including loop item and
    /// index variables and procedure parameters, which shadow).
    scoped: Vec<(String, Option<bool>)>,
    /// Number of `scoped` entries contributed by each open block.
    frames: Vec<usize>,
    globals: HashMap<String, Option<bool>>,
}

impl TruthContext<'_> {
    fn resolve(&self, name: &str) -> Option<bool> {
        for (bound, value) in self.scoped.iter().rev() {
            if bound == name {
                return *value;
            }
        }
        self.globals.get(name).copied().flatten()
    }

    fn close_frame(&mut self, message: &str) -> bool {
        match self.frames.pop() {
            Some(count) => {
                let keep = self.scoped.len() - count;
                self.scoped.truncate(keep);
                true
            }
            None => {
                self.error(message);
                false
            }
        }
    }

    fn emit(&mut self, command: &Command) {
        self.out.write(command.clone());
    }

    fn error(&mut self, message: &str) {
        self.out.write_error(StreamError::new(message));
    }
}

/// Default state: forward commands, track binding truth values, and
/// decide the fate of each conditional.
struct Emitting {
    /// One entry per conditional currently open in the output scope;
    /// `true` when the guard pair was erased (statically true).
    open_conditionals: Vec<bool>,
}

impl Emitting {
    fn new() -> Self {
        Self {
            open_conditionals: Vec::new(),
        }
    }
}

impl<'h> CommandVisitor<TruthContext<'h>> for Emitting {
    fn command(&mut self, ctx: &mut TruthContext<'h>, command: &Command) -> Control<TruthContext<'h>> {
        match command {
            Command::VariableBinding(VariableBinding::Start { name, expression }) => {
                let value = if expression.is_constant() {
                    expression.truth_value()
                } else {
                    None
                };
                ctx.scoped.push((name.clone(), value));
                ctx.frames.push(1);
                ctx.emit(command);
            }
            Command::VariableBinding(VariableBinding::End) => {
                if ctx.close_frame("variable binding end without matching start") {
                    ctx.emit(command);
                }
            }
            Command::VariableBinding(VariableBinding::Global { name, expression }) => {
                let value = if expression.is_constant() {
                    expression.truth_value()
                } else {
                    None
                };
                ctx.globals.insert(name.clone(), value);
                ctx.emit(command);
            }
            Command::Loop(Loop::Start {
                item_variable,
                index_variable,
                ..
            }) => {
                ctx.scoped.push((item_variable.clone(), None));
                ctx.scoped.push((index_variable.clone(), None));
                ctx.frames.push(2);
                ctx.emit(command);
            }
            Command::Loop(Loop::End) => {
                if ctx.close_frame("loop end without matching start") {
                    ctx.emit(command);
                }
            }
            Command::Procedure(Procedure::Start { parameters, .. }) => {
                for parameter in parameters {
                    ctx.scoped.push((parameter.clone(), None));
                }
                ctx.frames.push(parameters.len());
                ctx.emit(command);
            }
            Command::Procedure(Procedure::End) => {
                if ctx.close_frame("procedure end without matching start") {
                    ctx.emit(command);
                }
            }
            Command::Conditional(Conditional::Start {
                variable,
                expected_truth_value,
            }) => match ctx.resolve(variable) {
                Some(actual) if actual != *expected_truth_value => {
                    return Control::Push(Box::new(Dropping { depth: 0 }));
                }
                Some(_) => {
                    // Statically true: emit the body, erase the guard.
                    self.open_conditionals.push(true);
                }
                None => {
                    self.open_conditionals.push(false);
                    ctx.emit(command);
                }
            },
            Command::Conditional(Conditional::End) => match self.open_conditionals.pop() {
                Some(true) => {}
                Some(false) => ctx.emit(command),
                None => ctx.error("conditional end without matching start"),
            },
            other => ctx.emit(other),
        }
        Control::Stay
    }

    fn done(&mut self, ctx: &mut TruthContext<'h>) {
        if !self.open_conditionals.is_empty() {
            ctx.error("conditional still open at end of stream");
        }
    }
}

/// Transient state for a statically dead region: swallow everything up
/// to the matching `Conditional::End`, then pop back to emitting.
struct Dropping {
    depth: usize,
}

impl<'h> CommandVisitor<TruthContext<'h>> for Dropping {
    fn command(&mut self, ctx: &mut TruthContext<'h>, command: &Command) -> Control<TruthContext<'h>> {
        let _ = ctx;
        match command {
            Command::Conditional(Conditional::Start { .. }) => {
                self.depth += 1;
                Control::Stay
            }
            Command::Conditional(Conditional::End) => {
                if self.depth == 0 {
                    Control::Pop
                } else {
                    self.depth -= 1;
                    Control::Stay
                }
            }
            _ => Control::Stay,
        }
    }

    fn done(&mut self, ctx: &mut TruthContext<'h>) {
        ctx.error("conditional still open at end of stream");
    }
}

struct DeadCodeHandler<'h> {
    visitor: StatefulVisitor<TruthContext<'h>>,
    ctx: TruthContext<'h>,
}

impl StreamHandler for DeadCodeHandler<'_> {
    fn on_emit(&mut self, command: &Command) {
        if self.ctx.out.is_terminated() {
            return;
        }
        self.visitor.on_command(&mut self.ctx, command);
    }

    fn on_error(&mut self, error: &StreamError) {
        self.ctx.out.write_error(error.clone());
    }

    fn on_done(&mut self) {
        if self.ctx.out.is_terminated() {
            return;
        }
        self.visitor.on_done(&mut self.ctx);
        self.ctx.out.close();
    }
}
