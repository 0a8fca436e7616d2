//! Shared engine for dead binding elimination.
//!
//! Synthetic map removal and unused variable removal are the same
//! algorithm with different selection predicates: buffer the body of
//! each candidate `VariableBinding::Start`/`End` pair, track whether
//! the bound name is ever read in its lexical scope (loop item and
//! index variables and procedure parameters shadow outer bindings),
//! and on `End` either re-emit the bracket or splice the body through
//! without it. Only bindings with side-effect-free expressions are
//! ever removed; global bindings are never removed.
//!
//! Reads made by a candidate binding's own expression are applied only
//! if that binding survives, so a chain of bindings that feed nothing
//! but each other is removed as a whole.

use crate::commands::{Command, Conditional, Loop, Procedure, VariableBinding};
use crate::expression::ExpressionNode;
use crate::stream::{PushStream, StreamError, StreamHandler};

/// Selection predicate: which bindings a pass is allowed to remove.
pub(crate) type RemovalPredicate = fn(name: &str, expression: &ExpressionNode) -> bool;

enum Frame {
    /// An open `VariableBinding::Start`, with its body buffered until
    /// the matching `End` decides its fate.
    Binding {
        name: String,
        expression: ExpressionNode,
        removable: bool,
        used: bool,
        /// Indices of outer binding frames read by this binding's own
        /// expression; applied only if this binding is kept.
        expression_reads: Vec<usize>,
        body: Vec<Command>,
    },
    /// A scope that shadows names without being a removal candidate:
    /// a loop body or a procedure body.
    Shadow { loop_scope: bool, names: Vec<String> },
}

pub(crate) struct DeadBindingHandler<'h> {
    out: PushStream<'h>,
    predicate: RemovalPredicate,
    frames: Vec<Frame>,
}

impl<'h> DeadBindingHandler<'h> {
    pub(crate) fn new(out: PushStream<'h>, predicate: RemovalPredicate) -> Self {
        Self {
            out,
            predicate,
            frames: Vec::new(),
        }
    }

    /// Resolve a variable read to the binding frame it targets, if
    /// any, honoring shadowing scopes.
    fn resolve(&self, name: &str) -> Option<usize> {
        for (index, frame) in self.frames.iter().enumerate().rev() {
            match frame {
                Frame::Shadow { names, .. } if names.iter().any(|n| n == name) => return None,
                Frame::Binding { name: bound, .. } if bound == name => return Some(index),
                _ => {}
            }
        }
        None
    }

    fn mark_read(&mut self, name: &str) {
        if let Some(index) = self.resolve(name) {
            if let Frame::Binding { used, .. } = &mut self.frames[index] {
                *used = true;
            }
        }
    }

    fn mark_expression_reads(&mut self, expression: &ExpressionNode) {
        let mut names = Vec::new();
        expression.referenced_variables(&mut |name| names.push(name.to_string()));
        for name in names {
            self.mark_read(&name);
        }
    }

    /// Send a command to the innermost buffering frame, or to the
    /// output stream if none is open.
    fn route(&mut self, command: Command) {
        for frame in self.frames.iter_mut().rev() {
            if let Frame::Binding { body, .. } = frame {
                body.push(command);
                return;
            }
        }
        self.out.write(command);
    }

    fn open_binding(&mut self, name: &str, expression: &ExpressionNode) {
        let mut reads = Vec::new();
        let mut referenced = Vec::new();
        expression.referenced_variables(&mut |n| referenced.push(n.to_string()));
        for variable in referenced {
            if let Some(index) = self.resolve(&variable) {
                reads.push(index);
            }
        }
        let removable = (self.predicate)(name, expression) && expression.is_pure();
        self.frames.push(Frame::Binding {
            name: name.to_string(),
            expression: expression.clone(),
            removable,
            used: false,
            expression_reads: reads,
            body: Vec::new(),
        });
    }

    fn close_binding(&mut self) {
        let Some(frame) = self.frames.pop() else {
            self.error("variable binding end without matching start");
            return;
        };
        let Frame::Binding {
            name,
            expression,
            removable,
            used,
            expression_reads,
            body,
        } = frame
        else {
            self.error("variable binding end crosses an open block");
            return;
        };

        if removable && !used {
            for command in body {
                self.route(command);
            }
            return;
        }

        for index in expression_reads {
            if let Frame::Binding { used, .. } = &mut self.frames[index] {
                *used = true;
            }
        }
        self.route(Command::binding_start(name, expression));
        for command in body {
            self.route(command);
        }
        self.route(Command::binding_end());
    }

    fn close_shadow(&mut self, expect_loop: bool, command: &Command) {
        match self.frames.pop() {
            Some(Frame::Shadow { loop_scope, .. }) if loop_scope == expect_loop => {
                self.route(command.clone());
            }
            Some(_) | None => {
                let kind = if expect_loop { "loop" } else { "procedure" };
                self.error(&format!("{kind} end without matching start"));
            }
        }
    }

    fn error(&mut self, message: &str) {
        self.frames.clear();
        self.out.write_error(StreamError::new(message));
    }
}

impl StreamHandler for DeadBindingHandler<'_> {
    fn on_emit(&mut self, command: &Command) {
        if self.out.is_terminated() {
            return;
        }
        match command {
            Command::VariableBinding(VariableBinding::Start { name, expression }) => {
                self.open_binding(name, expression);
            }
            Command::VariableBinding(VariableBinding::End) => {
                self.close_binding();
            }
            Command::VariableBinding(VariableBinding::Global { expression, .. }) => {
                self.mark_expression_reads(expression);
                self.route(command.clone());
            }
            Command::Loop(Loop::Start {
                list_variable,
                item_variable,
                index_variable,
            }) => {
                self.mark_read(list_variable);
                self.route(command.clone());
                self.frames.push(Frame::Shadow {
                    loop_scope: true,
                    names: vec![item_variable.clone(), index_variable.clone()],
                });
            }
            Command::Loop(Loop::End) => {
                self.close_shadow(true, command);
            }
            Command::Procedure(Procedure::Start { parameters, .. }) => {
                self.route(command.clone());
                self.frames.push(Frame::Shadow {
                    loop_scope: false,
                    names: parameters.clone(),
                });
            }
            Command::Procedure(Procedure::End) => {
                self.close_shadow(false, command);
            }
            Command::Procedure(Procedure::Call {
                name,
                arguments,
                guard,
            }) => {
                self.mark_read(name);
                for (_, value) in arguments {
                    self.mark_expression_reads(value);
                }
                if let Some(guard) = guard {
                    self.mark_expression_reads(guard);
                }
                self.route(command.clone());
            }
            Command::Conditional(Conditional::Start { variable, .. }) => {
                self.mark_read(variable);
                self.route(command.clone());
            }
            Command::OutputVariable(output) => {
                self.mark_expression_reads(&output.expression);
                self.route(command.clone());
            }
            other => self.route(other.clone()),
        }
    }

    fn on_error(&mut self, error: &StreamError) {
        self.frames.clear();
        self.out.write_error(error.clone());
    }

    fn on_done(&mut self) {
        if self.out.is_terminated() {
            return;
        }
        if !self.frames.is_empty() {
            self.error("block still open at end of stream");
            return;
        }
        self.out.close();
    }
}
