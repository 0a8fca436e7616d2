//! The command IR: a closed set of template operations.
//!
//! The frontend lowers parsed markup into a linear stream of commands;
//! the optimizer rewrites that stream; the backend turns it into an
//! executable rendering unit. Commands are immutable value objects:
//! rewrite passes build new commands, they never patch emitted ones.
//!
//! Bracketing commands (`Start`/`End` pairs) always nest as a stack and
//! never partially overlap. `Procedure::Call` may reference a procedure
//! defined later in the stream; resolution is by name, not position.

use crate::expression::{ExpressionNode, MarkupContext};

/// One template operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Conditional(Conditional),
    VariableBinding(VariableBinding),
    OutputVariable(OutputVariable),
    OutText(OutText),
    Loop(Loop),
    Procedure(Procedure),
}

/// A branch guarded by the truthiness of a named variable.
#[derive(Clone, Debug, PartialEq)]
pub enum Conditional {
    Start {
        /// Name of the variable holding the guard value.
        variable: String,
        /// The truth value the guard must have for the branch to run.
        /// A negated condition expects `false`.
        expected_truth_value: bool,
    },
    End,
}

/// Introduction and retirement of variable bindings.
#[derive(Clone, Debug, PartialEq)]
pub enum VariableBinding {
    /// Open a lexically scoped binding; closed by the matching `End`.
    Start {
        name: String,
        expression: ExpressionNode,
    },
    End,
    /// A binding visible for the rest of the stream, not block scoped.
    Global {
        name: String,
        expression: ExpressionNode,
    },
}

/// Emit the value of an expression, escaped for a markup context.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputVariable {
    pub expression: ExpressionNode,
    /// Markup context the backend should escape for.
    pub context: Option<MarkupContext>,
    /// Additional escaping hints the frontend collected.
    pub hints: Vec<String>,
}

impl OutputVariable {
    pub fn new(expression: ExpressionNode) -> Self {
        Self {
            expression,
            context: None,
            hints: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: MarkupContext) -> Self {
        self.context = Some(context);
        self
    }
}

/// Emit a literal text fragment verbatim.
#[derive(Clone, Debug, PartialEq)]
pub struct OutText {
    pub text: String,
}

/// Iteration over a list, binding an item and an index per turn.
#[derive(Clone, Debug, PartialEq)]
pub enum Loop {
    Start {
        /// Variable holding the list to iterate.
        list_variable: String,
        /// Variable bound to the current item inside the body.
        item_variable: String,
        /// Variable bound to the current index inside the body.
        index_variable: String,
    },
    End,
}

/// Definition and invocation of named, callable command blocks.
#[derive(Clone, Debug, PartialEq)]
pub enum Procedure {
    Start {
        name: String,
        parameters: Vec<String>,
    },
    End,
    Call {
        name: String,
        arguments: Vec<(String, ExpressionNode)>,
        /// Optional guard; when present and falsy, the call is skipped.
        guard: Option<ExpressionNode>,
    },
}

/// The kind of bracket a `Start`/`End` command opens or closes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BracketKind {
    Conditional,
    Binding,
    Loop,
    Procedure,
}

impl BracketKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BracketKind::Conditional => "conditional",
            BracketKind::Binding => "variable binding",
            BracketKind::Loop => "loop",
            BracketKind::Procedure => "procedure",
        }
    }
}

impl Command {
    pub fn out_text(text: impl Into<String>) -> Self {
        Command::OutText(OutText { text: text.into() })
    }

    pub fn output(expression: ExpressionNode) -> Self {
        Command::OutputVariable(OutputVariable::new(expression))
    }

    pub fn conditional_start(variable: impl Into<String>, expected_truth_value: bool) -> Self {
        Command::Conditional(Conditional::Start {
            variable: variable.into(),
            expected_truth_value,
        })
    }

    pub fn conditional_end() -> Self {
        Command::Conditional(Conditional::End)
    }

    pub fn binding_start(name: impl Into<String>, expression: ExpressionNode) -> Self {
        Command::VariableBinding(VariableBinding::Start {
            name: name.into(),
            expression,
        })
    }

    pub fn binding_end() -> Self {
        Command::VariableBinding(VariableBinding::End)
    }

    pub fn global_binding(name: impl Into<String>, expression: ExpressionNode) -> Self {
        Command::VariableBinding(VariableBinding::Global {
            name: name.into(),
            expression,
        })
    }

    pub fn loop_start(
        list_variable: impl Into<String>,
        item_variable: impl Into<String>,
        index_variable: impl Into<String>,
    ) -> Self {
        Command::Loop(Loop::Start {
            list_variable: list_variable.into(),
            item_variable: item_variable.into(),
            index_variable: index_variable.into(),
        })
    }

    pub fn loop_end() -> Self {
        Command::Loop(Loop::End)
    }

    pub fn procedure_start(name: impl Into<String>, parameters: Vec<String>) -> Self {
        Command::Procedure(Procedure::Start {
            name: name.into(),
            parameters,
        })
    }

    pub fn procedure_end() -> Self {
        Command::Procedure(Procedure::End)
    }

    pub fn procedure_call(
        name: impl Into<String>,
        arguments: Vec<(String, ExpressionNode)>,
        guard: Option<ExpressionNode>,
    ) -> Self {
        Command::Procedure(Procedure::Call {
            name: name.into(),
            arguments,
            guard,
        })
    }

    /// The bracket kind this command opens, if any.
    pub fn opens_bracket(&self) -> Option<BracketKind> {
        match self {
            Command::Conditional(Conditional::Start { .. }) => Some(BracketKind::Conditional),
            Command::VariableBinding(VariableBinding::Start { .. }) => Some(BracketKind::Binding),
            Command::Loop(Loop::Start { .. }) => Some(BracketKind::Loop),
            Command::Procedure(Procedure::Start { .. }) => Some(BracketKind::Procedure),
            _ => None,
        }
    }

    /// The bracket kind this command closes, if any.
    pub fn closes_bracket(&self) -> Option<BracketKind> {
        match self {
            Command::Conditional(Conditional::End) => Some(BracketKind::Conditional),
            Command::VariableBinding(VariableBinding::End) => Some(BracketKind::Binding),
            Command::Loop(Loop::End) => Some(BracketKind::Loop),
            Command::Procedure(Procedure::End) => Some(BracketKind::Procedure),
            _ => None,
        }
    }
}
