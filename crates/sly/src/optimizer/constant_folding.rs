//! Constant folding.
//!
//! Rewrites expressions that are provably constant at compile time so
//! later passes can recognize always-true and always-false guards.
//! Folding respects short-circuit semantics: `And`/`Or` fold on a
//! constant left operand alone, because the right operand would never
//! be evaluated at runtime anyway. Folding an already-folded stream is
//! a no-op.

use crate::commands::{Command, Procedure, VariableBinding};
use crate::expression::{BinaryOperator, ExpressionNode, UnaryOperator};
use crate::stream::{PushStream, StreamError, StreamHandler};

use super::StreamPass;

pub struct ConstantFolding;

impl StreamPass for ConstantFolding {
    fn name(&self) -> &'static str {
        "constant-folding"
    }

    fn handler<'h>(&self, out: PushStream<'h>) -> Box<dyn StreamHandler + 'h> {
        Box::new(FoldingHandler { out })
    }
}

struct FoldingHandler<'h> {
    out: PushStream<'h>,
}

impl StreamHandler for FoldingHandler<'_> {
    fn on_emit(&mut self, command: &Command) {
        if self.out.is_terminated() {
            return;
        }
        let folded = match command {
            Command::VariableBinding(VariableBinding::Start { name, expression }) => {
                Command::binding_start(name.clone(), fold(expression.clone()))
            }
            Command::VariableBinding(VariableBinding::Global { name, expression }) => {
                Command::global_binding(name.clone(), fold(expression.clone()))
            }
            Command::OutputVariable(output) => {
                let mut output = output.clone();
                output.expression = fold(output.expression);
                Command::OutputVariable(output)
            }
            Command::Procedure(Procedure::Call {
                name,
                arguments,
                guard,
            }) => Command::procedure_call(
                name.clone(),
                arguments
                    .iter()
                    .map(|(key, value)| (key.clone(), fold(value.clone())))
                    .collect(),
                guard.clone().map(fold),
            ),
            other => other.clone(),
        };
        self.out.write(folded);
    }

    fn on_error(&mut self, error: &StreamError) {
        self.out.write_error(error.clone());
    }

    fn on_done(&mut self) {
        self.out.close();
    }
}

/// Fold one expression tree bottom-up.
pub(crate) fn fold(node: ExpressionNode) -> ExpressionNode {
    match node {
        ExpressionNode::BinaryOperation {
            operator,
            left,
            right,
        } => {
            let left = fold(*left);
            let right = fold(*right);
            fold_binary(operator, left, right)
        }
        ExpressionNode::UnaryOperation { operator, operand } => {
            let operand = fold(*operand);
            fold_unary(operator, operand)
        }
        ExpressionNode::TernaryOperator {
            condition,
            then_branch,
            else_branch,
        } => {
            let condition = fold(*condition);
            let then_branch = fold(*then_branch);
            let else_branch = fold(*else_branch);
            match condition.truth_value() {
                Some(true) if condition.is_constant() => then_branch,
                Some(false) if condition.is_constant() => else_branch,
                _ => ExpressionNode::TernaryOperator {
                    condition: Box::new(condition),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                },
            }
        }
        ExpressionNode::PropertyAccess { target, property } => ExpressionNode::PropertyAccess {
            target: Box::new(fold(*target)),
            property: Box::new(fold(*property)),
        },
        ExpressionNode::ArrayLiteral(items) => {
            ExpressionNode::ArrayLiteral(items.into_iter().map(fold).collect())
        }
        ExpressionNode::MapLiteral(entries) => ExpressionNode::MapLiteral(
            entries
                .into_iter()
                .map(|(key, value)| (key, fold(value)))
                .collect(),
        ),
        ExpressionNode::RuntimeCall {
            function,
            arguments,
        } => ExpressionNode::RuntimeCall {
            function,
            arguments: arguments.into_iter().map(fold).collect(),
        },
        leaf => leaf,
    }
}

fn fold_binary(
    operator: BinaryOperator,
    left: ExpressionNode,
    right: ExpressionNode,
) -> ExpressionNode {
    match operator {
        // Short-circuit: the operator yields an operand value, so a
        // constant left operand decides the whole operation.
        BinaryOperator::And => match left.truth_value() {
            Some(false) if left.is_constant() => left,
            Some(true) if left.is_constant() => right,
            _ => ExpressionNode::binary(operator, left, right),
        },
        BinaryOperator::Or => match left.truth_value() {
            Some(true) if left.is_constant() => left,
            Some(false) if left.is_constant() => right,
            _ => ExpressionNode::binary(operator, left, right),
        },
        BinaryOperator::Concatenate => match (&left, &right) {
            (ExpressionNode::StringConstant(a), ExpressionNode::StringConstant(b)) => {
                ExpressionNode::StringConstant(format!("{a}{b}"))
            }
            _ => ExpressionNode::binary(operator, left, right),
        },
        BinaryOperator::Add => match (&left, &right) {
            (ExpressionNode::NumericConstant(a), ExpressionNode::NumericConstant(b)) => {
                ExpressionNode::NumericConstant(a + b)
            }
            _ => ExpressionNode::binary(operator, left, right),
        },
        BinaryOperator::Eq | BinaryOperator::Neq => match constant_equality(&left, &right) {
            Some(equal) => {
                let value = if operator == BinaryOperator::Eq { equal } else { !equal };
                ExpressionNode::BooleanConstant(value)
            }
            None => ExpressionNode::binary(operator, left, right),
        },
    }
}

fn fold_unary(operator: UnaryOperator, operand: ExpressionNode) -> ExpressionNode {
    match operator {
        UnaryOperator::Not => match operand.truth_value() {
            Some(value) if operand.is_constant() => ExpressionNode::BooleanConstant(!value),
            _ => ExpressionNode::unary(operator, operand),
        },
        UnaryOperator::IsEmpty => match &operand {
            ExpressionNode::StringConstant(value) => {
                ExpressionNode::BooleanConstant(value.is_empty())
            }
            ExpressionNode::NullLiteral => ExpressionNode::BooleanConstant(true),
            ExpressionNode::ArrayLiteral(items) if operand.is_constant() => {
                ExpressionNode::BooleanConstant(items.is_empty())
            }
            ExpressionNode::MapLiteral(entries) if operand.is_constant() => {
                ExpressionNode::BooleanConstant(entries.is_empty())
            }
            _ => ExpressionNode::unary(operator, operand),
        },
    }
}

/// Equality of two constants of the same kind; `None` when the
/// comparison cannot be decided at compile time.
fn constant_equality(left: &ExpressionNode, right: &ExpressionNode) -> Option<bool> {
    match (left, right) {
        (ExpressionNode::BooleanConstant(a), ExpressionNode::BooleanConstant(b)) => Some(a == b),
        (ExpressionNode::StringConstant(a), ExpressionNode::StringConstant(b)) => Some(a == b),
        (ExpressionNode::NumericConstant(a), ExpressionNode::NumericConstant(b)) => Some(a == b),
        (ExpressionNode::NullLiteral, ExpressionNode::NullLiteral) => Some(true),
        _ => None,
    }
}
