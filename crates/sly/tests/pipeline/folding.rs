//! Constant folding interacting with the downstream passes.

use sly::{BinaryOperator, Command, ExpressionNode as E, UnaryOperator};

use super::{assert_optimizes, run_pipeline};

#[test]
fn folded_negation_feeds_dead_code_removal() {
    // !false folds to true, so the guard is statically true and both
    // the guard pair and the binding disappear.
    assert_optimizes(
        vec![
            Command::binding_start("show", E::unary(UnaryOperator::Not, E::BooleanConstant(false))),
            Command::conditional_start("show", true),
            Command::out_text("body"),
            Command::conditional_end(),
            Command::binding_end(),
        ],
        vec![Command::out_text("body")],
    );
}

#[test]
fn folded_equality_kills_a_region() {
    let guard = E::binary(BinaryOperator::Eq, E::string("a"), E::string("b"));
    assert_optimizes(
        vec![
            Command::binding_start("same", guard),
            Command::conditional_start("same", true),
            Command::out_text("never"),
            Command::conditional_end(),
            Command::binding_end(),
        ],
        vec![],
    );
}

#[test]
fn short_circuit_and_drops_an_impure_right_operand() {
    // false && track() folds to false without evaluating the call, so
    // the binding becomes pure and removable.
    let call = E::RuntimeCall {
        function: "track".to_string(),
        arguments: vec![],
    };
    let guard = E::binary(BinaryOperator::And, E::BooleanConstant(false), call);
    assert_optimizes(
        vec![
            Command::binding_start("flag", guard),
            Command::conditional_start("flag", true),
            Command::out_text("never"),
            Command::conditional_end(),
            Command::binding_end(),
            Command::out_text("kept"),
        ],
        vec![Command::out_text("kept")],
    );
}

#[test]
fn output_expressions_are_folded_in_place() {
    let outcome = run_pipeline(vec![Command::output(E::binary(
        BinaryOperator::Concatenate,
        E::string("Hello, "),
        E::string("world"),
    ))]);
    assert!(outcome.errors.is_empty());
    assert_eq!(
        outcome.commands,
        vec![Command::output(E::string("Hello, world"))]
    );
}

#[test]
fn dynamic_expressions_are_untouched() {
    let expr = E::binary(
        BinaryOperator::Concatenate,
        E::identifier("greeting"),
        E::string("!"),
    );
    let outcome = run_pipeline(vec![Command::output(expr.clone())]);
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.commands, vec![Command::output(expr)]);
}
