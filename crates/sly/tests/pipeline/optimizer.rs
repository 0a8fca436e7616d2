//! Whole-pipeline optimization scenarios.

use sly::{Command, ExpressionNode as E};

use super::{assert_optimizes, assert_preserved, run_pipeline};

#[test]
fn dead_region_and_its_guard_binding_vanish() {
    // The conditional is statically false, so dead code removal drops
    // the region; the guard binding is then unused and pure, so unused
    // variable removal drops it too.
    assert_optimizes(
        vec![
            Command::binding_start("cond", E::BooleanConstant(false)),
            Command::conditional_start("cond", true),
            Command::out_text("unreachable"),
            Command::conditional_end(),
            Command::binding_end(),
            Command::out_text("reached"),
        ],
        vec![Command::out_text("reached")],
    );
}

#[test]
fn statically_true_guard_leaves_only_the_body() {
    assert_optimizes(
        vec![
            Command::binding_start("cond", E::string("truthy")),
            Command::conditional_start("cond", true),
            Command::out_text("body"),
            Command::conditional_end(),
            Command::binding_end(),
        ],
        vec![Command::out_text("body")],
    );
}

#[test]
fn adjacent_text_is_coalesced_across_removed_regions() {
    let outcome = run_pipeline(vec![
        Command::out_text("a"),
        Command::binding_start("cond", E::BooleanConstant(false)),
        Command::conditional_start("cond", true),
        Command::out_text("never"),
        Command::conditional_end(),
        Command::binding_end(),
        Command::out_text("b"),
        Command::out_text("c"),
    ]);
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.commands, vec![Command::out_text("abc")]);
}

#[test]
fn dynamic_conditionals_survive_unchanged() {
    assert_preserved(vec![
        Command::binding_start("visible", E::identifier("request")),
        Command::conditional_start("visible", true),
        Command::out_text("maybe"),
        Command::conditional_end(),
        Command::binding_end(),
    ]);
}

#[test]
fn text_inside_surviving_brackets_does_not_merge_out() {
    let outcome = run_pipeline(vec![
        Command::out_text("before"),
        Command::loop_start("items", "item", "itemList"),
        Command::out_text("inside"),
        Command::loop_end(),
        Command::out_text("after"),
    ]);
    assert!(outcome.errors.is_empty());
    assert_eq!(
        outcome.commands,
        vec![
            Command::out_text("before"),
            Command::loop_start("items", "item", "itemList"),
            Command::out_text("inside"),
            Command::loop_end(),
            Command::out_text("after"),
        ]
    );
}

#[test]
fn loop_item_shadows_a_constant_guard() {
    // Inside the loop the item variable shadows the constant binding,
    // so the conditional must survive.
    let input = vec![
        Command::global_binding("flag", E::BooleanConstant(false)),
        Command::loop_start("items", "flag", "flagList"),
        Command::conditional_start("flag", true),
        Command::out_text("per-item"),
        Command::conditional_end(),
        Command::loop_end(),
    ];
    let outcome = run_pipeline(input.clone());
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.commands, input);
}

#[test]
fn negated_guard_on_a_false_constant_passes() {
    assert_optimizes(
        vec![
            Command::binding_start("missing", E::NullLiteral),
            Command::conditional_start("missing", false),
            Command::out_text("fallback"),
            Command::conditional_end(),
            Command::binding_end(),
        ],
        vec![Command::out_text("fallback")],
    );
}

#[test]
fn procedures_pass_through_whole() {
    assert_preserved(vec![
        Command::procedure_start("card", vec!["title".to_string()]),
        Command::output(E::identifier("title")),
        Command::procedure_end(),
        Command::procedure_call(
            "card",
            vec![("title".to_string(), E::identifier("pageTitle"))],
            None,
        ),
    ]);
}

#[test]
fn empty_stream_completes_empty() {
    let outcome = run_pipeline(vec![]);
    assert!(outcome.done);
    assert!(outcome.commands.is_empty());
    assert!(outcome.errors.is_empty());
}

#[test]
fn pipeline_is_idempotent() {
    let once = run_pipeline(vec![
        Command::out_text("a"),
        Command::binding_start("unused", E::string("x")),
        Command::binding_end(),
        Command::out_text("b"),
    ]);
    assert!(once.errors.is_empty());
    let twice = run_pipeline(once.commands.clone());
    assert_eq!(twice.commands, once.commands);
}
