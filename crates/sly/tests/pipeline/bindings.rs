//! Binding elimination through the full pipeline.

use sly::{Command, ExpressionNode as E};

use super::{assert_optimizes, assert_preserved, run_pipeline};

fn options_map() -> E {
    E::MapLiteral(vec![
        ("context".to_string(), E::string("html")),
        ("join".to_string(), E::string(", ")),
    ])
}

#[test]
fn unused_synthetic_map_is_removed() {
    // Frontends bind expression options as a map literal; once the
    // options are consumed at compile time the map is dead weight.
    assert_optimizes(
        vec![
            Command::binding_start("options_0", options_map()),
            Command::out_text("rendered"),
            Command::binding_end(),
        ],
        vec![Command::out_text("rendered")],
    );
}

#[test]
fn referenced_synthetic_map_survives() {
    assert_preserved(vec![
        Command::binding_start("options_0", options_map()),
        Command::output(E::identifier("options_0")),
        Command::binding_end(),
    ]);
}

#[test]
fn unused_ordinary_binding_is_removed() {
    assert_optimizes(
        vec![
            Command::binding_start("tmp", E::string("scratch")),
            Command::out_text("body"),
            Command::binding_end(),
        ],
        vec![Command::out_text("body")],
    );
}

#[test]
fn impure_binding_survives_unused() {
    let call = E::RuntimeCall {
        function: "audit".to_string(),
        arguments: vec![E::string("view")],
    };
    assert_preserved(vec![
        Command::binding_start("receipt", call),
        Command::out_text("body"),
        Command::binding_end(),
    ]);
}

#[test]
fn binding_chain_collapses_when_the_sink_is_dead() {
    use sly::BinaryOperator;

    assert_optimizes(
        vec![
            Command::binding_start("base", E::string("v")),
            Command::binding_start(
                "derived",
                E::binary(
                    BinaryOperator::Concatenate,
                    E::identifier("base"),
                    E::string("!"),
                ),
            ),
            Command::out_text("body"),
            Command::binding_end(),
            Command::binding_end(),
        ],
        vec![Command::out_text("body")],
    );
}

#[test]
fn global_bindings_are_never_removed() {
    let outcome = run_pipeline(vec![
        Command::global_binding("site", E::string("example")),
        Command::out_text("body"),
    ]);
    assert!(outcome.errors.is_empty());
    assert_eq!(
        outcome.commands,
        vec![
            Command::global_binding("site", E::string("example")),
            Command::out_text("body"),
        ]
    );
}

#[test]
fn procedure_call_arguments_count_as_reads() {
    assert_preserved(vec![
        Command::binding_start("title", E::identifier("pageTitle")),
        Command::procedure_call(
            "card",
            vec![("heading".to_string(), E::identifier("title"))],
            None,
        ),
        Command::binding_end(),
    ]);
}
