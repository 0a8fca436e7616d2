//! Error propagation and termination discipline.

use sly::{Command, CommandRecorder, ExpressionNode as E, Optimizer, PushStream, StreamError};

use super::{assert_pipeline_error, run_pipeline};

#[test]
fn stray_conditional_end_fails_the_stream() {
    assert_pipeline_error(vec![Command::conditional_end()], "without matching start");
}

#[test]
fn stray_binding_end_fails_the_stream() {
    assert_pipeline_error(vec![Command::binding_end()], "without matching start");
}

#[test]
fn unclosed_conditional_fails_at_completion() {
    assert_pipeline_error(
        vec![
            Command::binding_start("cond", E::identifier("x")),
            Command::conditional_start("cond", true),
            Command::out_text("dangling"),
        ],
        "still open",
    );
}

#[test]
fn unclosed_loop_fails_at_completion() {
    assert_pipeline_error(
        vec![Command::loop_start("items", "item", "itemList")],
        "still open",
    );
}

#[test]
fn nothing_is_delivered_after_an_error() {
    // The error fires mid-stream; pending coalesced text is discarded
    // and later commands never reach the backend.
    let outcome = run_pipeline(vec![
        Command::out_text("buffered"),
        Command::loop_end(),
        Command::out_text("late"),
    ]);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.commands.is_empty());
    assert!(!outcome.done);
}

#[test]
fn frontend_errors_pass_through_every_stage() {
    let optimizer = Optimizer::new();
    let mut recorder = CommandRecorder::new();
    {
        let chain = optimizer.chain(&mut recorder);
        let mut stream = PushStream::new();
        stream.attach_boxed(chain);
        stream.write(Command::out_text("partial"));
        stream.write_error(StreamError::at("expression syntax error", 12, 4));
    }
    assert_eq!(recorder.errors().len(), 1);
    assert_eq!(recorder.errors()[0].to_string(), "12:4: expression syntax error");
    assert!(!recorder.is_done());
    // The buffered text never flushes once the stream fails.
    assert!(recorder.commands().is_empty());
}

#[test]
fn error_is_delivered_exactly_once() {
    let outcome = run_pipeline(vec![
        Command::conditional_end(),
        Command::conditional_end(),
    ]);
    assert_eq!(outcome.errors.len(), 1);
}
