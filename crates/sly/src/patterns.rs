//! Stream-level suppression patterns.
//!
//! Frontends sometimes need to generate a region and then decide it
//! must never render, for example an attribute refused for security
//! reasons. Rather than rewinding the stream, the region is wrapped in
//! a guard that can never pass: a binding of `false` plus a
//! conditional on it. Dead code removal later erases the whole region,
//! and unused variable removal erases the guard binding.
//!
//! This is the stream-level counterpart of visitor-level suppression,
//! where a no-op handler is pushed for the skipped region instead.

use crate::commands::Command;
use crate::expression::ExpressionNode;
use crate::stream::PushStream;

/// Reserved name of the guard variable. Frontends must not let
/// user-authored bindings use it.
pub const STREAM_IGNORE_VARIABLE: &str = "ignored_condition";

/// Open a region that will be erased by the optimizer.
pub fn begin_stream_ignore(stream: &mut PushStream<'_>) {
    stream.write(Command::binding_start(
        STREAM_IGNORE_VARIABLE,
        ExpressionNode::BooleanConstant(false),
    ));
    stream.write(Command::conditional_start(STREAM_IGNORE_VARIABLE, true));
}

/// Close a region opened by [`begin_stream_ignore`].
pub fn end_stream_ignore(stream: &mut PushStream<'_>) {
    stream.write(Command::conditional_end());
    stream.write(Command::binding_end());
}
