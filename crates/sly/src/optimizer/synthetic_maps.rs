//! Synthetic map removal.
//!
//! The frontend fabricates map-literal bindings to carry option maps
//! between commands. Once the options have been consumed at compile
//! time, many of those maps are never read again; this pass elides
//! them. It is dead binding elimination restricted to map literals, so
//! user-authored bindings of other shapes are left for the
//! unused-variable pass to judge.

use crate::expression::ExpressionNode;
use crate::stream::{PushStream, StreamHandler};

use super::dead_bindings::DeadBindingHandler;
use super::StreamPass;

pub struct SyntheticMapRemoval;

impl StreamPass for SyntheticMapRemoval {
    fn name(&self) -> &'static str {
        "synthetic-map-removal"
    }

    fn handler<'h>(&self, out: PushStream<'h>) -> Box<dyn StreamHandler + 'h> {
        Box::new(DeadBindingHandler::new(out, is_synthetic_map))
    }
}

fn is_synthetic_map(_name: &str, expression: &ExpressionNode) -> bool {
    matches!(expression, ExpressionNode::MapLiteral(_))
}
