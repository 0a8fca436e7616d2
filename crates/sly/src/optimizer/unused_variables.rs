//! Unused variable removal.
//!
//! Dead binding elimination with the widest predicate: any binding
//! whose expression is side-effect-free may go if its name is never
//! read in its lexical scope.

use crate::expression::ExpressionNode;
use crate::stream::{PushStream, StreamHandler};

use super::dead_bindings::DeadBindingHandler;
use super::StreamPass;

pub struct UnusedVariableRemoval;

impl StreamPass for UnusedVariableRemoval {
    fn name(&self) -> &'static str {
        "unused-variable-removal"
    }

    fn handler<'h>(&self, out: PushStream<'h>) -> Box<dyn StreamHandler + 'h> {
        Box::new(DeadBindingHandler::new(out, any_binding))
    }
}

fn any_binding(_name: &str, _expression: &ExpressionNode) -> bool {
    true
}
