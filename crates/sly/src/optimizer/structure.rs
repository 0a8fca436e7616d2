//! Bracket well-formedness checking.
//!
//! An optional sanity pass for raw streams: verifies that every
//! `Start` command has a matching `End` of the same kind at the same
//! nesting depth. On the first violation it signals a stream error and
//! stops forwarding; commands are otherwise passed through untouched.

use crate::commands::{BracketKind, Command};
use crate::stream::{PushStream, StreamError, StreamHandler};

use super::StreamPass;

pub struct StructureCheck;

impl StreamPass for StructureCheck {
    fn name(&self) -> &'static str {
        "structure-check"
    }

    fn handler<'h>(&self, out: PushStream<'h>) -> Box<dyn StreamHandler + 'h> {
        Box::new(StructureHandler {
            out,
            open: Vec::new(),
        })
    }
}

struct StructureHandler<'h> {
    out: PushStream<'h>,
    open: Vec<BracketKind>,
}

impl StreamHandler for StructureHandler<'_> {
    fn on_emit(&mut self, command: &Command) {
        if self.out.is_terminated() {
            return;
        }
        if let Some(kind) = command.opens_bracket() {
            self.open.push(kind);
        } else if let Some(kind) = command.closes_bracket() {
            match self.open.pop() {
                Some(opened) if opened == kind => {}
                Some(opened) => {
                    self.out.write_error(StreamError::new(format!(
                        "mismatched {} end inside an open {}",
                        kind.as_str(),
                        opened.as_str()
                    )));
                    return;
                }
                None => {
                    self.out.write_error(StreamError::new(format!(
                        "{} end without matching start",
                        kind.as_str()
                    )));
                    return;
                }
            }
        }
        self.out.write(command.clone());
    }

    fn on_error(&mut self, error: &StreamError) {
        self.out.write_error(error.clone());
    }

    fn on_done(&mut self) {
        if self.out.is_terminated() {
            return;
        }
        if let Some(kind) = self.open.last() {
            self.out.write_error(StreamError::new(format!(
                "{} still open at end of stream",
                kind.as_str()
            )));
            return;
        }
        self.out.close();
    }
}
