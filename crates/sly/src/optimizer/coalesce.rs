//! Write coalescing.
//!
//! Adjacent `OutText` commands with nothing between them are merged
//! into one command carrying the concatenated text, so the backend
//! emits one write instead of many.

use crate::commands::Command;
use crate::stream::{PushStream, StreamError, StreamHandler};

use super::StreamPass;

pub struct CoalescingWrites;

impl StreamPass for CoalescingWrites {
    fn name(&self) -> &'static str {
        "coalescing-writes"
    }

    fn handler<'h>(&self, out: PushStream<'h>) -> Box<dyn StreamHandler + 'h> {
        Box::new(CoalescingHandler {
            out,
            pending: None,
        })
    }
}

struct CoalescingHandler<'h> {
    out: PushStream<'h>,
    pending: Option<String>,
}

impl CoalescingHandler<'_> {
    fn flush(&mut self) {
        if let Some(text) = self.pending.take() {
            self.out.write(Command::out_text(text));
        }
    }
}

impl StreamHandler for CoalescingHandler<'_> {
    fn on_emit(&mut self, command: &Command) {
        if self.out.is_terminated() {
            return;
        }
        match command {
            Command::OutText(out) => match &mut self.pending {
                Some(pending) => pending.push_str(&out.text),
                None => self.pending = Some(out.text.clone()),
            },
            other => {
                self.flush();
                self.out.write(other.clone());
            }
        }
    }

    fn on_error(&mut self, error: &StreamError) {
        // An errored stream delivers no further commands, buffered
        // text included.
        self.pending = None;
        self.out.write_error(error.clone());
    }

    fn on_done(&mut self) {
        if self.out.is_terminated() {
            return;
        }
        self.flush();
        self.out.close();
    }
}
