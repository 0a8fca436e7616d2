//! The stream optimizer: an ordered pipeline of rewrite passes.
//!
//! Each pass consumes one command stream and produces a behaviorally
//! equivalent stream with some redundancy removed. Passes run in a
//! fixed order because later passes rely on normal forms produced by
//! earlier ones:
//!
//! 1. Constant folding
//! 2. Dead code removal
//! 3. Synthetic map removal
//! 4. Unused variable removal
//! 5. Coalescing writes
//!
//! A pass forwards commands it has no opinion on, propagates upstream
//! errors and completion unchanged, and writes nothing after signaling
//! an error of its own.

mod coalesce;
mod constant_folding;
mod dead_bindings;
mod dead_code;
mod structure;
mod synthetic_maps;
mod unused_variables;

pub use coalesce::CoalescingWrites;
pub use constant_folding::ConstantFolding;
pub use dead_code::DeadCodeRemoval;
pub use structure::StructureCheck;
pub use synthetic_maps::SyntheticMapRemoval;
pub use unused_variables::UnusedVariableRemoval;

use crate::stream::{PushStream, StreamHandler};

/// A stream-to-stream rewrite step.
///
/// A pass instance is a stateless factory; all per-stream state lives
/// in the handler it creates around the output stream it is given.
pub trait StreamPass: Send + Sync {
    /// Stable pass name, for reporting.
    fn name(&self) -> &'static str;

    /// Create the handler that rewrites one stream into `out`.
    fn handler<'h>(&self, out: PushStream<'h>) -> Box<dyn StreamHandler + 'h>;
}

/// The fixed five-pass optimizer.
///
/// The pass list is built unconditionally at construction; an
/// `Optimizer` is immutable and shared freely across compiles.
pub struct Optimizer {
    passes: Vec<Box<dyn StreamPass>>,
}

impl Optimizer {
    pub fn new() -> Self {
        Self {
            passes: vec![
                Box::new(ConstantFolding),
                Box::new(DeadCodeRemoval),
                Box::new(SyntheticMapRemoval),
                Box::new(UnusedVariableRemoval),
                Box::new(CoalescingWrites),
            ],
        }
    }

    /// Names of the passes, in application order.
    pub fn pass_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.passes.iter().map(|pass| pass.name())
    }

    /// Compose the passes into a single handler that feeds `backend`
    /// with the fully optimized stream.
    ///
    /// Composition runs back to front: the last pass writes straight
    /// into the backend, each earlier pass into its successor.
    pub fn chain<'h>(&self, backend: impl StreamHandler + 'h) -> Box<dyn StreamHandler + 'h> {
        let mut handler: Box<dyn StreamHandler + 'h> = Box::new(backend);
        for pass in self.passes.iter().rev() {
            let mut out = PushStream::new();
            out.attach_boxed(handler);
            handler = pass.handler(out);
        }
        handler
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}
