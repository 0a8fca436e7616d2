//! Sly: the command-stream core of an HTML template compiler.
//!
//! Templates compile to a flat sequence of rendering commands rather
//! than a tree. The frontend pushes raw commands onto a stream, a
//! fixed pipeline of rewrite passes thins them out, and the backend
//! consumes the optimized sequence to generate runnable code.
//!
//! # Architecture
//!
//! ```text
//! Frontend → PushStream → Optimizer passes → Backend
//!                ↑               ↑               ↑
//!           raw commands     rewriting      code generation
//! ```
//!
//! # Key Design Decisions
//!
//! 1. **Flat command streams**: No command tree; nesting is expressed
//!    with `Start`/`End` bracket pairs.
//! 2. **Single-pass, push-based**: Every handler sees every event
//!    synchronously; the stream keeps no history.
//! 3. **Errors terminate**: A stream error ends the stream without
//!    completion, and no pass writes anything afterwards.
//! 4. **Fixed pass order**: Later passes depend on the normal forms
//!    earlier passes produce.
//!
//! # Example
//!
//! ```
//! use sly::{optimize, Command, ExpressionNode};
//!
//! let optimized = optimize(vec![
//!     Command::binding_start("cond", ExpressionNode::BooleanConstant(false)),
//!     Command::conditional_start("cond", true),
//!     Command::out_text("never rendered"),
//!     Command::conditional_end(),
//!     Command::binding_end(),
//!     Command::out_text("rendered"),
//! ])
//! .unwrap();
//! assert_eq!(optimized, vec![Command::out_text("rendered")]);
//! ```

pub mod commands;
pub mod compiler;
pub mod error;
pub mod expression;
pub mod optimizer;
pub mod patterns;
pub mod registry;
pub mod stream;
pub mod visitor;

// Re-export the working set at crate root
pub use commands::{BracketKind, Command};
pub use compiler::{CompileReport, CompilerOptions, Frontend, FrontendFactory, SlyCompiler};
pub use error::CompilerError;
pub use expression::{BinaryOperator, ExpressionNode, MarkupContext, UnaryOperator};
pub use optimizer::{Optimizer, StreamPass};
pub use registry::{Extension, Filter, FilterRegistry, Plugin, PluginRegistry};
pub use stream::{CommandRecorder, PushStream, StreamError, StreamHandler, StreamWarning};
pub use visitor::{CommandVisitor, Control, StatefulVisitor};

/// Run a command sequence through the full optimizer and collect the
/// result.
///
/// This is a convenience wrapper for hosts that already hold the raw
/// commands as a vector. Compilation proper goes through
/// [`SlyCompiler`], which drives the same pipeline from a frontend.
pub fn optimize(commands: Vec<Command>) -> Result<Vec<Command>, StreamError> {
    let optimizer = Optimizer::new();
    let mut recorder = CommandRecorder::new();
    {
        let chain = optimizer.chain(&mut recorder);
        let mut stream = PushStream::new();
        stream.attach_boxed(chain);
        for command in commands {
            stream.write(command);
        }
        stream.close();
    }
    match recorder.errors().first() {
        Some(error) => Err(error.clone()),
        None => Ok(recorder.into_commands()),
    }
}
