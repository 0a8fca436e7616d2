//! Compiler service errors.
//!
//! Per-template faults travel on the command stream as
//! [`StreamError`](crate::stream::StreamError) events; this type only
//! covers misuse of the service entry point itself.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompilerError {
    #[error("cannot compile an empty template source")]
    EmptySource,
}
