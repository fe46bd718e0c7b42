//! Error aliases and re-exports shared across the workspace.
//!
//! Typed errors live next to the code that raises them (see `kp_gen::paths::PathError`); glue code
//! and binaries propagate `anyhow` errors with context attached.

pub use anyhow::{
    anyhow,
    bail,
    ensure,
    Context,
};

/// Result type for operations that only report success or failure.
pub type EmptyResult = anyhow::Result<()>;

/// Flattens an error and its chain of causes into a single line, outermost first.
#[must_use]
pub fn error_chain(err: &anyhow::Error) -> String {
    err.chain().map(ToString::to_string).collect::<Vec<_>>().join(": ")
}
