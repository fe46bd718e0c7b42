#![deny(
    clippy::nursery,
    clippy::pedantic,
    missing_docs,
)]
//! Shared plumbing for the kp path tools.
//!
//! Everything in here is ambient: logging setup for the binaries and the error aliases the rest of
//! the workspace builds on. Nothing in this crate knows about graphs.

pub mod errors;
pub mod logging;
