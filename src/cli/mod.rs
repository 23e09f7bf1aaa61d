//! Command-line interface
//!
//! Argument parsing for the `auxpow` tool.

pub mod commands;

pub use commands::{Command, Opt};
