//! Command-line interface
//!
//! Argument definitions and command handlers for the `calltrace` binary.

pub mod args;
pub mod commands;
