//! `calltrace` - structured method tracing
//!
//! Builds on `calltrace-core`'s formatter: loads and validates the YAML
//! configuration, resolves call-site policies, wraps calls in a [`Tracer`]
//! that emits lifecycle lines through `tracing`, and provides the CLI.

pub mod cli;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod observability;
pub mod registry;

pub use interceptor::Tracer;
pub use registry::PolicyRegistry;
