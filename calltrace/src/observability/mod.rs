//! Observability
//!
//! Subscriber setup for the `calltrace` binary. Traced calls themselves are
//! emitted through whatever `tracing` subscriber the host installs.

pub mod logging;

pub use logging::{LogFormat, init_logging};
