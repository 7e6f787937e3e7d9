//! Configuration schema for `calltrace`.

pub mod schema;

pub use schema::{CallSite, TraceConfig};
