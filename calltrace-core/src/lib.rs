//! `calltrace` core: the method-tracing formatter
//!
//! This crate turns the observable facts of one method invocation (name,
//! arguments, result or error, elapsed time) into a human-readable log line,
//! driven by a per-call-site [`Policy`] and a shared [`TemplateSet`].
//!
//! Everything here is pure: no I/O, no global state. The `calltrace` crate
//! builds configuration loading, the interceptor and the CLI on top of it.

pub mod config;
pub mod duration;
pub mod error;
pub mod event;
pub mod formatter;
pub mod policy;
pub mod template;
pub mod value;

pub use duration::{SlowCallThreshold, TimeUnit, format_iso8601};
pub use event::{CallEvent, ErrorInfo, StackFrame};
pub use formatter::{ELISION_MARKER, Formatter};
pub use policy::{ErrorKind, LogLevel, Policy};
pub use template::{LifecycleEvent, TemplateSet, Token, TokenMap};
pub use value::{PrimitiveArray, Traceable, Value, render_value};
