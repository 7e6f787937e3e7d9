//! Per-call-site logging policy.
//!
//! A [`Policy`] says which lifecycle events a traced call emits and how much
//! of the call's data is elided. It is plain data: build it once (in code or
//! from configuration) and share it.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::duration::SlowCallThreshold;

/// Log level a policy asks for.
///
/// The formatter never looks at it; it is a tag for whoever writes the
/// rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
    /// Suppress output for this call site.
    Off,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
            Self::Off => "OFF",
        };
        f.write_str(name)
    }
}

/// Identity of an error type.
///
/// Rust errors are identified by their type path (as reported by
/// [`std::any::type_name`]); hand-built errors may use any name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorKind(String);

impl ErrorKind {
    /// Creates a kind from an explicit name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The kind of the Rust type `E`.
    #[must_use]
    pub fn of<E: ?Sized>() -> Self {
        Self(std::any::type_name::<E>().to_string())
    }

    /// The full name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last `::` segment of the name, ignoring generic arguments.
    #[must_use]
    pub fn short_name(&self) -> &str {
        let base = self.0.split('<').next().unwrap_or(&self.0);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Returns `true` if `self`, taken as a configured kind, designates
    /// `actual`.
    ///
    /// A fully qualified kind must match exactly; an unqualified one matches
    /// any kind with the same short name.
    #[must_use]
    pub fn designates(&self, actual: &Self) -> bool {
        if self.0.contains("::") {
            self.0 == actual.0
        } else {
            self.0 == actual.short_name()
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ErrorKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ErrorKind {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// How one traced call site is logged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "snake_case")]
pub struct Policy {
    /// Level for the `enter` and `after` lines.
    pub level: LogLevel,

    /// Logger name; the call site's type is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,

    /// Emit the `enter` line before the call runs.
    pub emit_on_entry: bool,

    /// Replace arguments with the elision marker.
    pub skip_arguments: bool,

    /// Replace the result with the elision marker.
    pub skip_result: bool,

    /// Replace error stack traces with the elision marker.
    pub skip_stack_trace: bool,

    /// Error kinds whose stack trace is never logged.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub exempt_error_types: BTreeSet<ErrorKind>,

    /// Duration after which the call is reported as slow. Unset: never.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slow_call_threshold: Option<SlowCallThreshold>,
}

impl Policy {
    /// A policy with every default: INFO, nothing skipped, never slow.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_logger(mut self, logger: impl Into<String>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    #[must_use]
    pub const fn with_emit_on_entry(mut self, emit: bool) -> Self {
        self.emit_on_entry = emit;
        self
    }

    #[must_use]
    pub const fn with_skip_arguments(mut self, skip: bool) -> Self {
        self.skip_arguments = skip;
        self
    }

    #[must_use]
    pub const fn with_skip_result(mut self, skip: bool) -> Self {
        self.skip_result = skip;
        self
    }

    #[must_use]
    pub const fn with_skip_stack_trace(mut self, skip: bool) -> Self {
        self.skip_stack_trace = skip;
        self
    }

    /// Adds an error kind to the stack-trace exemptions.
    #[must_use]
    pub fn with_exempt_error(mut self, kind: impl Into<ErrorKind>) -> Self {
        self.exempt_error_types.insert(kind.into());
        self
    }

    #[must_use]
    pub const fn with_slow_call_threshold(mut self, threshold: SlowCallThreshold) -> Self {
        self.slow_call_threshold = Some(threshold);
        self
    }

    /// Returns `true` if errors of `kind` must not have their stack trace
    /// logged.
    #[must_use]
    pub fn exempts(&self, kind: &ErrorKind) -> bool {
        self.exempt_error_types
            .iter()
            .any(|exempt| exempt.designates(kind))
    }
}
