//! Call events: the observable facts of one traced invocation.

use std::error::Error as StdError;
use std::fmt::Write as _;
use std::panic::Location;
use std::time::Duration;

use crate::policy::ErrorKind;
use crate::value::{Traceable, Value};

/// Where an error was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Source type, module or file of the frame.
    pub class_name: String,
    /// Line within `class_name`.
    pub line: u32,
}

impl StackFrame {
    pub fn new(class_name: impl Into<String>, line: u32) -> Self {
        Self {
            class_name: class_name.into(),
            line,
        }
    }

    /// A frame for a source location.
    #[must_use]
    pub fn from_location(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

/// A thrown error, captured as plain data.
///
/// Frames and the stack trace text are optional: an error with no frames
/// renders with sentinel source values and an empty trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    kind: ErrorKind,
    message: Option<String>,
    frames: Vec<StackFrame>,
    stack_trace: String,
}

impl ErrorInfo {
    /// An error with a kind and message and nothing else.
    pub fn new(kind: impl Into<ErrorKind>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: Some(message.into()),
            frames: Vec::new(),
            stack_trace: String::new(),
        }
    }

    /// An error whose message is unknown.
    pub fn without_message(kind: impl Into<ErrorKind>) -> Self {
        Self {
            kind: kind.into(),
            message: None,
            frames: Vec::new(),
            stack_trace: String::new(),
        }
    }

    /// Captures a Rust error without source location.
    ///
    /// Kind is the error's type path, message its `Display` text. No frames
    /// are recorded.
    pub fn from_error<E: StdError + 'static>(err: &E) -> Self {
        Self {
            kind: ErrorKind::of::<E>(),
            message: Some(err.to_string()),
            frames: Vec::new(),
            stack_trace: String::new(),
        }
    }

    /// Captures a Rust error raised at the caller's location.
    ///
    /// Records one frame at the call site and a trace made of the error and
    /// its `source()` chain.
    #[track_caller]
    pub fn capture<E: StdError + 'static>(err: &E) -> Self {
        Self::capture_at(err, Location::caller())
    }

    /// Captures a Rust error raised at `location`.
    pub fn capture_at<E: StdError + 'static>(err: &E, location: &Location<'_>) -> Self {
        let mut info = Self::from_error(err);
        info.frames.push(StackFrame::from_location(location));
        info.stack_trace = render_chain(&info.kind, err, location);
        info
    }

    #[must_use]
    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        self.frames.push(frame);
        self
    }

    #[must_use]
    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = stack_trace.into();
        self
    }

    #[must_use]
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// The frame the error originated from.
    #[must_use]
    pub fn source_frame(&self) -> Option<&StackFrame> {
        self.frames.first()
    }

    #[must_use]
    pub fn stack_trace(&self) -> &str {
        &self.stack_trace
    }
}

fn render_chain(kind: &ErrorKind, err: &dyn StdError, location: &Location<'_>) -> String {
    let mut trace = format!("{kind}: {err}\n\tat {location}");
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(trace, "\nCaused by: {cause}");
        source = cause.source();
    }
    trace
}

/// One lifecycle point of a traced call.
///
/// `elapsed` is unknown only at `enter`; exactly one of `result` / `error`
/// is known once the call has finished.
#[derive(Debug, Clone, PartialEq)]
pub struct CallEvent {
    /// Name of the traced method.
    pub method: String,
    /// Positional arguments.
    pub args: Vec<Value>,
    /// Time since the call started.
    pub elapsed: Option<Duration>,
    /// Returned value.
    pub result: Option<Value>,
    /// Thrown error.
    pub error: Option<ErrorInfo>,
}

impl CallEvent {
    /// A call that has just been entered.
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
            elapsed: None,
            result: None,
            error: None,
        }
    }

    /// Captures the arguments of a call through [`Traceable`].
    pub fn capture(method: impl Into<String>, args: &[&dyn Traceable]) -> Self {
        Self::new(method, args.iter().map(|arg| arg.trace_value()).collect())
    }

    /// The same call, `elapsed` after it started.
    #[must_use]
    pub const fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }

    /// Elapsed time given in nanoseconds.
    #[must_use]
    pub const fn with_elapsed_nanos(self, nanos: u64) -> Self {
        self.with_elapsed(Duration::from_nanos(nanos))
    }

    /// The same call, finished with `result`.
    #[must_use]
    pub fn returned(mut self, result: Value) -> Self {
        self.result = Some(result);
        self.error = None;
        self
    }

    /// The same call, finished with `error`.
    #[must_use]
    pub fn failed(mut self, error: ErrorInfo) -> Self {
        self.error = Some(error);
        self.result = None;
        self
    }
}
