//! `calltrace render`
//!
//! Renders a single lifecycle event described as JSON, e.g.
//!
//! ```json
//! {
//!   "event": "error",
//!   "method": "login",
//!   "args": ["alice", 3],
//!   "elapsed": "15ms",
//!   "error": {
//!     "class_name": "AuthFailure",
//!     "message": "bad password",
//!     "source_class": "AuthService",
//!     "source_line": 42,
//!     "stack_trace": "AuthFailure: bad password\n\tat AuthService:42"
//!   }
//! }
//! ```

use std::io::Read;
use std::path::Path;

use calltrace_core::config::{CallSite, TraceConfig};
use calltrace_core::{CallEvent, ErrorInfo, Formatter, LifecycleEvent, Policy, StackFrame, Value};
use serde::Deserialize;

use crate::cli::args::RenderArgs;
use crate::cli::commands::load_config;
use crate::error::CallTraceError;
use crate::registry::PolicyRegistry;

/// JSON description of one call event.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventSpec {
    /// Lifecycle event: `enter`, `warn_before`, `warn_after`, `after` or `error`.
    pub event: String,

    /// Method name; defaults to the method part of `--call-site`.
    #[serde(default)]
    pub method: Option<String>,

    #[serde(default)]
    pub args: Vec<serde_json::Value>,

    /// Returned value; absent or `null` renders as `NULL`.
    #[serde(default)]
    pub result: Option<serde_json::Value>,

    /// Elapsed time as a human-readable duration (`15ms`, `2s 300ms`).
    #[serde(default)]
    pub elapsed: Option<String>,

    #[serde(default)]
    pub error: Option<ErrorSpec>,
}

/// JSON description of a raised error.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorSpec {
    pub class_name: String,

    #[serde(default)]
    pub message: Option<String>,

    /// Type the error was raised in. Without it the error has no frames.
    #[serde(default)]
    pub source_class: Option<String>,

    #[serde(default)]
    pub source_line: Option<u32>,

    #[serde(default)]
    pub stack_trace: Option<String>,
}

/// Render the event and print the line.
///
/// # Errors
///
/// Returns an error if the event file or configuration cannot be read, or
/// the event description is malformed.
pub fn run(args: &RenderArgs) -> Result<(), CallTraceError> {
    let spec = read_event(&args.event)?;
    let config = load_config(args.config.as_deref())?;
    let line = render_event(&spec, &config, args.call_site.as_deref())?;
    println!("{line}");
    Ok(())
}

fn read_event(path: &Path) -> Result<EventSpec, CallTraceError> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&content)?)
}

/// Renders `spec` with the configuration's templates and the policy of
/// `call_site` (the default policy when absent or untraced).
///
/// # Errors
///
/// Returns `CallTraceError::Usage` if the event name, the elapsed time or
/// the method name is missing or invalid.
pub fn render_event(
    spec: &EventSpec,
    config: &TraceConfig,
    call_site: Option<&str>,
) -> Result<String, CallTraceError> {
    let lifecycle = LifecycleEvent::parse(&spec.event)
        .ok_or_else(|| CallTraceError::Usage(format!("unknown event '{}'", spec.event)))?;

    let policy = resolve_policy(config, call_site);

    let method = spec
        .method
        .as_deref()
        .or_else(|| call_site.map(|id| CallSite::parse(id).method()))
        .ok_or_else(|| {
            CallTraceError::Usage("event has no 'method' and no --call-site was given".to_string())
        })?;

    let mut event = CallEvent::new(method, spec.args.iter().map(Value::from).collect());

    if let Some(elapsed) = &spec.elapsed {
        let elapsed = humantime::parse_duration(elapsed)
            .map_err(|e| CallTraceError::Usage(format!("invalid elapsed time '{elapsed}': {e}")))?;
        event = event.with_elapsed(elapsed);
    }

    if let Some(result) = &spec.result {
        event = event.returned(Value::from(result));
    }

    match (&spec.error, lifecycle) {
        (Some(error), _) => event = event.failed(error_info(error)),
        (None, LifecycleEvent::Error) => {
            return Err(CallTraceError::Usage(
                "an 'error' event needs an 'error' object".to_string(),
            ));
        }
        (None, _) => {}
    }

    let line = Formatter::new(config.templates.clone()).format(lifecycle, &event, &policy);
    Ok(line)
}

fn resolve_policy(config: &TraceConfig, call_site: Option<&str>) -> Policy {
    let Some(call_site) = call_site else {
        return Policy::default();
    };
    PolicyRegistry::from_config(config)
        .resolve(call_site)
        .cloned()
        .unwrap_or_else(|| {
            tracing::warn!(call_site, "call site has no policy, using the default");
            Policy::default()
        })
}

fn error_info(spec: &ErrorSpec) -> ErrorInfo {
    let mut info = match &spec.message {
        Some(message) => ErrorInfo::new(spec.class_name.as_str(), message.as_str()),
        None => ErrorInfo::without_message(spec.class_name.as_str()),
    };
    if let Some(class_name) = &spec.source_class {
        info = info.with_frame(StackFrame::new(
            class_name.as_str(),
            spec.source_line.unwrap_or_default(),
        ));
    }
    if let Some(trace) = &spec.stack_trace {
        info = info.with_stack_trace(trace.as_str());
    }
    info
}
