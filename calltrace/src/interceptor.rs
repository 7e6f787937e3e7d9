//! Call interception.
//!
//! The [`Tracer`] wraps a call, times it, and emits the lifecycle lines the
//! call site's policy asks for through `tracing`:
//!
//! | line          | when                                          | level        |
//! |---------------|-----------------------------------------------|--------------|
//! | `enter`       | before the call, if `emit_on_entry`           | policy level |
//! | `warn_before` | async calls still pending past the threshold  | WARN         |
//! | `warn_after`  | the call returned past the threshold          | WARN         |
//! | `after`       | the call returned in time                     | policy level |
//! | `error`       | the call returned `Err`                       | ERROR        |
//!
//! Policy level `off` silences every line for the call site. Each event
//! carries the logger name (`logger`) and the call site id (`call_site`) as
//! fields; the rendered line is the message.

use std::error::Error as StdError;
use std::future::Future;
use std::panic::Location;
use std::sync::Arc;
use std::time::{Duration, Instant};

use calltrace_core::config::{CallSite, TraceConfig};
use calltrace_core::{
    CallEvent, ErrorInfo, Formatter, LifecycleEvent, LogLevel, Policy, Traceable,
};

use crate::registry::PolicyRegistry;

/// Wraps traced calls and emits their lifecycle lines.
///
/// Cheap to clone; clones share the formatter and the registry.
#[derive(Debug, Clone, Default)]
pub struct Tracer {
    formatter: Arc<Formatter>,
    registry: Arc<PolicyRegistry>,
}

impl Tracer {
    /// Creates a tracer from a formatter and the policies it applies.
    #[must_use]
    pub const fn new(formatter: Arc<Formatter>, registry: Arc<PolicyRegistry>) -> Self {
        Self {
            formatter,
            registry,
        }
    }

    /// Creates a tracer for a loaded configuration.
    #[must_use]
    pub fn from_config(config: &TraceConfig) -> Self {
        Self::new(
            Arc::new(Formatter::new(config.templates.clone())),
            Arc::new(PolicyRegistry::from_config(config)),
        )
    }

    #[must_use]
    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    #[must_use]
    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    /// Runs `f` as the traced call `call_site`.
    ///
    /// The result is returned unchanged. Call sites without a policy run
    /// `f` without any logging. Errors are recorded as raised at the caller
    /// of `trace`.
    #[track_caller]
    pub fn trace<T, E, F>(&self, call_site: &str, args: &[&dyn Traceable], f: F) -> Result<T, E>
    where
        T: Traceable,
        E: StdError + 'static,
        F: FnOnce() -> Result<T, E>,
    {
        let Some(policy) = self.registry.resolve(call_site) else {
            return f();
        };
        let location = Location::caller();
        let call = TracedCall::begin(&self.formatter, policy, call_site, args);
        call.enter();

        let started = Instant::now();
        let outcome = f();
        call.finish(&outcome, started.elapsed(), false, location);
        outcome
    }

    /// Awaits `fut` as the traced call `call_site`.
    ///
    /// Behaves like [`Tracer::trace`]; in addition, if the call site has a
    /// slow-call threshold and `fut` is still pending once it has passed,
    /// the `warn_before` line is emitted (once) while the call keeps running.
    /// Arguments are captured immediately; the `enter` line and the clock
    /// start when the returned future is first polled.
    #[track_caller]
    pub fn trace_async<'a, T, E, Fut>(
        &'a self,
        call_site: &'a str,
        args: &[&dyn Traceable],
        fut: Fut,
    ) -> impl Future<Output = Result<T, E>> + use<'a, T, E, Fut>
    where
        T: Traceable,
        E: StdError + 'static,
        Fut: Future<Output = Result<T, E>> + 'a,
    {
        let location = Location::caller();
        let call = self
            .registry
            .resolve(call_site)
            .map(|policy| TracedCall::begin(&self.formatter, policy, call_site, args));

        async move {
            let Some(call) = call else {
                return fut.await;
            };
            call.enter();

            let started = Instant::now();
            let threshold = call.policy.slow_call_threshold.map(|t| t.as_duration());
            let mut fut = std::pin::pin!(fut);

            let (outcome, warned) = match threshold {
                Some(limit) => {
                    tokio::select! {
                        outcome = &mut fut => (outcome, false),
                        () = tokio::time::sleep(limit) => {
                            call.still_running(started.elapsed());
                            (fut.await, true)
                        }
                    }
                }
                None => (fut.await, false),
            };

            call.finish(&outcome, started.elapsed(), warned, location);
            outcome
        }
    }
}

/// One in-flight traced call.
struct TracedCall<'a> {
    formatter: &'a Formatter,
    policy: &'a Policy,
    call_site: &'a str,
    logger: &'a str,
    event: CallEvent,
}

impl<'a> TracedCall<'a> {
    fn begin(
        formatter: &'a Formatter,
        policy: &'a Policy,
        call_site: &'a str,
        args: &[&dyn Traceable],
    ) -> Self {
        let site = CallSite::parse(call_site);
        let logger = policy
            .logger
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| site.owner())
            .unwrap_or(call_site);

        Self {
            formatter,
            policy,
            call_site,
            logger,
            event: CallEvent::capture(site.method(), args),
        }
    }

    fn enter(&self) {
        if self.policy.emit_on_entry {
            let line = self.formatter.format_enter(&self.event, self.policy);
            self.emit(self.policy.level, &line);
        }
    }

    fn still_running(&self, elapsed: Duration) {
        let event = self.event.clone().with_elapsed(elapsed);
        let line = self.formatter.format_warn_before(&event, self.policy);
        self.emit(LogLevel::Warn, &line);
    }

    fn finish<T, E>(
        &self,
        outcome: &Result<T, E>,
        elapsed: Duration,
        warned: bool,
        location: &Location<'_>,
    ) where
        T: Traceable,
        E: StdError + 'static,
    {
        let event = self.event.clone().with_elapsed(elapsed);
        match outcome {
            Ok(value) => {
                let event = event.returned(value.trace_value());
                let slow = warned
                    || self
                        .policy
                        .slow_call_threshold
                        .is_some_and(|t| t.is_exceeded_by(elapsed));
                if slow {
                    let line = self.formatter.format_warn_after(&event, self.policy);
                    self.emit(LogLevel::Warn, &line);
                } else {
                    let line = self.formatter.format_after(&event, self.policy);
                    self.emit(self.policy.level, &line);
                }
            }
            Err(err) => {
                let event = event.failed(ErrorInfo::capture_at(err, location));
                let line = self.formatter.format(LifecycleEvent::Error, &event, self.policy);
                self.emit(LogLevel::Error, &line);
            }
        }
    }

    fn emit(&self, level: LogLevel, line: &str) {
        if self.policy.level == LogLevel::Off {
            return;
        }
        let logger = self.logger;
        let call_site = self.call_site;
        match level {
            LogLevel::Trace => tracing::trace!(logger, call_site, "{line}"),
            LogLevel::Debug => tracing::debug!(logger, call_site, "{line}"),
            LogLevel::Info => tracing::info!(logger, call_site, "{line}"),
            LogLevel::Warn => tracing::warn!(logger, call_site, "{line}"),
            LogLevel::Error | LogLevel::Fatal => tracing::error!(logger, call_site, "{line}"),
            LogLevel::Off => {}
        }
    }
}
