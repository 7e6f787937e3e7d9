//! Log line formatting for traced calls.
//!
//! The [`Formatter`] builds the token map for a lifecycle event from a
//! [`CallEvent`] and its [`Policy`], then renders the matching template.
//! It holds nothing but the template set, never fails and never performs
//! I/O, so one instance can be shared by every thread.

use crate::duration::format_iso8601;
use crate::event::{CallEvent, ErrorInfo};
use crate::policy::Policy;
use crate::template::{LifecycleEvent, TemplateSet, Token, TokenMap};
use crate::value::{Value, render_value};

/// Text substituted for arguments, results and stack traces that a policy
/// elides.
pub const ELISION_MARKER: &str = "..";

/// Source class rendered for an error without frames.
pub const UNKNOWN_SOURCE_CLASS: &str = "somewhere";

/// Source line rendered for an error without frames.
pub const UNKNOWN_SOURCE_LINE: i64 = -1;

/// Renders lifecycle lines for traced calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formatter {
    templates: TemplateSet,
}

impl Formatter {
    /// Creates a formatter over `templates`.
    #[must_use]
    pub const fn new(templates: TemplateSet) -> Self {
        Self { templates }
    }

    /// The template set this formatter renders.
    #[must_use]
    pub const fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Renders `event` for any lifecycle point.
    #[must_use]
    pub fn format(&self, lifecycle: LifecycleEvent, event: &CallEvent, policy: &Policy) -> String {
        let tokens = tokens_for(lifecycle, event, policy);
        self.templates.render(lifecycle, &tokens)
    }

    /// The line logged before the call runs.
    #[must_use]
    pub fn format_enter(&self, event: &CallEvent, policy: &Policy) -> String {
        self.format(LifecycleEvent::Enter, event, policy)
    }

    /// The line logged while a slow call is still running.
    ///
    /// Whether the threshold has been crossed is the caller's decision.
    #[must_use]
    pub fn format_warn_before(&self, event: &CallEvent, policy: &Policy) -> String {
        self.format(LifecycleEvent::WarnBefore, event, policy)
    }

    /// The line logged when a slow call returns.
    #[must_use]
    pub fn format_warn_after(&self, event: &CallEvent, policy: &Policy) -> String {
        self.format(LifecycleEvent::WarnAfter, event, policy)
    }

    /// The line logged when a call returns.
    #[must_use]
    pub fn format_after(&self, event: &CallEvent, policy: &Policy) -> String {
        self.format(LifecycleEvent::After, event, policy)
    }

    /// The line logged when a call fails.
    #[must_use]
    pub fn format_error(&self, event: &CallEvent, policy: &Policy) -> String {
        self.format(LifecycleEvent::Error, event, policy)
    }
}

/// Tokens that can have a value when rendering `lifecycle`.
#[must_use]
pub const fn tokens_available(lifecycle: LifecycleEvent) -> &'static [Token] {
    match lifecycle {
        LifecycleEvent::Enter => &[Token::MethodName, Token::MethodArgs],
        LifecycleEvent::WarnBefore => &[
            Token::MethodName,
            Token::MethodArgs,
            Token::MethodDuration,
            Token::MethodWarnDuration,
        ],
        LifecycleEvent::WarnAfter => &[
            Token::MethodName,
            Token::MethodArgs,
            Token::MethodDuration,
            Token::MethodWarnDuration,
            Token::MethodResult,
        ],
        LifecycleEvent::After => &[
            Token::MethodName,
            Token::MethodArgs,
            Token::MethodDuration,
            Token::MethodResult,
        ],
        LifecycleEvent::Error => &[
            Token::MethodName,
            Token::MethodArgs,
            Token::MethodDuration,
            Token::ErrorClassName,
            Token::ErrorMessage,
            Token::ErrorSourceClassName,
            Token::ErrorSourceLine,
            Token::ErrorStacktrace,
        ],
    }
}

/// Builds the token map a lifecycle event's template is rendered against.
#[must_use]
pub fn tokens_for(lifecycle: LifecycleEvent, event: &CallEvent, policy: &Policy) -> TokenMap {
    let mut tokens = TokenMap::new();
    tokens.insert(Token::MethodName, event.method.as_str());
    tokens.insert(Token::MethodArgs, arguments_text(&event.args, policy));

    if lifecycle == LifecycleEvent::Enter {
        return tokens;
    }

    if let Some(elapsed) = event.elapsed {
        tokens.insert(Token::MethodDuration, format_iso8601(elapsed));
    }

    match lifecycle {
        LifecycleEvent::WarnBefore => {
            insert_warn_duration(&mut tokens, policy);
        }
        LifecycleEvent::WarnAfter => {
            insert_warn_duration(&mut tokens, policy);
            tokens.insert(Token::MethodResult, result_text(event.result.as_ref(), policy));
        }
        LifecycleEvent::After => {
            tokens.insert(Token::MethodResult, result_text(event.result.as_ref(), policy));
        }
        LifecycleEvent::Error => {
            if let Some(error) = &event.error {
                insert_error(&mut tokens, error, policy);
            }
        }
        LifecycleEvent::Enter => {}
    }

    tokens
}

fn arguments_text(args: &[Value], policy: &Policy) -> String {
    if policy.skip_arguments {
        return ELISION_MARKER.to_string();
    }
    // The argument list renders like an array of objects, without brackets
    let mut text = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            text.push_str(", ");
        }
        text.push_str(&render_value(arg));
    }
    text
}

fn result_text(result: Option<&Value>, policy: &Policy) -> String {
    if policy.skip_result {
        return ELISION_MARKER.to_string();
    }
    result.map_or_else(|| render_value(&Value::Null), render_value)
}

fn insert_warn_duration(tokens: &mut TokenMap, policy: &Policy) {
    if let Some(threshold) = &policy.slow_call_threshold {
        tokens.insert(Token::MethodWarnDuration, threshold.to_iso8601());
    }
}

fn insert_error(tokens: &mut TokenMap, error: &ErrorInfo, policy: &Policy) {
    tokens.insert(Token::ErrorClassName, error.kind().as_str());
    tokens.insert(Token::ErrorMessage, error.message().unwrap_or_default());

    let (source_class, source_line) = error.source_frame().map_or_else(
        || (UNKNOWN_SOURCE_CLASS.to_string(), UNKNOWN_SOURCE_LINE),
        |frame| (frame.class_name.clone(), i64::from(frame.line)),
    );
    tokens.insert(Token::ErrorSourceClassName, source_class);
    tokens.insert(Token::ErrorSourceLine, source_line.to_string());

    let stack_trace = if error.frames().is_empty() {
        String::new()
    } else if policy.skip_stack_trace || policy.exempts(error.kind()) {
        ELISION_MARKER.to_string()
    } else {
        error.stack_trace().to_string()
    };
    tokens.insert(Token::ErrorStacktrace, stack_trace);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::duration::{SlowCallThreshold, TimeUnit};
    use crate::event::StackFrame;
    use crate::value::Traceable;

    const AFTER: &str = "#${method.name}(${method.args}): ${method.result} in ${method.duration}";

    fn formatter() -> Formatter {
        Formatter::new(TemplateSet::default().with(LifecycleEvent::After, AFTER))
    }

    fn login_event() -> CallEvent {
        CallEvent::capture("login", &[&"alice"])
            .with_elapsed_nanos(2_000_000)
            .returned(true.trace_value())
    }

    fn failing_event(error: ErrorInfo) -> CallEvent {
        CallEvent::capture("login", &[&"alice"])
            .with_elapsed(Duration::from_millis(15))
            .failed(error)
    }

    fn traced_error() -> ErrorInfo {
        ErrorInfo::new("auth::AuthFailure", "bad credentials")
            .with_frame(StackFrame::new("auth::service::AuthService", 88))
            .with_stack_trace("auth::AuthFailure: bad credentials\n\tat auth/service.rs:88:9")
    }

    #[test]
    fn after_scenario() {
        let line = formatter().format_after(&login_event(), &Policy::default());
        assert_eq!(line, "#login('alice'): true in PT0.002S");
    }

    #[test]
    fn after_with_skipped_arguments() {
        let policy = Policy::new().with_skip_arguments(true);
        let line = formatter().format_after(&login_event(), &policy);
        assert_eq!(line, "#login(..): true in PT0.002S");
    }

    #[test]
    fn after_with_skipped_result() {
        let policy = Policy::new().with_skip_result(true);
        let line = formatter().format_after(&login_event(), &policy);
        assert_eq!(line, "#login('alice'): .. in PT0.002S");
    }

    #[test]
    fn after_without_result_is_null() {
        let event = CallEvent::new("logout", vec![]).with_elapsed(Duration::from_millis(1));
        let line = formatter().format_after(&event, &Policy::default());
        assert_eq!(line, "#logout(): NULL in PT0.001S");
    }

    #[test]
    fn enter_uses_default_template() {
        let event = CallEvent::capture("login", &[&"alice", &vec![1_i32, 2, 3], &None::<i32>]);
        let line = formatter().format_enter(&event, &Policy::default());
        assert_eq!(line, "#login('alice', [1, 2, 3], NULL): entered");
    }

    #[test]
    fn enter_has_no_duration_even_if_known() {
        let templates = TemplateSet::default().with(LifecycleEvent::Enter, "[${method.duration}]");
        let line = Formatter::new(templates).format_enter(&login_event(), &Policy::default());
        assert_eq!(line, "[]");
    }

    #[test]
    fn warn_before_renders_threshold() {
        let policy =
            Policy::new().with_slow_call_threshold(SlowCallThreshold::new(1, TimeUnit::Seconds));
        let event = CallEvent::capture("sync", &[&7_i64]).with_elapsed(Duration::from_millis(1500));
        let line = Formatter::default().format_warn_before(&event, &policy);
        assert_eq!(line, "#sync(7): in PT1.5S and still running (max PT1S)");
    }

    #[test]
    fn warn_before_without_threshold_leaves_blank() {
        let event = CallEvent::new("sync", vec![]).with_elapsed(Duration::from_secs(2));
        let line = Formatter::default().format_warn_before(&event, &Policy::default());
        assert_eq!(line, "#sync(): in PT2S and still running (max )");
    }

    #[test]
    fn warn_after_adds_result() {
        let policy = Policy::new()
            .with_slow_call_threshold(SlowCallThreshold::new(500, TimeUnit::Milliseconds));
        let event = CallEvent::capture("sync", &[])
            .with_elapsed(Duration::from_millis(750))
            .returned(Value::UInt(3));
        let line = Formatter::default().format_warn_after(&event, &policy);
        assert_eq!(line, "#sync(): 3 in PT0.75S (max PT0.5S)");
    }

    #[test]
    fn error_without_frames_uses_sentinels() {
        let templates = TemplateSet::default().with(
            LifecycleEvent::Error,
            "${error.class.name}: ${error.message} at ${error.source.class.name}",
        );
        let event = failing_event(ErrorInfo::new("AuthFailure", "bad credentials"));
        let line = Formatter::new(templates).format_error(&event, &Policy::default());
        assert_eq!(line, "AuthFailure: bad credentials at somewhere");
    }

    #[test]
    fn error_without_frames_has_line_minus_one_and_no_trace() {
        let templates = TemplateSet::default().with(
            LifecycleEvent::Error,
            "${error.source.line}|${error.stacktrace}|",
        );
        let event = failing_event(ErrorInfo::new("AuthFailure", "bad credentials"));
        let line = Formatter::new(templates).format_error(&event, &Policy::default());
        assert_eq!(line, "-1||");
    }

    #[test]
    fn error_default_template_with_frames() {
        let event = failing_event(traced_error());
        let line = Formatter::default().format_error(&event, &Policy::default());
        assert_eq!(
            line,
            "#login('alice'): thrown auth::AuthFailure(bad credentials) \
             from auth::service::AuthService[88] in PT0.015S \
             \nauth::AuthFailure: bad credentials\n\tat auth/service.rs:88:9"
        );
    }

    #[test]
    fn error_stack_trace_skipped() {
        let policy = Policy::new().with_skip_stack_trace(true);
        let line = Formatter::default().format_error(&failing_event(traced_error()), &policy);
        assert!(line.ends_with("\n.."));
        assert!(!line.contains("\tat "));
    }

    #[test]
    fn exempt_error_suppresses_trace() {
        for exempt in ["AuthFailure", "auth::AuthFailure"] {
            let policy = Policy::new().with_exempt_error(exempt);
            let line = Formatter::default().format_error(&failing_event(traced_error()), &policy);
            assert!(line.ends_with("\n.."), "exempt {exempt}: {line}");
        }
    }

    #[test]
    fn non_exempt_error_keeps_trace() {
        let policy = Policy::new().with_exempt_error("TimeoutError");
        let line = Formatter::default().format_error(&failing_event(traced_error()), &policy);
        assert!(line.contains("\tat auth/service.rs:88:9"));
    }

    #[test]
    fn error_without_message_renders_blank() {
        let event = failing_event(ErrorInfo::without_message("Panic"));
        let templates = TemplateSet::default()
            .with(LifecycleEvent::Error, "${error.class.name}(${error.message})");
        let line = Formatter::new(templates).format_error(&event, &Policy::default());
        assert_eq!(line, "Panic()");
    }

    #[test]
    fn error_event_without_error_degrades() {
        let event = CallEvent::new("login", vec![]).with_elapsed(Duration::from_millis(3));
        let templates = TemplateSet::default().with(
            LifecycleEvent::Error,
            "${method.name}: ${error.class.name}/${error.source.class.name}",
        );
        let line = Formatter::new(templates).format_error(&event, &Policy::default());
        assert_eq!(line, "login: /");
    }

    #[test]
    fn empty_template_renders_empty() {
        let templates = TemplateSet::default().with(LifecycleEvent::After, "");
        let line = Formatter::new(templates).format_after(&login_event(), &Policy::default());
        assert_eq!(line, "");
    }

    #[test]
    fn tokens_for_after_has_no_error_fields() {
        let tokens = tokens_for(LifecycleEvent::After, &login_event(), &Policy::default());
        assert_eq!(tokens.get(Token::MethodResult), Some("true"));
        assert_eq!(tokens.get(Token::MethodWarnDuration), None);
        assert_eq!(tokens.get(Token::ErrorClassName), None);
    }

    #[test]
    fn available_tokens_cover_fully_populated_maps() {
        let policy = Policy::new()
            .with_slow_call_threshold(SlowCallThreshold::new(1, TimeUnit::Seconds));
        let finished = login_event();
        let failed = failing_event(traced_error());
        for lifecycle in LifecycleEvent::ALL {
            let event = if lifecycle == LifecycleEvent::Error { &failed } else { &finished };
            let tokens = tokens_for(lifecycle, event, &policy);
            let available = tokens_available(lifecycle);
            assert_eq!(tokens.len(), available.len(), "{lifecycle}");
            for token in available {
                assert!(tokens.get(*token).is_some(), "{lifecycle} lacks {token}");
            }
        }
    }

    #[test]
    fn formatting_is_repeatable() {
        let formatter = Formatter::default();
        let event = failing_event(traced_error());
        let policy = Policy::default();
        assert_eq!(
            formatter.format_error(&event, &policy),
            formatter.format_error(&event, &policy)
        );
    }
}
