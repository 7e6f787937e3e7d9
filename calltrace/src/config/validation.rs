//! Configuration validation
//!
//! Semantic checks on a deserialized `TraceConfig`. Rendering never fails on
//! a bad template, so most template problems are warnings; malformed call
//! site ids are errors because they can never match a traced call.
//!
//! Validation collects ALL issues (doesn't stop at first).

use calltrace_core::config::{CallSite, TraceConfig};
use calltrace_core::formatter::tokens_available;
use calltrace_core::template::{has_unterminated_placeholder, placeholders};
use calltrace_core::{LifecycleEvent, Policy, TemplateSet, Token};

use crate::error::{Severity, ValidationIssue};

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns the result.
    pub fn validate(&mut self, config: &TraceConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_templates(&config.templates);
        for (id, policy) in &config.policies {
            self.validate_call_site(id);
            self.validate_policy(id, policy);
        }

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Templates
    // ========================================================================

    fn validate_templates(&mut self, templates: &TemplateSet) {
        for event in LifecycleEvent::ALL {
            let path = format!("templates.{event}");
            let template = templates.get(event);

            if has_unterminated_placeholder(template) {
                self.add_warning(&path, "Template contains an unterminated '${'");
            }

            for name in placeholders(template) {
                match Token::parse(&name) {
                    None => self.add_warning(
                        &path,
                        &format!("Unknown placeholder '${{{name}}}' always renders empty"),
                    ),
                    Some(token) if !tokens_available(event).contains(&token) => self.add_warning(
                        &path,
                        &format!("Placeholder '${{{name}}}' has no value for the {event} event"),
                    ),
                    Some(_) => {}
                }
            }
        }
    }

    // ========================================================================
    // Policies
    // ========================================================================

    fn validate_call_site(&mut self, id: &str) {
        let path = format!("policies.{id}");

        if id.trim().is_empty() {
            self.add_error("policies", "Call site id cannot be empty");
            return;
        }

        let site = CallSite::parse(id);
        if site.owner().is_some_and(str::is_empty) {
            self.add_error(&path, "Call site id has an empty type before '::'");
        }
        if site.method().is_empty() {
            self.add_error(&path, "Call site id has an empty method after '::'");
        }
    }

    fn validate_policy(&mut self, id: &str, policy: &Policy) {
        let path = format!("policies.{id}");

        if let Some(threshold) = &policy.slow_call_threshold
            && threshold.as_duration().is_zero()
        {
            self.add_warning(
                &format!("{path}.slow_call_threshold"),
                "Threshold is below one millisecond; every call will be reported as slow",
            );
        }

        if policy
            .exempt_error_types
            .iter()
            .any(|kind| kind.as_str().trim().is_empty())
        {
            self.add_error(
                &format!("{path}.exempt_error_types"),
                "Error type names cannot be empty",
            );
        }

        if policy.skip_stack_trace && !policy.exempt_error_types.is_empty() {
            self.add_warning(
                &format!("{path}.exempt_error_types"),
                "Stack traces are already skipped for every error type",
            );
        }

        if policy.logger.as_deref().is_some_and(|l| l.trim().is_empty()) {
            self.add_warning(
                &format!("{path}.logger"),
                "Logger name is empty; the call site type will be used",
            );
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Adds an error to the collection.
    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    /// Adds a warning to the collection.
    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calltrace_core::{SlowCallThreshold, TimeUnit};

    fn config_with_policy(id: &str, policy: Policy) -> TraceConfig {
        let mut config = TraceConfig::default();
        config.policies.insert(id.to_string(), policy);
        config
    }

    #[test]
    fn test_default_config_is_clean() {
        let result = Validator::new().validate(&TraceConfig::default());
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unknown_placeholder_warns() {
        let config = TraceConfig {
            templates: TemplateSet::default().with(LifecycleEvent::Enter, "${method.nme}"),
            ..TraceConfig::default()
        };
        let result = Validator::new().validate(&config);
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path, "templates.enter");
        assert!(result.warnings[0].message.contains("method.nme"));
    }

    #[test]
    fn test_unavailable_placeholder_warns() {
        let config = TraceConfig {
            templates: TemplateSet::default()
                .with(LifecycleEvent::After, "${method.name} ${error.message}"),
            ..TraceConfig::default()
        };
        let result = Validator::new().validate(&config);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("after event"));
    }

    #[test]
    fn test_unterminated_placeholder_warns() {
        let config = TraceConfig {
            templates: TemplateSet::default().with(LifecycleEvent::Error, "${method.name"),
            ..TraceConfig::default()
        };
        let result = Validator::new().validate(&config);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("unterminated"));
    }

    #[test]
    fn test_empty_call_site_is_error() {
        let result = Validator::new().validate(&config_with_policy("  ", Policy::default()));
        assert!(result.has_errors());
    }

    #[test]
    fn test_malformed_call_sites_are_errors() {
        for id in ["::login", "AuthService::"] {
            let result = Validator::new().validate(&config_with_policy(id, Policy::default()));
            assert!(result.has_errors(), "{id} should be rejected");
        }
    }

    #[test]
    fn test_nested_owner_is_valid() {
        let result = Validator::new().validate(&config_with_policy(
            "auth::service::AuthService::login",
            Policy::default(),
        ));
        assert!(result.is_valid());
    }

    #[test]
    fn test_sub_millisecond_threshold_warns() {
        let policy = Policy::new()
            .with_slow_call_threshold(SlowCallThreshold::new(500, TimeUnit::Microseconds));
        let result = Validator::new().validate(&config_with_policy("Auth::login", policy));
        assert!(result.is_valid());
        assert_eq!(
            result.warnings[0].path,
            "policies.Auth::login.slow_call_threshold"
        );
    }

    #[test]
    fn test_redundant_exemptions_warn() {
        let policy = Policy::new()
            .with_skip_stack_trace(true)
            .with_exempt_error("AuthFailure");
        let result = Validator::new().validate(&config_with_policy("Auth::login", policy));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_empty_exempt_type_is_error() {
        let policy = Policy::new().with_exempt_error("");
        let result = Validator::new().validate(&config_with_policy("Auth::login", policy));
        assert!(result.has_errors());
    }

    #[test]
    fn test_validator_collects_everything() {
        let mut config = config_with_policy("::a", Policy::new().with_exempt_error(" "));
        config.templates = TemplateSet::default().with(LifecycleEvent::After, "${x} ${y}");
        let result = Validator::new().validate(&config);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.warnings.len(), 2);
    }
}
