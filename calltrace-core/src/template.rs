//! Template set and `${token}` interpolation.
//!
//! Performs single-pass substitution over a closed token vocabulary.
//! Tokens that are unknown or have no value render as the empty string.
//! Substituted values are never re-interpolated.

use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Regex matching an escaped `$${` or a `${...}` placeholder.
///
/// Group 1 is only set for placeholders. The escape alternative comes first
/// so `$${x}` is never read as `$` followed by a placeholder.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$\{|\$\{([^}]*)\}").expect("valid regex"));

/// The placeholder vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Token {
    MethodName,
    MethodArgs,
    MethodResult,
    MethodDuration,
    MethodWarnDuration,
    ErrorClassName,
    ErrorMessage,
    ErrorSourceClassName,
    ErrorSourceLine,
    ErrorStacktrace,
}

impl Token {
    /// Every token, in vocabulary order.
    pub const ALL: [Self; 10] = [
        Self::MethodName,
        Self::MethodArgs,
        Self::MethodResult,
        Self::MethodDuration,
        Self::MethodWarnDuration,
        Self::ErrorClassName,
        Self::ErrorMessage,
        Self::ErrorSourceClassName,
        Self::ErrorSourceLine,
        Self::ErrorStacktrace,
    ];

    /// Placeholder name as written between `${` and `}`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MethodName => "method.name",
            Self::MethodArgs => "method.args",
            Self::MethodResult => "method.result",
            Self::MethodDuration => "method.duration",
            Self::MethodWarnDuration => "method.warn.duration",
            Self::ErrorClassName => "error.class.name",
            Self::ErrorMessage => "error.message",
            Self::ErrorSourceClassName => "error.source.class.name",
            Self::ErrorSourceLine => "error.source.line",
            Self::ErrorStacktrace => "error.stacktrace",
        }
    }

    /// Looks up a token by placeholder name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|token| token.as_str() == name)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token values for one rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMap(IndexMap<Token, String>);

impl TokenMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `token`, replacing any earlier value.
    pub fn insert(&mut self, token: Token, value: impl Into<String>) {
        self.0.insert(token, value.into());
    }

    #[must_use]
    pub fn get(&self, token: Token) -> Option<&str> {
        self.0.get(&token).map(String::as_str)
    }

    /// Resolves a placeholder name. Unknown names resolve to `None`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&str> {
        Token::parse(name).and_then(|token| self.get(token))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Token, String)> for TokenMap {
    fn from_iter<I: IntoIterator<Item = (Token, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Points in a traced call at which a line may be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Enter,
    WarnBefore,
    WarnAfter,
    After,
    Error,
}

impl LifecycleEvent {
    pub const ALL: [Self; 5] = [
        Self::Enter,
        Self::WarnBefore,
        Self::WarnAfter,
        Self::After,
        Self::Error,
    ];

    /// Name of the template for this event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::WarnBefore => "warn_before",
            Self::WarnAfter => "warn_after",
            Self::After => "after",
            Self::Error => "error",
        }
    }

    /// Looks up an event by template name. Accepts `warn_before` and
    /// `warnBefore` spellings.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "enter" => Some(Self::Enter),
            "warn_before" | "warnBefore" => Some(Self::WarnBefore),
            "warn_after" | "warnAfter" => Some(Self::WarnAfter),
            "after" => Some(Self::After),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One template per lifecycle event.
///
/// Deserializing a partial set fills the missing entries from
/// [`TemplateSet::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "snake_case")]
pub struct TemplateSet {
    pub enter: String,
    pub warn_before: String,
    pub warn_after: String,
    pub after: String,
    pub error: String,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self {
            enter: "#${method.name}(${method.args}): entered".to_string(),
            warn_before: "#${method.name}(${method.args}): in ${method.duration} \
                          and still running (max ${method.warn.duration})"
                .to_string(),
            warn_after: "#${method.name}(${method.args}): ${method.result} \
                         in ${method.duration} (max ${method.warn.duration})"
                .to_string(),
            after: "#${method.name}(${method.args}): ${method.result} in ${method.duration}"
                .to_string(),
            error: "#${method.name}(${method.args}): thrown ${error.class.name}(${error.message}) \
                    from ${error.source.class.name}[${error.source.line}] in ${method.duration} \
                    \n${error.stacktrace}"
                .to_string(),
        }
    }
}

impl TemplateSet {
    /// The template for `event`.
    #[must_use]
    pub fn get(&self, event: LifecycleEvent) -> &str {
        match event {
            LifecycleEvent::Enter => &self.enter,
            LifecycleEvent::WarnBefore => &self.warn_before,
            LifecycleEvent::WarnAfter => &self.warn_after,
            LifecycleEvent::After => &self.after,
            LifecycleEvent::Error => &self.error,
        }
    }

    /// Replaces the template for `event`.
    #[must_use]
    pub fn with(mut self, event: LifecycleEvent, template: impl Into<String>) -> Self {
        let slot = match event {
            LifecycleEvent::Enter => &mut self.enter,
            LifecycleEvent::WarnBefore => &mut self.warn_before,
            LifecycleEvent::WarnAfter => &mut self.warn_after,
            LifecycleEvent::After => &mut self.after,
            LifecycleEvent::Error => &mut self.error,
        };
        *slot = template.into();
        self
    }

    /// Renders the template for `event` against `tokens`.
    #[must_use]
    pub fn render(&self, event: LifecycleEvent, tokens: &TokenMap) -> String {
        interpolate(self.get(event), tokens)
    }
}

/// Resolves all `${...}` placeholders in `template`.
///
/// - `$${` is a literal `${`.
/// - Unknown or unset tokens resolve to the empty string.
/// - Substituted values are not re-interpolated.
#[must_use]
pub fn interpolate(template: &str, tokens: &TokenMap) -> String {
    if !template.contains("${") {
        return template.to_string();
    }

    PLACEHOLDER_RE
        .replace_all(template, |caps: &regex::Captures| match caps.get(1) {
            Some(name) => tokens.resolve(name.as_str()).unwrap_or_default().to_string(),
            None => "${".to_string(),
        })
        .into_owned()
}

/// Placeholder names in `template`, in order of appearance.
///
/// Escaped `$${...}` sequences are not placeholders.
#[must_use]
pub fn placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|name| name.as_str().to_string()))
        .collect()
}

/// Returns `true` if `template` opens a `${` it never closes.
#[must_use]
pub fn has_unterminated_placeholder(template: &str) -> bool {
    // A space keeps the text around a removed match from joining into `${`
    let stripped = PLACEHOLDER_RE.replace_all(template, " ");
    stripped.contains("${")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> TokenMap {
        [
            (Token::MethodName, "login".to_string()),
            (Token::MethodArgs, "'alice'".to_string()),
            (Token::MethodResult, "true".to_string()),
            (Token::MethodDuration, "PT0.002S".to_string()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn token_names_round_trip() {
        for token in Token::ALL {
            assert_eq!(Token::parse(token.as_str()), Some(token));
        }
        assert_eq!(Token::parse("method.nam"), None);
    }

    #[test]
    fn basic_interpolation() {
        let out = interpolate(
            "#${method.name}(${method.args}): ${method.result} in ${method.duration}",
            &tokens(),
        );
        assert_eq!(out, "#login('alice'): true in PT0.002S");
    }

    #[test]
    fn missing_token_is_empty() {
        assert_eq!(interpolate("[${error.message}]", &tokens()), "[]");
    }

    #[test]
    fn unknown_token_is_empty() {
        assert_eq!(interpolate("a${not.a.token}b", &tokens()), "ab");
        assert_eq!(interpolate("a${}b", &tokens()), "ab");
    }

    #[test]
    fn escaped_dollar() {
        assert_eq!(
            interpolate("literal $${method.name}", &tokens()),
            "literal ${method.name}"
        );
    }

    #[test]
    fn substituted_values_are_left_verbatim() {
        let mut map = TokenMap::new();
        map.insert(Token::MethodArgs, "'\x00ESC_DOLLAR\x00{x}' $${y}");
        assert_eq!(
            interpolate("$${a} ${method.args}", &map),
            "${a} '\x00ESC_DOLLAR\x00{x}' $${y}"
        );
    }

    #[test]
    fn escape_next_to_placeholder() {
        assert_eq!(interpolate("$${${method.name}}", &tokens()), "${login}");
        assert!(!has_unterminated_placeholder("$$${{"));
    }

    #[test]
    fn no_recursive_interpolation() {
        let mut map = TokenMap::new();
        map.insert(Token::MethodArgs, "'${method.name}'");
        map.insert(Token::MethodName, "login");
        assert_eq!(interpolate("${method.args}", &map), "'${method.name}'");
    }

    #[test]
    fn repeated_and_adjacent_tokens() {
        assert_eq!(
            interpolate("${method.name}${method.name}", &tokens()),
            "loginlogin"
        );
    }

    #[test]
    fn empty_template_renders_empty() {
        assert_eq!(interpolate("", &tokens()), "");
    }

    #[test]
    fn unterminated_placeholder_is_left_alone() {
        assert_eq!(interpolate("x ${method.name", &tokens()), "x ${method.name");
        assert!(has_unterminated_placeholder("x ${method.name"));
        assert!(!has_unterminated_placeholder("x ${method.name}"));
        assert!(!has_unterminated_placeholder("x $${method.name"));
    }

    #[test]
    fn placeholder_listing() {
        assert_eq!(
            placeholders("${method.name} $${skip} ${error.msg}"),
            vec!["method.name".to_string(), "error.msg".to_string()]
        );
    }

    #[test]
    fn default_set_matches_deployment_defaults() {
        let set = TemplateSet::default();
        assert_eq!(set.enter, "#${method.name}(${method.args}): entered");
        assert_eq!(
            set.warn_before,
            "#${method.name}(${method.args}): in ${method.duration} and still running \
             (max ${method.warn.duration})"
        );
        assert_eq!(
            set.error,
            "#${method.name}(${method.args}): thrown ${error.class.name}(${error.message}) \
             from ${error.source.class.name}[${error.source.line}] in ${method.duration} \
             \n${error.stacktrace}"
        );
    }

    #[test]
    fn render_picks_event_template() {
        let set = TemplateSet::default().with(LifecycleEvent::After, "${method.result}");
        assert_eq!(set.render(LifecycleEvent::After, &tokens()), "true");
        assert_eq!(
            set.render(LifecycleEvent::Enter, &tokens()),
            "#login('alice'): entered"
        );
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let set: TemplateSet = serde_yaml::from_str("after: \"${method.name} done\"").unwrap();
        assert_eq!(set.after, "${method.name} done");
        assert_eq!(set.enter, TemplateSet::default().enter);
    }

    #[test]
    fn unknown_template_rejected() {
        let result: Result<TemplateSet, _> = serde_yaml::from_str("before: x");
        assert!(result.is_err());
    }

    #[test]
    fn lifecycle_names() {
        for event in LifecycleEvent::ALL {
            assert_eq!(LifecycleEvent::parse(event.as_str()), Some(event));
        }
        assert_eq!(LifecycleEvent::parse("warnAfter"), Some(LifecycleEvent::WarnAfter));
        assert_eq!(LifecycleEvent::parse("exit"), None);
    }
}
