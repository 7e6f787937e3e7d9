//! Call-site policy lookup.
//!
//! Maps call site ids to the [`Policy`] that governs them. A `Type::method`
//! entry applies to that method; a bare `Type` entry applies to every method
//! of the type that has no entry of its own. Call sites with neither are not
//! traced.

use calltrace_core::Policy;
use calltrace_core::config::{CallSite, TraceConfig};
use indexmap::IndexMap;

/// Immutable call site → policy mapping, built once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyRegistry {
    policies: IndexMap<String, Policy>,
}

impl PolicyRegistry {
    /// An empty registry: nothing is traced.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry from the `policies` section of a configuration.
    #[must_use]
    pub fn from_config(config: &TraceConfig) -> Self {
        config.policies.iter().map(|(id, p)| (id.clone(), p.clone())).collect()
    }

    /// Registers `policy` for a call site id or a type.
    #[must_use]
    pub fn with(mut self, id: impl Into<String>, policy: Policy) -> Self {
        self.policies.insert(id.into(), policy);
        self
    }

    /// Finds the policy governing `call_site`.
    #[must_use]
    pub fn resolve(&self, call_site: &str) -> Option<&Policy> {
        if let Some(policy) = self.policies.get(call_site) {
            return Some(policy);
        }
        let owner = CallSite::parse(call_site).owner()?;
        let policy = self.policies.get(owner);
        if policy.is_some() {
            tracing::trace!(call_site, owner, "using type-level policy");
        }
        policy
    }

    /// Returns `true` if `call_site` is traced.
    #[must_use]
    pub fn is_traced(&self, call_site: &str) -> bool {
        self.resolve(call_site).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl FromIterator<(String, Policy)> for PolicyRegistry {
    fn from_iter<I: IntoIterator<Item = (String, Policy)>>(iter: I) -> Self {
        Self {
            policies: iter.into_iter().collect(),
        }
    }
}
