//! Configuration schema types
//!
//! These types are deserialized from YAML configuration files: the template
//! set for the deployment and the policy for each traced call site.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::policy::Policy;
use crate::template::TemplateSet;

/// Root configuration.
///
/// ```yaml
/// templates:
///   after: "#${method.name}(${method.args}): ${method.result} in ${method.duration}"
/// policies:
///   AuthService: { level: debug }
///   AuthService::login: { emit_on_entry: true, skip_arguments: true }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "snake_case")]
pub struct TraceConfig {
    /// Template set; entries left out keep their default.
    pub templates: TemplateSet,

    /// Policies keyed by call site id: `Type::method` for one method,
    /// `Type` for every method of a type.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub policies: IndexMap<String, Policy>,
}

/// A traced method's identity, `owner::method`.
///
/// The owner is everything before the last `::` and may itself be a module
/// path. An id without `::` has no owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSite<'a> {
    id: &'a str,
    owner: Option<&'a str>,
    method: &'a str,
}

impl<'a> CallSite<'a> {
    /// Splits a call site id.
    #[must_use]
    pub fn parse(id: &'a str) -> Self {
        match id.rsplit_once("::") {
            Some((owner, method)) => Self {
                id,
                owner: Some(owner),
                method,
            },
            None => Self {
                id,
                owner: None,
                method: id,
            },
        }
    }

    /// The full id.
    #[must_use]
    pub const fn id(&self) -> &'a str {
        self.id
    }

    /// The type or module owning the method.
    #[must_use]
    pub const fn owner(&self) -> Option<&'a str> {
        self.owner
    }

    /// The bare method name, as rendered into `${method.name}`.
    #[must_use]
    pub const fn method(&self) -> &'a str {
        self.method
    }
}
