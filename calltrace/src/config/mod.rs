//! Configuration loading and validation
//!
//! Loads the YAML configuration (template set and per-call-site policies),
//! validates it, and freezes it for sharing.

pub mod loader;
pub mod validation;

pub use calltrace_core::config::schema;
pub use loader::{ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use validation::{ValidationResult, Validator};
