//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod render;
pub mod templates;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use calltrace_core::config::TraceConfig;

use crate::cli::args::{Cli, Commands};
use crate::config::ConfigLoader;
use crate::error::CallTraceError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub fn dispatch(cli: Cli) -> Result<(), CallTraceError> {
    let quiet = cli.quiet;
    match cli.command {
        Commands::Validate(args) => validate::run(&args, quiet),
        Commands::Render(args) => render::run(&args),
        Commands::Templates(args) => templates::run(&args),
    }
}

/// Loads `path`, or the built-in defaults when no file is given.
///
/// Load warnings are logged, not returned.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Arc<TraceConfig>, CallTraceError> {
    let Some(path) = path else {
        tracing::debug!("no configuration file given, using defaults");
        return Ok(Arc::new(TraceConfig::default()));
    };

    let result = ConfigLoader::with_defaults().load(path)?;
    for warning in &result.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    Ok(result.config)
}
