//! `calltrace templates`

use crate::cli::args::TemplatesArgs;
use crate::cli::commands::load_config;
use crate::error::CallTraceError;

/// Print the effective template set as YAML.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn run(args: &TemplatesArgs) -> Result<(), CallTraceError> {
    let config = load_config(args.config.as_deref())?;
    print!("{}", serde_yaml::to_string(&config.templates)?);
    Ok(())
}
