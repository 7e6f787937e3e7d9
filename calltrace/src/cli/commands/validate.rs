//! `calltrace validate`
//!
//! Loads each configuration file through the full pipeline and reports what
//! it finds. Every file is checked even after a failure.

use std::path::Path;

use crate::cli::args::ValidateArgs;
use crate::config::{ConfigLoader, LoadWarning};
use crate::error::{CallTraceError, ConfigError};

/// Validate the given configuration files.
///
/// Prints one line per warning and one summary line per file to stdout;
/// with `quiet` only the lines for failing files are printed.
///
/// # Errors
///
/// Returns `ConfigError::ValidationFailed` if any file fails to load, or has
/// warnings while `--strict` is set.
pub fn run(args: &ValidateArgs, quiet: bool) -> Result<(), CallTraceError> {
    let loader = ConfigLoader::with_defaults();
    let mut failed = 0;

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating configuration");

        let result = match loader.load(path) {
            Ok(result) => result,
            Err(err) => {
                println!("{}: error: {err}", path.display());
                failed += 1;
                continue;
            }
        };

        if args.strict && !result.warnings.is_empty() {
            for warning in &result.warnings {
                print_warning(path, warning);
            }
            println!(
                "{}: {} warning(s) treated as errors",
                path.display(),
                result.warnings.len()
            );
            failed += 1;
            continue;
        }

        if quiet {
            continue;
        }
        for warning in &result.warnings {
            print_warning(path, warning);
        }
        println!(
            "{}: valid ({} policies)",
            path.display(),
            result.config.policies.len()
        );
    }

    if failed > 0 {
        return Err(ConfigError::ValidationFailed { count: failed }.into());
    }
    Ok(())
}

fn print_warning(path: &Path, warning: &LoadWarning) {
    println!(
        "{}: warning: {} at {}",
        path.display(),
        warning.message,
        warning.location.as_deref().unwrap_or("<unknown>")
    );
}
