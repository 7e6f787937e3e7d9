//! Shared integration-test harness for running the `calltrace` binary.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

/// Helpers for invoking the built `calltrace` binary.
pub struct CallTraceCli;

impl CallTraceCli {
    /// Runs `calltrace` with `args` and waits for it to exit.
    #[allow(clippy::missing_panics_doc)]
    pub fn run(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_calltrace"))
            .args(args)
            .env_remove("CALLTRACE_LOG_LEVEL")
            .env_remove("CALLTRACE_CONFIG")
            .env_remove("CALLTRACE_LOG_FORMAT")
            .output()
            .expect("failed to run calltrace")
    }

    /// Absolute path to a file under `tests/fixtures`.
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    /// A fixture path as a `String`, for argument lists.
    pub fn fixture(name: &str) -> String {
        Self::fixture_path(name).display().to_string()
    }
}

/// Stdout of a finished process as text.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr of a finished process as text.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
