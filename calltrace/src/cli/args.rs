//! CLI argument definitions
//!
//! All Clap derive structs for `calltrace` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Structured method tracing: validate configurations and render trace lines.
#[derive(Parser, Debug)]
#[command(name = "calltrace", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress diagnostics and informational output. Errors and the
    /// results of `render` and `templates` are still printed.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Diagnostic log format.
    #[arg(long, default_value = "human", global = true, env = "CALLTRACE_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "CALLTRACE_COLOR")]
    pub color: ColorChoice,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration files.
    Validate(ValidateArgs),

    /// Render one lifecycle event described as JSON.
    Render(RenderArgs),

    /// Print the effective template set as YAML.
    Templates(TemplatesArgs),
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Enable strict validation (warnings become errors).
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// JSON file describing the event (`-` reads stdin).
    #[arg(short, long)]
    pub event: PathBuf,

    /// Path to YAML configuration file.
    #[arg(short, long, env = "CALLTRACE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Call site id (`Type::method`) whose policy applies.
    #[arg(long)]
    pub call_site: Option<String>,
}

/// Arguments for `templates`.
#[derive(Args, Debug)]
pub struct TemplatesArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "CALLTRACE_CONFIG")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_files() {
        let cli = Cli::try_parse_from(["calltrace", "validate"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_validate_strict() {
        let cli = Cli::try_parse_from(["calltrace", "validate", "a.yaml", "b.yaml", "--strict"])
            .unwrap();
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.files.len(), 2);
                assert!(args.strict);
            }
            other => panic!("expected validate, got {other:?}"),
        }
    }

    #[test]
    fn test_render_args() {
        let cli = Cli::try_parse_from([
            "calltrace",
            "render",
            "--event",
            "event.json",
            "--call-site",
            "AuthService::login",
        ])
        .unwrap();
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.event, PathBuf::from("event.json"));
                assert_eq!(args.call_site.as_deref(), Some("AuthService::login"));
            }
            other => panic!("expected render, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["calltrace", "templates", "-vv", "--log-format", "json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn test_help_output() {
        let err = Cli::try_parse_from(["calltrace", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_output() {
        let err = Cli::try_parse_from(["calltrace", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
