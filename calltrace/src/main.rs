//! `calltrace` - structured method tracing CLI

use clap::Parser;

use calltrace::cli::args::Cli;
use calltrace::cli::commands;
use calltrace::error::ExitCode;
use calltrace::observability::init_logging;

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        let _ = init_logging(cli.log_format, cli.verbose, cli.color);
    }

    match commands::dispatch(cli) {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
