//! pcreg CLI - Command-line interface
//!
//! This is the command-line adapter for the PC Regulation tracker.

mod cli;
mod commands;
mod config_loader;
mod errors;
mod output;
mod output_types;
mod session;

use clap::Parser;
use cli::Cli;
use errors::CliError;
use output::OutputWriter;
use pcreg_core::PcregError;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Logs go to stderr so JSON on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = OutputWriter::new(cli.json);

    match commands::execute(cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e, &output);
            ExitCode::FAILURE
        }
    }
}

fn report(error: &anyhow::Error, output: &OutputWriter) {
    let explained = error
        .downcast_ref::<PcregError>()
        .and_then(errors::explain);
    let cli_error = error.downcast_ref::<CliError>().or(explained.as_ref());

    match cli_error {
        Some(cli_error) if output.is_json() => output.error(cli_error.summary()),
        Some(cli_error) => cli_error.display(),
        None => output.error(format!("{:#}", error)),
    }
}
