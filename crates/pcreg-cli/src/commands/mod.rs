//! Command implementations

mod incident;
mod init;
mod journal;
mod maintenance;
mod settings;
mod snapshot;
mod status;
mod train;
mod transfer;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use crate::session::Session;
use anyhow::Result;

/// Execute a CLI command
pub fn execute(cli: Cli, output: &OutputWriter) -> Result<()> {
    if let Commands::Init(args) = &cli.command {
        return init::execute(args, &cli, output);
    }

    let mut session = Session::open(&cli, output)?;
    match cli.command {
        Commands::Init(_) => Ok(()),
        Commands::Status(args) => status::execute(args, &session, output),
        Commands::Train(args) => train::execute(args.command, &mut session, output),
        Commands::Incident(args) => incident::execute(args.command, &mut session, output),
        Commands::Log(args) => journal::execute(args.command, &mut session, output),
        Commands::Settings(args) => settings::execute(args.command, &mut session, output),
        Commands::Snapshot(args) => snapshot::execute(args.command, &mut session, output),
        Commands::Export(args) => transfer::export(args, &session, output),
        Commands::Import(args) => transfer::import(args, &mut session, output),
        Commands::Save => maintenance::save(&mut session, output),
        Commands::Reset(args) => maintenance::reset(args, &mut session, output),
        Commands::Migrations => maintenance::migrations(&session, output),
    }
}
