use clap::{Parser, Subcommand};
use pcreg_core::config::MAX_AUTOSAVE_DELAY_MS;
use pcreg_core::models::{IncidentStatus, LogType, NetworkStatus, TrainStatus};
use std::path::PathBuf;

/// pcreg - PC Regulation tracker
#[derive(Parser, Debug)]
#[command(name = "pcreg")]
#[command(about = "Train regulation board with a versioned local store", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Workspace directory (searched upward from the current directory if omitted)
    #[arg(long, global = true, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Autosave debounce window in milliseconds
    #[arg(
        long,
        global = true,
        value_name = "MS",
        value_parser = clap::value_parser!(u64).range(0..=MAX_AUTOSAVE_DELAY_MS)
    )]
    pub autosave_delay_ms: Option<u64>,

    /// Author recorded on journal entries added from the command line
    #[arg(long, global = true)]
    pub author: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new workspace
    Init(InitArgs),

    /// Show the board summary and store status
    Status(StatusArgs),

    /// Manage tracked trains
    Train(TrainArgs),

    /// Manage incidents
    Incident(IncidentArgs),

    /// Read and write the operations journal
    Log(LogArgs),

    /// Show or change settings
    Settings(SettingsArgs),

    /// Manage named snapshots of the board
    Snapshot(SnapshotArgs),

    /// Export the document as JSON
    Export(ExportArgs),

    /// Replace the document with an exported JSON file
    Import(ImportArgs),

    /// Save the document now
    Save,

    /// Discard the document and start from defaults (snapshots are kept)
    Reset(ResetArgs),

    /// List schema migrations and the stored schema version
    Migrations,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Workspace directory path (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Rewrite the configuration file if the workspace already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Also show the effective configuration and where each value came from
    #[arg(long)]
    pub config: bool,
}

#[derive(Parser, Debug)]
pub struct TrainArgs {
    #[command(subcommand)]
    pub command: TrainCommand,
}

#[derive(Subcommand, Debug)]
pub enum TrainCommand {
    /// Put a train on the board
    Add {
        /// Train number (e.g. "TER 830123")
        number: String,

        /// Mission code
        #[arg(long)]
        mission: String,

        /// Origin and destination (e.g. "STRASBOURG → SAVERNE")
        #[arg(long)]
        od: String,

        #[arg(long, default_value = "")]
        line: String,

        #[arg(long)]
        position: Option<String>,

        /// Priority from 1 (highest) to 3
        #[arg(long, default_value = "2", allow_hyphen_values = true)]
        priority: i64,

        #[arg(long)]
        regulator: Option<String>,
    },

    /// List trains on the board
    List {
        /// Search number, mission, line, origin/destination and position
        #[arg(long, short = 'q')]
        query: Option<String>,

        #[arg(long)]
        status: Option<TrainStatus>,

        #[arg(long)]
        line: Option<String>,
    },

    /// Report a delay in minutes (negative for running early)
    Delay {
        id: String,

        #[arg(allow_hyphen_values = true)]
        minutes: i64,

        /// Cause recorded in the journal
        #[arg(long)]
        cause: Option<String>,
    },

    /// Change a train's status
    Status { id: String, status: TrainStatus },

    /// Edit a train's position or regulation decision
    Edit {
        id: String,

        #[arg(long)]
        position: Option<String>,

        #[arg(long)]
        decision: Option<String>,
    },

    /// Take a train off the board
    Remove { id: String },
}

#[derive(Parser, Debug)]
pub struct IncidentArgs {
    #[command(subcommand)]
    pub command: IncidentCommand,
}

#[derive(Subcommand, Debug)]
pub enum IncidentCommand {
    /// Declare an incident
    Add {
        /// Where it happened
        location: String,

        /// What happened
        #[arg(long, short = 'd')]
        description: String,

        #[arg(long, default_value = "Other")]
        kind: String,

        #[arg(long, default_value = "Minor")]
        severity: String,

        /// Train concerned, if any
        #[arg(long)]
        train: Option<String>,
    },

    /// List incidents
    List {
        #[arg(long)]
        status: Option<IncidentStatus>,
    },

    /// Move an incident to its next status (open, in progress, closed)
    Advance { id: String },

    /// Remove an incident
    Remove { id: String },
}

#[derive(Parser, Debug)]
pub struct LogArgs {
    #[command(subcommand)]
    pub command: LogCommand,
}

#[derive(Subcommand, Debug)]
pub enum LogCommand {
    /// Add a journal entry
    Add {
        text: String,

        #[arg(long = "type", default_value = "information")]
        entry_type: LogType,

        #[arg(long)]
        train: Option<String>,

        #[arg(long)]
        incident: Option<String>,
    },

    /// List journal entries, newest first
    List {
        /// Search type, text and author
        #[arg(long, short = 'q')]
        query: Option<String>,

        #[arg(long = "type")]
        entry_type: Option<LogType>,

        #[arg(long)]
        incident: Option<String>,

        /// Show at most this many entries
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Remove a journal entry
    Remove { id: String },
}

#[derive(Parser, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Show current settings
    Show,

    /// Change settings; a blank name restores its default
    Set {
        #[arg(long)]
        zone: Option<String>,

        #[arg(long)]
        operator: Option<String>,

        #[arg(long)]
        network_status: Option<NetworkStatus>,

        /// Regulation time offset in minutes
        #[arg(long, allow_hyphen_values = true)]
        rp_offset: Option<i64>,

        #[arg(long)]
        autosave: Option<bool>,
    },
}

#[derive(Parser, Debug)]
pub struct SnapshotArgs {
    #[command(subcommand)]
    pub command: SnapshotCommand,
}

#[derive(Subcommand, Debug)]
pub enum SnapshotCommand {
    /// Capture the current board
    Create {
        /// Snapshot name (defaults to a timestamp)
        name: Option<String>,
    },

    /// List snapshots, newest first
    List,

    /// Replace the board with a snapshot
    Restore { id: String },

    /// Delete a snapshot
    Delete { id: String },
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Output directory (defaults to the configured export directory)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Print the document instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,
}

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// JSON file produced by `pcreg export`
    pub path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ResetArgs {
    /// Confirm the reset
    #[arg(long)]
    pub yes: bool,
}
