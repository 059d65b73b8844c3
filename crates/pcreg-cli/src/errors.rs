use console::style;
use pcreg_core::PcregError;
use std::fmt;
use std::path::Path;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }

    /// Single-line form for JSON output
    pub fn summary(&self) -> String {
        match &self.context {
            Some(context) => format!("{}: {}", self.message, context.replace('\n', " ")),
            None => self.message.clone(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn workspace_not_found() -> CliError {
    let current_dir = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    CliError::new("Not in a pcreg workspace")
        .with_context(format!(
            "No workspace was found here or in any parent directory.\n\nCurrent directory: {}\nLooking for: .pcreg directory",
            current_dir
        ))
        .with_suggestion("Initialize a workspace: pcreg init")
        .with_suggestion("Or point at one: pcreg --workspace <DIR> ...")
        .with_help("Run: pcreg init --help")
}

pub fn workspace_exists(path: &Path) -> CliError {
    CliError::new("Workspace already exists")
        .with_context(format!("A .pcreg directory already exists at {}", path.display()))
        .with_suggestion("Use --force to rewrite its configuration file (board data is kept)")
        .with_suggestion("Or use 'pcreg reset --yes' to start the board over")
        .with_help("Run: pcreg init --help")
}

pub fn snapshot_not_found(id: &str) -> CliError {
    CliError::new("Snapshot not found")
        .with_context(format!("No snapshot has the id '{}'. The board was not changed.", id))
        .with_suggestion("List snapshots: pcreg snapshot list")
        .with_help("Run: pcreg snapshot --help")
}

pub fn invalid_import(path: &Path, reason: &str) -> CliError {
    CliError::new("Import file is not valid JSON")
        .with_context(format!(
            "The file could not be parsed. The board and snapshots were not changed.\n\nPath: {}\nError: {}",
            path.display(),
            reason
        ))
        .with_suggestion("Check that the file was produced by 'pcreg export'")
        .with_help("Run: pcreg import --help")
}

pub fn entity_not_found(kind: &str, id: &str, list_command: &str) -> CliError {
    CliError::new(format!("{} not found", kind))
        .with_context(format!("Nothing on the board has the id '{}'.", id))
        .with_suggestion(format!("List ids: {}", list_command))
}

pub fn reset_not_confirmed() -> CliError {
    CliError::new("Reset not confirmed")
        .with_context("Reset discards the current board. Snapshots are kept.")
        .with_suggestion("Take a snapshot first: pcreg snapshot create \"before reset\"")
        .with_suggestion("Then confirm: pcreg reset --yes")
}

/// Turn core errors that have a friendly explanation into a CliError
pub fn explain(error: &PcregError) -> Option<CliError> {
    match error {
        PcregError::SnapshotNotFound { id } => Some(snapshot_not_found(id)),
        PcregError::TrainNotFound { id } => Some(entity_not_found("Train", id, "pcreg train list")),
        PcregError::IncidentNotFound { id } => {
            Some(entity_not_found("Incident", id, "pcreg incident list"))
        }
        PcregError::LogEntryNotFound { id } => {
            Some(entity_not_found("Journal entry", id, "pcreg log list"))
        }
        PcregError::MissingField { field } => Some(
            CliError::new(format!("Missing required value: {}", field))
                .with_suggestion("Provide a non-blank value"),
        ),
        PcregError::QuotaExceeded { needed, limit, .. } => Some(
            CliError::new("Storage is full")
                .with_context(format!("The write needs {} bytes but only {} are available.", needed, limit))
                .with_suggestion("Delete old snapshots: pcreg snapshot delete <ID>"),
        ),
        _ => None,
    }
}
