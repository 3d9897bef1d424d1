//! CLI argument parsing via clap.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Productivity client for Drive, Sheets and Gmail with safe retries and
/// dry-run previews.
#[derive(Debug, Parser)]
#[command(name = "steward", version, long_version = steward::build_info::LONG_VERSION)]
pub struct Args {
    /// Path to config file (default: ./steward.toml or ~/.config/steward/steward.toml).
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    /// Preview mutations without performing them.
    #[arg(short = 'n', long = "dry-run", global = true)]
    pub dry_run: bool,

    /// Print results and previews as JSON.
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Disable color output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a default config to ~/.config/steward/steward.toml.
    Init {
        /// Overwrite an existing file (a timestamped backup is kept).
        #[arg(long)]
        force: bool,
    },
    /// File storage.
    #[command(subcommand)]
    Drive(DriveCommand),
    /// Spreadsheets.
    #[command(subcommand)]
    Sheets(SheetsCommand),
    /// Mail.
    #[command(subcommand)]
    Mail(MailCommand),
}

#[derive(Debug, Subcommand)]
pub enum DriveCommand {
    /// List a folder.
    Ls {
        #[arg(default_value = "root")]
        folder_id: String,
    },
    /// Create a folder.
    Mkdir {
        name: String,
        /// Parent folder id (default: drive root).
        #[arg(long)]
        parent: Option<String>,
    },
    /// Delete a file or folder.
    Rm { file_id: String },
    /// Upload new and changed files from a local directory.
    Sync {
        local_dir: PathBuf,
        folder_id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum SheetsCommand {
    /// Print the values of a range.
    Get { spreadsheet_id: String, range: String },
    /// Create an empty spreadsheet.
    Create { title: String },
    /// Overwrite a range.
    Update {
        spreadsheet_id: String,
        range: String,
        /// One row of comma-separated cells; repeat for more rows.
        #[arg(long = "row", required = true)]
        rows: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum MailCommand {
    /// Send a plain-text message.
    Send(SendArgs),
}

#[derive(Debug, ClapArgs)]
pub struct SendArgs {
    /// Recipient address; repeat for several.
    #[arg(long = "to", required = true)]
    pub to: Vec<String>,
    #[arg(long)]
    pub subject: String,
    #[arg(long, conflicts_with = "body_file", required_unless_present = "body_file")]
    pub body: Option<String>,
    /// Read the body from a file.
    #[arg(long = "body-file")]
    pub body_file: Option<PathBuf>,
}

impl Command {
    /// Commands that never mutate remote state, so `--dry-run` changes nothing.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Command::Drive(DriveCommand::Ls { .. }) | Command::Sheets(SheetsCommand::Get { .. })
        )
    }
}

/// Split `--row` values into cells.
pub fn parse_rows(rows: &[String]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.split(',').map(|cell| cell.trim().to_string()).collect())
        .collect()
}
