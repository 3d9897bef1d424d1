//! CLI entry point for steward.

mod cli;

use clap::Parser;
use serde::Serialize;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use cli::{Args, Command, DriveCommand, MailCommand, SheetsCommand};
use steward::config::{initialize_default_config, load_config, ConfigInitResult};
use steward::dryrun::Intercepted;
use steward::error::{FailureKind, ServiceError};
use steward::render::Renderer;
use steward::services::{RemoteFile, Workspace};

const EXIT_FAILURE: i32 = 1;
const EXIT_CONFIG: i32 = 2;
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing();
    let code = run(args).await;
    std::process::exit(code);
}

/// Log to stderr, filtered by `STEWARD_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("STEWARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> i32 {
    if let Command::Init { force } = args.command {
        let renderer = Renderer::new(!args.no_color);
        return match initialize_default_config(force) {
            Ok(ConfigInitResult::Created { path }) => {
                println!("created {}", path.display());
                0
            }
            Ok(ConfigInitResult::AlreadyInitialized { path }) => {
                println!("{} already exists (use --force to overwrite)", path.display());
                0
            }
            Ok(ConfigInitResult::Overwritten { path, backup_path }) => {
                println!(
                    "rewrote {} (previous file saved as {})",
                    path.display(),
                    backup_path.display()
                );
                0
            }
            Err(e) => {
                eprintln!("{}", renderer.error(&e.to_string()));
                EXIT_CONFIG
            }
        };
    }

    let mut config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", Renderer::new(!args.no_color).error(&e.to_string()));
            return EXIT_CONFIG;
        }
    };
    if args.no_color {
        config.display.color = false;
    }
    let renderer = Renderer::new(config.display.color);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    if args.dry_run && args.command.is_read_only() {
        eprintln!("{}", renderer.warn("--dry-run has no effect on read-only commands"));
    }

    let ws = Workspace::from_config(&config).with_cancellation(cancel_rx);
    let out = Output {
        renderer,
        json: args.json,
    };
    match dispatch(&ws, args.command, args.dry_run, &out).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{}", renderer.error(&err.to_string()));
            exit_code(&err)
        }
    }
}

fn exit_code(err: &ServiceError) -> i32 {
    match err.kind() {
        FailureKind::Configuration => EXIT_CONFIG,
        FailureKind::Cancelled => EXIT_CANCELLED,
        FailureKind::Transient | FailureKind::Permanent => EXIT_FAILURE,
    }
}

async fn dispatch(
    ws: &Workspace,
    command: Command,
    simulate: bool,
    out: &Output,
) -> Result<(), ServiceError> {
    match command {
        // Handled before config is loaded.
        Command::Init { .. } => Ok(()),
        Command::Drive(DriveCommand::Ls { folder_id }) => {
            let files = ws.drive().list_folder(&folder_id).await?;
            out.value(&files, || files.iter().map(describe_file).collect::<Vec<_>>().join("\n"));
            Ok(())
        }
        Command::Drive(DriveCommand::Mkdir { name, parent }) => {
            let result = ws
                .drive()
                .create_folder(&name, parent.as_deref(), simulate)
                .await?;
            out.intercepted(&result, |folder| format!("created folder {} ({})", folder.name, folder.id));
            Ok(())
        }
        Command::Drive(DriveCommand::Rm { file_id }) => {
            let result = ws.drive().delete_file(&file_id, simulate).await?;
            out.intercepted(&result, |_| format!("deleted {file_id}"));
            Ok(())
        }
        Command::Drive(DriveCommand::Sync {
            local_dir,
            folder_id,
        }) => {
            let result = ws.drive().sync_folder(&local_dir, &folder_id, simulate).await?;
            out.intercepted(&result, |outcome| {
                format!(
                    "synced: {} created, {} updated, {} unchanged",
                    outcome.totals.create, outcome.totals.update, outcome.totals.skip
                )
            });
            Ok(())
        }
        Command::Sheets(SheetsCommand::Get {
            spreadsheet_id,
            range,
        }) => {
            let rows = ws.sheets().read_range(&spreadsheet_id, &range).await?;
            out.value(&rows, || {
                rows.iter()
                    .map(|row| row.join("\t"))
                    .collect::<Vec<_>>()
                    .join("\n")
            });
            Ok(())
        }
        Command::Sheets(SheetsCommand::Create { title }) => {
            let result = ws.sheets().create_spreadsheet(&title, simulate).await?;
            out.intercepted(&result, |created| {
                format!("created spreadsheet {}", created.spreadsheet_id)
            });
            Ok(())
        }
        Command::Sheets(SheetsCommand::Update {
            spreadsheet_id,
            range,
            rows,
        }) => {
            let values = cli::parse_rows(&rows);
            let result = ws
                .sheets()
                .update_range(&spreadsheet_id, &range, values, simulate)
                .await?;
            out.intercepted(&result, |updated| {
                format!("updated {} cells in {}", updated.updated_cells, updated.updated_range)
            });
            Ok(())
        }
        Command::Mail(MailCommand::Send(send)) => {
            let body = match (&send.body, &send.body_file) {
                (Some(body), _) => body.clone(),
                (None, Some(path)) => tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| ServiceError::local(path, e))?,
                (None, None) => String::new(),
            };
            let result = ws
                .mail()
                .send_message(&send.to, &send.subject, &body, simulate)
                .await?;
            out.intercepted(&result, |sent| format!("sent message {}", sent.id));
            Ok(())
        }
    }
}

fn describe_file(file: &RemoteFile) -> String {
    let kind = if file.is_folder() { "dir" } else { "file" };
    let size = file.size.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
    let modified = file
        .modified_time
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    format!("{kind:<4} {size:>10} {modified:<16} {} ({})", file.name, file.id)
}

/// Chooses between text and JSON output on stdout.
struct Output {
    renderer: Renderer,
    json: bool,
}

impl Output {
    fn value<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) {
        if self.json {
            self.print_json(value);
        } else {
            println!("{}", text());
        }
    }

    fn intercepted<T: Serialize>(&self, result: &Intercepted<T>, text: impl FnOnce(&T) -> String) {
        match result {
            Intercepted::Simulated(report) if self.json => self.print_json(report),
            Intercepted::Simulated(report) => print!("{}", self.renderer.report(report)),
            Intercepted::Executed(value) if self.json => self.print_json(value),
            Intercepted::Executed(value) => println!("{}", text(value)),
        }
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("{}", self.renderer.error(&format!("failed to encode JSON: {e}"))),
        }
    }
}
