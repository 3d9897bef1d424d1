//! Terminal rendering of reports and status lines.
//!
//! Methods return strings so callers choose the stream; color is applied only
//! when enabled.

use std::fmt::Write as _;

use crossterm::style::{Color, Stylize};

use crate::dryrun::{DryRunReport, SyncAction, SyncDecision, SyncReason};

const GLYPH_SECTION: &str = "•";

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn section(&self, title: &str) -> String {
        if self.color {
            format!(
                "{} {}",
                GLYPH_SECTION.with(Color::DarkGrey),
                title.with(Color::Cyan).bold()
            )
        } else {
            format!("{title}:")
        }
    }

    pub fn field(&self, key: &str, value: &str) -> String {
        if self.color {
            format!("  {} {value}", format!("{key}:").with(Color::DarkGrey))
        } else {
            format!("  {key}: {value}")
        }
    }

    pub fn warn(&self, msg: &str) -> String {
        if self.color {
            format!("{} {msg}", "warning:".with(Color::Yellow).bold())
        } else {
            format!("warning: {msg}")
        }
    }

    pub fn error(&self, msg: &str) -> String {
        if self.color {
            format!("{} {msg}", "error:".with(Color::Red).bold())
        } else {
            format!("error: {msg}")
        }
    }

    /// Multi-line text view of a dry-run report.
    pub fn report(&self, report: &DryRunReport) -> String {
        let mut out = self.section(&format!("dry run ({})", report.kind()));
        out.push('\n');
        let mut push = |line: String| {
            out.push_str(&line);
            out.push('\n');
        };
        match report {
            DryRunReport::CreateResource {
                resource,
                name,
                parent_path,
            } => {
                push(self.field("would create", &format!("{resource} \"{name}\"")));
                push(self.field("in", parent_path));
            }
            DryRunReport::UpdateRange {
                spreadsheet_id,
                title,
                range,
                preview,
                rows,
                columns,
                cells,
                truncated,
            } => {
                push(self.field("spreadsheet", &format!("{title} ({spreadsheet_id})")));
                push(self.field("range", range));
                push(self.field(
                    "would write",
                    &format!("{rows} rows × {columns} columns ({cells} cells)"),
                ));
                for row in preview {
                    push(format!("    | {} |", row.join(" | ")));
                }
                if *truncated {
                    push("    …".to_string());
                }
            }
            DryRunReport::DeleteResource { id, name, resource } => {
                push(self.field("would delete", &format!("{resource} \"{name}\" ({id})")));
            }
            DryRunReport::SyncFolder {
                local_dir,
                folder_id,
                folder_name,
                entries,
                totals,
            } => {
                push(self.field("from", local_dir));
                push(self.field("to", &format!("{folder_name} ({folder_id})")));
                for entry in entries {
                    push(self.sync_entry(entry));
                }
                push(self.field(
                    "totals",
                    &format!(
                        "{} create, {} update, {} skip",
                        totals.create, totals.update, totals.skip
                    ),
                ));
            }
            DryRunReport::SendMessage {
                to,
                subject,
                body_preview,
                body_length,
            } => {
                push(self.field("to", &to.join(", ")));
                push(self.field("subject", subject));
                push(self.field("body", &format!("{body_length} characters")));
                for line in body_preview.lines() {
                    push(format!("    > {line}"));
                }
            }
        }
        out
    }

    fn sync_entry(&self, entry: &SyncDecision) -> String {
        let action = match entry.action {
            SyncAction::Create => "create",
            SyncAction::Update => "update",
            SyncAction::Skip => "skip",
        };
        let label = format!("{action:<6}");
        let label = if !self.color {
            label
        } else {
            let color = match entry.action {
                SyncAction::Create => Color::Green,
                SyncAction::Update => Color::Yellow,
                SyncAction::Skip => Color::DarkGrey,
            };
            label.with(color).to_string()
        };
        let mut line = format!("    {label} {}", entry.name);
        let _ = write!(line, " ({})", describe_reason(&entry.reason));
        line
    }
}

fn describe_reason(reason: &SyncReason) -> String {
    match reason {
        SyncReason::NotInRemote => "not in remote folder".to_string(),
        SyncReason::SizeChanged {
            local_size,
            remote_size: Some(remote),
        } => format!("size {remote} → {local_size} bytes"),
        SyncReason::SizeChanged {
            local_size,
            remote_size: None,
        } => format!("remote size unknown, local {local_size} bytes"),
        SyncReason::NewerLocally {
            local_modified,
            remote_modified,
        } => format!(
            "modified locally {} after remote {}",
            local_modified.to_rfc3339(),
            remote_modified.to_rfc3339()
        ),
        SyncReason::Unchanged => "unchanged".to_string(),
    }
}
