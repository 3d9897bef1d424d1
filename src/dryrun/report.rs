//! Structured previews returned instead of performing a mutation.

use serde::Serialize;
use std::fmt;

use super::sync_plan::{SyncDecision, SyncTotals};
use crate::exec::ResourceKind;

/// Rows shown in an update-range preview.
pub const PREVIEW_MAX_ROWS: usize = 5;
/// Columns shown per previewed row.
pub const PREVIEW_MAX_COLUMNS: usize = 8;
/// Characters of a message body shown in a send-message preview.
pub const BODY_PREVIEW_CHARS: usize = 200;

/// Kind of mutating operation; also the report's `kind` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MutationKind {
    CreateResource,
    UpdateRange,
    DeleteResource,
    SyncFolder,
    SendMessage,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateResource => "create-resource",
            Self::UpdateRange => "update-range",
            Self::DeleteResource => "delete-resource",
            Self::SyncFolder => "sync-folder",
            Self::SendMessage => "send-message",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a mutation would have done.
///
/// Only produced when no mutating remote call was issued for the invocation.
/// Contains no timestamps of its own, so identical inputs yield identical
/// reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DryRunReport {
    CreateResource {
        resource: ResourceKind,
        name: String,
        parent_path: String,
    },
    UpdateRange {
        spreadsheet_id: String,
        title: String,
        range: String,
        preview: Vec<Vec<String>>,
        rows: usize,
        columns: usize,
        cells: usize,
        truncated: bool,
    },
    DeleteResource {
        id: String,
        name: String,
        resource: ResourceKind,
    },
    SyncFolder {
        local_dir: String,
        folder_id: String,
        folder_name: String,
        entries: Vec<SyncDecision>,
        totals: SyncTotals,
    },
    SendMessage {
        to: Vec<String>,
        subject: String,
        body_preview: String,
        body_length: usize,
    },
}

impl DryRunReport {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::CreateResource { .. } => MutationKind::CreateResource,
            Self::UpdateRange { .. } => MutationKind::UpdateRange,
            Self::DeleteResource { .. } => MutationKind::DeleteResource,
            Self::SyncFolder { .. } => MutationKind::SyncFolder,
            Self::SendMessage { .. } => MutationKind::SendMessage,
        }
    }
}

/// Bounded view of a value grid plus its full dimensions.
pub(super) struct GridPreview {
    pub(super) rows: Vec<Vec<String>>,
    pub(super) row_count: usize,
    pub(super) column_count: usize,
    pub(super) cell_count: usize,
    pub(super) truncated: bool,
}

pub(super) fn preview_grid(values: &[Vec<String>]) -> GridPreview {
    let row_count = values.len();
    let column_count = values.iter().map(Vec::len).max().unwrap_or(0);
    let cell_count = values.iter().map(Vec::len).sum();
    let rows: Vec<Vec<String>> = values
        .iter()
        .take(PREVIEW_MAX_ROWS)
        .map(|row| row.iter().take(PREVIEW_MAX_COLUMNS).cloned().collect())
        .collect();
    GridPreview {
        rows,
        row_count,
        column_count,
        cell_count,
        truncated: row_count > PREVIEW_MAX_ROWS || column_count > PREVIEW_MAX_COLUMNS,
    }
}

/// First `BODY_PREVIEW_CHARS` characters, with an ellipsis when cut.
pub(super) fn preview_body(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(BODY_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
