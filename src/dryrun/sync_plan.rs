//! Folder sync planning.
//!
//! The same plan drives the real sync and its preview, so a preview always
//! lists exactly the writes a real run would issue.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ServiceError;
use crate::services::RemoteFile;

/// A top-level regular file in the local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    /// Truncated to milliseconds, the precision remote timestamps carry.
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Create,
    Update,
    Skip,
}

/// Why a file got its action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum SyncReason {
    /// No remote file with this name.
    NotInRemote,
    SizeChanged {
        local_size: u64,
        /// `None` when the remote side reports no byte size.
        remote_size: Option<u64>,
    },
    NewerLocally {
        local_modified: DateTime<Utc>,
        remote_modified: DateTime<Utc>,
    },
    Unchanged,
}

impl SyncReason {
    pub fn action(&self) -> SyncAction {
        match self {
            Self::NotInRemote => SyncAction::Create,
            Self::SizeChanged { .. } | Self::NewerLocally { .. } => SyncAction::Update,
            Self::Unchanged => SyncAction::Skip,
        }
    }
}

/// Planned handling of one local file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncDecision {
    pub name: String,
    pub action: SyncAction,
    #[serde(flatten)]
    pub reason: SyncReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
}

impl SyncDecision {
    fn new(name: &str, reason: SyncReason, remote_id: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            action: reason.action(),
            reason,
            remote_id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncTotals {
    pub create: usize,
    pub update: usize,
    pub skip: usize,
}

impl SyncTotals {
    pub fn tally(decisions: &[SyncDecision]) -> Self {
        decisions.iter().fold(Self::default(), |mut totals, d| {
            match d.action {
                SyncAction::Create => totals.create += 1,
                SyncAction::Update => totals.update += 1,
                SyncAction::Skip => totals.skip += 1,
            }
            totals
        })
    }
}

/// Compare local files against a remote listing, ordered by file name.
///
/// Remote folders never match a local file. When the remote side holds
/// several files with one name, the first listed wins.
pub fn plan_sync(local: &[LocalFile], remote: &[RemoteFile]) -> Vec<SyncDecision> {
    let mut decisions: Vec<SyncDecision> = local
        .iter()
        .map(|file| {
            let Some(existing) = remote
                .iter()
                .find(|r| !r.is_folder() && r.name == file.name)
            else {
                return SyncDecision::new(&file.name, SyncReason::NotInRemote, None);
            };
            let remote_id = Some(existing.id.clone());
            if existing.size != Some(file.size) {
                return SyncDecision::new(
                    &file.name,
                    SyncReason::SizeChanged {
                        local_size: file.size,
                        remote_size: existing.size,
                    },
                    remote_id,
                );
            }
            match existing.modified_time {
                Some(remote_modified) if file.modified > remote_modified => SyncDecision::new(
                    &file.name,
                    SyncReason::NewerLocally {
                        local_modified: file.modified,
                        remote_modified,
                    },
                    remote_id,
                ),
                _ => SyncDecision::new(&file.name, SyncReason::Unchanged, remote_id),
            }
        })
        .collect();
    decisions.sort_by(|a, b| a.name.cmp(&b.name));
    decisions
}

/// List top-level regular files of `dir`, sorted by name.
///
/// Subdirectories, symlinks and names that are not valid UTF-8 are ignored.
pub fn scan_local_dir(dir: &Path) -> Result<Vec<LocalFile>, ServiceError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ServiceError::local(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ServiceError::local(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| ServiceError::local(&path, e))?;
        if !file_type.is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let meta = entry.metadata().map_err(|e| ServiceError::local(&path, e))?;
        let modified = meta.modified().map_err(|e| ServiceError::local(&path, e))?;
        files.push(LocalFile {
            name,
            path,
            size: meta.len(),
            modified: truncate_to_millis(DateTime::<Utc>::from(modified)),
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}
