//! Read-only view used while building previews.

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::services::RemoteFile;

/// Id Drive accepts for the user's root folder.
pub const ROOT_FOLDER_ID: &str = "root";

const MAX_PATH_DEPTH: usize = 32;

/// Lookups a preview may perform. Every method is a read; implementations
/// route them through the retry executor like any other read.
#[async_trait]
pub trait PreviewLookup: Send + Sync {
    async fn file_metadata(&self, id: &str) -> Result<RemoteFile, ServiceError>;

    async fn list_folder(&self, folder_id: &str) -> Result<Vec<RemoteFile>, ServiceError>;

    async fn spreadsheet_title(&self, spreadsheet_id: &str) -> Result<String, ServiceError>;
}

/// Resolve `folder_id` to a `/`-joined path from the drive root.
///
/// Walks at most `MAX_PATH_DEPTH` folders; a deeper path keeps its innermost
/// components behind a leading `…/`.
pub(super) async fn resolve_folder_path(
    lookup: &dyn PreviewLookup,
    folder_id: &str,
) -> Result<String, ServiceError> {
    let mut names = Vec::new();
    let mut current = folder_id.to_string();
    let mut reached_top = false;
    for _ in 0..MAX_PATH_DEPTH {
        let meta = lookup.file_metadata(&current).await?;
        names.push(meta.name);
        match meta.parents.into_iter().next() {
            Some(parent) => current = parent,
            None => {
                reached_top = true;
                break;
            }
        }
    }
    names.reverse();
    let path = names.join("/");
    if reached_top {
        Ok(path)
    } else {
        Ok(format!("…/{path}"))
    }
}
