//! Per-kind preview construction.

use async_trait::async_trait;

use super::lookup::{resolve_folder_path, PreviewLookup, ROOT_FOLDER_ID};
use super::mutation::{
    CreateResource, DeleteResource, Mutation, SendMessage, SyncFolder, UpdateRange,
};
use super::report::{preview_body, preview_grid, DryRunReport};
use super::sync_plan::{plan_sync, scan_local_dir, SyncTotals};
use crate::error::ServiceError;
use crate::exec::ResourceKind;

/// Builds the report a mutation would produce, using reads only.
#[async_trait]
pub trait Preview: Send + Sync {
    async fn build_preview(&self, lookup: &dyn PreviewLookup)
        -> Result<DryRunReport, ServiceError>;
}

/// Dispatch to the preview of `mutation`'s kind.
///
/// A failing lookup aborts the whole report.
pub async fn build_report(
    mutation: &Mutation,
    lookup: &dyn PreviewLookup,
) -> Result<DryRunReport, ServiceError> {
    let preview: &dyn Preview = match mutation {
        Mutation::CreateResource(args) => args,
        Mutation::UpdateRange(args) => args,
        Mutation::DeleteResource(args) => args,
        Mutation::SyncFolder(args) => args,
        Mutation::SendMessage(args) => args,
    };
    preview.build_preview(lookup).await
}

#[async_trait]
impl Preview for CreateResource {
    async fn build_preview(
        &self,
        lookup: &dyn PreviewLookup,
    ) -> Result<DryRunReport, ServiceError> {
        let parent = self.parent_id.as_deref().unwrap_or(ROOT_FOLDER_ID);
        Ok(DryRunReport::CreateResource {
            resource: self.resource,
            name: self.name.clone(),
            parent_path: resolve_folder_path(lookup, parent).await?,
        })
    }
}

#[async_trait]
impl Preview for UpdateRange {
    async fn build_preview(
        &self,
        lookup: &dyn PreviewLookup,
    ) -> Result<DryRunReport, ServiceError> {
        let title = lookup.spreadsheet_title(&self.spreadsheet_id).await?;
        let grid = preview_grid(&self.values);
        Ok(DryRunReport::UpdateRange {
            spreadsheet_id: self.spreadsheet_id.clone(),
            title,
            range: self.range.clone(),
            preview: grid.rows,
            rows: grid.row_count,
            columns: grid.column_count,
            cells: grid.cell_count,
            truncated: grid.truncated,
        })
    }
}

#[async_trait]
impl Preview for DeleteResource {
    async fn build_preview(
        &self,
        lookup: &dyn PreviewLookup,
    ) -> Result<DryRunReport, ServiceError> {
        let name = match self.resource {
            ResourceKind::Spreadsheet => lookup.spreadsheet_title(&self.id).await?,
            _ => lookup.file_metadata(&self.id).await?.name,
        };
        Ok(DryRunReport::DeleteResource {
            id: self.id.clone(),
            name,
            resource: self.resource,
        })
    }
}

#[async_trait]
impl Preview for SyncFolder {
    async fn build_preview(
        &self,
        lookup: &dyn PreviewLookup,
    ) -> Result<DryRunReport, ServiceError> {
        let local = scan_local_dir(&self.local_dir)?;
        let folder = lookup.file_metadata(&self.folder_id).await?;
        let remote = lookup.list_folder(&self.folder_id).await?;
        let entries = plan_sync(&local, &remote);
        Ok(DryRunReport::SyncFolder {
            local_dir: self.local_dir.display().to_string(),
            folder_id: self.folder_id.clone(),
            folder_name: folder.name,
            totals: SyncTotals::tally(&entries),
            entries,
        })
    }
}

#[async_trait]
impl Preview for SendMessage {
    async fn build_preview(
        &self,
        _lookup: &dyn PreviewLookup,
    ) -> Result<DryRunReport, ServiceError> {
        Ok(DryRunReport::SendMessage {
            to: self.to.clone(),
            subject: self.subject.clone(),
            body_preview: preview_body(&self.body),
            body_length: self.body.chars().count(),
        })
    }
}
