//! Arguments of every mutating operation.
//!
//! A real call and its preview are both driven from these values.

use std::path::PathBuf;

use super::report::MutationKind;
use crate::exec::ResourceKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateResource {
    pub resource: ResourceKind,
    pub name: String,
    /// Parent folder id; `None` means the drive root.
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRange {
    pub spreadsheet_id: String,
    /// A1 notation, e.g. `Sheet1!A1:C3`.
    pub range: String,
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResource {
    pub resource: ResourceKind,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFolder {
    pub local_dir: PathBuf,
    pub folder_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// One mutating request, keyed by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateResource(CreateResource),
    UpdateRange(UpdateRange),
    DeleteResource(DeleteResource),
    SyncFolder(SyncFolder),
    SendMessage(SendMessage),
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::CreateResource(_) => MutationKind::CreateResource,
            Self::UpdateRange(_) => MutationKind::UpdateRange,
            Self::DeleteResource(_) => MutationKind::DeleteResource,
            Self::SyncFolder(_) => MutationKind::SyncFolder,
            Self::SendMessage(_) => MutationKind::SendMessage,
        }
    }
}

impl From<CreateResource> for Mutation {
    fn from(value: CreateResource) -> Self {
        Self::CreateResource(value)
    }
}

impl From<UpdateRange> for Mutation {
    fn from(value: UpdateRange) -> Self {
        Self::UpdateRange(value)
    }
}

impl From<DeleteResource> for Mutation {
    fn from(value: DeleteResource) -> Self {
        Self::DeleteResource(value)
    }
}

impl From<SyncFolder> for Mutation {
    fn from(value: SyncFolder) -> Self {
        Self::SyncFolder(value)
    }
}

impl From<SendMessage> for Mutation {
    fn from(value: SendMessage) -> Self {
        Self::SendMessage(value)
    }
}
