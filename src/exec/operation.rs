//! Descriptor for one unit of remote work.

use serde::Serialize;
use std::fmt;
use tokio::sync::watch;

/// Whether an operation may change remote state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Remote resource family an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    File,
    Folder,
    Spreadsheet,
    Range,
    Message,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::File => "file",
            Self::Folder => "folder",
            Self::Spreadsheet => "spreadsheet",
            Self::Range => "range",
            Self::Message => "message",
        };
        f.write_str(label)
    }
}

/// Identity and per-call overrides of an executed call.
///
/// The callable itself is handed to the executor next to this descriptor;
/// nothing here outlives a single execution.
#[derive(Debug, Clone)]
pub struct Operation {
    name: &'static str,
    resource: ResourceKind,
    access: Access,
    max_attempts: Option<u32>,
    cancel: Option<watch::Receiver<bool>>,
}

impl Operation {
    pub fn read(name: &'static str, resource: ResourceKind) -> Self {
        Self::new(name, resource, Access::Read)
    }

    pub fn write(name: &'static str, resource: ResourceKind) -> Self {
        Self::new(name, resource, Access::Write)
    }

    fn new(name: &'static str, resource: ResourceKind, access: Access) -> Self {
        Self {
            name,
            resource,
            access,
            max_attempts: None,
            cancel: None,
        }
    }

    /// Override the configured attempt ceiling for this call only.
    ///
    /// Raising it on a write opts that write into retries; the caller is then
    /// responsible for the call being idempotent.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts.max(1));
        self
    }

    /// Run this call once regardless of the configured ceiling.
    pub fn without_retries(self) -> Self {
        self.with_max_attempts(1)
    }

    /// Abort the retry loop once `cancel` reads `true`.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub(crate) fn with_optional_cancellation(self, cancel: Option<&watch::Receiver<bool>>) -> Self {
        match cancel {
            Some(rx) => self.with_cancellation(rx.clone()),
            None => self,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn is_write(&self) -> bool {
        self.access == Access::Write
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    pub(crate) fn cancel_receiver(&self) -> Option<watch::Receiver<bool>> {
        self.cancel.clone()
    }
}
