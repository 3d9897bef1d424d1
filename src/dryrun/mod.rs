//! Dry-run simulation layer.
//!
//! Mutating entry points pass their arguments as a [`Mutation`] through a
//! [`DryRunInterceptor`]. When simulation is requested the remote write is
//! never built; the report builder assembles a [`DryRunReport`] from reads
//! alone. Reads are never gated.

mod builder;
mod interceptor;
mod lookup;
mod mutation;
mod report;
mod sync_plan;

pub use builder::{build_report, Preview};
pub use interceptor::{DryRunInterceptor, Intercepted};
pub use lookup::{PreviewLookup, ROOT_FOLDER_ID};
pub use mutation::{CreateResource, DeleteResource, Mutation, SendMessage, SyncFolder, UpdateRange};
pub use report::{
    DryRunReport, MutationKind, BODY_PREVIEW_CHARS, PREVIEW_MAX_COLUMNS, PREVIEW_MAX_ROWS,
};
pub use sync_plan::{
    plan_sync, scan_local_dir, LocalFile, SyncAction, SyncDecision, SyncReason, SyncTotals,
};
