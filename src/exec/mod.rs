//! Resilient execution layer.
//!
//! Every outbound call runs through [`RetryExecutor`]:
//! - `classify`: fault → outcome category.
//! - `backoff`: wait between attempts, honoring server hints.
//! - `policy`: process-wide attempt ceilings for reads and writes.
//! - `operation`: per-call descriptor and overrides.
//! - `observer`: attempt records for logging and tests.

mod backoff;
mod classify;
mod observer;
mod operation;
mod policy;
mod retry;

pub use backoff::BackoffPolicy;
pub use classify::{classify, classify_credential, Outcome};
pub use observer::{AttemptRecord, RecordingObserver, RetryObserver, TracingObserver};
pub use operation::{Access, Operation, ResourceKind};
pub use policy::{RetryPolicy, DEFAULT_MAX_ATTEMPTS_READ, DEFAULT_MAX_ATTEMPTS_WRITE};
pub use retry::RetryExecutor;
