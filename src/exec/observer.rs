//! Attempt observation hooks.
//!
//! The executor reports every attempt as an [`AttemptRecord`]. The default
//! [`TracingObserver`] logs them; [`RecordingObserver`] keeps them in memory
//! for callers that need the attempt history.

use std::sync::Mutex;
use std::time::Duration;

use super::classify::Outcome;
use super::operation::Operation;
use crate::error::ExecError;

/// One finished attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptRecord {
    /// 1-based attempt index.
    pub index: u32,
    pub outcome: Outcome,
    /// Wait imposed before the next attempt; `None` on the final attempt.
    pub wait: Option<Duration>,
}

/// Callbacks fired by the retry executor.
pub trait RetryObserver: Send + Sync {
    /// An attempt is about to reach the remote side.
    fn on_attempt_start(&self, op: &Operation, attempt: u32, ceiling: u32) {
        let _ = (op, attempt, ceiling);
    }

    /// An attempt finished, successfully or not.
    fn on_attempt(&self, op: &Operation, record: &AttemptRecord);

    /// The operation gave up with `error`.
    fn on_give_up(&self, op: &Operation, error: &ExecError) {
        let _ = (op, error);
    }
}

/// Logs attempts through `tracing`.
///
/// - attempt start: DEBUG
/// - retry scheduled: WARN
/// - success after retries: INFO
/// - give up: ERROR (cancellation: WARN)
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RetryObserver for TracingObserver {
    fn on_attempt_start(&self, op: &Operation, attempt: u32, ceiling: u32) {
        tracing::debug!(operation = op.name(), attempt, ceiling, "starting attempt");
    }

    fn on_attempt(&self, op: &Operation, record: &AttemptRecord) {
        match (record.outcome, record.wait) {
            (_, Some(wait)) => tracing::warn!(
                operation = op.name(),
                attempt = record.index,
                outcome = ?record.outcome,
                wait_ms = wait.as_millis() as u64,
                "attempt failed, retrying"
            ),
            (Outcome::Success, None) if record.index > 1 => tracing::info!(
                operation = op.name(),
                attempts = record.index,
                "succeeded after retry"
            ),
            (outcome, None) => tracing::debug!(
                operation = op.name(),
                attempt = record.index,
                ?outcome,
                "attempt finished"
            ),
        }
    }

    fn on_give_up(&self, op: &Operation, error: &ExecError) {
        match error {
            ExecError::Cancelled { attempts, .. } => {
                tracing::warn!(operation = op.name(), attempts, "cancelled")
            }
            other => tracing::error!(
                operation = op.name(),
                attempts = other.attempts(),
                kind = %other.kind(),
                "giving up: {other}"
            ),
        }
    }
}

/// Keeps every attempt record; useful for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    records: Mutex<Vec<AttemptRecord>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of records observed so far.
    pub fn records(&self) -> Vec<AttemptRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Waits recorded between attempts, in order.
    pub fn waits(&self) -> Vec<Duration> {
        self.records().iter().filter_map(|r| r.wait).collect()
    }
}

impl RetryObserver for RecordingObserver {
    fn on_attempt(&self, _op: &Operation, record: &AttemptRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(*record);
        }
    }
}
