//! Sequential retry loop shared by every remote call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

use super::backoff::BackoffPolicy;
use super::classify::{classify, classify_credential, Outcome};
use super::observer::{AttemptRecord, RetryObserver, TracingObserver};
use super::operation::Operation;
use super::policy::RetryPolicy;
use crate::auth::{Bearer, CredentialProvider};
use crate::error::{ApiError, ExecError};

/// Runs one operation under the process retry policy.
///
/// The executor holds no per-call state, so a single instance can be shared
/// by concurrent callers.
pub struct RetryExecutor {
    policy: RetryPolicy,
    backoff: BackoffPolicy,
    credentials: Arc<dyn CredentialProvider>,
    observer: Arc<dyn RetryObserver>,
}

impl RetryExecutor {
    pub fn new(
        policy: RetryPolicy,
        backoff: BackoffPolicy,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            policy,
            backoff,
            credentials,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the default tracing observer.
    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    /// Attempt ceiling that applies to `op`.
    pub fn ceiling_for(&self, op: &Operation) -> u32 {
        self.policy.ceiling(op.is_write(), op.max_attempts())
    }

    /// Invoke `call` until it succeeds, fails permanently, runs out of
    /// attempts, or `op` is cancelled.
    ///
    /// A fresh bearer token is requested before every attempt. Each attempt
    /// invokes `call` exactly once; repeating a write is only safe when the
    /// caller raised the write ceiling for an idempotent call.
    pub async fn execute<T, F, Fut>(&self, op: &Operation, mut call: F) -> Result<T, ExecError>
    where
        F: FnMut(Bearer) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let ceiling = self.ceiling_for(op);
        let mut attempt: u32 = 1;
        let mut last_error: Option<ApiError> = None;

        loop {
            if op.is_cancelled() {
                return Err(self.give_up(
                    op,
                    ExecError::Cancelled {
                        operation: op.name(),
                        attempts: attempt - 1,
                        last_error,
                    },
                ));
            }

            let bearer = match self.credentials.bearer_token().await {
                Ok(bearer) => bearer,
                Err(source) => {
                    self.record(op, attempt, classify_credential(&source), None);
                    return Err(self.give_up(
                        op,
                        ExecError::Configuration {
                            operation: op.name(),
                            attempts: attempt - 1,
                            source,
                        },
                    ));
                }
            };

            self.observer.on_attempt_start(op, attempt, ceiling);
            let err = match call(bearer).await {
                Ok(value) => {
                    self.record(op, attempt, Outcome::Success, None);
                    return Ok(value);
                }
                Err(err) => err,
            };

            let outcome = classify(&err);
            if !outcome.is_retryable() {
                self.record(op, attempt, outcome, None);
                return Err(self.give_up(
                    op,
                    ExecError::Permanent {
                        operation: op.name(),
                        attempts: attempt,
                        source: err,
                    },
                ));
            }
            if attempt >= ceiling {
                self.record(op, attempt, outcome, None);
                return Err(self.give_up(
                    op,
                    ExecError::Transient {
                        operation: op.name(),
                        attempts: attempt,
                        source: err,
                    },
                ));
            }

            let wait = self.backoff.delay_for(attempt, err.retry_after());
            self.record(op, attempt, outcome, Some(wait));
            if !suspend(op.cancel_receiver(), wait).await {
                return Err(self.give_up(
                    op,
                    ExecError::Cancelled {
                        operation: op.name(),
                        attempts: attempt,
                        last_error: Some(err),
                    },
                ));
            }
            last_error = Some(err);
            attempt += 1;
        }
    }

    fn record(&self, op: &Operation, index: u32, outcome: Outcome, wait: Option<Duration>) {
        self.observer.on_attempt(
            op,
            &AttemptRecord {
                index,
                outcome,
                wait,
            },
        );
    }

    fn give_up(&self, op: &Operation, error: ExecError) -> ExecError {
        self.observer.on_give_up(op, &error);
        error
    }
}

/// Sleep for `wait`; returns false when cancellation wins the race.
async fn suspend(cancel: Option<watch::Receiver<bool>>, wait: Duration) -> bool {
    let Some(mut cancel) = cancel else {
        sleep(wait).await;
        return true;
    };
    tokio::select! {
        _ = wait_for_cancellation(&mut cancel) => false,
        _ = sleep(wait) => true,
    }
}

async fn wait_for_cancellation(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            // Sender gone without cancelling; nothing can cancel us anymore.
            std::future::pending::<()>().await;
        }
    }
}
