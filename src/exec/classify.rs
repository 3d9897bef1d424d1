//! Fault classification for the retry loop.

use crate::error::{ApiError, CredentialError};
use std::error::Error as StdError;
use std::io::ErrorKind;

/// Category of a single attempt's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    TransientFailure,
    PermanentFailure,
    ConfigurationFailure,
}

impl Outcome {
    pub fn is_retryable(self) -> bool {
        self == Self::TransientFailure
    }
}

/// Classify a transport fault.
///
/// Anything not recognized as transient is permanent; unknown failures are
/// never assumed safe to repeat.
pub fn classify(err: &ApiError) -> Outcome {
    match err {
        ApiError::Status { code, .. } => classify_status(*code),
        ApiError::Http(inner) => classify_http(inner),
        ApiError::Io(inner) => classify_io(inner.kind()),
        ApiError::InvalidResponse(_) => Outcome::PermanentFailure,
    }
}

/// Credential failures are configuration problems and never retried.
pub fn classify_credential(_err: &CredentialError) -> Outcome {
    Outcome::ConfigurationFailure
}

fn classify_status(code: u16) -> Outcome {
    match code {
        429 | 500 | 502 | 503 | 504 => Outcome::TransientFailure,
        _ => Outcome::PermanentFailure,
    }
}

fn classify_http(err: &reqwest::Error) -> Outcome {
    if err.is_timeout() || err.is_connect() {
        return Outcome::TransientFailure;
    }
    if let Some(status) = err.status() {
        return classify_status(status.as_u16());
    }
    if let Some(io) = io_source(err) {
        return classify_io(io.kind());
    }
    // The connection closed after the request went out and before a full
    // response arrived (hyper's incomplete message carries no io error).
    if err.is_request() || err.is_body() {
        return Outcome::TransientFailure;
    }
    Outcome::PermanentFailure
}

/// First `io::Error` in the source chain, if any.
fn io_source<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a std::io::Error> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return Some(io);
        }
        source = cause.source();
    }
    None
}

fn classify_io(kind: ErrorKind) -> Outcome {
    match kind {
        ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::ConnectionRefused
        | ErrorKind::BrokenPipe
        | ErrorKind::TimedOut
        | ErrorKind::UnexpectedEof
        | ErrorKind::Interrupted => Outcome::TransientFailure,
        _ => Outcome::PermanentFailure,
    }
}
