//! Typed wrappers over the remote REST APIs.
//!
//! [`Workspace`] owns the transport and the retry executor. Reads go straight
//! through the executor; every mutation first passes the dry-run interceptor.

mod drive;
mod mail;
mod sheets;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;

use crate::api::{ApiRequest, RestClient, Transport};
use crate::auth::provider_from_config;
use crate::config::{Config, ServicesConfig};
use crate::dryrun::{DryRunInterceptor, PreviewLookup};
use crate::error::{ApiError, ServiceError};
use crate::exec::{Operation, RetryExecutor};

pub use drive::{Drive, RemoteFile, SyncOutcome, FOLDER_MIME_TYPE};
pub use mail::{Mail, SentMessage};
pub use sheets::{CreatedSpreadsheet, Sheets, UpdatedRange};

/// Entry point for all remote operations.
pub struct Workspace {
    transport: Arc<dyn Transport>,
    executor: RetryExecutor,
    endpoints: ServicesConfig,
    cancel: Option<watch::Receiver<bool>>,
}

impl Workspace {
    pub fn new(
        transport: Arc<dyn Transport>,
        executor: RetryExecutor,
        endpoints: ServicesConfig,
    ) -> Self {
        Self {
            transport,
            executor,
            endpoints,
            cancel: None,
        }
    }

    /// Production wiring: reqwest transport and configured credentials.
    pub fn from_config(config: &Config) -> Self {
        let transport = RestClient::new(Duration::from_secs(config.network.timeout_secs));
        let executor = RetryExecutor::new(
            config.retry,
            config.backoff,
            provider_from_config(&config.auth),
        );
        Self::new(Arc::new(transport), executor, config.services.clone())
    }

    /// Attach a cancellation signal to every operation issued from here on.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn executor(&self) -> &RetryExecutor {
        &self.executor
    }

    pub fn drive(&self) -> Drive<'_> {
        Drive::new(self)
    }

    pub fn sheets(&self) -> Sheets<'_> {
        Sheets::new(self)
    }

    pub fn mail(&self) -> Mail<'_> {
        Mail::new(self)
    }

    pub(crate) fn endpoints(&self) -> &ServicesConfig {
        &self.endpoints
    }

    pub(crate) fn interceptor(&self) -> DryRunInterceptor<'_> {
        DryRunInterceptor::new(self)
    }

    /// Run `request` under `op` and decode the JSON response.
    ///
    /// Decoding happens inside the attempt so a malformed body is reported as
    /// a permanent failure of that operation.
    pub(crate) async fn call<T>(
        &self,
        op: Operation,
        request: ApiRequest,
    ) -> Result<T, ServiceError>
    where
        T: DeserializeOwned,
    {
        let op = op.with_optional_cancellation(self.cancel.as_ref());
        let result = self
            .executor
            .execute(&op, |bearer| {
                let transport = Arc::clone(&self.transport);
                let request = request.clone();
                async move {
                    let value = transport.send(&request, &bearer).await?;
                    decode::<T>(value)
                }
            })
            .await?;
        Ok(result)
    }
}

#[async_trait]
impl PreviewLookup for Workspace {
    async fn file_metadata(&self, id: &str) -> Result<RemoteFile, ServiceError> {
        self.drive().get_file(id).await
    }

    async fn list_folder(&self, folder_id: &str) -> Result<Vec<RemoteFile>, ServiceError> {
        self.drive().list_folder(folder_id).await
    }

    async fn spreadsheet_title(&self, spreadsheet_id: &str) -> Result<String, ServiceError> {
        self.sheets().spreadsheet_title(spreadsheet_id).await
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::InvalidResponse(format!("unexpected response shape: {e}")))
}

/// Append percent-encoded path segments to a configured base URL.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<String, ServiceError> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| ServiceError::InvalidArguments(format!("bad service URL `{base}`: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ServiceError::InvalidArguments(format!("service URL `{base}` cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.into())
}
