//! reqwest-backed transport.

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use serde_json::Value;
use tracing::trace;

use super::{ApiRequest, RequestBody, Transport};
use crate::auth::Bearer;
use crate::error::ApiError;

/// HTTP client shared by all services.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
}

impl RestClient {
    pub fn new(timeout: Duration) -> Self {
        // Fall back to reqwest defaults if the builder fails.
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("steward/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http }
    }
}

#[async_trait]
impl Transport for RestClient {
    async fn send(&self, request: &ApiRequest, bearer: &Bearer) -> Result<Value, ApiError> {
        trace!(method = %request.method, url = %request.url, "sending request");
        let mut req = self
            .http
            .request(request.method.clone(), &request.url)
            .header("Authorization", bearer.header_value());
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        req = match &request.body {
            RequestBody::Empty => req,
            RequestBody::Json(value) => req.json(value),
            RequestBody::Bytes { content_type, data } => req
                .header(CONTENT_TYPE, content_type.as_str())
                .body(data.clone()),
        };

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            let retry_after = parse_retry_after(code, response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::status(code, body, retry_after));
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::InvalidResponse(format!("malformed JSON body: {e}")))
    }
}

/// Extract a `Retry-After` wait from a 429 or 503 response.
///
/// Accepts delta-seconds or an HTTP-date; a date in the past means "now".
/// Any other status, or a malformed value, yields `None`.
pub fn parse_retry_after(status: u16, headers: &HeaderMap) -> Option<Duration> {
    if status != 429 && status != 503 {
        return None;
    }
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    let at = httpdate::parse_http_date(raw).ok()?;
    Some(
        at.duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO),
    )
}
