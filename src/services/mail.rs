//! Mail sending (Gmail v1).

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{endpoint, Workspace};
use crate::api::ApiRequest;
use crate::dryrun::{Intercepted, Mutation, SendMessage};
use crate::error::ServiceError;
use crate::exec::{Operation, ResourceKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

pub struct Mail<'a> {
    ws: &'a Workspace,
}

impl<'a> Mail<'a> {
    pub(super) fn new(ws: &'a Workspace) -> Self {
        Self { ws }
    }

    /// Send a plain-text message. Never retried under the default policy:
    /// a repeated send delivers a duplicate.
    pub async fn send_message(
        &self,
        to: &[String],
        subject: &str,
        body: &str,
        simulate: bool,
    ) -> Result<Intercepted<SentMessage>, ServiceError> {
        validate_headers(to, subject)?;
        let mutation = Mutation::from(SendMessage {
            to: to.to_vec(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        self.ws
            .interceptor()
            .run(&mutation, simulate, || async {
                let raw = URL_SAFE_NO_PAD.encode(rfc822_message(to, subject, body));
                let url = endpoint(
                    &self.ws.endpoints().mail_base_url,
                    &["users", "me", "messages", "send"],
                )?;
                let request = ApiRequest::post(url).json(json!({ "raw": raw }));
                self.ws
                    .call(
                        Operation::write("gmail.messages.send", ResourceKind::Message),
                        request,
                    )
                    .await
            })
            .await
    }
}

fn validate_headers(to: &[String], subject: &str) -> Result<(), ServiceError> {
    if to.is_empty() {
        return Err(ServiceError::InvalidArguments(
            "at least one recipient is required".to_string(),
        ));
    }
    let header_values = to.iter().map(String::as_str).chain(std::iter::once(subject));
    for value in header_values {
        if value.contains(['\r', '\n']) {
            return Err(ServiceError::InvalidArguments(format!(
                "line breaks are not allowed in headers: {value:?}"
            )));
        }
    }
    if to.iter().any(|addr| !addr.contains('@')) {
        return Err(ServiceError::InvalidArguments(
            "recipients must be email addresses".to_string(),
        ));
    }
    Ok(())
}

fn rfc822_message(to: &[String], subject: &str, body: &str) -> Vec<u8> {
    let mut message = format!(
        "To: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/plain; charset=UTF-8\r\nContent-Transfer-Encoding: 8bit\r\n\r\n",
        to.join(", "),
        encode_header(subject)
    );
    message.push_str(&body.replace("\r\n", "\n").replace('\n', "\r\n"));
    message.into_bytes()
}

/// RFC 2047 encoded-word for non-ASCII header text.
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value))
    }
}
