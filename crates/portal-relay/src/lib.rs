#![forbid(unsafe_code)]

//! HTTP mail relay client.
//!
//! [`HttpRelay`] implements [`MailRelay`] with a blocking `reqwest` client:
//! one `POST` per submission, `multipart/form-data`, one part per payload
//! entry, no auth headers and no retry. The response is classified by
//! [`interpret_response`].
//!
//! The client is blocking because the runtime already runs relay calls on
//! a worker thread.

use std::fmt;
use std::time::Duration;

use portal_core::FileBlob;
use portal_runtime::{MailRelay, MultipartPayload, PartBody, RelayOutcome, interpret_response};
use reqwest::blocking::{Client, multipart};

/// Errors that can occur while building the relay client.
#[derive(Debug)]
pub enum RelayError {
    /// The HTTP client could not be constructed.
    Client(reqwest::Error),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(e) => write!(f, "failed to build HTTP client: {e}"),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Client(e) => Some(e),
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Client(e)
    }
}

/// Mail relay reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRelay {
    client: Client,
    endpoint: String,
}

impl HttpRelay {
    /// Create a relay posting to `endpoint`.
    ///
    /// `timeout` bounds the whole request; `None` waits indefinitely.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, RelayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post(&self, payload: &MultipartPayload) -> Result<(u16, String), reqwest::Error> {
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(build_form(payload))
            .send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok((status, body))
    }
}

impl MailRelay for HttpRelay {
    fn send(&self, payload: &MultipartPayload) -> RelayOutcome {
        tracing::debug!(
            endpoint = %self.endpoint,
            parts = payload.len(),
            bytes = payload.content_bytes(),
            "posting submission"
        );
        match self.post(payload) {
            Ok((status, body)) => {
                let outcome = interpret_response(status, &body);
                tracing::debug!(status, %outcome, "relay responded");
                outcome
            }
            Err(error) => {
                tracing::debug!(endpoint = %self.endpoint, %error, "relay request failed");
                RelayOutcome::TransportFailure(error.to_string())
            }
        }
    }
}

fn file_part(blob: &FileBlob) -> multipart::Part {
    let bare = || multipart::Part::bytes(blob.bytes().to_vec()).file_name(blob.file_name().to_string());
    match blob.content_type() {
        Some(content_type) => bare().mime_str(content_type).unwrap_or_else(|error| {
            tracing::warn!(
                file = blob.file_name(),
                content_type,
                %error,
                "ignoring invalid content type"
            );
            bare()
        }),
        None => bare(),
    }
}

/// Translate a payload into a `reqwest` multipart form, preserving order.
fn build_form(payload: &MultipartPayload) -> multipart::Form {
    payload
        .parts()
        .iter()
        .fold(multipart::Form::new(), |form, part| match &part.body {
            PartBody::Text(text) => form.text(part.name.clone(), text.clone()),
            PartBody::File(blob) => form.part(part.name.clone(), file_part(blob)),
        })
}
