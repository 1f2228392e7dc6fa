#![forbid(unsafe_code)]

//! The mail relay seam.
//!
//! A [`MailRelay`] performs the single POST of a submission and reduces
//! whatever happened to a [`RelayOutcome`]. Implementations run on a worker
//! thread, so they are `Send + Sync` and blocking.

use std::fmt;

use serde::Deserialize;

use crate::payload::MultipartPayload;

/// Result of one relay call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The relay reported `success: true`.
    Success,
    /// The relay answered but did not report success.
    SoftFailure,
    /// No usable answer: connection error, non-2xx status or unparseable body.
    TransportFailure(String),
}

impl RelayOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for RelayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::SoftFailure => f.write_str("rejected by relay"),
            Self::TransportFailure(reason) => write!(f, "transport failure: {reason}"),
        }
    }
}

/// Sends a submission to the remote mail relay.
pub trait MailRelay: Send + Sync {
    fn send(&self, payload: &MultipartPayload) -> RelayOutcome;
}

#[derive(Deserialize)]
struct RelayResponse {
    #[serde(default)]
    success: Option<bool>,
}

/// Classify a relay HTTP response.
///
/// Non-2xx statuses and bodies that are not a JSON object are transport
/// failures. A JSON object with `success: true` is a success; anything else
/// (including a missing or non-true `success`) is a soft failure.
#[must_use]
pub fn interpret_response(status: u16, body: &str) -> RelayOutcome {
    if !(200..300).contains(&status) {
        return RelayOutcome::TransportFailure(format!("HTTP status {status}"));
    }
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(error) => return RelayOutcome::TransportFailure(format!("unparseable body: {error}")),
    };
    if !value.is_object() {
        return RelayOutcome::TransportFailure("response body is not a JSON object".into());
    }
    match serde_json::from_value::<RelayResponse>(value) {
        Ok(RelayResponse { success: Some(true) }) => RelayOutcome::Success,
        _ => RelayOutcome::SoftFailure,
    }
}
