#![forbid(unsafe_code)]

//! Submission state machine.
//!
//! ```text
//! Idle ──begin──▶ Validating ──invalid──▶ Idle
//!                     │
//!                   valid
//!                     ▼
//!                Submitting ──complete(outcome)──▶ Idle
//! ```
//!
//! The pipeline only tracks state and builds the payload. Issuing the POST
//! and reacting to the outcome belong to the application, which keeps all
//! side effects in one place.

use portal_i18n::Translate;

use crate::form::Form;
use crate::payload::{MultipartPayload, build_payload};
use crate::relay::RelayOutcome;

/// Where the pipeline is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Validating,
    Submitting,
}

/// Result of [`SubmissionPipeline::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDecision {
    /// The form failed validation; nothing is sent.
    Invalid,
    /// A submission is already in flight; nothing is sent.
    InFlight,
    /// Send this payload.
    Send(MultipartPayload),
}

#[derive(Debug, Default)]
pub struct SubmissionPipeline {
    state: PipelineState,
}

impl SubmissionPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Validate the form and, if valid, move to `Submitting`.
    pub fn begin(&mut self, form: &Form, translator: &dyn Translate) -> SubmitDecision {
        if self.state == PipelineState::Submitting {
            return SubmitDecision::InFlight;
        }
        self.state = PipelineState::Validating;
        if !form.is_valid() {
            let failing: Vec<&'static str> =
                form.errors().iter().map(|(key, _)| key.as_str()).collect();
            tracing::debug!(?failing, "submit ignored, form invalid");
            self.state = PipelineState::Idle;
            return SubmitDecision::Invalid;
        }
        let payload = build_payload(form.catalog(), &form.current_values(), translator);
        tracing::info!(
            parts = payload.len(),
            bytes = payload.content_bytes(),
            "submitting form"
        );
        self.state = PipelineState::Submitting;
        SubmitDecision::Send(payload)
    }

    /// Record the relay outcome and return to `Idle`.
    ///
    /// Returns `false`, leaving the state untouched, when no submission is
    /// in flight.
    pub fn complete(&mut self, outcome: &RelayOutcome) -> bool {
        if self.state != PipelineState::Submitting {
            tracing::warn!(state = ?self.state, %outcome, "relay outcome without submission in flight");
            return false;
        }
        self.state = PipelineState::Idle;
        true
    }
}
