#![forbid(unsafe_code)]

//! Submission portal runtime.
//!
//! Everything stateful about the portal lives here, driven by an
//! Elm-style loop so a shell only has to forward user input as messages
//! and render what the model exposes.
//!
//! # Key Components
//!
//! - [`Form`] - Field values, per-field status and a change stream
//! - [`PersistenceBridge`] - Mirrors the form into a [`KeyValueStore`]
//! - [`LocaleSelector`] - Active UI language, persisted
//! - [`SubmissionPipeline`] - Validate, build the multipart payload, track state
//! - [`MailRelay`] - Seam for the one network call
//! - [`Feedback`] - Busy indicator and notification queue
//! - [`PortalApp`] - The [`Model`] tying the above together
//! - [`Program`] / [`Simulator`] - Threaded and deterministic drivers
//!
//! # How it fits in the system
//! `portal-core` describes the fields and `portal-i18n` resolves strings.
//! This crate owns the lifecycle. The HTTP relay lives in `portal-relay`,
//! and the `portal` facade wires a ready-to-run program from configuration.

pub mod app;
pub mod config;
pub mod feedback;
pub mod form;
pub mod locale;
pub mod logging;
pub mod payload;
pub mod persistence;
pub mod pipeline;
pub mod program;
pub mod reactive;
pub mod relay;
pub mod simulator;
pub mod storage;
pub mod validation;

pub use app::{Msg, PortalApp, PortalDeps};
pub use config::{ConfigError, DEFAULT_RELAY_URL, LogConfig, PortalConfig};
pub use feedback::{
    BusyIndicator, Feedback, Notification, NotificationId, NotificationKind, NotificationPosition,
};
pub use form::{Form, FormError, FormValues};
pub use locale::{LANG_KEY, LocaleSelector};
pub use logging::{LogInitError, init_tracing};
pub use payload::{MultipartPayload, Part, PartBody, build_payload};
pub use persistence::{FORM_DATA_KEY, PersistenceBridge, RestoreOutcome, Snapshot};
pub use pipeline::{PipelineState, SubmissionPipeline, SubmitDecision};
pub use program::{Cmd, Model, Program, TaskSpec};
pub use reactive::{DisposeBag, Emitter, Observable, Subscription};
pub use relay::{MailRelay, RelayOutcome, interpret_response};
pub use simulator::{CmdRecord, Simulator, TaskMode};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StorageResult};
pub use validation::{FieldStatus, ValidationError, ValidationResult, Validator};
