#![forbid(unsafe_code)]

//! The portal application model.
//!
//! [`PortalApp`] wires the form, persistence bridge, locale selector,
//! submission pipeline and feedback into one [`Model`]. Every user action
//! and every relay result arrives as a [`Msg`]; the only background work
//! is the relay call, issued as a [`Cmd::Task`].
//!
//! # Startup order
//!
//! 1. Resolve the locale (persisted code, else the fallback).
//! 2. Restore the form snapshot.
//! 3. Attach the persistence bridge, so restoring does not rewrite the
//!    snapshot it just read.

use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Arc;

use portal_core::{FieldCatalog, FieldKey, FieldValue};
use portal_i18n::{Locale, Translate};

use crate::feedback::{Feedback, NotificationId, NotificationKind};
use crate::form::{Form, FormError};
use crate::payload::MultipartPayload;
use crate::locale::LocaleSelector;
use crate::persistence::{PersistenceBridge, RestoreOutcome};
use crate::pipeline::{PipelineState, SubmissionPipeline, SubmitDecision};
use crate::program::{Cmd, Model, TaskSpec};
use crate::reactive::DisposeBag;
use crate::relay::{MailRelay, RelayOutcome};
use crate::storage::KeyValueStore;

/// Messages understood by [`PortalApp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The user changed a field.
    FieldEdited(FieldKey, FieldValue),
    /// The user pressed submit.
    Submit,
    /// The relay call finished.
    RelayCompleted(RelayOutcome),
    /// The user picked a UI language.
    LanguageSelected(Locale),
    /// The user closed a notification.
    NotificationDismissed(NotificationId),
}

impl Msg {
    /// Input that is dropped while the busy indicator is open.
    fn is_blocked_while_busy(&self) -> bool {
        matches!(
            self,
            Self::FieldEdited(..) | Self::Submit | Self::LanguageSelected(_)
        )
    }
}

/// Collaborators the application is built from.
pub struct PortalDeps {
    pub catalog: Arc<FieldCatalog>,
    pub store: Arc<dyn KeyValueStore>,
    pub relay: Arc<dyn MailRelay>,
    pub translator: Rc<dyn Translate>,
    /// Locale used when none is persisted.
    pub fallback_locale: Locale,
}

/// The submission portal as an Elm-style model.
pub struct PortalApp {
    form: Form,
    pipeline: SubmissionPipeline,
    feedback: Feedback,
    locale: LocaleSelector,
    bridge: PersistenceBridge,
    relay: Arc<dyn MailRelay>,
    translator: Rc<dyn Translate>,
    subscriptions: DisposeBag,
    restore_outcome: RestoreOutcome,
    last_edit_error: Option<FormError>,
}

impl PortalApp {
    #[must_use]
    pub fn new(deps: PortalDeps) -> Self {
        let PortalDeps {
            catalog,
            store,
            relay,
            translator,
            fallback_locale,
        } = deps;

        let locale = LocaleSelector::startup(Arc::clone(&store), Rc::clone(&translator), fallback_locale);

        let mut form = Form::new(Arc::clone(&catalog));
        let bridge = PersistenceBridge::new(store, catalog);
        let restore_outcome = bridge.restore(&mut form);

        let mut subscriptions = DisposeBag::new();
        subscriptions.add(bridge.attach(&form));

        tracing::info!(
            locale = %locale.current(),
            restore = ?restore_outcome,
            "portal started"
        );

        Self {
            form,
            pipeline: SubmissionPipeline::new(),
            feedback: Feedback::new(),
            locale,
            bridge,
            relay,
            translator,
            subscriptions,
            restore_outcome,
            last_edit_error: None,
        }
    }

    #[must_use]
    pub fn form(&self) -> &Form {
        &self.form
    }

    #[must_use]
    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    /// Mutable feedback, for a shell draining notifications.
    pub fn feedback_mut(&mut self) -> &mut Feedback {
        &mut self.feedback
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.feedback.is_busy()
    }

    #[must_use]
    pub fn pipeline_state(&self) -> PipelineState {
        self.pipeline.state()
    }

    #[must_use]
    pub fn locale(&self) -> &LocaleSelector {
        &self.locale
    }

    #[must_use]
    pub fn translator(&self) -> &Rc<dyn Translate> {
        &self.translator
    }

    /// What the startup restore found.
    #[must_use]
    pub fn restore_outcome(&self) -> RestoreOutcome {
        self.restore_outcome
    }

    /// The most recent rejected edit, if any.
    #[must_use]
    pub fn last_edit_error(&self) -> Option<&FormError> {
        self.last_edit_error.as_ref()
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.subscriptions.is_disposed()
    }

    fn edit(&mut self, key: FieldKey, value: FieldValue) {
        match self.form.set_value(key, value) {
            Ok(status) => {
                tracing::trace!(field = %key, ?status, "field edited");
                self.last_edit_error = None;
            }
            Err(error) => {
                tracing::warn!(field = %key, %error, "edit rejected");
                self.last_edit_error = Some(error);
            }
        }
    }

    fn submit(&mut self) -> Cmd<Msg> {
        match self.pipeline.begin(&self.form, self.translator.as_ref()) {
            SubmitDecision::Invalid | SubmitDecision::InFlight => Cmd::none(),
            SubmitDecision::Send(payload) => {
                self.feedback.open_busy();
                let relay = Arc::clone(&self.relay);
                Cmd::task_with_spec(TaskSpec::named("portal-relay"), move || {
                    Msg::RelayCompleted(send_guarded(relay.as_ref(), &payload))
                })
            }
        }
    }

    fn notify(&mut self, kind: NotificationKind, title_key: &str) {
        let title = self.translator.translate(title_key);
        let action = self.translator.translate("CLOSE");
        self.feedback.notify(kind, title, action);
    }

    fn relay_completed(&mut self, outcome: RelayOutcome) {
        if !self.pipeline.complete(&outcome) {
            return;
        }
        self.feedback.close_busy();
        match outcome {
            RelayOutcome::Success => {
                tracing::info!("submission accepted");
                self.form.reset();
                self.bridge.clear();
                self.notify(NotificationKind::Success, "ACCEPTED");
            }
            RelayOutcome::SoftFailure => {
                tracing::info!("submission rejected by relay, keeping form");
                self.notify(NotificationKind::Error, "REJECTED");
            }
            RelayOutcome::TransportFailure(reason) => {
                tracing::warn!(%reason, "submission failed, keeping form");
                self.notify(NotificationKind::Error, "ERROR");
            }
        }
    }
}

/// Run the relay call, turning a panic into a transport failure so the
/// busy indicator is always released.
fn send_guarded(relay: &dyn MailRelay, payload: &MultipartPayload) -> RelayOutcome {
    panic::catch_unwind(AssertUnwindSafe(|| relay.send(payload))).unwrap_or_else(|panic_payload| {
        let reason = panic_payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| panic_payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_owned());
        tracing::error!(%reason, "relay call panicked");
        RelayOutcome::TransportFailure(format!("relay panicked: {reason}"))
    })
}

impl Model for PortalApp {
    type Message = Msg;

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        if self.is_torn_down() {
            return Cmd::none();
        }
        if self.feedback.is_busy() && msg.is_blocked_while_busy() {
            tracing::debug!(?msg, "input dropped while busy");
            return Cmd::none();
        }
        match msg {
            Msg::FieldEdited(key, value) => self.edit(key, value),
            Msg::Submit => return self.submit(),
            Msg::RelayCompleted(outcome) => self.relay_completed(outcome),
            Msg::LanguageSelected(locale) => self.locale.set_language(locale),
            Msg::NotificationDismissed(id) => {
                self.feedback.dismiss(id);
            }
        }
        Cmd::none()
    }

    fn teardown(&mut self) {
        let released = self.subscriptions.dispose_all();
        tracing::debug!(released, "portal torn down");
    }
}

impl std::fmt::Debug for PortalApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalApp")
            .field("form", &self.form)
            .field("pipeline", &self.pipeline)
            .field("feedback", &self.feedback)
            .field("locale", &self.locale)
            .finish()
    }
}
