//! Submission Lifecycle E2E Tests
//!
//! Drives [`PortalApp`] through the deterministic simulator with a scripted
//! relay and an in-memory store.
//!
//! # Running Tests
//!
//! ```sh
//! cargo test -p portal-runtime --test submission_lifecycle
//! ```
//!
//! # Invariants
//!
//! 1. **No call when invalid**: a submit with any required field empty
//!    issues no relay call and stays idle.
//! 2. **Snapshot mirrors form**: after every edit the stored snapshot equals
//!    the form values minus the file fields.
//! 3. **Data survives failures**: transport and soft failures keep the form
//!    and snapshot; only success resets and clears.
//! 4. **Busy blocks input**: edits and submits are dropped while the relay
//!    call is in flight.
//! 5. **Failures stay local**: a failing store or a panicking relay never
//!    blocks editing, locale changes or a later submit.

#![cfg(test)]

use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use portal_core::{FieldCatalog, FieldKey, FieldValue, FileBlob, NAVIGATION_MAX_BYTES};
use portal_i18n::{CatalogTranslator, Locale, Translate};
use portal_runtime::{
    FORM_DATA_KEY, FieldStatus, KeyValueStore, LANG_KEY, MailRelay, MemoryStore, Msg,
    MultipartPayload, NotificationKind, PersistenceBridge, PipelineState, PortalApp, PortalDeps,
    RelayOutcome, RestoreOutcome, Simulator, StorageError, StorageResult, TaskMode,
};
use pretty_assertions::assert_eq;

// ============================================================================
// Test Utilities
// ============================================================================

/// Relay answering from a script and recording what it was sent.
#[derive(Default)]
struct ScriptedRelay {
    script: Mutex<VecDeque<RelayOutcome>>,
    calls: AtomicUsize,
    last_payload: Mutex<Option<MultipartPayload>>,
}

impl ScriptedRelay {
    fn answering(outcomes: impl IntoIterator<Item = RelayOutcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            ..Self::default()
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_text(&self, name: &str) -> Option<String> {
        let guard = self.last_payload.lock().unwrap();
        guard.as_ref()?.text(name).map(str::to_string)
    }
}

impl MailRelay for ScriptedRelay {
    fn send(&self, payload: &MultipartPayload) -> RelayOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(payload.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| RelayOutcome::TransportFailure("script exhausted".into()))
    }
}

struct Harness {
    sim: Simulator<PortalApp>,
    store: Arc<MemoryStore>,
    relay: Arc<ScriptedRelay>,
    translator: Rc<CatalogTranslator>,
}

fn harness_with(store: Arc<MemoryStore>, relay: Arc<ScriptedRelay>, mode: TaskMode) -> Harness {
    let translator = Rc::new(CatalogTranslator::builtin(Locale::DEFAULT));
    let app = PortalApp::new(PortalDeps {
        catalog: Arc::new(FieldCatalog::standard()),
        store: store.clone(),
        relay: relay.clone(),
        translator: translator.clone(),
        fallback_locale: Locale::DEFAULT,
    });
    let mut sim = Simulator::with_mode(app, mode);
    sim.init();
    Harness {
        sim,
        store,
        relay,
        translator,
    }
}

fn harness(outcomes: impl IntoIterator<Item = RelayOutcome>) -> Harness {
    harness_with(
        Arc::new(MemoryStore::new()),
        ScriptedRelay::answering(outcomes),
        TaskMode::Immediate,
    )
}

fn file(name: &str, size: usize) -> FieldValue {
    FieldValue::File(FileBlob::new(name, vec![0; size]))
}

fn valid_edits() -> Vec<(FieldKey, FieldValue)> {
    vec![
        (FieldKey::Fio, FieldValue::text("A B")),
        (FieldKey::Work, FieldValue::text("Archive")),
        (FieldKey::Position, FieldValue::text("Clerk")),
        (FieldKey::LayerTheme, FieldValue::code("LAYER_THEME.AGRICULTURE")),
        (FieldKey::Chronology, FieldValue::code("1980")),
        (FieldKey::FileType, FieldValue::code("FILE_TYPE.MAP_SCHEME")),
        (FieldKey::File, file("scan.pdf", 64)),
        (FieldKey::Navigation, file("map.jpg", 64)),
        (FieldKey::Phone, FieldValue::text("+998 90 000 00 00")),
    ]
}

fn fill(h: &mut Harness) {
    for (key, value) in valid_edits() {
        h.sim.send(Msg::FieldEdited(key, value));
    }
    assert!(h.sim.model().form().is_valid());
}

fn stored_snapshot(h: &Harness) -> Option<String> {
    h.store.get(FORM_DATA_KEY).unwrap()
}

// ============================================================================
// 1. Validation gate
// ============================================================================

#[test]
fn each_missing_required_field_blocks_submit() {
    for (skip, _) in valid_edits() {
        let mut h = harness([RelayOutcome::Success]);
        for (key, value) in valid_edits() {
            if key != skip {
                h.sim.send(Msg::FieldEdited(key, value));
            }
        }
        h.sim.send(Msg::Submit);

        assert_eq!(h.relay.calls(), 0, "missing {skip}");
        assert_eq!(h.sim.tasks_issued(), 0, "missing {skip}");
        assert_eq!(h.sim.model().pipeline_state(), PipelineState::Idle);
        assert!(!h.sim.model().is_busy());
        assert!(h.sim.model().feedback().latest().is_none());
    }
}

#[test]
fn email_is_optional_but_checked() {
    let mut h = harness([RelayOutcome::Success, RelayOutcome::Success]);
    fill(&mut h);
    h.sim
        .send(Msg::FieldEdited(FieldKey::Email, FieldValue::text("no-at-sign")));
    assert_eq!(
        h.sim.model().form().status(FieldKey::Email),
        FieldStatus::FormatInvalid
    );
    h.sim.send(Msg::Submit);
    assert_eq!(h.relay.calls(), 0);

    h.sim
        .send(Msg::FieldEdited(FieldKey::Email, FieldValue::text("user@domain.tld")));
    h.sim.send(Msg::Submit);
    assert_eq!(h.relay.calls(), 1);
}

// ============================================================================
// 2. File ceilings
// ============================================================================

#[test]
fn oversize_navigation_image_is_cleared() {
    let mut h = harness([]);
    let too_big = usize::try_from(NAVIGATION_MAX_BYTES).unwrap() + 1;
    h.sim
        .send(Msg::FieldEdited(FieldKey::Navigation, file("map.png", too_big)));
    let form = h.sim.model().form();
    assert_eq!(form.value(FieldKey::Navigation), Some(&FieldValue::Empty));
    assert_eq!(form.status(FieldKey::Navigation), FieldStatus::Oversize);

    h.sim.send(Msg::FieldEdited(
        FieldKey::Navigation,
        file("map.png", too_big - 1),
    ));
    let form = h.sim.model().form();
    assert!(form.value(FieldKey::Navigation).unwrap().as_file().is_some());
    assert_eq!(form.status(FieldKey::Navigation), FieldStatus::Valid);
}

// ============================================================================
// 3. Persistence
// ============================================================================

#[test]
fn snapshot_tracks_every_edit_without_files() {
    let mut h = harness([]);
    let catalog = FieldCatalog::standard();
    let bridge = PersistenceBridge::new(h.store.clone(), Arc::new(catalog));

    for (key, value) in valid_edits() {
        h.sim.send(Msg::FieldEdited(key, value));
        let stored = bridge.load_snapshot().unwrap().unwrap();
        let expected = bridge.snapshot_of(&h.sim.model().form().current_values());
        assert_eq!(stored, expected);
        assert!(!stored.contains_key(&FieldKey::File));
        assert!(!stored.contains_key(&FieldKey::Navigation));
    }
}

#[test]
fn restart_restores_persisted_fields() {
    let store = Arc::new(MemoryStore::with_entries([(
        FORM_DATA_KEY,
        r#"{"fio":"A B","phone":"123"}"#,
    )]));
    let h = harness_with(store, ScriptedRelay::answering([]), TaskMode::Immediate);
    let form = h.sim.model().form();

    assert_eq!(h.sim.model().restore_outcome(), RestoreOutcome::Applied(2));
    assert_eq!(form.value(FieldKey::Fio), Some(&FieldValue::text("A B")));
    assert_eq!(form.value(FieldKey::Phone), Some(&FieldValue::text("123")));
    assert_eq!(form.value(FieldKey::Work), Some(&FieldValue::text("")));
    assert_eq!(form.value(FieldKey::LayerTheme), Some(&FieldValue::Empty));
    assert_eq!(form.value(FieldKey::File), Some(&FieldValue::Empty));
    assert_eq!(
        h.store.get(FORM_DATA_KEY).unwrap().as_deref(),
        Some(r#"{"fio":"A B","phone":"123"}"#),
        "restoring must not rewrite the snapshot"
    );
}

#[test]
fn malformed_snapshot_does_not_fail_startup() {
    let store = Arc::new(MemoryStore::with_entries([(FORM_DATA_KEY, "{\"fio\":")]));
    let h = harness_with(store, ScriptedRelay::answering([]), TaskMode::Immediate);
    assert_eq!(h.sim.model().restore_outcome(), RestoreOutcome::Malformed);
    assert_eq!(
        h.sim.model().form().value(FieldKey::Fio),
        Some(&FieldValue::text(""))
    );
}

// ============================================================================
// 4. Relay outcomes
// ============================================================================

#[test]
fn transport_failure_keeps_everything() {
    let mut h = harness([RelayOutcome::TransportFailure("connection refused".into())]);
    fill(&mut h);
    let values_before = h.sim.model().form().current_values();
    let snapshot_before = stored_snapshot(&h);

    h.sim.send(Msg::Submit);

    assert_eq!(h.relay.calls(), 1);
    assert!(!h.sim.model().is_busy());
    assert_eq!(h.sim.model().form().current_values(), values_before);
    assert_eq!(stored_snapshot(&h), snapshot_before);
    let toast = h.sim.model().feedback().latest().unwrap();
    assert_eq!(toast.kind, NotificationKind::Error);
    assert_eq!(toast.title, "Ошибка");
    assert_eq!(toast.action_label, "Закрыть");
}

#[test]
fn success_resets_form_and_clears_snapshot() {
    let mut h = harness([RelayOutcome::Success]);
    fill(&mut h);
    h.sim.send(Msg::Submit);

    assert_eq!(h.relay.calls(), 1);
    assert_eq!(stored_snapshot(&h), None);
    let form = h.sim.model().form();
    assert_eq!(form.value(FieldKey::Fio), Some(&FieldValue::text("")));
    assert_eq!(form.value(FieldKey::File), Some(&FieldValue::Empty));
    let toast = h.sim.model().feedback().latest().unwrap();
    assert_eq!(toast.kind, NotificationKind::Success);
    assert_eq!(toast.title, h.translator.translate("ACCEPTED"));
}

#[test]
fn soft_failure_keeps_form_and_reports_rejection() {
    let mut h = harness([RelayOutcome::SoftFailure]);
    fill(&mut h);
    let values_before = h.sim.model().form().current_values();
    let snapshot_before = stored_snapshot(&h);

    h.sim.send(Msg::Submit);

    assert_eq!(h.sim.model().form().current_values(), values_before);
    assert_eq!(stored_snapshot(&h), snapshot_before);
    let toast = h.sim.model().feedback().latest().unwrap();
    assert_eq!(toast.kind, NotificationKind::Error);
    assert_eq!(toast.title, "Заявка не принята");
}

#[test]
fn payload_uses_translated_labels() {
    let mut h = harness([RelayOutcome::Success]);
    h.sim.send(Msg::LanguageSelected(Locale::Uz));
    fill(&mut h);
    h.sim.send(Msg::Submit);

    assert_eq!(h.relay.last_text("fio").as_deref(), Some("F.I.Sh.: A B"));
    assert_eq!(
        h.relay.last_text("fileType").as_deref(),
        Some("Fayl turi: Xarita yoki sxema")
    );
    assert_eq!(h.relay.last_text("email").as_deref(), Some("Elektron pochta: "));
}

// ============================================================================
// 5. Busy indicator
// ============================================================================

#[test]
fn input_is_dropped_while_busy() {
    let mut h = harness_with(
        Arc::new(MemoryStore::new()),
        ScriptedRelay::answering([RelayOutcome::SoftFailure]),
        TaskMode::Deferred,
    );
    fill(&mut h);
    h.sim.send(Msg::Submit);
    assert!(h.sim.model().is_busy());
    assert!(!h.sim.model().feedback().busy().clone().request_close());
    assert_eq!(h.sim.model().pipeline_state(), PipelineState::Submitting);

    h.sim
        .send(Msg::FieldEdited(FieldKey::Fio, FieldValue::text("changed")));
    h.sim.send(Msg::Submit);
    h.sim.send(Msg::LanguageSelected(Locale::Uz));
    assert_eq!(h.sim.pending_tasks(), 1);
    assert_eq!(
        h.sim.model().form().value(FieldKey::Fio),
        Some(&FieldValue::text("A B"))
    );
    assert_eq!(h.sim.model().locale().current(), Locale::Ru);

    assert_eq!(h.sim.run_pending(), 1);
    assert!(!h.sim.model().is_busy());
    assert_eq!(h.relay.calls(), 1);
    assert_eq!(h.sim.model().pipeline_state(), PipelineState::Idle);
}

#[test]
fn dismissing_a_notification() {
    let mut h = harness([RelayOutcome::SoftFailure]);
    fill(&mut h);
    h.sim.send(Msg::Submit);
    let id = h.sim.model().feedback().latest().unwrap().id;
    h.sim.send(Msg::NotificationDismissed(id));
    assert!(h.sim.model().feedback().notifications().is_empty());
}

// ============================================================================
// 6. Locale
// ============================================================================

#[test]
fn switching_locale_changes_lookups_and_persists() {
    let mut h = harness([]);
    assert_eq!(h.translator.translate("CLOSE"), "Закрыть");
    h.sim.send(Msg::LanguageSelected(Locale::Uz));
    assert_eq!(h.translator.translate("CLOSE"), "Yopish");
    assert_eq!(h.store.get(LANG_KEY).unwrap().as_deref(), Some("uz"));
    assert_eq!(h.sim.model().locale().version(), 1);

    let restarted = harness_with(h.store.clone(), ScriptedRelay::answering([]), TaskMode::Immediate);
    assert_eq!(restarted.sim.model().locale().current(), Locale::Uz);
    assert_eq!(restarted.translator.translate("CLOSE"), "Yopish");
}

// ============================================================================
// 7. Teardown
// ============================================================================

#[test]
fn teardown_discards_in_flight_result() {
    let mut h = harness_with(
        Arc::new(MemoryStore::new()),
        ScriptedRelay::answering([RelayOutcome::Success]),
        TaskMode::Deferred,
    );
    fill(&mut h);
    h.sim.send(Msg::Submit);
    let snapshot_before = stored_snapshot(&h);

    h.sim.teardown();
    assert_eq!(h.sim.run_pending(), 0);
    assert_eq!(h.relay.calls(), 0);
    assert_eq!(stored_snapshot(&h), snapshot_before);
    assert!(h.sim.model().is_torn_down());
}

// ============================================================================
// 8. Failure isolation
// ============================================================================

/// Store whose reads find nothing and whose writes always fail.
#[derive(Default)]
struct FailingStore {
    write_attempts: AtomicUsize,
}

impl KeyValueStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Io(io::Error::other("disk full")))
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Io(io::Error::other("disk full")))
    }
}

#[test]
fn failing_store_never_blocks_the_session() {
    let store = Arc::new(FailingStore::default());
    let relay = ScriptedRelay::answering([RelayOutcome::Success]);
    let translator = Rc::new(CatalogTranslator::builtin(Locale::DEFAULT));
    let app = PortalApp::new(PortalDeps {
        catalog: Arc::new(FieldCatalog::standard()),
        store: store.clone(),
        relay: relay.clone(),
        translator: translator.clone(),
        fallback_locale: Locale::DEFAULT,
    });
    let mut sim = Simulator::new(app);
    sim.init();

    for (key, value) in valid_edits() {
        sim.send(Msg::FieldEdited(key, value));
    }
    assert_eq!(
        sim.model().form().value(FieldKey::Fio),
        Some(&FieldValue::text("A B"))
    );
    assert!(sim.model().form().is_valid());
    assert!(sim.model().last_edit_error().is_none());

    sim.send(Msg::LanguageSelected(Locale::Uz));
    assert_eq!(sim.model().locale().current(), Locale::Uz);
    assert_eq!(translator.translate("CLOSE"), "Yopish");

    sim.send(Msg::Submit);
    assert_eq!(relay.calls(), 1);
    assert!(!sim.model().is_busy());
    assert_eq!(
        sim.model().form().value(FieldKey::Fio),
        Some(&FieldValue::text(""))
    );
    assert_eq!(
        sim.model().feedback().latest().map(|n| n.kind),
        Some(NotificationKind::Success)
    );
    assert!(store.write_attempts.load(Ordering::SeqCst) > valid_edits().len());
}

struct PanickingRelay;

impl MailRelay for PanickingRelay {
    fn send(&self, _payload: &MultipartPayload) -> RelayOutcome {
        panic!("relay blew up");
    }
}

#[test]
fn panicking_relay_releases_busy_and_allows_retry() {
    let store = Arc::new(MemoryStore::new());
    let app = PortalApp::new(PortalDeps {
        catalog: Arc::new(FieldCatalog::standard()),
        store: store.clone(),
        relay: Arc::new(PanickingRelay),
        translator: Rc::new(CatalogTranslator::builtin(Locale::DEFAULT)),
        fallback_locale: Locale::DEFAULT,
    });
    let mut sim = Simulator::new(app);
    sim.init();
    for (key, value) in valid_edits() {
        sim.send(Msg::FieldEdited(key, value));
    }

    sim.send(Msg::Submit);
    assert!(!sim.model().is_busy());
    assert_eq!(sim.model().pipeline_state(), PipelineState::Idle);
    assert_eq!(
        sim.model().feedback().latest().map(|n| n.kind),
        Some(NotificationKind::Error)
    );
    assert!(store.get(FORM_DATA_KEY).unwrap().is_some());

    sim.send(Msg::FieldEdited(FieldKey::Fio, FieldValue::text("retry")));
    assert_eq!(
        sim.model().form().value(FieldKey::Fio),
        Some(&FieldValue::text("retry"))
    );
    sim.send(Msg::Submit);
    assert_eq!(sim.tasks_issued(), 2);
}
