#![forbid(unsafe_code)]

//! Mirrors the form into the key-value store and restores it on startup.
//!
//! The stored document is a JSON object keyed by field wire name. Text
//! and select values are strings, empty values are `null`, and file fields
//! never appear:
//!
//! ```json
//! {"chronology":"1960","email":"","fio":"A B","layerTheme":null,"phone":"123","work":""}
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Store write fails | Logged at `warn`, editing continues |
//! | Stored document is not JSON / not an object | Logged at `warn`, defaults kept |
//! | Entry with unknown key, file key, or wrong type | Skipped |

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use portal_core::{FieldCatalog, FieldKey, FieldValue, InputKind};
use serde_json::{Map, Value};

use crate::form::{Form, FormValues};
use crate::reactive::Subscription;
use crate::storage::{KeyValueStore, StorageResult};

/// Store key of the form snapshot.
pub const FORM_DATA_KEY: &str = "formData";

/// Non-file field values; `None` is an empty value.
pub type Snapshot = BTreeMap<FieldKey, Option<String>>;

/// What [`PersistenceBridge::restore`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// No snapshot stored (or the store could not be read).
    Absent,
    /// Snapshot parsed; this many entries were applied.
    Applied(usize),
    /// Snapshot present but unusable; defaults kept.
    Malformed,
}

/// Links a [`Form`] to a [`KeyValueStore`].
#[derive(Clone)]
pub struct PersistenceBridge {
    store: Arc<dyn KeyValueStore>,
    catalog: Arc<FieldCatalog>,
}

impl PersistenceBridge {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, catalog: Arc<FieldCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Snapshot of `values` with file fields removed.
    #[must_use]
    pub fn snapshot_of(&self, values: &FormValues) -> Snapshot {
        self.catalog
            .iter()
            .filter(|field| !field.is_file())
            .map(|field| {
                let stored = values
                    .get(&field.key())
                    .and_then(FieldValue::as_str)
                    .map(str::to_string);
                (field.key(), stored)
            })
            .collect()
    }

    /// Encode a snapshot as a JSON object.
    #[must_use]
    pub fn encode(snapshot: &Snapshot) -> String {
        let object: Map<String, Value> = snapshot
            .iter()
            .map(|(key, value)| {
                let json = value.clone().map_or(Value::Null, Value::String);
                (key.as_str().to_string(), json)
            })
            .collect();
        Value::Object(object).to_string()
    }

    /// Decode a stored document, skipping entries that do not fit the catalog.
    ///
    /// Returns `None` when the document is not a JSON object.
    #[must_use]
    pub fn decode(&self, raw: &str) -> Option<Snapshot> {
        let Ok(Value::Object(object)) = serde_json::from_str::<Value>(raw) else {
            return None;
        };
        let mut snapshot = Snapshot::new();
        for (name, value) in object {
            let Some(key) = FieldKey::parse(&name) else {
                tracing::debug!(field = %name, "ignoring unknown snapshot entry");
                continue;
            };
            if self.catalog.get(key).is_none_or(|field| field.is_file()) {
                continue;
            }
            match value {
                Value::Null => {
                    snapshot.insert(key, None);
                }
                Value::String(text) => {
                    snapshot.insert(key, Some(text));
                }
                other => {
                    tracing::debug!(field = %key, value = %other, "ignoring non-string snapshot entry");
                }
            }
        }
        Some(snapshot)
    }

    /// Turn snapshot entries into form values for the matching field kinds.
    fn to_values(&self, snapshot: Snapshot) -> Vec<(FieldKey, FieldValue)> {
        snapshot
            .into_iter()
            .filter_map(|(key, stored)| {
                let field = self.catalog.get(key)?;
                let value = match (field.input_kind(), stored) {
                    (_, None) => field.default_value(),
                    (InputKind::Select, Some(code)) => FieldValue::Code(code),
                    (kind, Some(text)) if kind.is_textual() => FieldValue::Text(text),
                    _ => return None,
                };
                Some((key, value))
            })
            .collect()
    }

    /// Persist the snapshot of `values`. Failures are logged, never returned.
    pub fn write(&self, values: &FormValues) {
        let encoded = Self::encode(&self.snapshot_of(values));
        if let Err(error) = self.store.set(FORM_DATA_KEY, &encoded) {
            tracing::warn!(store = self.store.name(), %error, "failed to persist form snapshot");
        }
    }

    /// Read and decode the stored snapshot.
    pub fn load_snapshot(&self) -> StorageResult<Option<Snapshot>> {
        Ok(self
            .store
            .get(FORM_DATA_KEY)?
            .and_then(|raw| self.decode(&raw)))
    }

    /// Apply the stored snapshot to `form`. Never fails.
    pub fn restore(&self, form: &mut Form) -> RestoreOutcome {
        let raw = match self.store.get(FORM_DATA_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return RestoreOutcome::Absent,
            Err(error) => {
                tracing::warn!(store = self.store.name(), %error, "failed to read form snapshot");
                return RestoreOutcome::Absent;
            }
        };
        let Some(snapshot) = self.decode(&raw) else {
            tracing::warn!(store = self.store.name(), "stored form snapshot is malformed, keeping defaults");
            return RestoreOutcome::Malformed;
        };
        let applied = form.patch(self.to_values(snapshot));
        tracing::debug!(applied, "restored form snapshot");
        RestoreOutcome::Applied(applied)
    }

    /// Write a snapshot on every form change until the subscription is released.
    pub fn attach(&self, form: &Form) -> Subscription {
        let bridge = self.clone();
        form.subscribe(move |values| bridge.write(values))
    }

    /// Remove the stored snapshot.
    pub fn clear(&self) {
        if let Err(error) = self.store.remove(FORM_DATA_KEY) {
            tracing::warn!(store = self.store.name(), %error, "failed to clear form snapshot");
        }
    }
}

impl fmt::Debug for PersistenceBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceBridge")
            .field("store", &self.store.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use portal_core::FileBlob;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn setup() -> (Arc<MemoryStore>, PersistenceBridge, Form) {
        let catalog = Arc::new(FieldCatalog::standard());
        let store = Arc::new(MemoryStore::new());
        let bridge = PersistenceBridge::new(store.clone(), Arc::clone(&catalog));
        (store, bridge, Form::new(catalog))
    }

    #[test]
    fn snapshot_never_contains_files() {
        let (store, bridge, mut form) = setup();
        let _subscription = bridge.attach(&form);
        form.set_value(FieldKey::File, FieldValue::File(FileBlob::new("a.pdf", vec![1])))
            .unwrap();
        form.set_value(FieldKey::Fio, FieldValue::text("A B")).unwrap();

        let raw = store.get(FORM_DATA_KEY).unwrap().unwrap();
        let object: Map<String, Value> = serde_json::from_str(&raw).unwrap();
        assert!(!object.contains_key("file"));
        assert!(!object.contains_key("navigation"));
        assert_eq!(object.get("fio"), Some(&Value::String("A B".into())));
        assert_eq!(object.get("layerTheme"), Some(&Value::Null));
        assert_eq!(object.len(), 8);
    }

    #[test]
    fn restore_applies_partial_snapshot() {
        let (store, bridge, mut form) = setup();
        store
            .set(FORM_DATA_KEY, r#"{"fio":"A B","phone":"123"}"#)
            .unwrap();
        assert_eq!(bridge.restore(&mut form), RestoreOutcome::Applied(2));
        assert_eq!(form.value(FieldKey::Fio), Some(&FieldValue::text("A B")));
        assert_eq!(form.value(FieldKey::Phone), Some(&FieldValue::text("123")));
        assert_eq!(form.value(FieldKey::Work), Some(&FieldValue::text("")));
        assert_eq!(form.value(FieldKey::Chronology), Some(&FieldValue::Empty));
    }

    #[test]
    fn restore_skips_unfit_entries() {
        let (store, bridge, mut form) = setup();
        store
            .set(
                FORM_DATA_KEY,
                r#"{"fio":7,"file":"x","bogus":"y","chronology":"1999","fileType":"FILE_TYPE.MAP_SCHEME","work":null}"#,
            )
            .unwrap();
        assert_eq!(bridge.restore(&mut form), RestoreOutcome::Applied(2));
        assert_eq!(form.value(FieldKey::Fio), Some(&FieldValue::text("")));
        assert_eq!(form.value(FieldKey::Chronology), Some(&FieldValue::Empty));
        assert_eq!(
            form.value(FieldKey::FileType),
            Some(&FieldValue::code("FILE_TYPE.MAP_SCHEME"))
        );
    }

    #[test]
    fn malformed_snapshot_keeps_defaults() {
        let (store, bridge, mut form) = setup();
        let defaults = form.current_values();
        for raw in ["{not json", "[1,2]", "\"text\""] {
            store.set(FORM_DATA_KEY, raw).unwrap();
            assert_eq!(bridge.restore(&mut form), RestoreOutcome::Malformed);
        }
        assert_eq!(form.current_values(), defaults);
    }

    #[test]
    fn absent_snapshot() {
        let (_store, bridge, mut form) = setup();
        assert_eq!(bridge.restore(&mut form), RestoreOutcome::Absent);
        assert_eq!(bridge.load_snapshot().unwrap(), None);
    }

    #[test]
    fn clear_removes_snapshot() {
        let (store, bridge, mut form) = setup();
        let _subscription = bridge.attach(&form);
        form.set_value(FieldKey::Fio, FieldValue::text("x")).unwrap();
        bridge.clear();
        assert_eq!(store.get(FORM_DATA_KEY).unwrap(), None);
    }

    #[test]
    fn released_subscription_stops_writes() {
        let (store, bridge, mut form) = setup();
        bridge.attach(&form).dispose();
        form.set_value(FieldKey::Fio, FieldValue::text("x")).unwrap();
        assert!(store.is_empty());
    }

    fn edit_strategy() -> impl Strategy<Value = (FieldKey, FieldValue)> {
        prop_oneof![
            "[a-zA-Z ]{0,12}".prop_map(|t| (FieldKey::Fio, FieldValue::Text(t))),
            "[0-9+ ]{0,12}".prop_map(|t| (FieldKey::Phone, FieldValue::Text(t))),
            "[a-z@.]{0,12}".prop_map(|t| (FieldKey::Email, FieldValue::Text(t))),
            prop::sample::select(portal_core::chronology_years())
                .prop_map(|c| (FieldKey::Chronology, FieldValue::Code(c))),
            Just((FieldKey::LayerTheme, FieldValue::Empty)),
            Just((FieldKey::Navigation, FieldValue::File(FileBlob::new("m.png", vec![1, 2])))),
        ]
    }

    proptest! {
        #[test]
        fn stored_snapshot_tracks_current_values(edits in prop::collection::vec(edit_strategy(), 1..20)) {
            let (store, bridge, mut form) = setup();
            let _subscription = bridge.attach(&form);
            for (key, value) in edits {
                form.set_value(key, value).unwrap();
            }
            let stored = bridge.load_snapshot().unwrap().unwrap();
            prop_assert_eq!(&stored, &bridge.snapshot_of(&form.current_values()));
            prop_assert!(!stored.contains_key(&FieldKey::File));
            prop_assert!(!stored.contains_key(&FieldKey::Navigation));
            prop_assert!(store.get(FORM_DATA_KEY).unwrap().is_some());
        }

        #[test]
        fn snapshot_restores_into_fresh_form(fio in "[a-zA-Z ]{0,12}", phone in "[0-9]{0,8}") {
            let (_store, bridge, mut form) = setup();
            let _subscription = bridge.attach(&form);
            form.set_value(FieldKey::Fio, FieldValue::Text(fio)).unwrap();
            form.set_value(FieldKey::Phone, FieldValue::Text(phone)).unwrap();

            let mut restored = Form::new(Arc::new(FieldCatalog::standard()));
            bridge.restore(&mut restored);
            prop_assert_eq!(restored.current_values(), form.current_values());
        }
    }
}
