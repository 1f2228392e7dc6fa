#![forbid(unsafe_code)]

//! The validation form: one value per catalog field plus derived status.
//!
//! Every accepted mutation emits the full value map to subscribers, which
//! is how the persistence bridge keeps the stored snapshot in step.
//!
//! # Invariants
//!
//! 1. The value map holds exactly one entry per catalog key.
//! 2. A value of the wrong kind for its field is never stored.
//! 3. An oversize pick is never stored; the field keeps an `Oversize` mark
//!    until it is set again or the form is reset.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use portal_core::{FieldCatalog, FieldDescriptor, FieldKey, FieldValue, InputKind};
use portal_i18n::Translate;

use crate::reactive::{Emitter, Subscription};
use crate::validation::{FieldStatus, MaxBytes, ValidationError, check_field, field_status};

/// Field values in catalog order.
pub type FormValues = BTreeMap<FieldKey, FieldValue>;

/// Rejected form mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// The key is not part of this form's catalog.
    UnknownField(FieldKey),
    /// The value kind does not fit the field's input kind.
    KindMismatch { key: FieldKey, expected: InputKind },
    /// A select code outside the field's option list.
    UnknownOption { key: FieldKey, code: String },
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField(key) => write!(f, "unknown field: {key}"),
            Self::KindMismatch { key, expected } => {
                write!(f, "field {key} expects a {expected:?} value")
            }
            Self::UnknownOption { key, code } => {
                write!(f, "field {key} has no option {code:?}")
            }
        }
    }
}

impl std::error::Error for FormError {}

/// Mutable form state over a shared catalog.
pub struct Form {
    catalog: Arc<FieldCatalog>,
    values: FormValues,
    oversize: BTreeSet<FieldKey>,
    changes: Emitter<FormValues>,
}

impl Form {
    /// Create a form with every field at its default value.
    #[must_use]
    pub fn new(catalog: Arc<FieldCatalog>) -> Self {
        let values = Self::defaults(&catalog);
        Self {
            catalog,
            values,
            oversize: BTreeSet::new(),
            changes: Emitter::new(),
        }
    }

    fn defaults(catalog: &FieldCatalog) -> FormValues {
        catalog
            .iter()
            .map(|field| (field.key(), field.default_value()))
            .collect()
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<FieldCatalog> {
        &self.catalog
    }

    fn descriptor(&self, key: FieldKey) -> Result<&FieldDescriptor, FormError> {
        self.catalog.get(key).ok_or(FormError::UnknownField(key))
    }

    fn check_kind(descriptor: &FieldDescriptor, value: &FieldValue) -> Result<(), FormError> {
        let key = descriptor.key();
        let expected = descriptor.input_kind();
        let fits = match value {
            FieldValue::Empty => true,
            FieldValue::Text(_) => expected.is_textual(),
            FieldValue::File(_) => expected == InputKind::File,
            FieldValue::Code(code) => {
                if expected != InputKind::Select {
                    false
                } else if descriptor.option(code).is_none() {
                    return Err(FormError::UnknownOption {
                        key,
                        code: code.clone(),
                    });
                } else {
                    true
                }
            }
        };
        if fits {
            Ok(())
        } else {
            Err(FormError::KindMismatch { key, expected })
        }
    }

    /// Store without notifying. Returns the resulting status.
    fn apply(&mut self, key: FieldKey, value: FieldValue) -> Result<FieldStatus, FormError> {
        let descriptor = self.descriptor(key)?;
        Self::check_kind(descriptor, &value)?;

        if let (Some(max), FieldValue::File(blob)) = (descriptor.max_bytes(), &value)
            && blob.size() > max
        {
            tracing::debug!(
                field = %key,
                size = blob.size(),
                max,
                "picked file exceeds ceiling, clearing"
            );
            self.values.insert(key, FieldValue::Empty);
            self.oversize.insert(key);
            return Ok(FieldStatus::Oversize);
        }

        self.oversize.remove(&key);
        self.values.insert(key, value);
        Ok(self.status(key))
    }

    /// Set one field and notify subscribers.
    ///
    /// A rejected value leaves the form untouched and emits nothing.
    pub fn set_value(&mut self, key: FieldKey, value: FieldValue) -> Result<FieldStatus, FormError> {
        let status = self.apply(key, value)?;
        self.changes.emit(&self.values);
        Ok(status)
    }

    /// Apply several entries, skipping rejected ones, then notify once.
    ///
    /// Returns the number of entries applied.
    pub fn patch(&mut self, entries: impl IntoIterator<Item = (FieldKey, FieldValue)>) -> usize {
        let mut applied = 0;
        for (key, value) in entries {
            match self.apply(key, value) {
                Ok(_) => applied += 1,
                Err(error) => tracing::debug!(%error, "skipping patch entry"),
            }
        }
        if applied > 0 {
            self.changes.emit(&self.values);
        }
        applied
    }

    /// Return every field to its default and clear all marks.
    pub fn reset(&mut self) {
        self.values = Self::defaults(&self.catalog);
        self.oversize.clear();
        self.changes.emit(&self.values);
    }

    #[must_use]
    pub fn value(&self, key: FieldKey) -> Option<&FieldValue> {
        self.values.get(&key)
    }

    /// Copy of all values in catalog order.
    #[must_use]
    pub fn current_values(&self) -> FormValues {
        self.values.clone()
    }

    /// Status of one field. Unknown keys are reported valid.
    #[must_use]
    pub fn status(&self, key: FieldKey) -> FieldStatus {
        if self.oversize.contains(&key) {
            return FieldStatus::Oversize;
        }
        match (self.catalog.get(key), self.values.get(&key)) {
            (Some(descriptor), Some(value)) => field_status(descriptor, value),
            _ => FieldStatus::Valid,
        }
    }

    #[must_use]
    pub fn statuses(&self) -> BTreeMap<FieldKey, FieldStatus> {
        self.catalog
            .iter()
            .map(|field| (field.key(), self.status(field.key())))
            .collect()
    }

    /// Failing fields with their errors, in catalog order.
    #[must_use]
    pub fn errors(&self) -> Vec<(FieldKey, ValidationError)> {
        self.catalog
            .iter()
            .filter_map(|field| {
                let key = field.key();
                if self.oversize.contains(&key) {
                    let max = field.max_bytes().unwrap_or_default();
                    return Some((key, MaxBytes::new(max).error()));
                }
                let value = self.values.get(&key)?;
                check_field(field, value).error().cloned().map(|e| (key, e))
            })
            .collect()
    }

    /// Rendered error message of one field, if it fails.
    #[must_use]
    pub fn error_message(&self, key: FieldKey, translator: &dyn Translate) -> Option<String> {
        self.errors()
            .into_iter()
            .find(|(failing, _)| *failing == key)
            .map(|(_, error)| error.message(translator))
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.catalog
            .iter()
            .all(|field| self.status(field.key()).is_valid())
    }

    /// Listen to every accepted change.
    pub fn subscribe(&self, listener: impl Fn(&FormValues) + 'static) -> Subscription {
        self.changes.subscribe(listener)
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("values", &self.values)
            .field("oversize", &self.oversize)
            .field("listeners", &self.changes.listener_count())
            .finish()
    }
}
