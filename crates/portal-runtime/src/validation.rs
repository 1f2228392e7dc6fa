#![forbid(unsafe_code)]

//! Field rules and per-field status.
//!
//! Rules are small [`Validator`] values. Each produces a
//! [`ValidationResult`] whose error carries a stable code and a translation
//! key, so the form never stores rendered text and messages follow the
//! active locale.

use std::fmt;

use portal_core::{AcceptedTypes, FieldDescriptor, FieldValue, FileBlob, InputKind};
use portal_i18n::Translate;

// ---------------------------------------------------------------------------
// Error Codes
// ---------------------------------------------------------------------------

/// Error code for a missing required value.
pub const ERROR_CODE_REQUIRED: &str = "required";
/// Error code for a malformed email address.
pub const ERROR_CODE_EMAIL: &str = "email";
/// Error code for a file above the byte ceiling.
pub const ERROR_CODE_OVERSIZE: &str = "oversize";
/// Error code for a file outside the accept list.
pub const ERROR_CODE_FILE_TYPE: &str = "file_type";

// ---------------------------------------------------------------------------
// ValidationError / ValidationResult
// ---------------------------------------------------------------------------

/// A failed rule: stable code, message key and interpolation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Stable error code for programmatic handling.
    pub code: &'static str,
    /// Translation key of the message template.
    pub message_key: &'static str,
    /// Parameters substituted into the template as `{name}`.
    pub params: Vec<(String, String)>,
}

impl ValidationError {
    #[must_use]
    pub fn new(code: &'static str, message_key: &'static str) -> Self {
        Self {
            code,
            message_key,
            params: Vec::new(),
        }
    }

    /// Add a parameter for message interpolation.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    /// Render the message in the translator's active locale.
    #[must_use]
    pub fn message(&self, translator: &dyn Translate) -> String {
        let params: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        translator.translate_with(self.message_key, &params)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.message_key)
    }
}

impl std::error::Error for ValidationError {}

/// The result of one rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationResult {
    #[default]
    Valid,
    Invalid(ValidationError),
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    #[must_use]
    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Valid => None,
            Self::Invalid(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Validator trait
// ---------------------------------------------------------------------------

/// A single rule over values of type `T`.
pub trait Validator<T: ?Sized> {
    fn validate(&self, value: &T) -> ValidationResult;
}

/// Value must be present. Whitespace-only text is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Validator<FieldValue> for Required {
    fn validate(&self, value: &FieldValue) -> ValidationResult {
        if value.is_present() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(ValidationError::new(
                ERROR_CODE_REQUIRED,
                "VALIDATION.REQUIRED",
            ))
        }
    }
}

/// `local@domain.tld`. Empty input is valid; pair with [`Required`] when needed.
///
/// The local part is any run of non-whitespace characters without `@`. The
/// domain needs at least two labels of `[A-Za-z0-9-]` that neither start nor
/// end with `-`, and a top-level label of two or more characters, so bare
/// hosts such as `user@localhost` are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

impl Email {
    fn is_well_formed(value: &str) -> bool {
        let Some((local, domain)) = value.split_once('@') else {
            return false;
        };
        if local.is_empty() || local.chars().any(char::is_whitespace) || domain.contains('@') {
            return false;
        }
        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 || !labels.iter().all(|label| Self::is_domain_label(label)) {
            return false;
        }
        labels.last().is_some_and(|tld| tld.len() >= 2)
    }

    fn is_domain_label(label: &str) -> bool {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
}

impl Validator<str> for Email {
    fn validate(&self, value: &str) -> ValidationResult {
        let trimmed = value.trim();
        if trimmed.is_empty() || Self::is_well_formed(trimmed) {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(ValidationError::new(ERROR_CODE_EMAIL, "VALIDATION.EMAIL"))
        }
    }
}

/// File must not exceed a byte ceiling.
#[derive(Debug, Clone, Copy)]
pub struct MaxBytes {
    pub max: u64,
}

impl MaxBytes {
    #[must_use]
    pub fn new(max: u64) -> Self {
        Self { max }
    }

    /// The error reported for a file above this ceiling.
    #[must_use]
    pub fn error(&self) -> ValidationError {
        ValidationError::new(ERROR_CODE_OVERSIZE, "VALIDATION.OVERSIZE")
            .with_param("max", self.max / 1024 / 1024)
    }
}

impl Validator<FileBlob> for MaxBytes {
    fn validate(&self, blob: &FileBlob) -> ValidationResult {
        if blob.size() > self.max {
            ValidationResult::Invalid(self.error())
        } else {
            ValidationResult::Valid
        }
    }
}

/// File name or content type must match an accept list.
#[derive(Debug, Clone)]
pub struct AcceptedFile<'a> {
    pub accepted: &'a AcceptedTypes,
}

impl Validator<FileBlob> for AcceptedFile<'_> {
    fn validate(&self, blob: &FileBlob) -> ValidationResult {
        if self.accepted.accepts(blob) {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(ValidationError::new(
                ERROR_CODE_FILE_TYPE,
                "VALIDATION.FILE_TYPE",
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// FieldStatus
// ---------------------------------------------------------------------------

/// Validation state of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FieldStatus {
    #[default]
    Valid,
    RequiredMissing,
    FormatInvalid,
    Oversize,
}

impl FieldStatus {
    #[must_use]
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }

    fn from_error(error: &ValidationError) -> Self {
        match error.code {
            ERROR_CODE_REQUIRED => Self::RequiredMissing,
            ERROR_CODE_OVERSIZE => Self::Oversize,
            _ => Self::FormatInvalid,
        }
    }
}

/// Run every rule that applies to `descriptor` against `value`.
///
/// Returns the first failure in rule order: required, then format (email
/// or accepted file types), then byte ceiling.
#[must_use]
pub fn check_field(descriptor: &FieldDescriptor, value: &FieldValue) -> ValidationResult {
    if descriptor.is_required() {
        let required = Required.validate(value);
        if !required.is_valid() {
            return required;
        }
    }

    match (descriptor.input_kind(), value) {
        (InputKind::Email, FieldValue::Text(text)) => Email.validate(text.as_str()),
        (InputKind::File, FieldValue::File(blob)) => {
            if let Some(accepted) = descriptor.accepted_types() {
                let result = AcceptedFile { accepted }.validate(blob);
                if !result.is_valid() {
                    return result;
                }
            }
            descriptor
                .max_bytes()
                .map_or(ValidationResult::Valid, |max| MaxBytes::new(max).validate(blob))
        }
        _ => ValidationResult::Valid,
    }
}

/// [`check_field`] reduced to a [`FieldStatus`].
#[must_use]
pub fn field_status(descriptor: &FieldDescriptor, value: &FieldValue) -> FieldStatus {
    check_field(descriptor, value)
        .error()
        .map_or(FieldStatus::Valid, FieldStatus::from_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::{FieldCatalog, FieldKey};
    use portal_i18n::{CatalogTranslator, Locale};
    use proptest::prelude::*;

    fn descriptor(key: FieldKey) -> FieldDescriptor {
        FieldCatalog::standard().get(key).cloned().unwrap()
    }

    #[test]
    fn email_accepts_empty_and_well_formed() {
        assert!(Email.validate("").is_valid());
        assert!(Email.validate("   ").is_valid());
        assert!(Email.validate("user@domain.tld").is_valid());
        assert!(Email.validate("a.b@mail.example.uz").is_valid());
        assert!(Email.validate("first+tag@sub-domain.uz").is_valid());
        assert!(Email.validate("  user@domain.tld  ").is_valid());
    }

    #[test]
    fn email_rejects_malformed() {
        for bad in [
            "userdomain.tld",
            "@domain.tld",
            "user@",
            "user@domain",
            "user@domain.t",
            "user@.tld",
            "user@a..uz",
            "a@b@c.uz",
            "user name@mail.uz",
            "user@-bad-.uz",
            "user@bad-.uz",
            "user@mail_box.uz",
            "user@localhost",
        ] {
            let result = Email.validate(bad);
            assert_eq!(result.error().map(|e| e.code), Some(ERROR_CODE_EMAIL), "{bad}");
        }
    }

    #[test]
    fn required_rules_follow_catalog() {
        assert_eq!(
            field_status(&descriptor(FieldKey::Fio), &FieldValue::text("  ")),
            FieldStatus::RequiredMissing
        );
        assert_eq!(
            field_status(&descriptor(FieldKey::Chronology), &FieldValue::Empty),
            FieldStatus::RequiredMissing
        );
        assert_eq!(
            field_status(&descriptor(FieldKey::Email), &FieldValue::text("")),
            FieldStatus::Valid
        );
        assert_eq!(
            field_status(&descriptor(FieldKey::Email), &FieldValue::text("nope")),
            FieldStatus::FormatInvalid
        );
    }

    #[test]
    fn file_rules() {
        let navigation = descriptor(FieldKey::Navigation);
        let ok = FieldValue::File(FileBlob::new("map.png", vec![0; 16]));
        let wrong_type = FieldValue::File(FileBlob::new("map.gif", vec![0; 16]));
        assert_eq!(field_status(&navigation, &ok), FieldStatus::Valid);
        assert_eq!(field_status(&navigation, &wrong_type), FieldStatus::FormatInvalid);

        let tiny = MaxBytes::new(8);
        assert!(tiny.validate(&FileBlob::new("a.png", vec![0; 8])).is_valid());
        assert_eq!(
            tiny.validate(&FileBlob::new("a.png", vec![0; 9])).error().map(|e| e.code),
            Some(ERROR_CODE_OVERSIZE)
        );
    }

    #[test]
    fn oversize_message_reports_megabytes() {
        let translator = CatalogTranslator::builtin(Locale::Ru);
        let message = MaxBytes::new(10 * 1024 * 1024).error().message(&translator);
        assert_eq!(message, "Размер файла не должен превышать 10 МБ");
    }

    proptest! {
        #[test]
        fn email_without_at_is_invalid(raw in "[a-z.]{1,30}") {
            prop_assert!(!Email.validate(&raw).is_valid());
        }

        #[test]
        fn simple_addresses_are_valid(local in "[a-z0-9]{1,12}", domain in "[a-z]{1,12}", tld in "[a-z]{2,6}") {
            let address = format!("{local}@{domain}.{tld}");
            prop_assert!(Email.validate(&address).is_valid());
        }
    }
}
