#![forbid(unsafe_code)]

//! Static field catalog for the submission form.
//!
//! The catalog is the ordered list of logical fields the portal collects.
//! Every other component (form, persistence, payload builder) walks the
//! catalog rather than hard-coding field names, so the catalog order is also
//! the wire order of the multipart payload.
//!
//! # Invariants
//!
//! 1. Field keys are unique across a catalog.
//! 2. A descriptor carries options iff its input kind is [`InputKind::Select`].
//! 3. A descriptor carries a byte ceiling and accepted types iff its input
//!    kind is [`InputKind::File`].
//!
//! Invariants 2 and 3 hold by construction (descriptor fields are private
//! and only the kind-specific constructors set them). Invariant 1 is checked
//! by [`FieldCatalog::new`].

use std::fmt;

use crate::value::{FieldValue, FileBlob};

/// Ceiling for the uploaded document (200 MiB).
pub const FILE_MAX_BYTES: u64 = 200 * (1 << 20);

/// Ceiling for the uploaded navigation image (10 MiB).
pub const NAVIGATION_MAX_BYTES: u64 = 10 * (1 << 20);

/// First chronology year offered.
pub const CHRONOLOGY_START: u16 = 1950;

/// Chronology years stay strictly below this bound.
pub const CHRONOLOGY_END: u16 = 1990;

/// Distance between two consecutive chronology years.
pub const CHRONOLOGY_STEP: u16 = 10;

/// Accept list of the document field, as shipped to the file picker.
pub const FILE_ACCEPT: &str = ".doc, .pdf, .png, .jpg, .xls, ai, .mpg, .mp4, .rar, jpeg";

/// Accept list of the navigation image field.
pub const NAVIGATION_ACCEPT: &str = ".png, .jpg, jpeg";

/// Layer theme option codes (also their translation keys).
pub const LAYER_THEMES: [&str; 7] = [
    "LAYER_THEME.REGION",
    "LAYER_THEME.DISTRICT",
    "LAYER_THEME.POPULATION_CENTERS",
    "LAYER_THEME.INDUSTRY",
    "LAYER_THEME.AGRICULTURE",
    "LAYER_THEME.POWERHOUSE",
    "LAYER_THEME.SCIENCE_CULTURE",
];

/// File type option codes (also their translation keys).
pub const FILE_TYPES: [&str; 8] = [
    "FILE_TYPE.IMG",
    "FILE_TYPE.TEXT",
    "FILE_TYPE.AUDIO",
    "FILE_TYPE.VIDEO",
    "FILE_TYPE.DIAGRAM",
    "FILE_TYPE.MAP_SCHEME",
    "FILE_TYPE.TABLE",
    "FILE_TYPE.LINK",
];

// ---------------------------------------------------------------------------
// FieldKey
// ---------------------------------------------------------------------------

/// Logical field identifier.
///
/// Variant order is the catalog order; `Ord` follows it so ordered maps
/// keyed by `FieldKey` iterate in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum FieldKey {
    /// Full name.
    Fio,
    /// Place of work.
    Work,
    /// Position held.
    Position,
    /// Map layer theme (select).
    LayerTheme,
    /// Decade the material belongs to (select).
    Chronology,
    /// Kind of the submitted material (select).
    FileType,
    /// The submitted document.
    File,
    /// Navigation / location image.
    Navigation,
    /// Contact phone.
    Phone,
    /// Contact email (optional).
    Email,
}

impl FieldKey {
    /// Every key in catalog order.
    pub const ALL: [FieldKey; 10] = [
        Self::Fio,
        Self::Work,
        Self::Position,
        Self::LayerTheme,
        Self::Chronology,
        Self::FileType,
        Self::File,
        Self::Navigation,
        Self::Phone,
        Self::Email,
    ];

    /// Wire name of the key (multipart part name, snapshot key).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fio => "fio",
            Self::Work => "work",
            Self::Position => "position",
            Self::LayerTheme => "layerTheme",
            Self::Chronology => "chronology",
            Self::FileType => "fileType",
            Self::File => "file",
            Self::Navigation => "navigation",
            Self::Phone => "phone",
            Self::Email => "email",
        }
    }

    /// Parse a wire name. Matching is exact.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// InputKind / SelectOption
// ---------------------------------------------------------------------------

/// How a field is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Free text.
    Text,
    /// One code out of a fixed option list.
    Select,
    /// A picked file.
    File,
    /// Phone number (free text, phone keyboard).
    Phone,
    /// Email address (free text, format checked).
    Email,
}

impl InputKind {
    /// Whether values of this kind are entered as text.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::Text | Self::Phone | Self::Email)
    }
}

/// One selectable `(code, label)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Value stored in the form.
    pub code: String,
    /// Translation key of the human-readable label.
    pub label_key: String,
}

impl SelectOption {
    /// Create an option with a distinct label key.
    #[must_use]
    pub fn new(code: impl Into<String>, label_key: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label_key: label_key.into(),
        }
    }

    /// Create an option whose code doubles as its label key.
    #[must_use]
    pub fn keyed(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            label_key: code.clone(),
            code,
        }
    }
}

// ---------------------------------------------------------------------------
// Accepted file types
// ---------------------------------------------------------------------------

/// Normalized set of accepted extensions and MIME types.
///
/// Entries are lowercase. Extensions always carry a leading dot; entries
/// containing `/` are MIME types and may end in `/*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptedTypes {
    entries: Vec<String>,
}

impl AcceptedTypes {
    /// Parse an HTML-style accept list (`".png, .jpg, jpeg"`).
    ///
    /// Bare extensions without a dot are tolerated and normalized.
    #[must_use]
    pub fn parse(accept: &str) -> Self {
        let mut entries: Vec<String> = Vec::new();
        for raw in accept.split(',') {
            let raw = raw.trim().to_ascii_lowercase();
            if raw.is_empty() {
                continue;
            }
            let entry = if raw.contains('/') || raw.starts_with('.') {
                raw
            } else {
                format!(".{raw}")
            };
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
        Self { entries }
    }

    /// Normalized entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Whether no restriction applies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check a picked file against the set.
    ///
    /// An empty set accepts everything.
    #[must_use]
    pub fn accepts(&self, blob: &FileBlob) -> bool {
        if self.entries.is_empty() {
            return true;
        }
        let name = blob.file_name().to_ascii_lowercase();
        let mime = blob.content_type().map(str::to_ascii_lowercase);
        self.entries.iter().any(|entry| {
            if let Some(prefix) = entry.strip_suffix("/*") {
                mime.as_deref()
                    .and_then(|m| m.split_once('/'))
                    .is_some_and(|(major, _)| major == prefix)
            } else if entry.contains('/') {
                mime.as_deref() == Some(entry.as_str())
            } else {
                name.ends_with(entry.as_str())
            }
        })
    }
}

impl fmt::Display for AcceptedTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.entries.join(", "))
    }
}

// ---------------------------------------------------------------------------
// FieldDescriptor
// ---------------------------------------------------------------------------

/// Immutable description of one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    key: FieldKey,
    input_kind: InputKind,
    label_key: String,
    hint_key: Option<String>,
    options: Option<Vec<SelectOption>>,
    accepted_types: Option<AcceptedTypes>,
    max_bytes: Option<u64>,
}

impl FieldDescriptor {
    fn plain(key: FieldKey, input_kind: InputKind, label_key: impl Into<String>) -> Self {
        Self {
            key,
            input_kind,
            label_key: label_key.into(),
            hint_key: None,
            options: None,
            accepted_types: None,
            max_bytes: None,
        }
    }

    /// Free text field.
    #[must_use]
    pub fn text(key: FieldKey, label_key: impl Into<String>) -> Self {
        Self::plain(key, InputKind::Text, label_key)
    }

    /// Phone field.
    #[must_use]
    pub fn phone(key: FieldKey, label_key: impl Into<String>) -> Self {
        Self::plain(key, InputKind::Phone, label_key)
    }

    /// Email field.
    #[must_use]
    pub fn email(key: FieldKey, label_key: impl Into<String>) -> Self {
        Self::plain(key, InputKind::Email, label_key)
    }

    /// Select field over the given options.
    #[must_use]
    pub fn select(key: FieldKey, label_key: impl Into<String>, options: Vec<SelectOption>) -> Self {
        let mut descriptor = Self::plain(key, InputKind::Select, label_key);
        descriptor.options = Some(options);
        descriptor
    }

    /// File field with a byte ceiling and accept list.
    #[must_use]
    pub fn file(
        key: FieldKey,
        label_key: impl Into<String>,
        max_bytes: u64,
        accepted_types: AcceptedTypes,
    ) -> Self {
        let mut descriptor = Self::plain(key, InputKind::File, label_key);
        descriptor.max_bytes = Some(max_bytes);
        descriptor.accepted_types = Some(accepted_types);
        descriptor
    }

    /// Attach a hint translation key.
    #[must_use]
    pub fn with_hint(mut self, hint_key: impl Into<String>) -> Self {
        self.hint_key = Some(hint_key.into());
        self
    }

    #[must_use]
    pub fn key(&self) -> FieldKey {
        self.key
    }

    #[must_use]
    pub fn input_kind(&self) -> InputKind {
        self.input_kind
    }

    #[must_use]
    pub fn label_key(&self) -> &str {
        &self.label_key
    }

    #[must_use]
    pub fn hint_key(&self) -> Option<&str> {
        self.hint_key.as_deref()
    }

    /// Options of a select field; `None` for every other kind.
    #[must_use]
    pub fn options(&self) -> Option<&[SelectOption]> {
        self.options.as_deref()
    }

    /// Accept list of a file field; `None` for every other kind.
    #[must_use]
    pub fn accepted_types(&self) -> Option<&AcceptedTypes> {
        self.accepted_types.as_ref()
    }

    /// Byte ceiling of a file field; `None` for every other kind.
    #[must_use]
    pub fn max_bytes(&self) -> Option<u64> {
        self.max_bytes
    }

    /// Find an option by code.
    #[must_use]
    pub fn option(&self, code: &str) -> Option<&SelectOption> {
        self.options()?.iter().find(|option| option.code == code)
    }

    /// Whether the field holds a binary blob.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.input_kind == InputKind::File
    }

    /// Whether an empty value fails validation.
    ///
    /// Every field is required except the email field.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.input_kind != InputKind::Email
    }

    /// Value the field holds on startup and after a reset.
    ///
    /// Textual fields start as an empty string, selects and files as
    /// [`FieldValue::Empty`].
    #[must_use]
    pub fn default_value(&self) -> FieldValue {
        if self.input_kind.is_textual() {
            FieldValue::Text(String::new())
        } else {
            FieldValue::Empty
        }
    }
}

// ---------------------------------------------------------------------------
// FieldCatalog
// ---------------------------------------------------------------------------

/// Errors raised while assembling a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Two descriptors share a key.
    DuplicateKey(FieldKey),
    /// A select field has no options to choose from.
    EmptyOptions(FieldKey),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateKey(key) => write!(f, "duplicate field key: {key}"),
            Self::EmptyOptions(key) => write!(f, "select field {key} has no options"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Ordered, validated list of field descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCatalog {
    fields: Vec<FieldDescriptor>,
}

impl FieldCatalog {
    /// Build a catalog, checking key uniqueness and non-empty option lists.
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self, CatalogError> {
        for (index, field) in fields.iter().enumerate() {
            if fields[..index].iter().any(|prior| prior.key == field.key) {
                return Err(CatalogError::DuplicateKey(field.key));
            }
            if field.options().is_some_and(<[SelectOption]>::is_empty) {
                return Err(CatalogError::EmptyOptions(field.key));
            }
        }
        Ok(Self { fields })
    }

    /// The portal's ten-field catalog.
    #[must_use]
    pub fn standard() -> Self {
        let keyed = |codes: &[&str]| -> Vec<SelectOption> {
            codes.iter().map(|code| SelectOption::keyed(*code)).collect()
        };
        let chronology = chronology_years()
            .into_iter()
            .map(SelectOption::keyed)
            .collect();

        Self {
            fields: vec![
                FieldDescriptor::text(FieldKey::Fio, "OPTIONS.FIO"),
                FieldDescriptor::text(FieldKey::Work, "OPTIONS.WORK").with_hint("OPTIONS.WORK_HINT"),
                FieldDescriptor::text(FieldKey::Position, "OPTIONS.POSITION")
                    .with_hint("OPTIONS.POSITION_HINT"),
                FieldDescriptor::select(
                    FieldKey::LayerTheme,
                    "OPTIONS.LAYER_THEME",
                    keyed(&LAYER_THEMES[..]),
                ),
                FieldDescriptor::select(FieldKey::Chronology, "OPTIONS.CHRONOLOGY", chronology),
                FieldDescriptor::select(FieldKey::FileType, "OPTIONS.FILE_TYPE", keyed(&FILE_TYPES[..])),
                FieldDescriptor::file(
                    FieldKey::File,
                    "OPTIONS.FILE",
                    FILE_MAX_BYTES,
                    AcceptedTypes::parse(FILE_ACCEPT),
                )
                .with_hint("OPTIONS.FILE_HINT"),
                FieldDescriptor::file(
                    FieldKey::Navigation,
                    "OPTIONS.NAVIGATION",
                    NAVIGATION_MAX_BYTES,
                    AcceptedTypes::parse(NAVIGATION_ACCEPT),
                ),
                FieldDescriptor::phone(FieldKey::Phone, "OPTIONS.PHONE"),
                FieldDescriptor::email(FieldKey::Email, "OPTIONS.EMAIL"),
            ],
        }
    }

    /// Descriptors in catalog order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Iterate descriptors in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    /// Look up a descriptor by key.
    #[must_use]
    pub fn get(&self, key: FieldKey) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Keys of the file-valued fields.
    #[must_use]
    pub fn file_keys(&self) -> Vec<FieldKey> {
        self.fields
            .iter()
            .filter(|field| field.is_file())
            .map(FieldDescriptor::key)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Decade-stepped chronology years: `1950, 1960, 1970, 1980`.
#[must_use]
pub fn chronology_years() -> Vec<String> {
    decade_years(CHRONOLOGY_START, CHRONOLOGY_END, CHRONOLOGY_STEP)
}

fn decade_years(start: u16, end: u16, step: u16) -> Vec<String> {
    (start..end)
        .step_by(usize::from(step.max(1)))
        .map(|year| year.to_string())
        .collect()
}
