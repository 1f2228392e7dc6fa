#![forbid(unsafe_code)]

//! String tables keyed by symbolic message keys.
//!
//! Tables are flat maps from dotted keys (`OPTIONS.FIO`) to display strings.
//! They can be loaded from nested JSON documents in the usual translation
//! file layout:
//!
//! ```json
//! { "OPTIONS": { "FIO": "Ф.И.О." }, "CLOSE": "Закрыть" }
//! ```
//!
//! Nested objects are flattened by joining keys with `.`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::builtin;
use crate::locale::{Locale, SUPPORTED_LOCALES};

/// Errors produced while loading a string table.
#[derive(Debug)]
pub enum CatalogLoadError {
    /// The document is not valid JSON.
    Json(serde_json::Error),
    /// The document root is not an object.
    NotAnObject,
    /// A leaf is neither a string nor an object.
    InvalidEntry(String),
    /// An override file exists but could not be read.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for CatalogLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "invalid string table JSON: {e}"),
            Self::NotAnObject => write!(f, "string table root must be an object"),
            Self::InvalidEntry(key) => write!(f, "string table entry {key} is not a string"),
            Self::Io { path, source } => {
                write!(f, "failed to read string table {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for CatalogLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            Self::NotAnObject | Self::InvalidEntry(_) => None,
        }
    }
}

impl From<serde_json::Error> for CatalogLoadError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Flat key → string table for one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    entries: HashMap<String, String>,
}

impl StringTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from static pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
                .collect(),
        }
    }

    /// Parse a (possibly nested) JSON translation document.
    pub fn from_json(json: &str) -> Result<Self, CatalogLoadError> {
        let root: Value = serde_json::from_str(json)?;
        let Value::Object(map) = root else {
            return Err(CatalogLoadError::NotAnObject);
        };
        let mut table = Self::new();
        for (key, value) in map {
            table.flatten_into(key, value)?;
        }
        Ok(table)
    }

    fn flatten_into(&mut self, prefix: String, value: Value) -> Result<(), CatalogLoadError> {
        match value {
            Value::String(text) => {
                self.entries.insert(prefix, text);
                Ok(())
            }
            Value::Object(map) => {
                for (key, nested) in map {
                    self.flatten_into(format!("{prefix}.{key}"), nested)?;
                }
                Ok(())
            }
            _ => Err(CatalogLoadError::InvalidEntry(prefix)),
        }
    }

    /// Insert or replace one entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Overlay another table; its entries win.
    pub fn merge(&mut self, other: StringTable) {
        self.entries.extend(other.entries);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// String tables for every supported locale.
#[derive(Debug, Clone, Default)]
pub struct StringCatalog {
    tables: HashMap<Locale, StringTable>,
}

impl StringCatalog {
    /// Empty catalog; every lookup misses.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog with the strings shipped in the crate.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        catalog.set_table(Locale::Ru, StringTable::from_pairs(builtin::RU));
        catalog.set_table(Locale::Uz, StringTable::from_pairs(builtin::UZ));
        catalog
    }

    /// Replace the table of a locale.
    pub fn set_table(&mut self, locale: Locale, table: StringTable) {
        self.tables.insert(locale, table);
    }

    /// Overlay entries onto the table of a locale.
    pub fn extend(&mut self, locale: Locale, overrides: StringTable) {
        self.tables.entry(locale).or_default().merge(overrides);
    }

    /// Overlay a JSON document onto the table of a locale.
    pub fn extend_from_json(&mut self, locale: Locale, json: &str) -> Result<(), CatalogLoadError> {
        let table = StringTable::from_json(json)?;
        tracing::debug!(locale = %locale, entries = table.len(), "loaded string table overrides");
        self.extend(locale, table);
        Ok(())
    }

    /// Overlay `<dir>/<code>.json` for every supported locale.
    ///
    /// Missing files are skipped. Returns the number of files applied.
    pub fn extend_from_dir(&mut self, dir: &Path) -> Result<usize, CatalogLoadError> {
        let mut applied = 0;
        for locale in SUPPORTED_LOCALES {
            let path = dir.join(format!("{}.json", locale.code()));
            let json = match fs::read_to_string(&path) {
                Ok(json) => json,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(CatalogLoadError::Io { path, source }),
            };
            if let Err(error) = self.extend_from_json(locale, &json) {
                tracing::warn!(path = %path.display(), %error, "rejected string table overrides");
                return Err(error);
            }
            applied += 1;
        }
        Ok(applied)
    }

    #[must_use]
    pub fn table(&self, locale: Locale) -> Option<&StringTable> {
        self.tables.get(&locale)
    }

    /// Exact lookup in one locale, without fallback.
    #[must_use]
    pub fn lookup(&self, locale: Locale, key: &str) -> Option<&str> {
        self.tables.get(&locale)?.get(key)
    }
}
