#![forbid(unsafe_code)]

//! Key lookup against the active locale.

use std::cell::Cell;
use std::sync::Arc;

use crate::catalog::StringCatalog;
use crate::locale::Locale;

/// Symbolic-key translation with a switchable active locale.
///
/// This is the whole surface the portal needs from an i18n layer.
pub trait Translate {
    /// Resolve `key` in the active locale.
    ///
    /// Unknown keys resolve to the key itself.
    fn translate(&self, key: &str) -> String;

    /// Currently active locale.
    fn locale(&self) -> Locale;

    /// Switch the active locale for subsequent lookups.
    fn set_locale(&self, locale: Locale);

    /// Resolve `key` and substitute `{name}` placeholders.
    fn translate_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut text = self.translate(key);
        for (name, value) in params {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}

/// [`Translate`] backed by a [`StringCatalog`].
///
/// Lookup order: active locale, then [`Locale::DEFAULT`], then the key.
#[derive(Debug)]
pub struct CatalogTranslator {
    catalog: Arc<StringCatalog>,
    locale: Cell<Locale>,
}

impl CatalogTranslator {
    #[must_use]
    pub fn new(catalog: Arc<StringCatalog>, locale: Locale) -> Self {
        Self {
            catalog,
            locale: Cell::new(locale),
        }
    }

    /// Translator over the built-in tables.
    #[must_use]
    pub fn builtin(locale: Locale) -> Self {
        Self::new(Arc::new(StringCatalog::builtin()), locale)
    }

    #[must_use]
    pub fn catalog(&self) -> &StringCatalog {
        &self.catalog
    }
}

impl Translate for CatalogTranslator {
    fn translate(&self, key: &str) -> String {
        let locale = self.locale.get();
        if let Some(text) = self.catalog.lookup(locale, key) {
            return text.to_string();
        }
        if let Some(text) = self.catalog.lookup(Locale::DEFAULT, key) {
            tracing::trace!(key, locale = %locale, "string missing, using default locale");
            return text.to_string();
        }
        key.to_string()
    }

    fn locale(&self) -> Locale {
        self.locale.get()
    }

    fn set_locale(&self, locale: Locale) {
        self.locale.set(locale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StringTable;

    #[test]
    fn lookups_follow_active_locale() {
        let translator = CatalogTranslator::builtin(Locale::Ru);
        assert_eq!(translator.translate("CLOSE"), "Закрыть");
        translator.set_locale(Locale::Uz);
        assert_eq!(translator.translate("CLOSE"), "Yopish");
        assert_eq!(translator.locale(), Locale::Uz);
    }

    #[test]
    fn missing_key_falls_back_to_default_locale_then_key() {
        let mut catalog = StringCatalog::empty();
        catalog.set_table(Locale::Ru, StringTable::from_pairs(&[("ONLY_RU", "только")]));
        catalog.set_table(Locale::Uz, StringTable::new());
        let translator = CatalogTranslator::new(Arc::new(catalog), Locale::Uz);
        assert_eq!(translator.translate("ONLY_RU"), "только");
        assert_eq!(translator.translate("1950"), "1950");
    }

    #[test]
    fn placeholders_are_substituted() {
        let translator = CatalogTranslator::builtin(Locale::Uz);
        assert_eq!(
            translator.translate_with("VALIDATION.OVERSIZE", &[("max", "10")]),
            "Fayl hajmi 10 MB dan oshmasligi kerak"
        );
    }
}
