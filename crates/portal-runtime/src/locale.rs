#![forbid(unsafe_code)]

//! Active UI locale, persisted across restarts.
//!
//! [`LocaleSelector`] owns the current locale as an [`Observable`] so a
//! shell can re-render on change, keeps the translator in step, and writes
//! the locale code under [`LANG_KEY`] on every switch.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use portal_i18n::{Locale, Translate};

use crate::reactive::{Observable, Subscription};
use crate::storage::KeyValueStore;

/// Store key of the locale code.
pub const LANG_KEY: &str = "lang";

/// Read the persisted locale.
///
/// Missing, unreadable and unsupported codes all yield `None`.
#[must_use]
pub fn persisted_locale(store: &dyn KeyValueStore) -> Option<Locale> {
    match store.get(LANG_KEY) {
        Ok(Some(code)) => {
            let locale = Locale::parse(&code);
            if locale.is_none() {
                tracing::debug!(code = %code, "ignoring unsupported persisted locale");
            }
            locale
        }
        Ok(None) => None,
        Err(error) => {
            tracing::warn!(store = store.name(), %error, "failed to read persisted locale");
            None
        }
    }
}

/// Locale switcher bound to a translator and a store.
#[derive(Clone)]
pub struct LocaleSelector {
    store: Arc<dyn KeyValueStore>,
    translator: Rc<dyn Translate>,
    current: Observable<Locale>,
}

impl LocaleSelector {
    /// Resolve the startup locale (persisted code, else `fallback`) and
    /// apply it to the translator. Nothing is written.
    #[must_use]
    pub fn startup(
        store: Arc<dyn KeyValueStore>,
        translator: Rc<dyn Translate>,
        fallback: Locale,
    ) -> Self {
        let locale = persisted_locale(store.as_ref()).unwrap_or(fallback);
        translator.set_locale(locale);
        tracing::debug!(locale = %locale, "startup locale");
        Self {
            store,
            translator,
            current: Observable::new(locale),
        }
    }

    /// Switch the active locale and persist it.
    ///
    /// Storage failures are logged; the switch still takes effect.
    pub fn set_language(&self, locale: Locale) {
        self.translator.set_locale(locale);
        self.current.set(locale);
        if let Err(error) = self.store.set(LANG_KEY, locale.code()) {
            tracing::warn!(store = self.store.name(), %error, "failed to persist locale");
        }
    }

    /// [`set_language`](Self::set_language) from a raw code.
    ///
    /// Returns the applied locale, or `None` (and changes nothing) for an
    /// unsupported code.
    pub fn set_language_code(&self, code: &str) -> Option<Locale> {
        let locale = Locale::parse(code)?;
        self.set_language(locale);
        Some(locale)
    }

    #[must_use]
    pub fn current(&self) -> Locale {
        self.current.get()
    }

    /// Number of locale changes since startup.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.current.version()
    }

    #[must_use]
    pub fn translator(&self) -> &Rc<dyn Translate> {
        &self.translator
    }

    /// Listen to locale changes.
    pub fn subscribe(&self, callback: impl Fn(&Locale) + 'static) -> Subscription {
        self.current.subscribe(callback)
    }
}

impl fmt::Debug for LocaleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleSelector")
            .field("current", &self.current.get())
            .field("version", &self.current.version())
            .finish()
    }
}
