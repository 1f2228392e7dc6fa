#![forbid(unsafe_code)]

//! Internationalization for the submission portal.
//!
//! - [`Locale`]: the two supported UI languages.
//! - [`StringCatalog`]: per-locale string tables (built-in, overridable from JSON).
//! - [`Translate`]: `translate(key)` / `set_locale(code)` capability used by the
//!   runtime; [`CatalogTranslator`] is the catalog-backed implementation.

mod builtin;
pub mod catalog;
pub mod locale;
pub mod translator;

pub use catalog::{CatalogLoadError, StringCatalog, StringTable};
pub use locale::{Locale, SUPPORTED_LOCALES};
pub use translator::{CatalogTranslator, Translate};
