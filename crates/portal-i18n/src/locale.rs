#![forbid(unsafe_code)]

//! Supported UI locales.

use std::fmt;

/// A UI language the portal ships strings for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Locale {
    /// Russian (fallback on first run).
    #[default]
    Ru,
    /// Uzbek.
    Uz,
}

/// Supported locales in switcher order.
pub const SUPPORTED_LOCALES: [Locale; 2] = [Locale::Ru, Locale::Uz];

impl Locale {
    /// Fallback used when nothing valid is persisted.
    pub const DEFAULT: Locale = Locale::Ru;

    /// Two-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Ru => "ru",
            Self::Uz => "uz",
        }
    }

    /// Name shown in the language switcher, in the language itself.
    #[must_use]
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::Ru => "Русский",
            Self::Uz => "O\u{2019}zbekcha",
        }
    }

    /// Parse a locale code.
    ///
    /// Tolerates surrounding whitespace, case, region tags and POSIX
    /// codeset/modifier suffixes (`uz_UZ.UTF-8@latin`). Returns `None` for
    /// anything that is not a supported language.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let raw = raw.split('@').next().unwrap_or(raw);
        let raw = raw.split('.').next().unwrap_or(raw);
        let primary = raw.split(['-', '_']).next().unwrap_or(raw).trim();
        if primary.eq_ignore_ascii_case("ru") {
            Some(Self::Ru)
        } else if primary.eq_ignore_ascii_case("uz") {
            Some(Self::Uz)
        } else {
            None
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
