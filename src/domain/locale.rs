// ============================================================================
// Number Format Conventions
// Decimal and grouping separators for the supported locales
// ============================================================================

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The sign character. Identical in every convention.
pub const MINUS: char = '-';

/// Language prefixes that write numbers as `1,234.5`.
const EN_LANGUAGES: [&str; 6] = ["ar", "en", "iw", "ja", "ko", "zh"];

/// Language prefixes that write numbers as `1.234,5`.
const ES_LANGUAGES: [&str; 12] = [
    "da", "de", "el", "es", "fr", "it", "nl", "pt", "ru", "sl", "sv", "tr",
];

/// Separator convention used to read and display numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NumberFormat {
    /// `1 234.5` - dot decimal, space grouping
    #[default]
    Iso,
    /// `1,234.5` - dot decimal, comma grouping
    En,
    /// `1.234,5` - comma decimal, dot grouping
    Es,
}

/// The two separator characters of a [`NumberFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Separators {
    pub decimal: char,
    pub grouping: char,
}

impl NumberFormat {
    pub const fn separators(self) -> Separators {
        match self {
            NumberFormat::Iso => Separators {
                decimal: '.',
                grouping: ' ',
            },
            NumberFormat::En => Separators {
                decimal: '.',
                grouping: ',',
            },
            NumberFormat::Es => Separators {
                decimal: ',',
                grouping: '.',
            },
        }
    }

    /// Pick the convention for a language tag such as `de-AT` or `en`.
    ///
    /// Unknown languages fall back to ISO.
    pub fn from_language(tag: &str) -> Self {
        let tag = tag.trim().to_ascii_lowercase();
        if EN_LANGUAGES.iter().any(|code| tag.starts_with(code)) {
            NumberFormat::En
        } else if ES_LANGUAGES.iter().any(|code| tag.starts_with(code)) {
            NumberFormat::Es
        } else {
            NumberFormat::Iso
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            NumberFormat::Iso => "ISO",
            NumberFormat::En => "EN",
            NumberFormat::Es => "ES",
        }
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a format code is not one of `ISO`, `EN`, `ES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNumberFormat(pub String);

impl fmt::Display for UnknownNumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown number format {:?}: expected ISO, EN or ES",
            self.0
        )
    }
}

impl std::error::Error for UnknownNumberFormat {}

impl FromStr for NumberFormat {
    type Err = UnknownNumberFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ISO" => Ok(NumberFormat::Iso),
            "EN" => Ok(NumberFormat::En),
            "ES" => Ok(NumberFormat::Es),
            _ => Err(UnknownNumberFormat(s.to_string())),
        }
    }
}

impl Separators {
    #[inline]
    pub fn is_decimal(&self, c: char) -> bool {
        c == self.decimal
    }

    #[inline]
    pub fn is_grouping(&self, c: char) -> bool {
        c == self.grouping
    }
}

impl Default for Separators {
    fn default() -> Self {
        NumberFormat::default().separators()
    }
}
