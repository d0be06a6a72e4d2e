//! Normalized cache keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Display form of the sentinel key.
pub const UNKNOWN_REGION: &str = "Unknown Region";

/// A normalized region/topic identifier.
///
/// `key` is the lower-cased comparison form used for every cache lookup;
/// `display` keeps the casing shown to users and fed to prompts. Build one
/// with [`normalize()`](crate::normalize::normalize) rather than by hand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentKey {
    key: String,
    display: String,
}

impl ContentKey {
    /// Build a key from a display form. The comparison key is derived from it.
    pub(crate) fn from_display(display: impl Into<String>) -> Self {
        let display = collapse_whitespace(&display.into());
        Self {
            key: display.to_lowercase(),
            display,
        }
    }

    /// The sentinel returned for empty or unparseable input.
    pub fn unknown() -> Self {
        Self::from_display(UNKNOWN_REGION)
    }

    /// Whether this is the [`unknown()`](Self::unknown) sentinel.
    pub fn is_unknown(&self) -> bool {
        self.display == UNKNOWN_REGION
    }

    /// Lower-cased comparison form.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Display-cased form.
    pub fn display(&self) -> &str {
        &self.display
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
