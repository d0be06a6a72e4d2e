//! Location label normalization.
//!
//! Turns free-text location strings ("10 Downing Street, Westminster,
//! London, UK", "Frankfurt am Main", "75001 Paris, France") into a stable
//! [`ContentKey`] so that the same place maps to the same cache entry.
//!
//! The rules are best-effort and biased towards false negatives: two labels
//! for one place may still produce different keys, but two different places
//! should never share one. A key is therefore a place plus at most one
//! qualifier (`"Rome, GA"`, `"Frankfurt, Oder"`, `"Shibuya, Tokyo"`).
//! Countries never qualify, so `"Rome, Italy"` is `"Rome"`.
//!
//! # Algorithm
//!
//! 1. Split on commas, semicolons, pipes and spaced or typographic dashes.
//!    Hyphens inside names (`Aix-en-Provence`) are not separators.
//! 2. Drop postal codes, numeric-only segments and street lines. A US state
//!    code, alone or with a ZIP, becomes the qualifier. `USA` and its
//!    aliases only mark the label as American.
//! 3. Strip parenthesised notes. A locative suffix (`am Main`,
//!    `an der Oder`, `upon Thames`, ...) is cut from the name and its object
//!    kept for the qualifier.
//! 4. The primary is the first segment that is not a country, falling back
//!    to the first segment. Two-letter tokens such as `Ay` only count when
//!    nothing longer precedes them.
//! 5. The qualifier is the state code, else the primary's locative object,
//!    else the next non-country segment. A US state name there is written
//!    as its code (`Georgia` is `GA` in an American label).
//!
//! Normalization never fails. Blank input yields [`ContentKey::unknown()`];
//! input where every segment is discarded is kept as-is.

mod places;

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{ContentKey, collapse_whitespace};

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:[,;|\x{2013}\x{2014}]|\s-\s)\s*").expect("valid regex"));

static PARENTHESISED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)|\[[^\]]*\]").expect("valid regex"));

static POSTAL_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:",
        r"[\d\s-]+",                        // numeric only, incl. ZIP+4
        r"|[A-Z]{1,2}\d[A-Z\d]?\s*\d[A-Z]{2}", // UK
        r"|[A-Z]\d[A-Z]\s?\d[A-Z]\d",       // Canada
        r"|\d{4}\s?[A-Z]{2}",               // Netherlands
        r")$"
    ))
    .expect("valid regex")
});

static STATE_WITH_ZIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]{2})\s+\d{5}(?:-\d{4})?$").expect("valid regex"));

static TWO_LETTER_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2}$").expect("valid regex"));

static LEADING_POSTAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4,6}\s+").expect("valid regex"));

static TRAILING_POSTAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\d{4,6}$").expect("valid regex"));

static HOUSE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}[A-Za-z]?(?:[-/]\d+)?\s").expect("valid regex"));

static STREET_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:street|st\.|road|rd\.|avenue|ave\.|boulevard|blvd|lane|drive|straße|strasse|str\.|rue|via|calle|platz)(?:\b|$)",
    )
    .expect("valid regex")
});

static LOCATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(?:am|an der|on the|upon|on|sur)\s+(\S.*)$").expect("valid regex")
});

/// A surviving segment of a label.
enum Part {
    Place {
        name: String,
        /// Object of a stripped locative suffix: `Main` in `Frankfurt am Main`.
        locative: Option<String>,
    },
    /// A two-letter token that is not a US state code.
    Short(String),
}

impl Part {
    fn name(&self) -> &str {
        match self {
            Part::Place { name, .. } | Part::Short(name) => name,
        }
    }
}

/// Canonicalize a raw location label into a cache key.
pub fn normalize(raw: &str) -> ContentKey {
    let trimmed = raw.trim();
    if !trimmed.chars().any(char::is_alphanumeric) {
        return ContentKey::unknown();
    }

    let mut parts: Vec<Part> = Vec::new();
    let mut state_code: Option<String> = None;
    let mut in_us = false;

    for segment in SEPARATOR.split(trimmed) {
        let segment = collapse_whitespace(&PARENTHESISED.replace_all(segment, " "));
        if segment.is_empty() {
            continue;
        }
        if places::is_us_alias(&segment) {
            in_us = true;
            continue;
        }

        if let Some(caps) = STATE_WITH_ZIP.captures(&segment) {
            note_state_code(&caps[1], &mut state_code);
            continue;
        }
        if TWO_LETTER_CODE.is_match(&segment) {
            if !note_state_code(&segment, &mut state_code) {
                parts.push(Part::Short(segment));
            }
            continue;
        }
        if POSTAL_CODE.is_match(&segment) || is_street_line(&segment) {
            continue;
        }

        let segment = LEADING_POSTAL.replace(&segment, "");
        let segment = TRAILING_POSTAL.replace(&segment, "");
        let (name, locative) = split_locative(&segment);
        if !name.chars().any(char::is_alphabetic) {
            continue;
        }
        if places::is_us_alias(&name) {
            in_us = true;
        } else {
            parts.push(Part::Place { name, locative });
        }
    }

    let primary = parts
        .iter()
        .position(|part| !is_country(part.name()))
        .or_else(|| (!parts.is_empty()).then_some(0));
    let Some(index) = primary else {
        return ContentKey::from_display(trimmed);
    };

    let qualifier = state_code
        .or_else(|| match &parts[index] {
            Part::Place {
                locative: Some(object),
                ..
            } => Some(display_case(object)),
            _ => None,
        })
        .or_else(|| {
            parts.iter().skip(index + 1).find_map(|part| match part {
                Part::Place { name, .. } if !is_country(name) => Some(region_qualifier(name, in_us)),
                _ => None,
            })
        });

    let primary = display_case(parts[index].name());
    let display = match qualifier {
        Some(qualifier) => format!("{primary}, {qualifier}"),
        None => primary,
    };
    ContentKey::from_display(display)
}

/// Record a US state code as the qualifier. Returns whether `code` is one.
fn note_state_code(code: &str, qualifier: &mut Option<String>) -> bool {
    if !places::is_us_state_code(code) {
        return false;
    }
    if qualifier.is_none() {
        *qualifier = Some(code.to_ascii_uppercase());
    }
    true
}

fn is_street_line(segment: &str) -> bool {
    HOUSE_NUMBER.is_match(segment)
        || (segment.chars().any(|c| c.is_ascii_digit()) && STREET_WORD.is_match(segment))
}

fn split_locative(segment: &str) -> (String, Option<String>) {
    let found = LOCATIVE
        .captures(segment)
        .and_then(|caps| Some((caps.get(0)?.start(), caps.get(1)?.as_str())));
    match found {
        Some((start, object)) => (
            collapse_whitespace(&segment[..start]),
            Some(collapse_whitespace(object)),
        ),
        None => (collapse_whitespace(segment), None),
    }
}

/// A country that is not also a US state name.
fn is_country(name: &str) -> bool {
    places::is_country_name(name) && places::us_state_code(name).is_none()
}

/// `Georgia` is `GA` in an American label and stays `Georgia` otherwise.
fn region_qualifier(name: &str, in_us: bool) -> String {
    match places::us_state_code(name) {
        Some(code) if in_us || !places::is_country_name(name) => code.to_string(),
        _ => display_case(name),
    }
}

/// Title-case labels typed entirely in lower case; keep any other casing.
fn display_case(segment: &str) -> String {
    if segment.chars().any(char::is_uppercase) {
        return segment.to_string();
    }
    segment
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
