//! Log retention labels and inverted logging flags
//!
//! The API stores retention as a number of seconds while the declarative
//! schema speaks in a closed set of labels. Earlier schema revisions took
//! the raw number, so [`Retention`] accepts both shapes.

use serde::{Deserialize, Serialize};

const HOUR: u32 = 60 * 60;
const DAY: u32 = 24 * HOUR;

/// Canonical retention labels and their length in seconds
///
/// Months are 30 days and years 365 days.
pub const RETENTION_TABLE: [(&str, u32); 9] = [
    ("1 hour", HOUR),
    ("6 hours", 6 * HOUR),
    ("1 day", DAY),
    ("1 week", 7 * DAY),
    ("1 month", 30 * DAY),
    ("3 months", 90 * DAY),
    ("6 months", 180 * DAY),
    ("1 year", 365 * DAY),
    ("2 years", 2 * 365 * DAY),
];

/// Seconds for a retention label, `0` when the label is not canonical
///
/// `0` means "no retention configured"; callers must not treat it as a
/// failure.
pub fn label_to_seconds(label: &str) -> u32 {
    RETENTION_TABLE
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, secs)| *secs)
        .unwrap_or(0)
}

/// Label for a number of seconds, empty when it has no canonical label
pub fn seconds_to_label(seconds: u32) -> &'static str {
    RETENTION_TABLE
        .iter()
        .find(|(_, secs)| *secs == seconds)
        .map(|(label, _)| *label)
        .unwrap_or("")
}

/// The API's `drop.ip`/`drop.domain` are the negation of the user-facing
/// `log_clients_ip`/`log_domains` toggles. Applied on both read and write.
pub fn invert(value: bool) -> bool {
    !value
}

/// Retention as written in the declarative state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Retention {
    /// One of the labels in [`RETENTION_TABLE`]
    Label(String),
    /// Raw number of seconds (earlier schema)
    Seconds(u32),
}

impl Retention {
    /// Seconds to send to the API
    pub fn to_seconds(&self) -> u32 {
        match self {
            Retention::Label(label) => label_to_seconds(label),
            Retention::Seconds(secs) => *secs,
        }
    }

    /// Translate a value read from the API, keeping the caller's shape
    ///
    /// A label is only produced when `prefer_label` is set and the value is
    /// canonical. A non-canonical value falls back to raw seconds so the
    /// drift stays visible instead of collapsing to an empty label.
    pub fn from_seconds(seconds: u32, prefer_label: bool) -> Self {
        let label = seconds_to_label(seconds);
        if prefer_label && !label.is_empty() {
            Retention::Label(label.to_string())
        } else {
            Retention::Seconds(seconds)
        }
    }

    /// Whether this is the label shape
    pub fn is_label(&self) -> bool {
        matches!(self, Retention::Label(_))
    }
}

impl Default for Retention {
    fn default() -> Self {
        Retention::Label(String::new())
    }
}
