//! Identity and timestamp behavior shared by all script records.
//!
//! # Invariants
//! - `id` is assigned once at construction and never reassigned.
//! - `updated_at` never moves backwards and is bumped on every mutation.
//! - Timestamps read from external data fall back to "now" when they cannot
//!   be parsed; a bad date is never an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use uuid::Uuid;

const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Opaque record identifier.
///
/// Generated ids are UUID v4 strings; imported ids are kept verbatim.
pub type EntityId = String;

/// Generates a fresh unique entity id.
pub fn generate_id() -> EntityId {
    Uuid::new_v4().to_string()
}

/// Creation and last-modification instants of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    /// Both instants set to the current time.
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds timestamps from optional ISO-8601 strings.
    ///
    /// Missing or unparsable values are replaced by the current time.
    pub fn from_wire(created_at: Option<&str>, updated_at: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            created_at: created_at.and_then(parse_timestamp).unwrap_or(now),
            updated_at: updated_at.and_then(parse_timestamp).unwrap_or(now),
        }
    }

    /// Marks the record as modified.
    pub fn touch(&mut self) {
        let now = Utc::now();
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

/// Common accessors for records stored in an ordered collection.
pub trait Entity {
    fn id(&self) -> &str;
    fn timestamps(&self) -> &Timestamps;

    fn created_at(&self) -> DateTime<Utc> {
        self.timestamps().created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.timestamps().updated_at
    }
}

/// Parses an ISO-8601 timestamp, returning `None` on failure.
///
/// Values without an offset are read as UTC; a bare date is midnight UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Formats an instant as ISO-8601 with millisecond precision and `Z` suffix.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}
