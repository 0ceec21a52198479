//! The logged entry and its serialized record.

use chrono::{DateTime, Datelike, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::duration::{self, Duration};
use crate::parse_input::{ParseOptions, parse_time_at};

/// Version of the record layout written by [`Entry::to_record`].
pub const SCHEMA_VERSION: u32 = 1;

static HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+[\w-]*").expect("valid hashtag pattern"));

/// Validation errors for entry fields.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// Errors raised when rebuilding an entry from a stored record.
#[derive(Debug, Error)]
pub enum EntryError {
    /// The record is missing fields or carries contradictory ones.
    #[error("malformed entry record: {reason}")]
    MalformedRecord { reason: String },

    #[error("entry record version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error(transparent)]
    InvalidId(#[from] ValidationError),
}

impl EntryError {
    fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            reason: reason.into(),
        }
    }
}

/// Opaque entry identifier, generated once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryId(String);

impl EntryId {
    /// Creates an ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty { field: "id" });
        }
        Ok(Self(id))
    }

    /// A fresh random ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntryId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Calendar breakdown of an instant in UTC, for timezone-stable day comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
}

impl From<DateTime<Utc>> for DayFields {
    fn from(instant: DateTime<Utc>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
            day: instant.day(),
            hour: instant.hour(),
            minute: instant.minute(),
            second: instant.second(),
            // leap seconds report 1000+ ms
            millisecond: (instant.nanosecond() / 1_000_000).min(999),
        }
    }
}

/// The serialized form of an [`Entry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    pub id: String,
    pub version: u32,
    pub user: String,
    pub message: String,
    #[serde(rename = "ref")]
    pub reference: DateTime<Utc>,
    pub has_dates: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_day_fields: Option<DayFields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_day_fields: Option<DayFields>,
    pub time_text: String,
    /// The message with the time phrase removed. Older records may lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residual: Option<String>,
    pub tags: Vec<String>,
    pub duration: Option<Duration>,
}

/// A logged piece of work: the user's text plus everything read out of it.
///
/// Entries are only ever built by [`Entry::new`] (from text) or
/// [`Entry::from_record`] (from storage) and are read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    id: EntryId,
    version: u32,
    user: String,
    message: String,
    reference: DateTime<Utc>,
    start: Option<DateTime<Utc>>,
    start_fields: Option<DayFields>,
    end: Option<DateTime<Utc>>,
    end_fields: Option<DayFields>,
    time_text: String,
    residual: String,
    duration: Option<Duration>,
    tags: BTreeSet<String>,
}

impl Entry {
    /// Builds an entry from the user's raw text.
    ///
    /// Start and end come from the time phrase; the duration is `end - start`
    /// for a range, otherwise whatever "2 hours 15 minutes"-style phrase the
    /// text states. Tags are read from the untouched message.
    ///
    /// ```
    /// # use chrono::{TimeZone, Utc};
    /// # use tick_core::{Entry, ParseOptions};
    /// let opts = ParseOptions {
    ///     reference: Some(Utc.with_ymd_and_hms(2025, 8, 15, 0, 0, 0).unwrap()),
    ///     ..Default::default()
    /// };
    /// let entry = Entry::new("sam", "1-2pm did some #stuff", Some(opts));
    ///
    /// assert!(entry.has_dates());
    /// assert_eq!(entry.residual_message(), "did some #stuff");
    /// assert_eq!(entry.duration().unwrap().seconds, 3600);
    /// assert!(entry.tags().contains("#stuff"));
    /// ```
    pub fn new(
        user: impl Into<String>,
        message: impl Into<String>,
        options: Option<ParseOptions>,
    ) -> Self {
        let message = message.into();
        let options = options.unwrap_or_default();
        let implicit_reference = options.reference.is_none();
        let reference = options.reference.unwrap_or_else(Utc::now);

        let parsed = parse_time_at(&message, &options, reference, implicit_reference);
        let (duration, residual) = match (parsed.start, parsed.end) {
            (Some(start), Some(end)) => (Some(Duration::between(start, end)), parsed.message),
            _ => {
                let stated = duration::extract(&message).duration;
                if stated.is_zero() {
                    (None, parsed.message)
                } else {
                    (Some(stated), duration::strip(&parsed.message))
                }
            }
        };

        let entry = Self {
            id: EntryId::generate(),
            version: SCHEMA_VERSION,
            user: user.into(),
            tags: extract_tags(&message),
            reference,
            start: parsed.start,
            start_fields: parsed.start.map(DayFields::from),
            end: parsed.end,
            end_fields: parsed.end.map(DayFields::from),
            time_text: parsed.text,
            residual,
            duration,
            message,
        };
        debug!(id = %entry.id, has_dates = entry.has_dates(), "entry created");
        entry
    }

    /// Rebuilds an entry from a stored record.
    ///
    /// The stored fields are authoritative: nothing is re-parsed, so the entry
    /// comes back exactly as it was written even if the parsing rules changed
    /// in between.
    pub fn from_record(record: EntryRecord) -> Result<Self, EntryError> {
        if record.version > SCHEMA_VERSION {
            return Err(EntryError::UnsupportedVersion {
                found: record.version,
                supported: SCHEMA_VERSION,
            });
        }
        if record.has_dates != record.start.is_some() {
            return Err(EntryError::malformed(
                "hasDates does not agree with the presence of start",
            ));
        }
        if record.start.is_some() != record.start_day_fields.is_some() {
            return Err(EntryError::malformed(
                "start and startDayFields must be stored together",
            ));
        }
        if record.end.is_some() != record.end_day_fields.is_some() {
            return Err(EntryError::malformed(
                "end and endDayFields must be stored together",
            ));
        }
        if record.end.is_some() && record.start.is_none() {
            return Err(EntryError::malformed("end is stored without a start"));
        }

        let residual = record
            .residual
            .unwrap_or_else(|| fallback_residual(&record.message, &record.time_text));

        Ok(Self {
            id: EntryId::new(record.id)?,
            version: record.version,
            user: record.user,
            message: record.message,
            reference: record.reference,
            start: record.start,
            start_fields: record.start_day_fields,
            end: record.end,
            end_fields: record.end_day_fields,
            time_text: record.time_text,
            residual,
            duration: record.duration,
            tags: record.tags.into_iter().collect(),
        })
    }

    pub fn to_record(&self) -> EntryRecord {
        EntryRecord {
            id: self.id.to_string(),
            version: self.version,
            user: self.user.clone(),
            message: self.message.clone(),
            reference: self.reference,
            has_dates: self.has_dates(),
            start: self.start,
            start_day_fields: self.start_fields,
            end: self.end,
            end_day_fields: self.end_fields,
            time_text: self.time_text.clone(),
            residual: Some(self.residual.clone()),
            tags: self.tags.iter().cloned().collect(),
            duration: self.duration,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_record())
    }

    /// Parses a JSON record; missing or mistyped fields are a `MalformedRecord`.
    pub fn from_json(json: &str) -> Result<Self, EntryError> {
        let record: EntryRecord =
            serde_json::from_str(json).map_err(|e| EntryError::malformed(e.to_string()))?;
        Self::from_record(record)
    }

    pub fn id(&self) -> &EntryId {
        &self.id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// The text exactly as the user typed it.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The message without its time phrase (or, when no time was given, without
    /// its duration phrase). Hashtags stay in.
    pub fn residual_message(&self) -> &str {
        &self.residual
    }

    pub fn reference(&self) -> DateTime<Utc> {
        self.reference
    }

    pub fn has_dates(&self) -> bool {
        self.start.is_some()
    }

    pub fn is_range(&self) -> bool {
        self.end.is_some()
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    pub fn start_fields(&self) -> Option<DayFields> {
        self.start_fields
    }

    pub fn end_fields(&self) -> Option<DayFields> {
        self.end_fields
    }

    pub fn time_text(&self) -> &str {
        &self.time_text
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }
}

/// Hashtags in `text` (`#client`, `#on-call`), duplicates collapsed.
pub fn extract_tags(text: &str) -> BTreeSet<String> {
    HASHTAG
        .find_iter(text)
        .map(|tag| tag.as_str().to_string())
        .collect()
}

fn fallback_residual(message: &str, time_text: &str) -> String {
    if time_text.is_empty() {
        return message.to_string();
    }
    match message.find(time_text) {
        Some(start) => {
            crate::parse_input::remove_spans(message, &[start..start + time_text.len()])
        }
        None => message.to_string(),
    }
}
