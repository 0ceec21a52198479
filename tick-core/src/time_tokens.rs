//! Time-of-day recognition.
//!
//! Recognizers are plain functions tried in a fixed order; the first one that
//! finds something wins and the rest are not consulted:
//!
//! 1. military ranges, `0800-1330` (see [`crate::military`])
//! 2. spelled ranges, `8am-10am`, `1-3pm`, `9:15am to 2:30pm`
//! 3. a single spelled time, `12pm`, `9:30`, `noon`
//!
//! A military range always beats a spelled range found anywhere else in the
//! same text. The two patterns cannot match the same substring: a spelled hour
//! has one or two digits, a military group three or four.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::Range;
use tracing::{debug, trace};

use crate::meridiem::{ClockTime, Meridiem};
use crate::military;

static SPELLED_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})(?::(\d{2}))?(?:\s*(am|pm))?\s*(?:-|–|\bto\b|\buntil\b|\btill\b)\s*(\d{1,2})(?::(\d{2}))?(?:\s*(am|pm))?\b",
    )
    .expect("valid spelled range pattern")
});

static SINGLE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:(\d{1,2})(?::(\d{2}))?\s*(am|pm)|(\d{1,2}):(\d{2})|(noon|midnight))\b")
        .expect("valid single time pattern")
});

/// "1:30 hours" is a duration, not a time of day.
static DURATION_UNIT_AHEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(hours|hour|hrs|hr|h)\b").expect("valid unit pattern"));

/// A time expression as found in the text, before any inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    /// The matched text, as written by the user.
    pub text: String,
    /// Byte offset of `text` within the input.
    pub index: usize,
    pub start: ClockTime,
    /// `None` when the text names a single instant.
    pub end: Option<ClockTime>,
}

impl RawMatch {
    pub fn is_range(&self) -> bool {
        self.end.is_some()
    }

    pub fn span(&self) -> Range<usize> {
        self.index..self.index + self.text.len()
    }
}

type Recognizer = fn(&str) -> Option<RawMatch>;

const RECOGNIZERS: &[(&str, Recognizer)] = &[
    ("military range", military::recognize),
    ("spelled range", spelled_range),
    ("single time", single_time),
];

/// Finds the time expression in `text`, if any.
///
/// ```
/// # use tick_core::time_tokens::extract;
/// let raw = extract("1-3pm did some things").unwrap();
/// assert_eq!(raw.text, "1-3pm");
/// assert!(raw.is_range());
/// ```
pub fn extract(text: &str) -> Option<RawMatch> {
    RECOGNIZERS.iter().find_map(|(name, recognize)| {
        let raw = recognize(text)?;
        debug!(recognizer = *name, text = %raw.text, index = raw.index, "time phrase recognized");
        Some(raw)
    })
}

fn spelled_range(text: &str) -> Option<RawMatch> {
    SPELLED_RANGE.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let has_meridiem = caps.get(3).is_some() || caps.get(6).is_some();
        let has_colon = caps.get(2).is_some() || caps.get(5).is_some();
        // "2-3 bugs" is not a time
        if !has_meridiem && !has_colon {
            trace!(candidate = whole.as_str(), "range without meridiem or minutes");
            return None;
        }
        let start = clock_from(&caps, 1, 2, 3);
        let end = clock_from(&caps, 4, 5, 6);
        if start.is_none() || end.is_none() {
            trace!(candidate = whole.as_str(), "rejected spelled range");
        }
        Some(RawMatch {
            text: whole.as_str().to_string(),
            index: whole.start(),
            start: start?,
            end: Some(end?),
        })
    })
}

fn single_time(text: &str) -> Option<RawMatch> {
    SINGLE_TIME.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let start = if let Some(word) = caps.get(6) {
            if word.as_str().eq_ignore_ascii_case("noon") {
                ClockTime::from_24h(12, 0)?
            } else {
                ClockTime::from_24h(0, 0)?
            }
        } else if caps.get(3).is_some() {
            clock_from(&caps, 1, 2, 3)?
        } else {
            if DURATION_UNIT_AHEAD.is_match(&text[whole.end()..]) {
                return None;
            }
            clock_from(&caps, 4, 5, 0)?
        };
        Some(RawMatch {
            text: whole.as_str().to_string(),
            index: whole.start(),
            start,
            end: None,
        })
    })
}

/// Builds one side of a time from capture groups; group 0 means "no meridiem group".
fn clock_from(caps: &Captures, hour: usize, minute: usize, meridiem: usize) -> Option<ClockTime> {
    let h: u32 = caps.get(hour)?.as_str().parse().ok()?;
    let m: u32 = match caps.get(minute) {
        Some(group) => group.as_str().parse().ok()?,
        None => 0,
    };
    let meridiem = if meridiem == 0 {
        None
    } else {
        caps.get(meridiem).and_then(|g| Meridiem::parse(g.as_str()))
    };
    ClockTime::from_written(h, m, meridiem)
}
