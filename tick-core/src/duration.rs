//! Elapsed-time phrases ("2 hours 15 minutes", "1.5h", "1:30 hours").

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

static HOURS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d*\.?\d+)\s*(hours|hour|hrs|hr|h)\b").expect("valid hours pattern")
});

static MINUTES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d*\.?\d+)\s*(minutes|minute|mins|min|m)\b").expect("valid minutes pattern")
});

static HOURS_COLON_MINUTES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d*):(\d+)\s*(hours|hour|hrs|hr|h)\b").expect("valid h:mm pattern")
});

/// A non-negative span of time, in whole seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Duration {
    pub seconds: u64,
}

impl Duration {
    pub fn from_seconds(seconds: u64) -> Self {
        Self { seconds }
    }

    /// Time from `start` to `end`; zero if `end` is not after `start`.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let seconds = (end - start).num_seconds();
        Self {
            seconds: u64::try_from(seconds).unwrap_or(0),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.seconds == 0
    }

    pub fn hours(&self) -> u64 {
        self.seconds / 3600
    }

    /// Minutes past the whole hours.
    pub fn minutes(&self) -> u64 {
        self.seconds % 3600 / 60
    }
}

/// A duration found in text, with the spans it was read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DurationMatch {
    pub duration: Duration,
    pub spans: Vec<Range<usize>>,
}

/// Reads the stated duration out of `text`.
///
/// An `H:MM hours` phrase takes precedence over separate hour and minute
/// phrases. Text without any unit phrase yields a zero duration; that only
/// means nothing was stated.
///
/// ```
/// # use tick_core::duration::extract;
/// assert_eq!(extract("2 hours 15 minutes").duration.seconds, 8100);
/// assert_eq!(extract("1.5 hours").duration.seconds, 5400);
/// assert_eq!(extract("did some #stuff").duration.seconds, 0);
/// ```
pub fn extract(text: &str) -> DurationMatch {
    if let Some(caps) = HOURS_COLON_MINUTES.captures(text) {
        let hours: u64 = caps
            .get(1)
            .and_then(|h| h.as_str().parse().ok())
            .unwrap_or(0);
        let minutes: u64 = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        let seconds = hours
            .checked_mul(3600)
            .and_then(|h| minutes.checked_mul(60)?.checked_add(h));
        // an unrepresentable count states nothing
        let Some(seconds) = seconds else {
            return DurationMatch::default();
        };
        let spans = caps.get(0).map(|m| vec![m.range()]).unwrap_or_default();
        return DurationMatch {
            duration: Duration::from_seconds(seconds),
            spans,
        };
    }

    let mut seconds = 0.0;
    let mut spans = Vec::new();
    for (pattern, unit_seconds) in [(&*HOURS, 3600.0), (&*MINUTES, 60.0)] {
        if let Some(caps) = pattern.captures(text) {
            let count: f64 = caps
                .get(1)
                .and_then(|n| n.as_str().parse().ok())
                .unwrap_or(0.0);
            seconds += count * unit_seconds;
            spans.extend(caps.get(0).map(|m| m.range()));
        }
    }
    spans.sort_by_key(|span| span.start);

    DurationMatch {
        duration: Duration::from_seconds(seconds.round() as u64),
        spans,
    }
}

/// `text` with the duration phrases removed.
pub fn strip(text: &str) -> String {
    let found = extract(text);
    crate::parse_input::remove_spans(text, &found.spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn seconds(text: &str) -> u64 {
        extract(text).duration.seconds
    }

    #[test]
    fn hours_and_minutes() {
        assert_eq!(seconds("2 hours 15 minutes"), 8100);
        assert_eq!(seconds("2h 15m"), 8100);
        assert_eq!(seconds("45 mins of review"), 2700);
        assert_eq!(seconds("3 HRS"), 10800);
    }

    #[test]
    fn decimal_counts() {
        assert_eq!(seconds("1.5 hours"), 5400);
        assert_eq!(seconds(".5h"), 1800);
        assert_eq!(seconds("1.5 min"), 90);
    }

    #[test]
    fn colon_form_takes_precedence() {
        assert_eq!(seconds("1:30 hours"), 5400);
        assert_eq!(seconds("2:05h and 10 minutes"), 7500);
    }

    #[test]
    fn no_unit_phrase_is_zero() {
        assert_eq!(seconds("did some #stuff"), 0);
        assert_eq!(seconds("8am-10am"), 0);
        assert_eq!(seconds("meeting at 9pm"), 0);
        assert_eq!(seconds(""), 0);
        assert!(extract("did some #stuff").duration.is_zero());
        assert!(extract("did some #stuff").spans.is_empty());
    }

    #[test]
    fn huge_counts_do_not_overflow() {
        let found = extract("logged 10000000000000000:00 hours");
        assert!(found.duration.is_zero());
        assert!(found.spans.is_empty());
        assert_eq!(strip("logged 10000000000000000:00 hours"), "logged 10000000000000000:00 hours");
        // decimal counts saturate instead
        assert_eq!(seconds("99999999999999999999999 hours"), u64::MAX);
    }

    #[test]
    fn spans_point_at_phrases() {
        let found = extract("review 2 hours then 15 minutes docs");
        assert_eq!(found.spans, vec![7..14, 20..30]);
    }

    #[test]
    fn strip_removes_phrases() {
        assert_eq!(strip("2 hours 15 minutes writing #docs"), "writing #docs");
        assert_eq!(strip("writing docs for 1:30 hours"), "writing docs for");
        assert_eq!(strip("nothing to strip"), "nothing to strip");
    }

    #[test]
    fn between_clamps_at_zero() {
        let start = Utc.with_ymd_and_hms(2025, 8, 15, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 8, 15, 11, 15, 0).unwrap();
        assert_eq!(Duration::between(start, end).seconds, 8100);
        assert_eq!(Duration::between(end, start).seconds, 0);

        let d = Duration::between(start, end);
        assert_eq!((d.hours(), d.minutes()), (2, 15));
    }
}
