use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use tracing::debug;

use crate::dates::{DEFAULT_FORMATS, DatePhraseRecognizer, KeywordDates};
use crate::keywords::Keywords;
use crate::meridiem;
use crate::rollover::{self, ResolvedRange, SameClockPolicy};
use crate::time_tokens;

/// What may sit between a time phrase and a date phrase for the two to read as
/// one expression ("9am-5pm on friday", "friday, 9am-5pm").
static JOINER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[\s,]*(?:\bon\b)?[\s,]*$").expect("valid joiner pattern"));

/// Configuration options for [`parse_time`].
#[derive(Copy, Clone, Debug, Default)]
pub struct ParseOptions<'a> {
    /// The instant relative phrases are resolved against. Defaults to now.
    pub reference: Option<DateTime<Utc>>,
    /// The user's offset from UTC; clock times are read in this offset.
    /// Defaults to UTC.
    pub offset: Option<FixedOffset>,
    /// How `9am-9am` is read.
    pub same_clock: SameClockPolicy,
    /// Keyword registry for date phrases. Defaults to [`Keywords::builtin`].
    pub keywords: Option<&'a Keywords>,
    /// A slice of `chrono` format strings to try for dates.
    pub formats: Option<&'a [&'a str]>,
}

/// The outcome of reading a time expression out of free text.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedTime {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// The recognized time (and date) text, or `""`.
    pub text: String,
    /// The input with `text` removed.
    pub message: String,
}

impl ParsedTime {
    fn untouched(input: &str) -> Self {
        Self {
            start: None,
            end: None,
            text: String::new(),
            message: input.to_string(),
        }
    }

    pub fn has_dates(&self) -> bool {
        self.start.is_some()
    }

    pub fn is_range(&self) -> bool {
        self.end.is_some()
    }
}

/// Reads a start/end pair out of free text such as `"1-3pm did some #stuff"`.
///
/// The work is split between a date phrase (which day) and a time phrase
/// (which clock times):
///
/// - a time phrase without a date phrase lands on the reference day;
/// - a date phrase without a time phrase yields a single instant at local noon;
/// - a range whose end clock is before its start clock ends the next day.
///
/// When no reference is given, "now" is used and a range crossing midnight is
/// placed so that it ends today: `11pm-2am` typed in the morning is last night.
/// An explicit reference is never shifted.
///
/// Nothing recognized is not an error: the result has no dates, an empty
/// `text`, and the input as `message`.
///
/// # Examples
///
/// ```
/// # use chrono::{TimeZone, Timelike, Utc};
/// # use tick_core::parse_input::{parse_time, ParseOptions};
/// let opts = ParseOptions {
///     reference: Some(Utc.with_ymd_and_hms(2015, 1, 25, 0, 0, 0).unwrap()),
///     ..Default::default()
/// };
///
/// let parsed = parse_time("11pm-2am fixing the build", Some(opts));
///
/// assert_eq!(parsed.start.unwrap().hour(), 23);
/// assert_eq!(parsed.end.unwrap(), Utc.with_ymd_and_hms(2015, 1, 26, 2, 0, 0).unwrap());
/// assert_eq!(parsed.text, "11pm-2am");
/// assert_eq!(parsed.message, "fixing the build");
/// ```
pub fn parse_time(input: &str, options: Option<ParseOptions>) -> ParsedTime {
    let options = options.unwrap_or_default();
    let implicit_reference = options.reference.is_none();
    let reference = options.reference.unwrap_or_else(Utc::now);
    parse_time_at(input, &options, reference, implicit_reference)
}

pub(crate) fn parse_time_at(
    input: &str,
    options: &ParseOptions,
    reference: DateTime<Utc>,
    implicit_reference: bool,
) -> ParsedTime {
    let offset = options.offset.unwrap_or_else(|| Utc.fix());
    let keywords = options.keywords.unwrap_or_else(|| Keywords::builtin());
    let formats = options.formats.unwrap_or(DEFAULT_FORMATS);
    let reference_day = reference.with_timezone(&offset).date_naive();

    let clock = time_tokens::extract(input)
        .and_then(|raw| meridiem::infer(&raw).map(|clock| (raw, clock)));
    let date_phrase = KeywordDates::new(keywords, formats)
        .recognize(input, reference_day)
        .filter(|phrase| match &clock {
            Some((raw, _)) => !overlaps(&phrase.span(), &raw.span()),
            None => true,
        });

    let day = date_phrase
        .as_ref()
        .map_or(reference_day, |phrase| phrase.day);

    let range = match &clock {
        Some((_, clock)) => {
            let range = rollover::resolve(day, *clock, options.same_clock);
            if implicit_reference && date_phrase.is_none() && range.rolled_over() {
                debug!("range crosses midnight, anchoring its end to the reference day");
                range.earlier_by(1)
            } else {
                Some(range)
            }
        }
        None => date_phrase
            .as_ref()
            .and_then(|_| day.and_hms_opt(12, 0, 0))
            .map(|start| ResolvedRange { start, end: None }),
    };
    let Some(range) = range else {
        return ParsedTime::untouched(input);
    };

    let mut spans: Vec<Range<usize>> = Vec::new();
    if let Some((raw, _)) = &clock {
        spans.push(raw.span());
    }
    if let Some(phrase) = &date_phrase {
        spans.push(phrase.span());
    }
    spans.sort_by_key(|span| span.start);
    let spans = join_adjacent(input, spans);

    let (Some(start), end) = (
        to_utc(range.start, offset),
        range.end.and_then(|end| to_utc(end, offset)),
    ) else {
        return ParsedTime::untouched(input);
    };

    ParsedTime {
        start: Some(start),
        end,
        text: spans
            .iter()
            .map(|span| &input[span.clone()])
            .collect::<Vec<_>>()
            .join(" "),
        message: remove_spans(input, &spans),
    }
}

/// Parses a reference given on the command line or in a record: an RFC 3339
/// instant, or a bare `YYYY-MM-DD` meaning local midnight in `offset`.
pub fn parse_reference(s: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
        return Some(instant.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    to_utc(day.and_hms_opt(0, 0, 0)?, offset)
}

fn to_utc(local: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    local
        .and_local_timezone(offset)
        .single()
        .map(|instant| instant.with_timezone(&Utc))
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Merges spans separated only by whitespace, commas or "on".
fn join_adjacent(input: &str, spans: Vec<Range<usize>>) -> Vec<Range<usize>> {
    let mut joined: Vec<Range<usize>> = Vec::with_capacity(spans.len());
    for span in spans {
        match joined.last_mut() {
            Some(last) if JOINER.is_match(&input[last.end..span.start]) => last.end = span.end,
            _ => joined.push(span),
        }
    }
    joined
}

/// Removes `spans` (sorted, non-overlapping) from `input`, leaving a single
/// space at each seam and no leading `:`/`,` left behind by the cut.
pub(crate) fn remove_spans(input: &str, spans: &[Range<usize>]) -> String {
    if spans.is_empty() {
        return input.to_string();
    }
    let mut out = input.to_string();
    for span in spans.iter().rev() {
        let before = out[..span.start].trim_end();
        let after = out[span.end..].trim_start();
        out = match (before.is_empty(), after.is_empty()) {
            (true, _) => after.to_string(),
            (_, true) => before.to_string(),
            _ => format!("{before} {after}"),
        };
    }
    out.trim_start_matches([':', ','])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn anchored(y: i32, m: u32, d: u32) -> Option<ParseOptions<'static>> {
        Some(ParseOptions {
            reference: Some(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()),
            ..Default::default()
        })
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(instant: Option<DateTime<Utc>>) -> (u32, u32) {
        let instant = instant.unwrap();
        (instant.hour(), instant.minute())
    }

    #[test]
    fn simple_am_times() {
        let p = parse_time("8am-10am", anchored(2025, 8, 15));
        assert_eq!(hm(p.start), (8, 0));
        assert_eq!(hm(p.end), (10, 0));
        assert_eq!(p.start.unwrap().date_naive(), p.end.unwrap().date_naive());
    }

    #[test]
    fn simple_am_to_pm_times() {
        let p = parse_time("9am-2pm", anchored(2025, 8, 15));
        assert_eq!(hm(p.start), (9, 0));
        assert_eq!(hm(p.end), (14, 0));
    }

    #[test]
    fn simple_pm_times() {
        let p = parse_time("1pm-4pm", anchored(2025, 8, 15));
        assert_eq!(hm(p.start), (13, 0));
        assert_eq!(hm(p.end), (16, 0));
    }

    #[test]
    fn infer_start_meridiem() {
        let p = parse_time("1-3pm", anchored(2025, 8, 15));
        assert_eq!(hm(p.start), (13, 0));
        assert_eq!(hm(p.end), (15, 0));

        let p = parse_time("10-4pm", anchored(2025, 8, 15));
        assert_eq!(hm(p.start), (10, 0));
        assert_eq!(hm(p.end), (16, 0));

        let p = parse_time("9:30-12pm", anchored(2025, 8, 15));
        assert_eq!(hm(p.start), (9, 30));
        assert_eq!(hm(p.end), (12, 0));
        assert_eq!(p.end.unwrap().date_naive(), day(2025, 8, 15));
    }

    #[test]
    fn infer_end_meridiem_same_evening() {
        let p = parse_time("4pm-10", anchored(2025, 8, 15));
        assert_eq!(hm(p.end), (22, 0));
        assert_eq!(p.end.unwrap().date_naive(), day(2025, 8, 15));

        let p = parse_time("1pm-3", anchored(2025, 8, 15));
        assert_eq!(hm(p.start), (13, 0));
        assert_eq!(hm(p.end), (15, 0));
    }

    #[test]
    fn infer_end_meridiem_next_morning() {
        let p = parse_time("10pm-4", anchored(2025, 8, 15));
        assert_eq!(hm(p.start), (22, 0));
        assert_eq!(hm(p.end), (4, 0));
        assert_eq!(p.start.unwrap().date_naive(), day(2025, 8, 15));
        assert_eq!(p.end.unwrap().date_naive(), day(2025, 8, 16));
    }

    #[test]
    fn minutes() {
        let p = parse_time("9:15am-2:30pm", anchored(2025, 8, 15));
        assert_eq!(hm(p.start), (9, 15));
        assert_eq!(hm(p.end), (14, 30));
    }

    #[test]
    fn proper_24h_times() {
        let p = parse_time("0800-1330", anchored(2025, 8, 15));
        assert_eq!(hm(p.start), (8, 0));
        assert_eq!(hm(p.end), (13, 30));

        let p = parse_time("08:00-13:30", anchored(2025, 8, 15));
        assert_eq!(hm(p.start), (8, 0));
        assert_eq!(hm(p.end), (13, 30));
    }

    #[test]
    fn no_leading_zero_24h_times() {
        let p = parse_time("800-1300", anchored(2025, 8, 15));
        assert_eq!(hm(p.start), (8, 0));
        assert_eq!(hm(p.end), (13, 0));
    }

    #[test]
    fn anchored_dates_relative_to_anchor() {
        for anchor in [day(2015, 1, 25), day(2015, 4, 2)] {
            let opts = Some(ParseOptions {
                reference: Some(Utc.from_utc_datetime(&anchor.and_hms_opt(0, 0, 0).unwrap())),
                ..Default::default()
            });
            let p = parse_time("8am-1pm", opts);
            assert_eq!(p.start.unwrap().date_naive(), anchor);
            assert_eq!(p.end.unwrap().date_naive(), anchor);
        }
    }

    #[test]
    fn overlapping_times_with_anchor() {
        let p = parse_time("11pm-2am", anchored(2015, 1, 25));
        assert_eq!(p.start.unwrap().date_naive(), day(2015, 1, 25));
        assert_eq!(p.end.unwrap().date_naive(), day(2015, 1, 26));

        let p = parse_time("11pm-2am", anchored(2016, 1, 15));
        assert_eq!(p.start.unwrap().date_naive(), day(2016, 1, 15));
        assert_eq!(p.end.unwrap().date_naive(), day(2016, 1, 16));
    }

    /// Runs the parser as if `reference` were "now" rather than given.
    fn parse_as_now(input: &str, reference: DateTime<Utc>) -> ParsedTime {
        parse_time_at(input, &ParseOptions::default(), reference, true)
    }

    #[test]
    fn overlapping_times_without_anchor_end_today() {
        let now = Utc.with_ymd_and_hms(2025, 8, 15, 9, 30, 0).unwrap();
        let p = parse_as_now("11pm-2", now);
        assert_eq!(hm(p.start), (23, 0));
        assert_eq!(hm(p.end), (2, 0));
        assert_eq!(p.start.unwrap().date_naive(), day(2025, 8, 14));
        assert_eq!(p.end.unwrap().date_naive(), day(2025, 8, 15));
    }

    #[test]
    fn overnight_with_date_phrase_is_not_shifted() {
        let now = Utc.with_ymd_and_hms(2025, 8, 15, 9, 30, 0).unwrap();
        let p = parse_as_now("today 11pm-2am", now);
        assert_eq!(p.start.unwrap().date_naive(), day(2025, 8, 15));
        assert_eq!(p.end.unwrap().date_naive(), day(2025, 8, 16));
    }

    #[test]
    fn same_day_without_anchor_is_today() {
        let now = Utc.with_ymd_and_hms(2025, 8, 15, 23, 59, 59).unwrap();
        let p = parse_as_now("1pm-3", now);
        assert_eq!(p.start.unwrap().date_naive(), day(2025, 8, 15));
        assert_eq!(p.end.unwrap().date_naive(), day(2025, 8, 15));
    }

    #[test]
    fn identical_clock_policies() {
        let zero = parse_time("9am-9am", anchored(2025, 8, 15));
        assert_eq!(zero.start, zero.end);

        let opts = Some(ParseOptions {
            reference: Some(Utc.with_ymd_and_hms(2025, 8, 15, 0, 0, 0).unwrap()),
            same_clock: SameClockPolicy::FullDay,
            ..Default::default()
        });
        let full = parse_time("9am-9am", opts);
        assert_eq!(full.end.unwrap() - full.start.unwrap(), chrono::TimeDelta::hours(24));
    }

    #[test]
    fn date_phrase_supplies_the_day() {
        // 2016-03-26 is a Saturday
        let p = parse_time("8-4pm Good Friday #stat", anchored(2016, 3, 26));
        assert_eq!(hm(p.start), (8, 0));
        assert_eq!(hm(p.end), (16, 0));
        assert_eq!(p.start.unwrap().date_naive(), day(2016, 3, 25));
        assert_eq!(p.end.unwrap().date_naive(), day(2016, 3, 25));
        assert_eq!(p.text, "8-4pm Good Friday");
        assert_eq!(p.message, "#stat");
    }

    #[test]
    fn rollover_is_relative_to_the_date_phrase() {
        let p = parse_time("yesterday 11pm-2am deploy", anchored(2025, 8, 15));
        assert_eq!(p.start.unwrap().date_naive(), day(2025, 8, 14));
        assert_eq!(p.end.unwrap().date_naive(), day(2025, 8, 15));
        assert_eq!(p.text, "yesterday 11pm-2am");
        assert_eq!(p.message, "deploy");
    }

    #[test]
    fn separated_phrases_are_both_removed() {
        let p = parse_time("9am-5pm planning for friday", anchored(2025, 8, 20));
        assert_eq!(p.start.unwrap().date_naive(), day(2025, 8, 15));
        assert_eq!(p.text, "9am-5pm friday");
        assert_eq!(p.message, "planning for");
    }

    #[test]
    fn date_only_is_noon_single_instant() {
        let p = parse_time("tomorrow: plan the sprint", anchored(2025, 8, 15));
        assert_eq!(p.start.unwrap().date_naive(), day(2025, 8, 16));
        assert_eq!(hm(p.start), (12, 0));
        assert!(!p.is_range());
        assert_eq!(p.message, "plan the sprint");
    }

    #[test]
    fn one_time_unit_is_set_to_start() {
        let p = parse_time("12pm did some #stuff", anchored(2025, 8, 15));
        assert_eq!(hm(p.start), (12, 0));
        assert!(p.end.is_none());
        assert!(!p.is_range());
        assert_eq!(p.text, "12pm");
    }

    #[test]
    fn returns_original_message_without_time() {
        let p = parse_time("1-2pm did some #stuff", anchored(2025, 8, 15));
        assert_eq!(p.message, "did some #stuff");
        assert_eq!(p.text, "1-2pm");

        let p = parse_time("fixed the 0800-1330 outage", anchored(2025, 8, 15));
        assert_eq!(p.message, "fixed the outage");
    }

    #[test]
    fn no_time_needed() {
        let p = parse_time("did some #stuff", anchored(2025, 8, 15));
        assert_eq!(p.text, "");
        assert_eq!(p.message, "did some #stuff");
        assert!(!p.has_dates());
        assert!(!p.is_range());
    }

    #[test]
    fn message_unchanged_keeps_inner_spacing() {
        let p = parse_time("  did   some stuff ", anchored(2025, 8, 15));
        assert_eq!(p.message, "  did   some stuff ");
    }

    #[test]
    fn clock_times_read_in_user_offset() {
        let opts = Some(ParseOptions {
            reference: Some(Utc.with_ymd_and_hms(2025, 8, 15, 12, 0, 0).unwrap()),
            offset: FixedOffset::east_opt(2 * 3600),
            ..Default::default()
        });
        let p = parse_time("8am-10am", opts);
        assert_eq!(p.start, Some(Utc.with_ymd_and_hms(2025, 8, 15, 6, 0, 0).unwrap()));
        assert_eq!(p.end, Some(Utc.with_ymd_and_hms(2025, 8, 15, 8, 0, 0).unwrap()));
    }

    #[test]
    fn reference_day_follows_user_offset() {
        // 23:30 UTC on the 14th is already the 15th at +02:00
        let opts = Some(ParseOptions {
            reference: Some(Utc.with_ymd_and_hms(2025, 8, 14, 23, 30, 0).unwrap()),
            offset: FixedOffset::east_opt(2 * 3600),
            ..Default::default()
        });
        let p = parse_time("9am-5pm", opts);
        assert_eq!(p.start, Some(Utc.with_ymd_and_hms(2025, 8, 15, 7, 0, 0).unwrap()));
    }

    #[test]
    fn reference_parsing() {
        let utc = Utc.fix();
        assert_eq!(
            parse_reference("2015-01-25", utc),
            Some(Utc.with_ymd_and_hms(2015, 1, 25, 0, 0, 0).unwrap())
        );
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            parse_reference("2015-01-25", plus_two),
            Some(Utc.with_ymd_and_hms(2015, 1, 24, 22, 0, 0).unwrap())
        );
        assert_eq!(
            parse_reference("2015-01-25T10:00:00+01:00", utc),
            Some(Utc.with_ymd_and_hms(2015, 1, 25, 9, 0, 0).unwrap())
        );
        assert_eq!(parse_reference("next tuesday", utc), None);
    }

    #[test]
    fn remove_spans_joins_seams() {
        assert_eq!(remove_spans("a 1-2pm b", &[2..7]), "a b");
        assert_eq!(remove_spans("1-2pm: standup", &[0..5]), "standup");
        assert_eq!(remove_spans("standup 1-2pm", &[8..13]), "standup");
        assert_eq!(remove_spans("x", &[]), "x");
    }

    #[test]
    fn noon_without_reference() {
        let now = Utc.with_ymd_and_hms(2025, 8, 15, 7, 0, 0).unwrap();
        let p = parse_as_now("noon standup", now);
        assert_eq!(p.start, Some(Utc.with_ymd_and_hms(2025, 8, 15, 12, 0, 0).unwrap()));
        assert!(!p.is_range());
        assert_eq!(p.message, "standup");
    }
}
