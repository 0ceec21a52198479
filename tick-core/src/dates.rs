//! Calendar-day recognition for the date portion of an entry.
//!
//! Time-of-day ranges are handled elsewhere; this module only answers "which
//! day does this text talk about?" for words like `yesterday`, `friday`,
//! `christmas` or a formatted date such as `2026-10-15`.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use tracing::debug;

use crate::keywords::{Keyword, Keywords};

/// Default accepted input date formats (parsing only).
pub const DEFAULT_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

static WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\d'’]+(?:[/.\-][\p{L}\d'’]+)*").expect("valid word pattern")
});

/// A calendar day found in free text.
#[derive(Clone, Debug, PartialEq)]
pub struct DatePhrase {
    /// The matched text, as written by the user.
    pub text: String,
    /// Byte offset of `text` within the input.
    pub index: usize,
    pub day: NaiveDate,
}

impl DatePhrase {
    pub fn span(&self) -> Range<usize> {
        self.index..self.index + self.text.len()
    }
}

/// Resolves a calendar day from free text, relative to a reference day.
///
/// The time-range logic only relies on this for the *day*; the clock time
/// always comes from the time-token extractor.
pub trait DatePhraseRecognizer {
    fn recognize(&self, text: &str, reference_day: NaiveDate) -> Option<DatePhrase>;
}

/// The built-in recognizer: keyword phrases from a [`Keywords`] registry plus
/// a list of `chrono` date formats.
#[derive(Clone, Copy, Debug)]
pub struct KeywordDates<'a> {
    keywords: &'a Keywords,
    formats: &'a [&'a str],
}

impl<'a> KeywordDates<'a> {
    pub fn new(keywords: &'a Keywords, formats: &'a [&'a str]) -> Self {
        Self { keywords, formats }
    }
}

impl Default for KeywordDates<'static> {
    fn default() -> Self {
        Self::new(Keywords::builtin(), DEFAULT_FORMATS)
    }
}

impl DatePhraseRecognizer for KeywordDates<'_> {
    /// Returns the leftmost phrase; at a given position the longest phrase wins
    /// ("christmas eve" over "christmas").
    fn recognize(&self, text: &str, reference_day: NaiveDate) -> Option<DatePhrase> {
        let words: Vec<_> = WORD.find_iter(text).collect();
        let longest = self.keywords.longest_phrase();

        for (i, first) in words.iter().enumerate() {
            for len in (1..=longest.min(words.len() - i)).rev() {
                let window = &words[i..i + len];
                let contiguous = window
                    .windows(2)
                    .all(|pair| text[pair[0].end()..pair[1].start()].trim().is_empty());
                if !contiguous {
                    continue;
                }
                let last = window[len - 1];
                let phrase = &text[first.start()..last.end()];

                let day = match self.keywords.lookup(phrase) {
                    Some(keyword) => resolve_keyword(keyword, reference_day),
                    None if len == 1 => parse_formatted(phrase, self.formats),
                    None => None,
                };
                if let Some(day) = day {
                    debug!(phrase, %day, "date phrase recognized");
                    return Some(DatePhrase {
                        text: phrase.to_string(),
                        index: first.start(),
                        day,
                    });
                }
            }
        }
        None
    }
}

/// Resolves a keyword against `reference_day`.
///
/// Weekdays resolve to the most recent occurrence on or before the reference
/// day (work is logged after the fact). Holidays resolve within the reference
/// day's year.
pub fn resolve_keyword(keyword: Keyword, reference_day: NaiveDate) -> Option<NaiveDate> {
    let year = reference_day.year();
    match keyword {
        Keyword::Today => Some(reference_day),
        Keyword::Yesterday => reference_day.checked_sub_days(Days::new(1)),
        Keyword::Tomorrow => reference_day.checked_add_days(Days::new(1)),
        Keyword::Monday => most_recent(reference_day, Weekday::Mon),
        Keyword::Tuesday => most_recent(reference_day, Weekday::Tue),
        Keyword::Wednesday => most_recent(reference_day, Weekday::Wed),
        Keyword::Thursday => most_recent(reference_day, Weekday::Thu),
        Keyword::Friday => most_recent(reference_day, Weekday::Fri),
        Keyword::Saturday => most_recent(reference_day, Weekday::Sat),
        Keyword::Sunday => most_recent(reference_day, Weekday::Sun),
        Keyword::NewYearsDay => NaiveDate::from_ymd_opt(year, 1, 1),
        Keyword::NewYearsEve => NaiveDate::from_ymd_opt(year, 12, 31),
        Keyword::Halloween => NaiveDate::from_ymd_opt(year, 10, 31),
        Keyword::ChristmasEve => NaiveDate::from_ymd_opt(year, 12, 24),
        Keyword::Christmas => NaiveDate::from_ymd_opt(year, 12, 25),
        Keyword::GoodFriday => easter_sunday(year)?.checked_sub_days(Days::new(2)),
        Keyword::Easter => easter_sunday(year),
    }
}

fn most_recent(reference_day: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let today_wd = reference_day.weekday();
    let days_ago = (today_wd.num_days_from_monday() + 7 - weekday.num_days_from_monday()) % 7;
    reference_day.checked_sub_days(Days::new(u64::from(days_ago)))
}

/// Gregorian Easter Sunday (anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

fn parse_formatted(token: &str, formats: &[&str]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
}
