//! `HHMM-HHMM` ranges written on a 24-hour clock ("0800-1330", "800-1300").

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::meridiem::ClockTime;
use crate::time_tokens::RawMatch;

static MILITARY_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{3,4})\s*-\s*(\d{3,4})\b").expect("valid military pattern"));

/// Recognizes the first valid military range in `text`.
///
/// Both sides come out fully disambiguated (hour < 12 is AM), so they never go
/// through meridiem guessing. Candidates with an hour above 23 or a minute
/// above 59 are skipped.
pub fn recognize(text: &str) -> Option<RawMatch> {
    MILITARY_RANGE.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let start = split_digits(caps.get(1)?.as_str());
        let end = split_digits(caps.get(2)?.as_str());
        match (start, end) {
            (Some((sh, sm)), Some((eh, em))) => Some(RawMatch {
                text: whole.as_str().to_string(),
                index: whole.start(),
                start: ClockTime::from_24h(sh, sm)?,
                end: Some(ClockTime::from_24h(eh, em)?),
            }),
            _ => {
                trace!(candidate = whole.as_str(), "rejected military range");
                None
            }
        }
    })
}

/// Splits a 3 or 4 digit group into hour and minute.
///
/// Three digits are `H` + `MM` ("800" → 8:00), four are `HH` + `MM`
/// ("1330" → 13:30).
pub fn split_digits(digits: &str) -> Option<(u32, u32)> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour_len = match digits.len() {
        3 => 1,
        4 => 2,
        _ => return None,
    };
    let hour: u32 = digits[..hour_len].parse().ok()?;
    let minute: u32 = digits[hour_len..].parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}
