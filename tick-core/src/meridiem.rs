//! Clock values and meridiem inference for time ranges.
//!
//! When a range names the meridiem on one side only ("4pm-10", "10-4pm"), the
//! other side is inferred from the numeric relationship between the two
//! times:
//!
//! - `4pm-10` reads as `4pm-10pm` (22:00 comes after 16:00 the same evening)
//! - `10pm-4` reads as `10pm-4am` (the range crosses midnight)
//! - `10-4pm` reads as `10am-4pm`
//! - `1-3pm` reads as `1pm-3pm`
//!
//! Inference never looks at the text: it is a pure function over a
//! [`RawMatch`]'s numbers.

use chrono::NaiveTime;

use crate::time_tokens::RawMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    /// Meridiem of a 24-hour clock value.
    pub fn of_hour24(hour: u32) -> Self {
        if hour < 12 { Self::Am } else { Self::Pm }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "am" => Some(Self::Am),
            "pm" => Some(Self::Pm),
            _ => None,
        }
    }

    fn opposite(self) -> Self {
        match self {
            Self::Am => Self::Pm,
            Self::Pm => Self::Am,
        }
    }
}

/// One side of a recognized time expression.
///
/// With a known meridiem `hour` is in 12-hour form (1..=12). Without one it is
/// the literal 1..=12 hour the user wrote; values only valid on a 24-hour clock
/// (0, 13..=23) always carry a known meridiem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub meridiem: Option<Meridiem>,
}

impl ClockTime {
    /// A fully disambiguated value from a 24-hour clock.
    pub fn from_24h(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        let hour12 = match hour {
            0 => 12,
            13..=23 => hour - 12,
            _ => hour,
        };
        Some(Self {
            hour: hour12,
            minute,
            meridiem: Some(Meridiem::of_hour24(hour)),
        })
    }

    /// A value as written in free text, with or without a meridiem.
    ///
    /// Returns `None` for out-of-range digits (`13pm`, `25`, `9:75`).
    pub fn from_written(hour: u32, minute: u32, meridiem: Option<Meridiem>) -> Option<Self> {
        if minute > 59 {
            return None;
        }
        match (hour, meridiem) {
            (1..=12, _) => Some(Self {
                hour,
                minute,
                meridiem,
            }),
            (0 | 13..=23, None) => Self::from_24h(hour, minute),
            _ => None,
        }
    }

    /// Hour on a 24-hour clock if this value had meridiem `meridiem`.
    pub fn hour24_as(&self, meridiem: Meridiem) -> u32 {
        match (self.hour, meridiem) {
            (12, Meridiem::Am) => 0,
            (12, Meridiem::Pm) => 12,
            (h, Meridiem::Pm) => h + 12,
            (h, Meridiem::Am) => h,
        }
    }

    fn minutes_as(&self, meridiem: Meridiem) -> u32 {
        self.hour24_as(meridiem) * 60 + self.minute
    }

    /// The time of day under `meridiem`, or the literal hour when `None`.
    fn to_time(self, meridiem: Option<Meridiem>) -> Option<NaiveTime> {
        let hour = match meridiem {
            Some(m) => self.hour24_as(m),
            None => self.hour,
        };
        NaiveTime::from_hms_opt(hour, self.minute, 0)
    }
}

/// Clock times with every meridiem settled; no calendar day yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedClock {
    pub start: NaiveTime,
    pub end: Option<NaiveTime>,
}

/// Fills in a missing meridiem on one side of a range from the other side.
///
/// - Start known, end unknown: the end keeps the start's meridiem when that
///   puts its hour after the start's hour, otherwise it flips (which makes the range cross
///   midnight for a PM start).
/// - End known, start unknown: the start keeps the end's meridiem when that
///   puts it before the end, otherwise it flips.
/// - Both unknown: the hours are taken literally.
pub fn infer(raw: &RawMatch) -> Option<ResolvedClock> {
    let start = raw.start;
    let Some(end) = raw.end else {
        return Some(ResolvedClock {
            start: start.to_time(start.meridiem)?,
            end: None,
        });
    };

    let (start_meridiem, end_meridiem) = match (start.meridiem, end.meridiem) {
        (Some(s), None) => {
            // hours only: "4:30pm-4:45" ends at 4:45am
            let same = end.hour24_as(s) > start.hour24_as(s);
            (Some(s), Some(if same { s } else { s.opposite() }))
        }
        (None, Some(e)) => {
            let same = start.minutes_as(e) < end.minutes_as(e);
            (Some(if same { e } else { e.opposite() }), Some(e))
        }
        known => known,
    };

    Some(ResolvedClock {
        start: start.to_time(start_meridiem)?,
        end: Some(end.to_time(end_meridiem)?),
    })
}
