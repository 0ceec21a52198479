use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum_macros::{AsRefStr, EnumString};

use crate::meridiem::ResolvedClock;

/// What a range whose start and end land on the same clock time means.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SameClockPolicy {
    /// `9am-9am` is a zero-length range on the same day.
    #[default]
    ZeroLength,
    /// `9am-9am` ends at 9am the next day.
    FullDay,
}

/// Start and optional end, anchored to calendar days in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
}

impl ResolvedRange {
    pub fn is_range(&self) -> bool {
        self.end.is_some()
    }

    /// `true` when the end falls on a later calendar day than the start.
    pub fn rolled_over(&self) -> bool {
        self.end.is_some_and(|end| end.date() > self.start.date())
    }

    /// Moves the whole range back by `days`, keeping its shape.
    pub fn earlier_by(self, days: u64) -> Option<Self> {
        let days = Days::new(days);
        Some(Self {
            start: self.start.checked_sub_days(days)?,
            end: match self.end {
                Some(end) => Some(end.checked_sub_days(days)?),
                None => None,
            },
        })
    }
}

/// Anchors resolved clock times to `day`.
///
/// An end clock earlier than the start clock belongs to the day after `day`
/// (`11pm-2am` ends the next morning). Identical clocks follow `policy`.
pub fn resolve(day: NaiveDate, clock: ResolvedClock, policy: SameClockPolicy) -> ResolvedRange {
    let start = day.and_time(clock.start);
    let end = clock.end.map(|end_time| {
        let next_day = match end_time.cmp(&clock.start) {
            Ordering::Less => true,
            Ordering::Equal => policy == SameClockPolicy::FullDay,
            Ordering::Greater => false,
        };
        let end_day = if next_day {
            day.checked_add_days(Days::new(1)).unwrap_or(day)
        } else {
            day
        };
        end_day.and_time(end_time)
    });
    ResolvedRange { start, end }
}
