//! Plain-text rendering helpers.
//!
//! Entry line:  `Fri 15 Aug 2025 08:00-13:30 (5h 30m) meeting #client`

use chrono::{DateTime, FixedOffset, Utc};

use crate::duration::Duration;
use crate::entry::Entry;

/// `2h 15m`, `45m`, `3h`; zero is `0m`.
pub fn format_duration(duration: Duration) -> String {
    match (duration.hours(), duration.minutes()) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// One line per entry, in the user's offset.
///
/// The end gets its own date only when it falls on another local day.
pub fn format_entry_line(entry: &Entry, offset: FixedOffset, date_format: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(start) = entry.start() {
        let start = local(start, offset);
        let mut when = format!("{} {}", start.format(date_format), start.format("%H:%M"));
        if let Some(end) = entry.end() {
            let end = local(end, offset);
            if end.date_naive() == start.date_naive() {
                when.push_str(&format!("-{}", end.format("%H:%M")));
            } else {
                when.push_str(&format!(" - {} {}", end.format(date_format), end.format("%H:%M")));
            }
        }
        parts.push(when);
    }
    if let Some(duration) = entry.duration() {
        parts.push(format!("({})", format_duration(duration)));
    }
    if !entry.residual_message().is_empty() {
        parts.push(entry.residual_message().to_string());
    }
    parts.join(" ")
}

fn local(instant: DateTime<Utc>, offset: FixedOffset) -> DateTime<FixedOffset> {
    instant.with_timezone(&offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_input::ParseOptions;
    use chrono::{Offset, TimeZone};

    fn entry(text: &str) -> Entry {
        let opts = ParseOptions {
            reference: Some(Utc.with_ymd_and_hms(2025, 8, 15, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        Entry::new("sam", text, Some(opts))
    }

    #[test]
    fn durations_read_naturally() {
        assert_eq!(format_duration(Duration::from_seconds(8100)), "2h 15m");
        assert_eq!(format_duration(Duration::from_seconds(2700)), "45m");
        assert_eq!(format_duration(Duration::from_seconds(10800)), "3h");
        assert_eq!(format_duration(Duration::default()), "0m");
    }

    #[test]
    fn same_day_range() {
        let line = format_entry_line(&entry("0800-1330 meeting #client"), Utc.fix(), "%a %d %b %Y");
        assert_eq!(line, "Fri 15 Aug 2025 08:00-13:30 (5h 30m) meeting #client");
    }

    #[test]
    fn overnight_range_shows_both_days() {
        let line = format_entry_line(&entry("11pm-2am on call"), Utc.fix(), "%Y-%m-%d");
        assert_eq!(line, "2025-08-15 23:00 - 2025-08-16 02:00 (3h) on call");
    }

    #[test]
    fn undated_entry() {
        let line = format_entry_line(&entry("2 hours docs"), Utc.fix(), "%Y-%m-%d");
        assert_eq!(line, "(2h) docs");
        assert_eq!(format_entry_line(&entry("thinking"), Utc.fix(), "%Y-%m-%d"), "thinking");
    }

    #[test]
    fn rendered_in_offset() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let line = format_entry_line(&entry("12pm lunch"), plus_two, "%Y-%m-%d");
        assert_eq!(line, "2025-08-15 14:00 lunch");
    }
}
