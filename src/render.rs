//! Terminal rendering for agenda output, using owo_colors.

use chrono::NaiveDate;
use owo_colors::OwoColorize;
use printcal_core::Tz;
use printcal_core::config::CalendarColors;
use printcal_core::display::display_summary;
use printcal_core::index::EventOccurrence;

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
pub fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

/// "15:00-16:00", or "all-day" for events without a time
pub fn format_time(occurrence: &EventOccurrence) -> String {
    if occurrence.event.start.is_all_day() {
        return format!("{:>11}", "all-day");
    }
    let end = occurrence.date + occurrence.event.length();
    format!("{}-{}", occurrence.date.format("%H:%M"), end.format("%H:%M"))
}

pub fn render_occurrence(
    occurrence: &EventOccurrence,
    colors: Option<&CalendarColors>,
    zone: &Tz,
) -> String {
    let summary = display_summary(&occurrence.event, occurrence.date, zone);
    let tag = format!("[{}]", occurrence.source_calendar);

    let tag = match colors.and_then(|c| parse_hex(&c.background)) {
        Some((r, g, b)) => tag.truecolor(r, g, b).to_string(),
        None => tag.dimmed().to_string(),
    };

    format!("  {} {} {}", format_time(occurrence), summary, tag)
}

/// `#rrggbb` to its components.
fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use printcal_core::event::{Event, EventDuration, EventTime};

    #[test]
    fn test_date_labels() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 24).unwrap();

        assert_eq!(format_date_label(today, today), "Today");
        assert_eq!(format_date_label(today.succ_opt().unwrap(), today), "Tomorrow");
        assert_eq!(
            format_date_label(NaiveDate::from_ymd_opt(2025, 2, 26).unwrap(), today),
            "Wed Feb 26"
        );
    }

    #[test]
    fn test_format_time_shows_span() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let mut event = Event {
            start: EventTime::DateTime(Utc.with_ymd_and_hms(2025, 6, 2, 15, 0, 0).unwrap()),
            duration: Some(EventDuration::hours(1)),
            ..Event::new()
        };
        let timed = EventOccurrence {
            date: start.and_hms_opt(15, 0, 0).unwrap(),
            source_calendar: "work".to_string(),
            event: event.clone(),
        };
        assert_eq!(format_time(&timed), "15:00-16:00");

        event.start = EventTime::Date(start);
        let all_day = EventOccurrence { event, ..timed };
        assert_eq!(format_time(&all_day), "    all-day");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#1e66f5"), Some((0x1e, 0x66, 0xf5)));
        assert_eq!(parse_hex("1e66f5"), None);
        assert_eq!(parse_hex("#fff"), None);
    }
}
