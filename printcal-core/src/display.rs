//! Display text for occurrences.

use chrono::NaiveDateTime;
use rrule::Tz;

use crate::dates::DateRange;
use crate::event::Event;
use crate::recurrence::occurrences_in_range;

/// `1st`, `2nd`, `3rd`, `4th`, `11th`, `21st`... Zero and negative numbers
/// are returned as plain digits.
pub fn ordinal_suffix(n: i64) -> String {
    if n <= 0 {
        return n.to_string();
    }

    let suffix = match (n % 100, n % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Summary for the occurrence of `event` starting at `occurrence`.
///
/// A recurring event with ordinal text shows which repetition this is,
/// counting the start itself as the 0th: "Bob Jones 3rd Birthday". The
/// start occurrence and everything else show the plain summary.
pub fn display_summary(event: &Event, occurrence: NaiveDateTime, zone: &Tz) -> String {
    let Some(ordinal) = event.ordinal_display.as_ref().filter(|_| event.recurs()) else {
        return event.summary.clone();
    };

    let start = event.start.wall_clock(zone);
    let nth = match occurrences_in_range(event, &DateRange::new(start, occurrence), zone) {
        Ok(dates) if dates.last() == Some(&occurrence) => dates.len() as i64 - 1,
        _ => return event.summary.clone(),
    };
    if nth == 0 {
        return event.summary.clone();
    }

    format!("{} {} {}", ordinal.before, ordinal_suffix(nth), ordinal.after)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventTime, OrdinalDisplay};
    use chrono::{NaiveDate, NaiveTime};

    fn birthday() -> Event {
        Event {
            start: EventTime::Date(NaiveDate::from_ymd_opt(2000, 5, 22).unwrap()),
            summary: "Bob Jones Birthday".to_string(),
            recurrence_rule: Some("FREQ=YEARLY".parse().unwrap()),
            ordinal_display: Some(OrdinalDisplay {
                before: "Bob Jones".to_string(),
                after: "Birthday".to_string(),
            }),
            ..Event::new()
        }
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN)
    }

    #[test]
    fn test_ordinal_suffix() {
        let cases = [
            (1, "1st"),
            (2, "2nd"),
            (3, "3rd"),
            (4, "4th"),
            (11, "11th"),
            (12, "12th"),
            (13, "13th"),
            (21, "21st"),
            (22, "22nd"),
            (101, "101st"),
            (111, "111th"),
            (0, "0"),
            (-3, "-3"),
        ];
        for (n, expected) in cases {
            assert_eq!(ordinal_suffix(n), expected, "n = {}", n);
        }
    }

    #[test]
    fn test_birthday_counts_years() {
        let event = birthday();

        assert_eq!(display_summary(&event, at(2025, 5, 22), &Tz::UTC), "Bob Jones 25th Birthday");
        assert_eq!(display_summary(&event, at(2001, 5, 22), &Tz::UTC), "Bob Jones 1st Birthday");
    }

    #[test]
    fn test_start_occurrence_uses_plain_summary() {
        let event = birthday();
        assert_eq!(display_summary(&event, at(2000, 5, 22), &Tz::UTC), "Bob Jones Birthday");
    }

    #[test]
    fn test_blank_ordinal_text_is_trimmed() {
        let mut event = birthday();
        event.ordinal_display = Some(OrdinalDisplay {
            before: String::new(),
            after: "Anniversary".to_string(),
        });

        assert_eq!(display_summary(&event, at(2010, 5, 22), &Tz::UTC), "10th Anniversary");
    }

    #[test]
    fn test_non_recurring_event_uses_plain_summary() {
        let mut event = birthday();
        event.recurrence_rule = None;

        assert_eq!(display_summary(&event, at(2000, 5, 22), &Tz::UTC), "Bob Jones Birthday");
    }
}
