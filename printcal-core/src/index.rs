//! Day-by-day index of a collection.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use rrule::Tz;
use tracing::warn;

use crate::calendar::Collection;
use crate::dates::{DateRange, date_key};
use crate::event::Event;
use crate::recurrence::occurrences_in_range;

/// One manifestation of an event, tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct EventOccurrence {
    pub date: NaiveDateTime,
    pub source_calendar: String,
    pub event: Event,
}

/// Map every calendar day in `range` to the occurrences starting on it.
///
/// Every day is present even when empty. Calendars for which `is_disabled`
/// returns true are skipped. Within a day, occurrences keep collection order
/// (calendar name, then event order, then occurrence order). An event whose
/// rule cannot be expanded is logged and left out.
pub fn index_by_date(
    collection: &Collection,
    range: &DateRange,
    zone: &Tz,
    is_disabled: impl Fn(&str) -> bool,
) -> BTreeMap<NaiveDate, Vec<EventOccurrence>> {
    let mut index: BTreeMap<NaiveDate, Vec<EventOccurrence>> =
        range.days().map(|day| (day, Vec::new())).collect();

    for (name, calendar) in collection.calendars_to_persist() {
        if is_disabled(name) {
            continue;
        }

        for event in &calendar.events {
            let dates = match occurrences_in_range(event, range, zone) {
                Ok(dates) => dates,
                Err(e) => {
                    warn!(calendar = name, uid = %event.uid, error = %e, "Skipping event");
                    continue;
                }
            };

            for date in dates {
                index.entry(date_key(date)).or_default().push(EventOccurrence {
                    date,
                    source_calendar: name.to_string(),
                    event: event.clone(),
                });
            }
        }
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{Calendar, DEFAULT_CALENDAR_NAME};
    use crate::event::EventTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn all_day_event(start: NaiveDate, summary: &str, rule: Option<&str>) -> Event {
        Event {
            start: EventTime::Date(start),
            summary: summary.to_string(),
            recurrence_rule: rule.map(|r| r.parse().unwrap()),
            ..Event::new()
        }
    }

    fn calendar_of(events: Vec<Event>) -> Calendar {
        let mut calendar = Calendar::new();
        for event in events {
            calendar.add_event(event);
        }
        calendar
    }

    #[test]
    fn test_daily_count_index_has_every_day() {
        let mut collection = Collection::new();
        collection.insert(
            DEFAULT_CALENDAR_NAME,
            calendar_of(vec![all_day_event(date(2025, 6, 2), "Course", Some("FREQ=DAILY;COUNT=5"))]),
        );
        let range = DateRange::from_dates(date(2025, 6, 5), date(2025, 6, 10));

        let index = index_by_date(&collection, &range, &Tz::UTC, |_| false);

        assert_eq!(index.len(), 6);
        for (day, occurrences) in &index {
            let expected = usize::from(*day == date(2025, 6, 5) || *day == date(2025, 6, 6));
            assert_eq!(occurrences.len(), expected, "day {}", day);
        }
        assert_eq!(index[&date(2025, 6, 5)][0].source_calendar, DEFAULT_CALENDAR_NAME);
    }

    #[test]
    fn test_disabled_calendar_is_excluded() {
        let mut collection = Collection::new();
        collection.insert("work", calendar_of(vec![all_day_event(date(2025, 6, 5), "Standup", None)]));
        collection.insert(
            "holidays",
            calendar_of(vec![all_day_event(date(2025, 6, 5), "Holiday", None)]),
        );
        let range = DateRange::from_dates(date(2025, 6, 1), date(2025, 6, 30));

        let index = index_by_date(&collection, &range, &Tz::UTC, |name| name == "holidays");

        let sources: Vec<_> = index
            .values()
            .flatten()
            .map(|o| o.source_calendar.as_str())
            .collect();
        assert_eq!(sources, vec!["work"]);
    }

    #[test]
    fn test_bucket_keeps_insertion_order() {
        let mut collection = Collection::new();
        collection.insert(
            "a-family",
            calendar_of(vec![
                all_day_event(date(2025, 6, 5), "Second by name", None),
                all_day_event(date(2020, 6, 5), "Anniversary", Some("FREQ=YEARLY")),
            ]),
        );
        collection.insert("b-work", calendar_of(vec![all_day_event(date(2025, 6, 5), "Review", None)]));
        let range = DateRange::from_dates(date(2025, 6, 5), date(2025, 6, 5));

        let index = index_by_date(&collection, &range, &Tz::UTC, |_| false);

        let summaries: Vec<_> = index[&date(2025, 6, 5)]
            .iter()
            .map(|o| o.event.summary.as_str())
            .collect();
        assert_eq!(summaries, vec!["Second by name", "Anniversary", "Review"]);
    }

    #[test]
    fn test_removed_calendar_is_skipped() {
        let mut collection = Collection::new();
        collection.insert("old", calendar_of(vec![all_day_event(date(2025, 6, 5), "Gone", None)]));
        collection.remove("old");
        let range = DateRange::from_dates(date(2025, 6, 5), date(2025, 6, 5));

        let index = index_by_date(&collection, &range, &Tz::UTC, |_| false);

        assert!(index[&date(2025, 6, 5)].is_empty());
    }
}
