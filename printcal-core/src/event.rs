//! Event types.
//!
//! These are the in-memory form of a VEVENT. The ICS codec converts them to
//! and from text; the recurrence engine and the indexer only ever read them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};
use rrule::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates::{local_midnight, to_wall_clock};

/// Summary given to events that arrive without one.
pub const MISSING_SUMMARY: &str = "(No title)";

/// Summary given to newly created events.
pub const NEW_EVENT_SUMMARY: &str = "New Event";

/// A single schedulable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Creation/modification timestamp (DTSTAMP), whole seconds
    pub stamp: DateTime<Utc>,
    pub start: EventTime,
    /// Explicit end (DTEND); when absent `duration` applies
    pub end: Option<EventTime>,
    pub duration: Option<EventDuration>,
    pub summary: String,
    /// Stable across edits
    pub uid: String,
    pub recurrence_rule: Option<RecurrenceRule>,
    /// Text around the ordinal when a recurring event is displayed
    pub ordinal_display: Option<OrdinalDisplay>,
}

impl Event {
    /// A new all-day event today, lasting an hour, with a fresh UID.
    pub fn new() -> Self {
        let stamp = Utc::now();
        Event {
            stamp: stamp.with_nanosecond(0).unwrap_or(stamp),
            start: EventTime::Date(Local::now().date_naive()),
            end: None,
            duration: Some(EventDuration::hours(1)),
            summary: NEW_EVENT_SUMMARY.to_string(),
            uid: format!("{}@printcal", Uuid::new_v4()),
            recurrence_rule: None,
            ordinal_display: None,
        }
    }

    pub fn recurs(&self) -> bool {
        self.recurrence_rule.is_some()
    }

    /// How long each occurrence lasts: explicit end first, then duration,
    /// then one hour.
    pub fn length(&self) -> chrono::Duration {
        if let Some(end) = &self.end
            && let Some(length) = end.signed_duration_since(&self.start)
        {
            return length;
        }
        self.duration
            .map(|d| d.to_chrono())
            .unwrap_or_else(|| chrono::Duration::hours(1))
    }
}

impl Default for Event {
    fn default() -> Self {
        Event::new()
    }
}

/// See [`Event::new`].
pub fn default_event() -> Event {
    Event::new()
}

/// The start (or end) of an event.
///
/// `Date` is an all-day local calendar date with no clock time at all.
/// `DateTime` is an absolute instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl EventTime {
    pub fn is_all_day(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// Wall-clock time in `zone`. All-day dates become local midnight on the
    /// same calendar day regardless of zone.
    pub fn wall_clock(&self, zone: &Tz) -> NaiveDateTime {
        match self {
            EventTime::Date(d) => local_midnight(*d),
            EventTime::DateTime(dt) => to_wall_clock(*dt, zone),
        }
    }

    /// Difference between two times of the same kind.
    pub fn signed_duration_since(&self, other: &EventTime) -> Option<chrono::Duration> {
        match (self, other) {
            (EventTime::Date(a), EventTime::Date(b)) => Some(a.signed_duration_since(*b)),
            (EventTime::DateTime(a), EventTime::DateTime(b)) => Some(a.signed_duration_since(*b)),
            _ => None,
        }
    }

    /// ICS value text: `YYYYMMDD` or `YYYYMMDDTHHMMSSZ`.
    pub fn to_ics_string(&self) -> String {
        match self {
            EventTime::Date(d) => d.format("%Y%m%d").to_string(),
            EventTime::DateTime(dt) => dt.format("%Y%m%dT%H%M%SZ").to_string(),
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            EventTime::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
        }
    }
}

/// A nominal span of time (RFC 5545 `dur-value`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDuration {
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl EventDuration {
    pub fn hours(hours: u32) -> Self {
        EventDuration {
            hours,
            ..Default::default()
        }
    }

    pub fn days(days: u32) -> Self {
        EventDuration {
            days,
            ..Default::default()
        }
    }

    pub fn to_chrono(&self) -> chrono::Duration {
        chrono::Duration::weeks(self.weeks.into())
            + chrono::Duration::days(self.days.into())
            + chrono::Duration::hours(self.hours.into())
            + chrono::Duration::minutes(self.minutes.into())
            + chrono::Duration::seconds(self.seconds.into())
    }
}

/// Formats as an ISO 8601 duration, e.g. `PT1H`, `P1DT12H`, `P2W`.
impl fmt::Display for EventDuration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let has_date = self.weeks > 0 || self.days > 0;
        let has_time = self.hours > 0 || self.minutes > 0 || self.seconds > 0;

        if !has_date && !has_time {
            return write!(f, "PT0S");
        }

        write!(f, "P")?;
        if self.weeks > 0 {
            write!(f, "{}W", self.weeks)?;
        }
        if self.days > 0 {
            write!(f, "{}D", self.days)?;
        }
        if has_time {
            write!(f, "T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if self.seconds > 0 {
                write!(f, "{}S", self.seconds)?;
            }
        }
        Ok(())
    }
}

impl FromStr for EventDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('-') {
            return Err(format!("negative duration '{}'", s));
        }
        let s = s.trim_start_matches('+');

        // iso8601 rejects the combined week+day form (P1W2D) that RFC 5545
        // allows, so weeks are split off by hand.
        let (weeks, rest) = match s.strip_prefix('P').and_then(|r| r.split_once('W')) {
            Some((w, rest)) => {
                let weeks: u32 = w.parse().map_err(|_| format!("invalid weeks in '{}'", s))?;
                (weeks, rest)
            }
            None => (0, s.strip_prefix('P').unwrap_or(s)),
        };

        if rest.is_empty() {
            return Ok(EventDuration {
                weeks,
                ..Default::default()
            });
        }

        match iso8601::duration(&format!("P{}", rest))? {
            iso8601::Duration::Weeks(w) => Ok(EventDuration {
                weeks: weeks + w,
                ..Default::default()
            }),
            iso8601::Duration::YMDHMS {
                year,
                month,
                day,
                hour,
                minute,
                second,
                ..
            } => {
                if year != 0 || month != 0 {
                    return Err(format!("years and months are not fixed spans: '{}'", s));
                }
                Ok(EventDuration {
                    weeks,
                    days: day,
                    hours: hour,
                    minutes: minute,
                    seconds: second,
                })
            }
        }
    }
}

/// Text shown around the ordinal of a recurring event, e.g. "Bob's" and
/// "Birthday" for "Bob's 3rd Birthday".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrdinalDisplay {
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_ics_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    pub fn from_ics_str(s: &str) -> Option<Self> {
        match s {
            "DAILY" => Some(Frequency::Daily),
            "WEEKLY" => Some(Frequency::Weekly),
            "MONTHLY" => Some(Frequency::Monthly),
            "YEARLY" => Some(Frequency::Yearly),
            _ => None,
        }
    }
}

/// A `BYDAY` entry: a weekday, optionally with its ordinal within the month
/// (1 = first, -1 = last).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayNum {
    pub day: Weekday,
    pub occurrence: Option<i8>,
}

impl WeekdayNum {
    pub fn every(day: Weekday) -> Self {
        WeekdayNum {
            day,
            occurrence: None,
        }
    }

    pub fn nth(occurrence: i8, day: Weekday) -> Self {
        WeekdayNum {
            day,
            occurrence: Some(occurrence),
        }
    }
}

/// How an event repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: Option<u16>,
    pub count: Option<u32>,
    pub until: Option<EventTime>,
    pub by_day: Vec<WeekdayNum>,
    pub by_month_day: Vec<i8>,
    /// Months of the year, 1 to 12
    pub by_month: Vec<u8>,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency) -> Self {
        RecurrenceRule {
            frequency,
            interval: None,
            count: None,
            until: None,
            by_day: Vec::new(),
            by_month_day: Vec::new(),
            by_month: Vec::new(),
        }
    }

    pub fn interval(&self) -> u16 {
        self.interval.unwrap_or(1).max(1)
    }
}

pub(crate) fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

pub(crate) fn weekday_from_code(code: &str) -> Option<Weekday> {
    match code {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_event_defaults() {
        let event = Event::new();

        assert!(matches!(event.start, EventTime::Date(_)));
        assert_eq!(event.duration, Some(EventDuration::hours(1)));
        assert_eq!(event.summary, NEW_EVENT_SUMMARY);
        assert_eq!(event.stamp.nanosecond(), 0);
        assert!(event.uid.ends_with("@printcal"));
        assert_ne!(event.uid, Event::new().uid);
        assert_eq!(default_event().summary, NEW_EVENT_SUMMARY);
    }

    #[test]
    fn test_duration_formats_as_iso8601() {
        assert_eq!(EventDuration::hours(1).to_string(), "PT1H");
        assert_eq!(EventDuration::days(1).to_string(), "P1D");
        assert_eq!(EventDuration::default().to_string(), "PT0S");

        let mixed = EventDuration {
            weeks: 1,
            days: 2,
            hours: 3,
            minutes: 30,
            seconds: 0,
        };
        assert_eq!(mixed.to_string(), "P1W2DT3H30M");
    }

    #[test]
    fn test_duration_parses_rfc5545_forms() {
        assert_eq!("PT1H".parse::<EventDuration>(), Ok(EventDuration::hours(1)));
        assert_eq!("P1D".parse::<EventDuration>(), Ok(EventDuration::days(1)));
        assert_eq!(
            "P2W".parse::<EventDuration>(),
            Ok(EventDuration {
                weeks: 2,
                ..Default::default()
            })
        );
        assert_eq!(
            "P1W2DT3H30M".parse::<EventDuration>(),
            Ok(EventDuration {
                weeks: 1,
                days: 2,
                hours: 3,
                minutes: 30,
                seconds: 0,
            })
        );
        assert!("-PT15M".parse::<EventDuration>().is_err());
        assert!("P1M".parse::<EventDuration>().is_err());
    }

    #[test]
    fn test_length_prefers_explicit_end() {
        let mut event = Event::new();
        event.start = EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 20).unwrap());
        event.end = Some(EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 22).unwrap()));

        assert_eq!(event.length(), chrono::Duration::days(2));

        event.end = None;
        event.duration = None;
        assert_eq!(event.length(), chrono::Duration::hours(1));
    }

    #[test]
    fn test_all_day_wall_clock_ignores_zone() {
        let start = EventTime::Date(NaiveDate::from_ymd_opt(2025, 10, 25).unwrap());
        let west = Tz::Tz(chrono_tz::America::Los_Angeles);
        let east = Tz::Tz(chrono_tz::Asia::Tokyo);

        assert_eq!(start.wall_clock(&west), start.wall_clock(&east));
        assert_eq!(start.to_ics_string(), "20251025");
    }
}
