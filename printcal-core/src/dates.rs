//! Wall-clock date primitives.
//!
//! Everything the engine compares is a wall-clock `NaiveDateTime` in the
//! caller's display zone. All-day dates never pass through UTC, so a local
//! date stays the same calendar day whatever the process offset is.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use rrule::Tz;

/// Inclusive range of wall-clock date-times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        DateRange { start, end }
    }

    /// Range covering every instant of the calendar days `start..=end`.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange {
            start: local_midnight(start),
            end: end_of_day(end),
        }
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let next_month = first
            .checked_add_months(chrono::Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        Self::from_dates(first, next_month.pred_opt().unwrap_or(first))
    }

    /// Parse `YYYY-MM-DD` arguments. Missing bounds default to the month
    /// containing `today`.
    pub fn from_args(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> Result<Self, String> {
        let month = Self::month_of(today);

        let start = match from {
            Some(s) => local_midnight(parse_date(s)?),
            None => month.start,
        };
        let end = match to {
            Some(s) => end_of_day(parse_date(s)?),
            None => month.end,
        };

        Ok(DateRange { start, end })
    }

    /// True when `end < start`; such a range contains nothing.
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, date: NaiveDateTime) -> bool {
        date >= self.start && date <= self.end
    }

    /// Every calendar day touched by the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let last = self.end.date();
        let first = self.start.date();
        let empty = self.is_empty();
        first
            .iter_days()
            .take_while(move |d| !empty && *d <= last)
    }
}

/// Key for grouping by calendar day.
pub fn date_key(date: NaiveDateTime) -> NaiveDate {
    date.date()
}

/// True if both values fall on the same calendar day.
pub fn dates_equal(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    date_key(a) == date_key(b)
}

pub fn local_midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
        .map(|last| date.and_time(last))
        .unwrap_or_else(|| local_midnight(date))
}

/// Midnight UTC on the given calendar day.
pub fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    local_midnight(date).and_utc()
}

/// Express an absolute instant as wall-clock time in `zone`.
pub fn to_wall_clock(instant: DateTime<Utc>, zone: &Tz) -> NaiveDateTime {
    instant.with_timezone(zone).naive_local()
}

/// Resolve wall-clock time in `zone` back to an instant. Times skipped by a
/// DST jump resolve to `None`; ambiguous ones take the earlier instant.
pub fn from_wall_clock(wall: NaiveDateTime, zone: &Tz) -> Option<DateTime<Utc>> {
    zone.from_local_datetime(&wall)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Today's date in `zone`.
pub fn today(zone: &Tz) -> NaiveDate {
    to_wall_clock(Utc::now(), zone).date()
}

pub(crate) fn month_start(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (month_start(year, month), next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 31,
    }
}

/// Parse YYYY-MM-DD.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}
