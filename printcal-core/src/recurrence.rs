//! Recurrence expansion.
//!
//! Produces the wall-clock start of every occurrence of an event that falls
//! inside a [`DateRange`]. Rules are evaluated in the display zone's wall
//! clock, so a weekly 09:00 meeting stays at 09:00 across DST changes.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use rrule::{RRuleSet, Tz};
use tracing::debug;

use crate::dates::{DateRange, days_in_month, month_start};
use crate::error::{PrintCalError, PrintCalResult};
use crate::event::{Event, EventTime, Frequency, RecurrenceRule, WeekdayNum};

/// Upper bound on occurrences collected from a single rule per call.
const EXPANSION_LIMIT: u16 = u16::MAX;

/// Start times of every occurrence of `event` within `range`, ascending.
///
/// A non-recurring event yields its own start if it lies in range. All-day
/// events start at midnight on their calendar date.
pub fn occurrences_in_range(
    event: &Event,
    range: &DateRange,
    zone: &Tz,
) -> PrintCalResult<Vec<NaiveDateTime>> {
    if range.is_empty() {
        return Ok(Vec::new());
    }

    let start = event.start.wall_clock(zone);

    let Some(rule) = &event.recurrence_rule else {
        return Ok(if range.contains(start) { vec![start] } else { Vec::new() });
    };

    if rule.count == Some(0) {
        return Ok(Vec::new());
    }
    let until = rule.until.map(|u| until_wall_clock(&u, zone));
    if until.is_some_and(|u| u < start) {
        return Ok(Vec::new());
    }

    let mut dates = if rule.frequency == Frequency::Monthly && !rule.by_day.is_empty() {
        monthly_by_weekday(start, rule, until, range)
    } else {
        expand_with_rrule(event, start, rule, until, range)?
    };

    dates.retain(|d| range.contains(*d));
    dates.sort();
    dates.dedup();
    Ok(dates)
}

/// UNTIL as wall-clock time. A date bound includes its whole day.
fn until_wall_clock(until: &EventTime, zone: &Tz) -> NaiveDateTime {
    match until {
        EventTime::Date(d) => d.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::seconds(1),
        EventTime::DateTime(_) => until.wall_clock(zone),
    }
}

/// Strip the parts of `rule` that have no meaning for its frequency.
///
/// Plain weekdays only filter weekly rules; ordinal weekdays only make sense
/// for monthly and yearly ones. A yearly ordinal counts within its month, so
/// without BYMONTH it is pinned to the month of `start`.
fn normalize_for_rrule(
    rule: &RecurrenceRule,
    start: NaiveDateTime,
    until: Option<NaiveDateTime>,
) -> RecurrenceRule {
    let by_day = match rule.frequency {
        Frequency::Daily => Vec::new(),
        Frequency::Weekly => rule.by_day.iter().map(|wd| WeekdayNum::every(wd.day)).collect(),
        Frequency::Monthly | Frequency::Yearly => rule
            .by_day
            .iter()
            .filter(|wd| wd.occurrence.is_some_and(|n| n != 0 && (-53..=53).contains(&n)))
            .copied()
            .collect(),
    };
    let by_month_day = match rule.frequency {
        Frequency::Weekly => Vec::new(),
        _ => rule
            .by_month_day
            .iter()
            .filter(|d| **d != 0 && (-31..=31).contains(*d))
            .copied()
            .collect(),
    };

    let by_month = if rule.frequency == Frequency::Yearly
        && rule.by_month.is_empty()
        && by_day.iter().any(|wd| wd.occurrence.is_some())
    {
        vec![start.month() as u8]
    } else {
        rule.by_month.clone()
    };

    if by_day.len() != rule.by_day.len() || by_month_day.len() != rule.by_month_day.len() {
        debug!(rule = %rule, "Dropped BYDAY/BYMONTHDAY entries that do not apply to the frequency");
    }

    RecurrenceRule {
        frequency: rule.frequency,
        interval: (rule.interval() > 1).then(|| rule.interval()),
        count: rule.count,
        // Wall-clock values are handed to the rrule crate as if they were UTC
        until: until.map(|u| EventTime::DateTime(u.and_utc())),
        by_day,
        by_month_day,
        by_month,
    }
}

fn expand_with_rrule(
    event: &Event,
    start: NaiveDateTime,
    rule: &RecurrenceRule,
    until: Option<NaiveDateTime>,
    range: &DateRange,
) -> PrintCalResult<Vec<NaiveDateTime>> {
    let rule = normalize_for_rrule(rule, start, until);
    let rrule_str = format!("DTSTART:{}Z\nRRULE:{}", start.format("%Y%m%dT%H%M%S"), rule);

    let rrule_set: RRuleSet = rrule_str.parse().map_err(|e| {
        PrintCalError::Recurrence(format!(
            "Failed to parse RRULE for event '{}': {}",
            event.uid, e
        ))
    })?;

    // after/before are exclusive
    let after = (range.start.and_utc() - Duration::seconds(1)).with_timezone(&Tz::UTC);
    let before = (range.end.and_utc() + Duration::seconds(1)).with_timezone(&Tz::UTC);

    let result = rrule_set.after(after).before(before).all(EXPANSION_LIMIT);

    Ok(result.dates.iter().map(|d| d.naive_utc()).collect())
}

/// Monthly rules with ordinal weekdays, e.g. `FREQ=MONTHLY;BYDAY=-1SA,4SU`.
///
/// Each month in the rule's interval contributes its matching days in date
/// order. COUNT is spent across the combined days and the start itself only
/// counts when it matches.
fn monthly_by_weekday(
    start: NaiveDateTime,
    rule: &RecurrenceRule,
    until: Option<NaiveDateTime>,
    range: &DateRange,
) -> Vec<NaiveDateTime> {
    let (positive, negative): (Vec<(i8, Weekday)>, Vec<(i8, Weekday)>) = rule
        .by_day
        .iter()
        .filter_map(|wd| match wd.occurrence {
            Some(n) if n != 0 => Some((n, wd.day)),
            _ => None,
        })
        .partition(|(n, _)| *n > 0);

    if positive.is_empty() && negative.is_empty() {
        debug!(rule = %rule, "Monthly rule has no ordinal weekdays, nothing to expand");
        return Vec::new();
    }

    let Some(first_month) = month_start(start.year(), start.month()) else {
        return Vec::new();
    };
    let interval = u32::from(rule.interval());
    let time = start.time();

    let mut dates = Vec::new();
    let mut emitted = 0u32;

    for step in 0u32.. {
        let Some(month) = step
            .checked_mul(interval)
            .and_then(|m| first_month.checked_add_months(Months::new(m)))
        else {
            break;
        };
        let month_begins = month.and_time(NaiveTime::MIN);
        if month_begins > range.end || until.is_some_and(|u| month_begins > u) {
            break;
        }

        let (year, m) = (month.year(), month.month());
        if !rule.by_month.is_empty() && !rule.by_month.contains(&(m as u8)) {
            continue;
        }
        let mut candidates: Vec<NaiveDate> = positive
            .iter()
            .filter_map(|(n, day)| nth_weekday(year, m, *day, *n))
            .chain(negative.iter().filter_map(|(n, day)| nth_last_weekday(year, m, *day, *n)))
            .filter(|d| matches_month_day(d, &rule.by_month_day))
            .collect();
        candidates.sort();
        candidates.dedup();

        for date in candidates {
            let at = date.and_time(time);
            if at < start {
                continue;
            }
            if until.is_some_and(|u| at > u) {
                return dates;
            }

            emitted += 1;
            if range.contains(at) {
                dates.push(at);
            }
            if rule.count.is_some_and(|c| emitted >= c) {
                return dates;
            }
        }
    }

    dates
}

/// The `n`th (1-based) `day` of the month, if the month has one.
fn nth_weekday(year: i32, month: u32, day: Weekday, n: i8) -> Option<NaiveDate> {
    let n = u8::try_from(n).ok()?;
    NaiveDate::from_weekday_of_month_opt(year, month, day, n)
}

/// The `n`th-from-last `day` of the month, `n` negative.
fn nth_last_weekday(year: i32, month: u32, day: Weekday, n: i8) -> Option<NaiveDate> {
    let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))?;
    let back = (last.weekday().num_days_from_monday() + 7 - day.num_days_from_monday()) % 7;
    let weeks_back = i64::from(n.unsigned_abs()) - 1;
    let date = last - Duration::days(i64::from(back) + 7 * weeks_back);
    (date.month() == month).then_some(date)
}

fn matches_month_day(date: &NaiveDate, by_month_day: &[i8]) -> bool {
    if by_month_day.is_empty() {
        return true;
    }
    let dim = days_in_month(date.year(), date.month()) as i32;
    by_month_day.iter().any(|&md| {
        let md = i32::from(md);
        let wanted = if md < 0 { dim + md + 1 } else { md };
        wanted == date.day() as i32
    })
}
