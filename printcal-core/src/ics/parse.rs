//! ICS file parsing using the icalendar crate's parser.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};
use rrule::Tz;
use tracing::{debug, warn};

use super::ORDINAL_DISPLAY_PROPERTY;
use crate::calendar::{Calendar, DEFAULT_PROD_ID, DEFAULT_VERSION};
use crate::dates::{from_wall_clock, utc_midnight};
use crate::error::CalendarParseError;
use crate::event::{
    Event, EventDuration, EventTime, MISSING_SUMMARY, OrdinalDisplay, RecurrenceRule,
};

/// Parse ICS content into a Calendar.
///
/// Two gaps are repaired rather than rejected: a missing SUMMARY becomes
/// "(No title)", and an event with neither DURATION nor DTEND lasts one hour.
pub fn parse_calendar(content: &str) -> Result<Calendar, CalendarParseError> {
    let unfolded = unfold(content);

    let body = unfolded.trim_start_matches('\u{feff}').trim_start();
    if !body.starts_with("BEGIN:VCALENDAR") {
        return Err(CalendarParseError::Malformed(
            "missing BEGIN:VCALENDAR".to_string(),
        ));
    }

    let calendar = read_calendar(body).map_err(|e| CalendarParseError::Malformed(e.to_string()))?;

    let header = |name: &str| {
        calendar
            .properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.val.to_string())
    };
    let version = header("VERSION").unwrap_or_else(|| DEFAULT_VERSION.to_string());
    let prod_id = header("PRODID").unwrap_or_else(|| DEFAULT_PROD_ID.to_string());

    let events = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .map(parse_event)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Calendar {
        version,
        prod_id,
        events,
    })
}

fn parse_event(vevent: &Component) -> Result<Event, CalendarParseError> {
    let uid = required(vevent, "UID")?.val.to_string();

    let stamp = match parse_time_property(required(vevent, "DTSTAMP")?)? {
        EventTime::DateTime(dt) => dt,
        EventTime::Date(d) => utc_midnight(d),
    };
    let start = parse_time_property(required(vevent, "DTSTART")?)?;
    let end = vevent.find_prop("DTEND").map(parse_time_property).transpose()?;

    let mut duration = vevent
        .find_prop("DURATION")
        .map(|p| {
            p.val
                .as_ref()
                .parse::<EventDuration>()
                .map_err(|_| CalendarParseError::invalid("DURATION", p.val.as_ref()))
        })
        .transpose()?;

    let summary = match vevent.find_prop("SUMMARY") {
        Some(p) => unescape_text(p.val.as_ref()),
        None => {
            debug!(uid = %uid, "Event has no SUMMARY, using placeholder");
            MISSING_SUMMARY.to_string()
        }
    };

    if duration.is_none() && end.is_none() {
        debug!(uid = %uid, "Event has neither DURATION nor DTEND, assuming one hour");
        duration = Some(EventDuration::hours(1));
    }

    let recurrence_rule = vevent
        .find_prop("RRULE")
        .map(|p| p.val.as_ref().parse::<RecurrenceRule>())
        .transpose()?;

    let ordinal_display = vevent
        .find_prop(ORDINAL_DISPLAY_PROPERTY)
        .map(|p| serde_json::from_str::<OrdinalDisplay>(p.val.as_ref()))
        .transpose()?;

    Ok(Event {
        stamp,
        start,
        end,
        duration,
        summary,
        uid,
        recurrence_rule,
        ordinal_display,
    })
}

fn required<'a>(
    vevent: &'a Component<'a>,
    property: &'static str,
) -> Result<&'a Property<'a>, CalendarParseError> {
    vevent
        .find_prop(property)
        .ok_or(CalendarParseError::MissingProperty { property })
}

fn parse_time_property(prop: &Property) -> Result<EventTime, CalendarParseError> {
    DatePerhapsTime::try_from(prop)
        .map(to_event_time)
        .map_err(|_| CalendarParseError::invalid(prop.name.as_ref(), prop.val.as_ref()))
}

/// Convert icalendar's DatePerhapsTime to our EventTime.
///
/// Dates stay plain calendar dates. Floating times are read as process-local
/// wall-clock time, as are zoned times whose TZID chrono-tz doesn't know.
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => EventTime::DateTime(dt),
            CalendarDateTime::Floating(naive) => floating_to_event_time(naive, &Tz::LOCAL),
            CalendarDateTime::WithTimezone { date_time, tzid } => {
                let zone = match tzid.parse::<chrono_tz::Tz>() {
                    Ok(tz) => Tz::Tz(tz),
                    Err(_) => {
                        warn!(tzid = %tzid, "Unknown TZID, reading time as local");
                        Tz::LOCAL
                    }
                };
                floating_to_event_time(date_time, &zone)
            }
        },
    }
}

/// Wall-clock time in `zone` to an instant. A time skipped by a DST jump
/// keeps the offset in force before the jump, so 02:30 becomes 03:30.
fn floating_to_event_time(naive: NaiveDateTime, zone: &Tz) -> EventTime {
    let instant = from_wall_clock(naive, zone)
        .or_else(|| from_wall_clock(naive + Duration::hours(1), zone))
        .unwrap_or_else(|| naive.and_utc());
    EventTime::DateTime(instant)
}

/// Parse a bare DATE or DATE-TIME value, as found in RRULE's UNTIL.
pub(super) fn parse_time_value(value: &str) -> Option<EventTime> {
    let value = value.trim();

    if value.len() == 8 {
        return NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .map(EventTime::Date);
    }

    if let Some(utc) = value.strip_suffix('Z') {
        return NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S")
            .ok()
            .map(|dt| EventTime::DateTime(dt.and_utc()));
    }

    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
        .ok()
        .map(|dt| floating_to_event_time(dt, &Tz::LOCAL))
}

/// Unescape ICS TEXT values per RFC 5545
/// Reverses: \, → , and \; → ; and \\ → \ and \n → newline
pub(super) fn unescape_text(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some(&next @ (',' | ';' | '\\')) => {
                result.push(next);
                chars.next();
            }
            Some('n') | Some('N') => {
                result.push('\n');
                chars.next();
            }
            _ => result.push(c),
        }
    }

    result
}
