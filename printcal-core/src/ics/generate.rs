//! ICS file generation.

use icalendar::{Component, Property, ValueType};

use super::ORDINAL_DISPLAY_PROPERTY;
use crate::calendar::Calendar;
use crate::error::{PrintCalError, PrintCalResult};
use crate::event::{Event, EventTime};

/// Generate .ics content for a whole calendar.
///
/// All-day dates are written straight from their calendar date, so the day
/// on disk is the day the user picked whatever the process offset is.
pub fn serialize_calendar(calendar: &Calendar) -> PrintCalResult<String> {
    let mut cal = icalendar::Calendar::new();

    for event in &calendar.events {
        cal.push(build_event(event)?);
    }

    let cal = cal.done();

    Ok(rewrite_header(&cal.to_string(), calendar))
}

fn build_event(event: &Event) -> PrintCalResult<icalendar::Event> {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&event.uid);
    ics_event.add_property("DTSTAMP", event.stamp.format("%Y%m%dT%H%M%SZ").to_string());

    add_time_property(&mut ics_event, "DTSTART", &event.start);
    if let Some(ref end) = event.end {
        add_time_property(&mut ics_event, "DTEND", end);
    }
    if let Some(duration) = event.duration {
        ics_event.add_property("DURATION", duration.to_string());
    }

    ics_event.append_property(Property::new("SUMMARY", escape_text(&event.summary)));

    if let Some(ref rule) = event.recurrence_rule {
        ics_event.add_property("RRULE", rule.to_string());
    }

    if let Some(ref ordinal) = event.ordinal_display {
        let json = serde_json::to_string(ordinal)
            .map_err(|e| PrintCalError::Serialization(e.to_string()))?;
        ics_event.add_property(ORDINAL_DISPLAY_PROPERTY, json);
    }

    Ok(ics_event.done())
}

/// Put the calendar's own VERSION and PRODID in place of the icalendar
/// crate's, and drop CALSCALE:GREGORIAN (it's the default).
fn rewrite_header(ics: &str, calendar: &Calendar) -> String {
    let mut result = String::with_capacity(ics.len());
    let mut in_header = true;

    for line in ics.lines() {
        if line.starts_with("BEGIN:") && line != "BEGIN:VCALENDAR" {
            in_header = false;
        }

        if in_header {
            if line.starts_with("VERSION:") {
                result.push_str(&format!("VERSION:{}\r\n", calendar.version));
                continue;
            }
            if line.starts_with("PRODID:") {
                result.push_str(&format!("PRODID:{}\r\n", calendar.prod_id));
                continue;
            }
            if line == "CALSCALE:GREGORIAN" {
                continue;
            }
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// Add a DATE or UTC DATE-TIME property.
fn add_time_property(ics_event: &mut icalendar::Event, name: &str, time: &EventTime) {
    match time {
        EventTime::Date(_) => {
            let mut prop = Property::new(name, time.to_ics_string());
            prop.append_parameter(ValueType::Date);
            ics_event.append_property(prop);
        }
        EventTime::DateTime(_) => {
            ics_event.add_property(name, time.to_ics_string());
        }
    }
}

/// Escape ICS TEXT values per RFC 5545
fn escape_text(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            ',' => result.push_str("\\,"),
            ';' => result.push_str("\\;"),
            '\n' => result.push_str("\\n"),
            '\r' => {}
            _ => result.push(c),
        }
    }
    result
}
