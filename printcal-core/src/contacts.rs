//! Birthdays and anniversaries from a contacts CSV export.
//!
//! Reads the Google Contacts export layout. Each contact's birthday and first
//! labelled event become yearly all-day events with ordinal text, so the
//! agenda shows "Bob Jones 30th Birthday".

use chrono::NaiveDate;
use tracing::debug;

use crate::calendar::Calendar;
use crate::error::ContactsError;
use crate::event::{Event, EventTime, Frequency, OrdinalDisplay, RecurrenceRule};

pub const FIRST_NAME: &str = "First Name";
pub const LAST_NAME: &str = "Last Name";
pub const BIRTHDAY: &str = "Birthday";
pub const EVENT_LABEL: &str = "Event 1 - Label";
pub const EVENT_DATE: &str = "Event 1 - Value";

const BIRTHDAY_LABEL: &str = "Birthday";

struct Columns {
    first_name: usize,
    last_name: usize,
    birthday: usize,
    event_label: usize,
    event_date: usize,
}

impl Columns {
    fn locate(headers: &[String]) -> Result<Self, Vec<ContactsError>> {
        let find = |header: &'static str| {
            headers
                .iter()
                .position(|h| h == header)
                .ok_or(ContactsError::MissingHeader { header })
        };

        match [FIRST_NAME, LAST_NAME, BIRTHDAY, EVENT_LABEL, EVENT_DATE].map(find) {
            [
                Ok(first_name),
                Ok(last_name),
                Ok(birthday),
                Ok(event_label),
                Ok(event_date),
            ] => Ok(Columns {
                first_name,
                last_name,
                birthday,
                event_label,
                event_date,
            }),
            found => Err(found.into_iter().filter_map(Result::err).collect()),
        }
    }
}

/// Convert a contacts CSV export into a calendar.
///
/// Every problem found is reported; a file with any error produces no
/// calendar.
pub fn convert_contacts(content: &str) -> Result<Calendar, Vec<ContactsError>> {
    let rows = read_rows(content).map_err(|e| vec![e])?;

    let Some((headers, rows)) = rows.split_first() else {
        return Err(vec![ContactsError::Empty]);
    };
    let columns = Columns::locate(headers)?;

    let mut calendar = Calendar::new();
    let mut errors = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        if row.len() != headers.len() {
            errors.push(ContactsError::ColumnCountMismatch {
                row: i + 1,
                found: row.len(),
                expected: headers.len(),
            });
            continue;
        }

        let name = format!("{} {}", row[columns.first_name], row[columns.last_name])
            .trim()
            .to_string();

        if let Some(date) = parse_contact_date(&row[columns.birthday]) {
            calendar.add_event(contact_event(&name, BIRTHDAY_LABEL, date));
        }

        let label = row[columns.event_label].trim();
        if !label.is_empty()
            && let Some(date) = parse_contact_date(&row[columns.event_date])
        {
            calendar.add_event(contact_event(&name, label, date));
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(calendar)
}

fn read_rows(content: &str) -> Result<Vec<Vec<String>>, ContactsError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    reader
        .records()
        .map(|result| {
            result
                .map(|record| record.iter().map(str::to_string).collect())
                .map_err(|e| ContactsError::Unreadable(e.to_string()))
        })
        .collect()
}

/// Full `YYYY-MM-DD` dates only. Year-less birthdays (`--05-22`) are skipped.
fn parse_contact_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok();
    if date.is_none() {
        debug!(value, "Skipping unparseable contact date");
    }
    date
}

fn contact_event(name: &str, label: &str, date: NaiveDate) -> Event {
    Event {
        start: EventTime::Date(date),
        summary: format!("{} {}", name, label),
        recurrence_rule: Some(RecurrenceRule::new(Frequency::Yearly)),
        ordinal_display: Some(OrdinalDisplay {
            before: name.to_string(),
            after: label.to_string(),
        }),
        ..Event::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const HEADERS: &str = "First Name,Last Name,Birthday,Event 1 - Label,Event 1 - Value\n";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_file() {
        assert_eq!(convert_contacts("").unwrap_err(), vec![ContactsError::Empty]);
    }

    #[test]
    fn test_missing_headers_are_all_reported() {
        let errors = convert_contacts("not,right\n").unwrap_err();

        assert_eq!(
            errors,
            [FIRST_NAME, LAST_NAME, BIRTHDAY, EVENT_LABEL, EVENT_DATE]
                .map(|header| ContactsError::MissingHeader { header })
                .to_vec()
        );
        assert_eq!(
            errors[0].to_string(),
            "Expected a column heading of First Name but it wasn't found."
        );
    }

    #[test]
    fn test_short_row_is_reported() {
        let errors = convert_contacts(&format!("{}a,b\n", HEADERS)).unwrap_err();

        assert_eq!(
            errors,
            vec![ContactsError::ColumnCountMismatch {
                row: 1,
                found: 2,
                expected: 5
            }]
        );
    }

    #[test]
    fn test_headers_only_gives_empty_calendar() {
        let calendar = convert_contacts(HEADERS).unwrap();
        assert!(calendar.events.is_empty());
    }

    #[test]
    fn test_birthday_and_event_become_yearly_events() {
        let csv = indoc! {"
            First Name,Last Name,Birthday,Event 1 - Label,Event 1 - Value
            Bob,Jones,2023-05-22,Anniversary,2019-09-14
            Alice,,--03-01,,
        "};

        let calendar = convert_contacts(csv).unwrap();

        assert_eq!(calendar.events.len(), 2);

        let birthday = &calendar.events[0];
        assert_eq!(birthday.summary, "Bob Jones Birthday");
        assert_eq!(birthday.start, EventTime::Date(date(2023, 5, 22)));
        assert_eq!(birthday.recurrence_rule, Some(RecurrenceRule::new(Frequency::Yearly)));
        assert_eq!(
            birthday.ordinal_display,
            Some(OrdinalDisplay {
                before: "Bob Jones".to_string(),
                after: "Birthday".to_string(),
            })
        );

        let anniversary = &calendar.events[1];
        assert_eq!(anniversary.summary, "Bob Jones Anniversary");
        assert_eq!(anniversary.start, EventTime::Date(date(2019, 9, 14)));
        assert_ne!(birthday.uid, anniversary.uid);
    }

    #[test]
    fn test_event_without_label_is_skipped() {
        let csv = format!("{}Bob,Jones,,,2019-09-14\n", HEADERS);
        assert!(convert_contacts(&csv).unwrap().events.is_empty());
    }

    #[test]
    fn test_fields_are_trimmed() {
        let csv = indoc! {"
            First Name, Last Name, Birthday, Event 1 - Label, Event 1 - Value
            Bob, Jones, 2023-05-22,,
        "};

        let calendar = convert_contacts(csv).unwrap();

        assert_eq!(calendar.events.len(), 1);
        assert_eq!(calendar.events[0].summary, "Bob Jones Birthday");
        assert_eq!(calendar.events[0].start, EventTime::Date(date(2023, 5, 22)));
    }

    #[test]
    fn test_headers_can_be_in_any_order() {
        let csv = indoc! {"
            Birthday,Event 1 - Value,Event 1 - Label,Last Name,First Name,Notes
            1990-01-31,,,Smith,Jo,likes cake
        "};

        let calendar = convert_contacts(csv).unwrap();

        assert_eq!(calendar.events.len(), 1);
        assert_eq!(calendar.events[0].summary, "Jo Smith Birthday");
    }
}
