//! Core of printcal: calendars kept as .ics files, laid out day by day.
//!
//! - `ics` reads and writes calendar text
//! - `recurrence` expands an event into the occurrences within a date range
//! - `index` groups a whole collection's occurrences by calendar day
//! - `storage`, `contacts` and `config` are the file-facing collaborators

pub mod calendar;
pub mod config;
pub mod contacts;
pub mod dates;
pub mod display;
pub mod error;
pub mod event;
pub mod ics;
pub mod index;
pub mod recurrence;
pub mod storage;

// Re-export the types callers handle most
pub use calendar::{Calendar, Collection, DEFAULT_CALENDAR_NAME};
pub use dates::DateRange;
pub use error::{CalendarParseError, ConfigParseError, ContactsError, PrintCalError, PrintCalResult};
pub use event::*;
pub use index::{EventOccurrence, index_by_date};
pub use recurrence::occurrences_in_range;

/// Display zone for wall-clock expansion (`Tz::LOCAL`, `Tz::UTC` or a named zone).
pub use rrule::Tz;
