//! ICS file generation and parsing.
//!
//! This module handles reading and writing .ics files according to RFC 5545,
//! plus the one vendor property printcal adds to VEVENTs.

mod generate;
mod parse;
mod rule;

pub use generate::serialize_calendar;
pub use parse::parse_calendar;

/// Vendor property carrying an event's [`OrdinalDisplay`](crate::event::OrdinalDisplay)
/// as a JSON object.
pub const ORDINAL_DISPLAY_PROPERTY: &str = "X-PRINTCAL-ORDINAL-DISPLAY";
