pub mod agenda;
pub mod calendars;
pub mod import_contacts;
