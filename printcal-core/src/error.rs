//! Error types for printcal.

use thiserror::Error;

/// A calendar file could not be read. Always fatal to the single parse call.
#[derive(Error, Debug)]
pub enum CalendarParseError {
    #[error("Error reading calendar file: {0}")]
    Malformed(String),

    #[error("Error reading calendar file: event is missing {property}")]
    MissingProperty { property: &'static str },

    #[error("Error reading calendar file: invalid {property} value '{value}'")]
    InvalidValue { property: String, value: String },

    #[error("Error reading calendar file: invalid ordinal display: {0}")]
    InvalidOrdinalDisplay(#[from] serde_json::Error),
}

impl CalendarParseError {
    pub(crate) fn invalid(property: impl Into<String>, value: impl Into<String>) -> Self {
        CalendarParseError::InvalidValue {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// The persisted user configuration could not be read.
#[derive(Error, Debug)]
pub enum ConfigParseError {
    #[error("Error reading config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Error reading config file: {0}")]
    Config(#[from] config::ConfigError),
}

/// A contacts export could not be turned into a calendar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactsError {
    #[error("Contacts file is empty.")]
    Empty,

    #[error("Expected a column heading of {header} but it wasn't found.")]
    MissingHeader { header: &'static str },

    #[error(
        "Row number {row} has {found} values but the headers have {expected} values. Unable to convert this row."
    )]
    ColumnCountMismatch {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("Contacts file could not be read: {0}")]
    Unreadable(String),
}

/// Errors that can occur in printcal operations.
#[derive(Error, Debug)]
pub enum PrintCalError {
    #[error(transparent)]
    CalendarParse(#[from] CalendarParseError),

    #[error(transparent)]
    ConfigParse(#[from] ConfigParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid calendar name '{0}'")]
    InvalidCalendarName(String),

    #[error("Recurrence error: {0}")]
    Recurrence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for printcal operations.
pub type PrintCalResult<T> = Result<T, PrintCalError>;
