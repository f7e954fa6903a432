//! Error types for the attendance tool.

use chrono::NaiveDate;

/// Precondition violations raised by the session book before data reaches
/// the projection engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BookError {
    #[error("session start date {start} must be on or before session end date {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },

    #[error("subject '{0}' already exists in this session")]
    DuplicateSubject(String),

    #[error("subject '{0}' not found")]
    UnknownSubject(String),

    #[error("an attendance record for '{subject}' on {date} already exists")]
    DuplicateAttendance { subject: String, date: NaiveDate },

    #[error("an exam of type '{0}' already exists for this session")]
    DuplicateExam(String),

    #[error("holiday on {0} already exists for this session")]
    DuplicateHoliday(NaiveDate),

    #[error("holiday date {date} is outside the session dates ({start} to {end})")]
    HolidayOutsideSession {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("session '{0}' already exists")]
    DuplicateSession(String),

    #[error("session '{0}' not found")]
    UnknownSession(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Failures while reading or writing snapshot and import files.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Book(#[from] BookError),
}

/// Failures while loading a projection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("average_working_days_per_week must be finite and positive, got {0}")]
    InvalidAverageWorkingDays(f64),
}

pub type BookResult<T> = Result<T, BookError>;
pub type SnapshotResult<T> = Result<T, SnapshotError>;
