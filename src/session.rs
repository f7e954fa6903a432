use crate::error::{BookError, BookResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive date range of an academic session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionBounds {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl SessionBounds {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> BookResult<Self> {
        let bounds = Self {
            start_date,
            end_date,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> BookResult<()> {
        if self.start_date > self.end_date {
            return Err(BookError::StartAfterEnd {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicSession {
    /// e.g. "Odd Semester 2024-2025"
    pub name: String,
    pub bounds: SessionBounds,
    #[serde(default)]
    pub is_current: bool,
}

impl AcademicSession {
    pub fn new(name: impl Into<String>, bounds: SessionBounds) -> Self {
        Self {
            name: name.into(),
            bounds,
            is_current: false,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.bounds.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.bounds.end_date
    }
}
