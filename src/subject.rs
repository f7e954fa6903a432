use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Attendance policy of a subject within one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectPolicy {
    /// Subject name, unique within a session.
    pub name: String,
    /// Optional course code (e.g. "CS301").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Theoretical number of classes (lectures/tutorials) per week. Must be positive.
    pub classes_per_week: u32,
    /// Minimum attendance required, as a percentage in `[0, 100]`.
    #[serde(default = "default_minimum_attendance_percentage")]
    pub minimum_attendance_percentage: f64,
}

fn default_minimum_attendance_percentage() -> f64 {
    75.0
}

impl SubjectPolicy {
    pub fn new(name: impl Into<String>, classes_per_week: u32) -> Self {
        Self {
            name: name.into(),
            code: None,
            classes_per_week,
            minimum_attendance_percentage: default_minimum_attendance_percentage(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_minimum_percentage(mut self, percentage: f64) -> Self {
        self.minimum_attendance_percentage = percentage;
        self
    }
}

/// Classes conducted and attended for one subject on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    #[serde(default = "default_classes_conducted")]
    pub classes_conducted: u32,
    #[serde(default)]
    pub classes_attended: u32,
}

fn default_classes_conducted() -> u32 {
    1
}

impl AttendanceRecord {
    pub fn new(date: NaiveDate, classes_conducted: u32, classes_attended: u32) -> Self {
        Self {
            date,
            classes_conducted,
            classes_attended,
        }
    }
}

/// Aggregate of a subject's attendance records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceTotals {
    pub total_conducted: u64,
    pub total_attended: u64,
}

impl AttendanceTotals {
    pub fn new(total_conducted: u64, total_attended: u64) -> Self {
        Self {
            total_conducted,
            total_attended,
        }
    }

    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a AttendanceRecord>,
    {
        records
            .into_iter()
            .fold(Self::default(), |mut totals, record| {
                totals.total_conducted += u64::from(record.classes_conducted);
                totals.total_attended += u64::from(record.classes_attended);
                totals
            })
    }

    pub fn missed(&self) -> u64 {
        self.total_conducted.saturating_sub(self.total_attended)
    }

    /// Attendance so far as a percentage; 0 when nothing has been conducted
    pub fn current_percentage(&self) -> f64 {
        if self.total_conducted == 0 {
            return 0.0;
        }
        self.total_attended as f64 / self.total_conducted as f64 * 100.0
    }
}
