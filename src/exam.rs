use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    /// e.g. "Mid-Semester Exam 1"; unique within a session
    pub exam_type: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Exam {
    pub fn new(exam_type: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            exam_type: exam_type.into(),
            start_date,
            end_date: None,
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Last day whose classes count towards eligibility for this exam.
    pub fn eligibility_cutoff(&self) -> NaiveDate {
        self.start_date - Duration::days(1)
    }
}
