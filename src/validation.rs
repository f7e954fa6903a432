use crate::error::{BookError, BookResult};
use crate::subject::{AttendanceRecord, SubjectPolicy};
use std::collections::HashSet;

pub fn validate_policy(policy: &SubjectPolicy) -> BookResult<()> {
    if policy.name.trim().is_empty() {
        return Err(BookError::InvalidData(
            "subject name must not be empty".to_string(),
        ));
    }

    if policy.classes_per_week == 0 {
        return Err(BookError::InvalidData(format!(
            "subject '{}' must have at least one class per week",
            policy.name
        )));
    }

    let pct = policy.minimum_attendance_percentage;
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(BookError::InvalidData(format!(
            "subject '{}' has invalid minimum_attendance_percentage {} (must be between 0 and 100)",
            policy.name, pct
        )));
    }

    Ok(())
}

pub fn validate_record(subject: &str, record: &AttendanceRecord) -> BookResult<()> {
    if record.classes_attended > record.classes_conducted {
        return Err(BookError::InvalidData(format!(
            "'{}' on {}: classes_attended {} exceeds classes_conducted {}",
            subject, record.date, record.classes_attended, record.classes_conducted
        )));
    }
    Ok(())
}

/// Checks every record and the (subject, date) uniqueness across the collection.
pub fn validate_record_collection(subject: &str, records: &[AttendanceRecord]) -> BookResult<()> {
    let mut seen_dates = HashSet::with_capacity(records.len());
    for record in records {
        if !seen_dates.insert(record.date) {
            return Err(BookError::DuplicateAttendance {
                subject: subject.to_string(),
                date: record.date,
            });
        }
        validate_record(subject, record)?;
    }
    Ok(())
}
