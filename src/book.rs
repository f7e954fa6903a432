use crate::calendar::SessionCalendar;
use crate::eligibility::{EligibilityVerdict, Projector};
use crate::error::{BookError, BookResult};
use crate::exam::Exam;
use crate::holiday::Holiday;
use crate::ingest::{self, HolidayImport};
use crate::session::{AcademicSession, SessionBounds};
use crate::subject::{AttendanceRecord, AttendanceTotals, SubjectPolicy};
use crate::validation;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use tracing::info;

/// A subject together with its attendance records, ordered by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectEntry {
    pub policy: SubjectPolicy,
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
}

impl SubjectEntry {
    pub fn totals(&self) -> AttendanceTotals {
        AttendanceTotals::from_records(&self.records)
    }
}

/// Per-subject summary handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectEligibility {
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub totals: AttendanceTotals,
    pub current_percentage: f64,
    pub verdicts: Vec<EligibilityVerdict>,
}

/// All records of one academic session. Every mutation checks the
/// preconditions the projection engine relies on.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionBook {
    session: AcademicSession,
    subjects: BTreeMap<String, SubjectEntry>,
    holidays: BTreeMap<NaiveDate, Holiday>,
    exams: Vec<Exam>,
}

impl SessionBook {
    pub fn new(session: AcademicSession) -> BookResult<Self> {
        session.bounds.validate()?;
        Ok(Self {
            session,
            subjects: BTreeMap::new(),
            holidays: BTreeMap::new(),
            exams: Vec::new(),
        })
    }

    pub fn session(&self) -> &AcademicSession {
        &self.session
    }

    pub fn name(&self) -> &str {
        &self.session.name
    }

    pub fn bounds(&self) -> &SessionBounds {
        &self.session.bounds
    }

    pub(crate) fn set_current_flag(&mut self, is_current: bool) {
        self.session.is_current = is_current;
    }

    pub fn set_bounds(&mut self, bounds: SessionBounds) -> BookResult<()> {
        bounds.validate()?;
        if let Some(outside) = self.holidays.keys().find(|date| !bounds.contains(**date)) {
            return Err(BookError::HolidayOutsideSession {
                date: *outside,
                start: bounds.start_date,
                end: bounds.end_date,
            });
        }
        self.session.bounds = bounds;
        Ok(())
    }

    pub fn add_subject(&mut self, policy: SubjectPolicy) -> BookResult<()> {
        validation::validate_policy(&policy)?;
        if self.subjects.contains_key(&policy.name) {
            return Err(BookError::DuplicateSubject(policy.name));
        }
        self.subjects.insert(
            policy.name.clone(),
            SubjectEntry {
                policy,
                records: Vec::new(),
            },
        );
        Ok(())
    }

    /// Replace a subject's policy, keeping its records
    pub fn update_subject(&mut self, policy: SubjectPolicy) -> BookResult<()> {
        validation::validate_policy(&policy)?;
        let entry = self
            .subjects
            .get_mut(&policy.name)
            .ok_or_else(|| BookError::UnknownSubject(policy.name.clone()))?;
        entry.policy = policy;
        Ok(())
    }

    pub fn remove_subject(&mut self, name: &str) -> bool {
        self.subjects.remove(name).is_some()
    }

    pub fn subject(&self, name: &str) -> Option<&SubjectEntry> {
        self.subjects.get(name)
    }

    /// Subjects ordered by name
    pub fn subjects(&self) -> impl Iterator<Item = &SubjectEntry> {
        self.subjects.values()
    }

    pub fn record_attendance(&mut self, subject: &str, record: AttendanceRecord) -> BookResult<()> {
        validation::validate_record(subject, &record)?;
        let entry = self
            .subjects
            .get_mut(subject)
            .ok_or_else(|| BookError::UnknownSubject(subject.to_string()))?;

        let idx = entry.records.partition_point(|r| r.date < record.date);
        if entry.records.get(idx).is_some_and(|r| r.date == record.date) {
            return Err(BookError::DuplicateAttendance {
                subject: subject.to_string(),
                date: record.date,
            });
        }
        entry.records.insert(idx, record);
        Ok(())
    }

    pub fn records(&self, subject: &str) -> BookResult<&[AttendanceRecord]> {
        self.subjects
            .get(subject)
            .map(|entry| entry.records.as_slice())
            .ok_or_else(|| BookError::UnknownSubject(subject.to_string()))
    }

    pub fn totals_for(&self, subject: &str) -> BookResult<AttendanceTotals> {
        Ok(AttendanceTotals::from_records(self.records(subject)?))
    }

    pub fn add_exam(&mut self, exam: Exam) -> BookResult<()> {
        if exam.exam_type.trim().is_empty() {
            return Err(BookError::InvalidData(
                "exam type must not be empty".to_string(),
            ));
        }
        if let Some(end) = exam.end_date {
            if end < exam.start_date {
                return Err(BookError::InvalidData(format!(
                    "exam '{}' ends on {end} before it starts on {}",
                    exam.exam_type, exam.start_date
                )));
            }
        }
        if self.exams.iter().any(|e| e.exam_type == exam.exam_type) {
            return Err(BookError::DuplicateExam(exam.exam_type));
        }
        let idx = self
            .exams
            .partition_point(|e| e.start_date <= exam.start_date);
        self.exams.insert(idx, exam);
        Ok(())
    }

    pub fn remove_exam(&mut self, exam_type: &str) -> bool {
        let before = self.exams.len();
        self.exams.retain(|e| e.exam_type != exam_type);
        self.exams.len() != before
    }

    /// Exams ordered by start date
    pub fn exams(&self) -> &[Exam] {
        &self.exams
    }

    pub fn add_holiday(&mut self, holiday: Holiday) -> BookResult<()> {
        let bounds = self.bounds();
        if !bounds.contains(holiday.date) {
            return Err(BookError::HolidayOutsideSession {
                date: holiday.date,
                start: bounds.start_date,
                end: bounds.end_date,
            });
        }
        if self.holidays.contains_key(&holiday.date) {
            return Err(BookError::DuplicateHoliday(holiday.date));
        }
        self.holidays.insert(holiday.date, holiday);
        Ok(())
    }

    pub fn remove_holiday(&mut self, date: NaiveDate) -> bool {
        self.holidays.remove(&date).is_some()
    }

    /// Holidays ordered by date
    pub fn holidays(&self) -> impl Iterator<Item = &Holiday> {
        self.holidays.values()
    }

    pub fn holiday_dates(&self) -> HashSet<NaiveDate> {
        self.holidays.keys().copied().collect()
    }

    pub fn calendar(&self) -> SessionCalendar {
        SessionCalendar::from_holidays(self.holidays.keys().copied())
    }

    pub fn import_holiday_text(&mut self, text: &str) -> HolidayImport {
        let import = ingest::parse_holiday_text(text, self.bounds(), &self.holiday_dates());
        self.store_imported(&import);
        import
    }

    pub fn import_holiday_csv<R: Read>(&mut self, reader: R) -> HolidayImport {
        let import = ingest::parse_holiday_csv(reader, self.bounds(), &self.holiday_dates());
        self.store_imported(&import);
        import
    }

    fn store_imported(&mut self, import: &HolidayImport) {
        for holiday in &import.added {
            self.holidays.insert(holiday.date, holiday.clone());
        }
        if !import.added.is_empty() {
            info!(
                session = %self.session.name,
                added = import.added.len(),
                "holidays added to session"
            );
        }
    }

    pub fn eligibility_for(
        &self,
        subject: &str,
        projector: &Projector,
        today: NaiveDate,
    ) -> BookResult<SubjectEligibility> {
        let entry = self
            .subjects
            .get(subject)
            .ok_or_else(|| BookError::UnknownSubject(subject.to_string()))?;
        Ok(self.summarize(entry, &self.calendar(), projector, today))
    }

    /// Eligibility of every subject, ordered by subject name
    pub fn dashboard(&self, projector: &Projector, today: NaiveDate) -> Vec<SubjectEligibility> {
        let calendar = self.calendar();
        let entries: Vec<&SubjectEntry> = self.subjects.values().collect();
        entries
            .par_iter()
            .map(|entry| self.summarize(entry, &calendar, projector, today))
            .collect()
    }

    fn summarize(
        &self,
        entry: &SubjectEntry,
        calendar: &SessionCalendar,
        projector: &Projector,
        today: NaiveDate,
    ) -> SubjectEligibility {
        let totals = entry.totals();
        let verdicts = projector.project_all(
            &entry.policy,
            &totals,
            self.bounds(),
            calendar,
            &self.exams,
            today,
        );
        SubjectEligibility {
            subject: entry.policy.name.clone(),
            code: entry.policy.code.clone(),
            totals,
            current_percentage: totals.current_percentage(),
            verdicts,
        }
    }
}

/// Several sessions of one student, at most one of them current.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    books: Vec<SessionBook>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_session(&mut self, mut book: SessionBook, make_current: bool) -> BookResult<()> {
        if self.books.iter().any(|b| b.name() == book.name()) {
            return Err(BookError::DuplicateSession(book.name().to_string()));
        }
        let make_current = make_current || book.session().is_current;
        if make_current {
            for other in &mut self.books {
                other.set_current_flag(false);
            }
        }
        book.set_current_flag(make_current);
        self.books.push(book);
        Ok(())
    }

    pub fn set_current(&mut self, name: &str) -> BookResult<()> {
        if !self.books.iter().any(|b| b.name() == name) {
            return Err(BookError::UnknownSession(name.to_string()));
        }
        for book in &mut self.books {
            let is_target = book.name() == name;
            book.set_current_flag(is_target);
        }
        Ok(())
    }

    pub fn current(&self) -> Option<&SessionBook> {
        self.books.iter().find(|b| b.session().is_current)
    }

    pub fn current_mut(&mut self) -> Option<&mut SessionBook> {
        self.books.iter_mut().find(|b| b.session().is_current)
    }

    pub fn get(&self, name: &str) -> Option<&SessionBook> {
        self.books.iter().find(|b| b.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SessionBook> {
        self.books.iter_mut().find(|b| b.name() == name)
    }

    /// Sessions with the most recent start date first
    pub fn sessions(&self) -> Vec<&SessionBook> {
        let mut books: Vec<&SessionBook> = self.books.iter().collect();
        books.sort_by(|a, b| b.bounds().start_date.cmp(&a.bounds().start_date));
        books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
