use crate::book::{SessionBook, SubjectEntry};
use crate::error::{SnapshotError, SnapshotResult};
use crate::exam::Exam;
use crate::holiday::Holiday;
use crate::session::AcademicSession;
use crate::subject::AttendanceRecord;
use crate::validation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct BookSnapshot {
    session: AcademicSession,
    #[serde(default)]
    subjects: Vec<SubjectEntry>,
    #[serde(default)]
    holidays: Vec<Holiday>,
    #[serde(default)]
    exams: Vec<Exam>,
}

impl BookSnapshot {
    fn from_book(book: &SessionBook) -> Self {
        Self {
            session: book.session().clone(),
            subjects: book.subjects().cloned().collect(),
            holidays: book.holidays().cloned().collect(),
            exams: book.exams().to_vec(),
        }
    }

    /// Rebuild through the book's own checks so a hand-edited file cannot
    /// smuggle in duplicates or out-of-range dates.
    fn into_book(self) -> SnapshotResult<SessionBook> {
        let mut book = SessionBook::new(self.session)?;
        for holiday in self.holidays {
            book.add_holiday(holiday)?;
        }
        for exam in self.exams {
            book.add_exam(exam)?;
        }
        for entry in self.subjects {
            validation::validate_record_collection(&entry.policy.name, &entry.records)?;
            let name = entry.policy.name.clone();
            book.add_subject(entry.policy)?;
            for record in entry.records {
                book.record_attendance(&name, record)?;
            }
        }
        Ok(book)
    }
}

pub fn save_book_to_json<P: AsRef<Path>>(book: &SessionBook, path: P) -> SnapshotResult<()> {
    let snapshot = BookSnapshot::from_book(book);
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_book_from_json<P: AsRef<Path>>(path: P) -> SnapshotResult<SessionBook> {
    let file = File::open(path)?;
    book_from_json_reader(file)
}

pub fn book_from_json_reader<R: Read>(reader: R) -> SnapshotResult<SessionBook> {
    let snapshot: BookSnapshot = serde_json::from_reader(reader)?;
    snapshot.into_book()
}

pub fn book_to_json_string(book: &SessionBook) -> SnapshotResult<String> {
    Ok(serde_json::to_string_pretty(&BookSnapshot::from_book(book))?)
}

#[derive(Debug, Deserialize)]
struct AttendanceCsvRecord {
    subject: String,
    date: String,
    classes_conducted: u32,
    classes_attended: u32,
}

impl AttendanceCsvRecord {
    fn into_record(self) -> SnapshotResult<(String, AttendanceRecord)> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|e| {
            SnapshotError::InvalidData(format!("invalid date '{}': {e}", self.date))
        })?;
        Ok((
            self.subject.trim().to_string(),
            AttendanceRecord::new(date, self.classes_conducted, self.classes_attended),
        ))
    }
}

/// Import attendance rows (`subject,date,classes_conducted,classes_attended`)
/// into a book. All or nothing: the book is left untouched if any row is
/// invalid. Returns the number of rows added.
pub fn import_attendance_csv<R: Read>(book: &mut SessionBook, reader: R) -> SnapshotResult<usize> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut staged = book.clone();
    let mut added = 0;
    for record in csv_reader.deserialize::<AttendanceCsvRecord>() {
        let (subject, record) = record?.into_record()?;
        staged.record_attendance(&subject, record)?;
        added += 1;
    }
    *book = staged;
    Ok(added)
}

pub fn load_attendance_from_csv<P: AsRef<Path>>(
    book: &mut SessionBook,
    path: P,
) -> SnapshotResult<usize> {
    let file = File::open(path)?;
    import_attendance_csv(book, file)
}
