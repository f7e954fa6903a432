pub mod book;
pub mod calendar;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod exam;
pub mod holiday;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod ingest;
#[cfg(any(feature = "cli", feature = "http_api"))]
pub mod logging;
pub mod report;
pub mod session;
pub mod snapshot;
pub mod subject;
pub(crate) mod validation;

pub use book::{SessionBook, SessionRegistry, SubjectEligibility, SubjectEntry};
pub use calendar::{SessionCalendar, working_day_count};
pub use config::ProjectionConfig;
pub use eligibility::{
    EligibilityStatus, EligibilityVerdict, ProjectionMethod, Projector, project_eligibility,
};
pub use error::{BookError, ConfigError, SnapshotError};
pub use exam::Exam;
pub use holiday::Holiday;
pub use ingest::{HolidayImport, RowError};
pub use session::{AcademicSession, SessionBounds};
pub use snapshot::{
    import_attendance_csv, load_attendance_from_csv, load_book_from_json, save_book_to_json,
};
pub use subject::{AttendanceRecord, AttendanceTotals, SubjectPolicy};
