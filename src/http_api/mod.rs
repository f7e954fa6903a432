use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{
    AcademicSession, AttendanceRecord, AttendanceTotals, BookError, Exam, Holiday, HolidayImport,
    Projector, SessionBook, SubjectEligibility, SubjectEntry, SubjectPolicy,
};

#[derive(Clone)]
pub struct AppState {
    book: Arc<RwLock<SessionBook>>,
    projector: Arc<Projector>,
}

impl AppState {
    pub fn new(book: SessionBook, projector: Projector) -> Self {
        Self {
            book: Arc::new(RwLock::new(book)),
            projector: Arc::new(projector),
        }
    }

    pub fn with_shared(book: Arc<RwLock<SessionBook>>, projector: Projector) -> Self {
        Self {
            book,
            projector: Arc::new(projector),
        }
    }

    fn book(&self) -> Arc<RwLock<SessionBook>> {
        self.book.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
}

impl From<BookError> for ApiError {
    fn from(value: BookError) -> Self {
        let message = value.to_string();
        match value {
            BookError::UnknownSubject(_) | BookError::UnknownSession(_) => {
                ApiError::NotFound(message)
            }
            BookError::DuplicateSubject(_)
            | BookError::DuplicateAttendance { .. }
            | BookError::DuplicateExam(_)
            | BookError::DuplicateHoliday(_)
            | BookError::DuplicateSession(_) => ApiError::Conflict(message),
            BookError::StartAfterEnd { .. }
            | BookError::HolidayOutsideSession { .. }
            | BookError::InvalidData(_) => ApiError::Invalid(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct TodayQuery {
    today: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkingDaysBody {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub working_days: i64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/session", get(get_session))
        .route("/subjects", get(list_subjects).post(create_subject))
        .route("/subjects/:name/attendance", post(record_attendance))
        .route("/subjects/:name/eligibility", get(subject_eligibility))
        .route("/dashboard", get(dashboard))
        .route("/exams", get(list_exams).post(create_exam))
        .route("/holidays", get(list_holidays))
        .route("/holidays/import", post(import_holidays))
        .route("/working-days", get(working_days))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_session(State(state): State<AppState>) -> Json<AcademicSession> {
    let book = state.book();
    let session = book.read().session().clone();
    Json(session)
}

async fn list_subjects(State(state): State<AppState>) -> Json<Vec<SubjectEntry>> {
    let book = state.book();
    let subjects = book.read().subjects().cloned().collect();
    Json(subjects)
}

async fn create_subject(
    State(state): State<AppState>,
    Json(policy): Json<SubjectPolicy>,
) -> Result<(StatusCode, Json<SubjectEntry>), ApiError> {
    let book = state.book();
    let created = {
        let mut guard = book.write();
        let name = policy.name.clone();
        guard.add_subject(policy)?;
        guard
            .subject(&name)
            .cloned()
            .ok_or(BookError::UnknownSubject(name))?
    };
    info!(subject = %created.policy.name, "subject created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn record_attendance(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(record): Json<AttendanceRecord>,
) -> Result<(StatusCode, Json<AttendanceTotals>), ApiError> {
    let book = state.book();
    let totals = {
        let mut guard = book.write();
        guard.record_attendance(&name, record)?;
        guard.totals_for(&name)?
    };
    Ok((StatusCode::CREATED, Json(totals)))
}

async fn subject_eligibility(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<TodayQuery>,
) -> Result<Json<SubjectEligibility>, ApiError> {
    let book = state.book();
    let summary = book
        .read()
        .eligibility_for(&name, &state.projector, query.today)?;
    Ok(Json(summary))
}

async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<TodayQuery>,
) -> Json<Vec<SubjectEligibility>> {
    let book = state.book();
    let summaries = book.read().dashboard(&state.projector, query.today);
    Json(summaries)
}

async fn list_exams(State(state): State<AppState>) -> Json<Vec<Exam>> {
    let book = state.book();
    let exams = book.read().exams().to_vec();
    Json(exams)
}

async fn create_exam(
    State(state): State<AppState>,
    Json(exam): Json<Exam>,
) -> Result<(StatusCode, Json<Exam>), ApiError> {
    let book = state.book();
    book.write().add_exam(exam.clone())?;
    Ok((StatusCode::CREATED, Json(exam)))
}

async fn list_holidays(State(state): State<AppState>) -> Json<Vec<Holiday>> {
    let book = state.book();
    let holidays = book.read().holidays().cloned().collect();
    Json(holidays)
}

async fn import_holidays(State(state): State<AppState>, body: String) -> Json<HolidayImport> {
    let book = state.book();
    let import = book.write().import_holiday_text(&body);
    Json(import)
}

async fn working_days(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Json<WorkingDaysBody> {
    let book = state.book();
    let calendar = book.read().calendar();
    Json(WorkingDaysBody {
        start: query.start,
        end: query.end,
        working_days: calendar.count_working_days(query.start, query.end),
    })
}
