use crate::calendar::{SessionCalendar, working_day_count};
use crate::config::ProjectionConfig;
use crate::exam::Exam;
use crate::session::SessionBounds;
use crate::subject::{AttendanceTotals, SubjectPolicy};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityStatus {
    ExamPast,
    NotApplicable,
    Ineligible,
    NeedsAttention,
    Good,
    GoodNoMissesLeft,
    GoodAllClassesDone,
}

impl EligibilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EligibilityStatus::ExamPast => "Exam Past",
            EligibilityStatus::NotApplicable => "Not Applicable",
            EligibilityStatus::Ineligible => "Ineligible",
            EligibilityStatus::NeedsAttention => "Needs Attention",
            EligibilityStatus::Good => "Good",
            EligibilityStatus::GoodNoMissesLeft => "Good (No Misses Left)",
            EligibilityStatus::GoodAllClassesDone => "Good (All Classes Done)",
        }
    }

    /// True for `Good` and its refinements
    pub fn is_eligible(&self) -> bool {
        matches!(
            self,
            EligibilityStatus::Good
                | EligibilityStatus::GoodNoMissesLeft
                | EligibilityStatus::GoodAllClassesDone
        )
    }
}

impl fmt::Display for EligibilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the total class count up to an exam was estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMethod {
    HistoricalRate,
    TheoreticalSchedule,
    ExamBeforeSession,
    NotProjected,
}

impl ProjectionMethod {
    pub fn description(&self) -> &'static str {
        match self {
            ProjectionMethod::HistoricalRate => "Based on observed historical class rate.",
            ProjectionMethod::TheoreticalSchedule => {
                "Based on theoretical schedule (insufficient historical data)."
            }
            ProjectionMethod::ExamBeforeSession => "Exam date before session start.",
            ProjectionMethod::NotProjected => "No projection performed.",
        }
    }
}

/// Eligibility of one subject for one exam. Recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub exam_type: String,
    pub exam_start_date: NaiveDate,
    pub status: EligibilityStatus,
    pub detail: String,
    pub projection_method: ProjectionMethod,
    pub total_projected_classes: i64,
    pub classes_remaining_to_be_conducted: i64,
    pub min_required_classes: i64,
    pub classes_to_attend_for_eligibility: i64,
    pub classes_can_miss: i64,
    pub current_percentage: f64,
    pub projected_percentage_if_all_attended: f64,
}

impl EligibilityVerdict {
    fn exam_past(exam: &Exam, totals: &AttendanceTotals) -> Self {
        let current_percentage = totals.current_percentage();
        Self {
            exam_type: exam.exam_type.clone(),
            exam_start_date: exam.start_date,
            status: EligibilityStatus::ExamPast,
            detail: "This exam date has already passed.".to_string(),
            projection_method: ProjectionMethod::NotProjected,
            total_projected_classes: totals.total_conducted as i64,
            classes_remaining_to_be_conducted: 0,
            min_required_classes: 0,
            classes_to_attend_for_eligibility: 0,
            classes_can_miss: 0,
            current_percentage,
            projected_percentage_if_all_attended: current_percentage,
        }
    }

    fn not_applicable(exam: &Exam, totals: &AttendanceTotals, method: ProjectionMethod) -> Self {
        Self {
            exam_type: exam.exam_type.clone(),
            exam_start_date: exam.start_date,
            status: EligibilityStatus::NotApplicable,
            detail: "Cannot project eligibility as no effective class days are expected before \
                     this exam date or subject has no classes."
                .to_string(),
            projection_method: method,
            total_projected_classes: 0,
            classes_remaining_to_be_conducted: 0,
            min_required_classes: 0,
            classes_to_attend_for_eligibility: 0,
            classes_can_miss: 0,
            current_percentage: totals.current_percentage(),
            projected_percentage_if_all_attended: 0.0,
        }
    }
}

/// Projects class counts up to each exam and derives an attend/miss budget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projector {
    config: ProjectionConfig,
}

impl Projector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn project(
        &self,
        policy: &SubjectPolicy,
        totals: &AttendanceTotals,
        bounds: &SessionBounds,
        calendar: &SessionCalendar,
        exam: &Exam,
        today: NaiveDate,
    ) -> EligibilityVerdict {
        self.project_with_holidays(
            policy,
            totals,
            bounds,
            calendar.holiday_set(),
            exam,
            today,
        )
    }

    /// One verdict per exam, in exam start order
    pub fn project_all(
        &self,
        policy: &SubjectPolicy,
        totals: &AttendanceTotals,
        bounds: &SessionBounds,
        calendar: &SessionCalendar,
        exams: &[Exam],
        today: NaiveDate,
    ) -> Vec<EligibilityVerdict> {
        let mut ordered: Vec<&Exam> = exams.iter().collect();
        ordered.sort_by_key(|exam| exam.start_date);
        ordered
            .into_iter()
            .map(|exam| self.project(policy, totals, bounds, calendar, exam, today))
            .collect()
    }

    fn project_with_holidays(
        &self,
        policy: &SubjectPolicy,
        totals: &AttendanceTotals,
        bounds: &SessionBounds,
        holidays: &HashSet<NaiveDate>,
        exam: &Exam,
        today: NaiveDate,
    ) -> EligibilityVerdict {
        if exam.start_date <= today {
            return EligibilityVerdict::exam_past(exam, totals);
        }

        let total_conducted = totals.total_conducted as i64;
        let total_attended = totals.total_attended as i64;

        let (estimate, method) = self.estimate_total_classes(policy, totals, bounds, holidays, exam, today);
        // never fewer than what already happened
        let total_projected = estimate.max(total_conducted);

        if total_projected <= 0 {
            return EligibilityVerdict::not_applicable(exam, totals, method);
        }

        let minimum = policy.minimum_attendance_percentage;
        let classes_remaining = (total_projected - total_conducted).max(0);
        let min_required = round_half_even(minimum / 100.0 * total_projected as f64);
        let projected_percentage =
            (total_attended + classes_remaining) as f64 / total_projected as f64 * 100.0;

        let status;
        let detail;
        let classes_to_attend;
        let classes_can_miss;

        if projected_percentage < minimum {
            status = EligibilityStatus::Ineligible;
            classes_to_attend = classes_remaining;
            classes_can_miss = 0;
            detail = format!(
                "You cannot reach {minimum:.2}% attendance for this exam, even if you attend all \
                 {classes_remaining} remaining classes. Your max possible attendance will be \
                 {projected_percentage:.2}%."
            );
        } else {
            let classes_needed = (min_required - total_attended).max(0);
            if classes_needed > 0 {
                status = EligibilityStatus::NeedsAttention;
                classes_to_attend = classes_needed;
                classes_can_miss = classes_remaining - classes_needed;
                detail = format!(
                    "You must attend at least {classes_needed} more classes to reach {minimum:.2}% \
                     eligibility. You can miss up to {classes_can_miss} more classes."
                );
            } else {
                classes_to_attend = 0;
                let max_overall_misses = total_projected - min_required;
                let already_missed = total_conducted - total_attended;
                classes_can_miss = (max_overall_misses - already_missed)
                    .max(0)
                    .min(classes_remaining);

                if classes_can_miss == 0 && classes_remaining > 0 {
                    status = EligibilityStatus::GoodNoMissesLeft;
                    detail = format!(
                        "You are eligible, but you cannot miss any more of the remaining \
                         {classes_remaining} classes to maintain {minimum:.2}% eligibility for \
                         this exam."
                    );
                } else if classes_can_miss == 0 {
                    status = EligibilityStatus::GoodAllClassesDone;
                    detail = "You are eligible. All projected classes for this exam are completed."
                        .to_string();
                } else {
                    status = EligibilityStatus::Good;
                    detail = format!(
                        "You can afford to miss up to {classes_can_miss} more classes and still be \
                         eligible for this exam (reaching at least {minimum:.2}%)."
                    );
                }
            }
        }

        debug!(
            exam = %exam.exam_type,
            subject = %policy.name,
            total_projected,
            classes_remaining,
            min_required,
            status = %status,
            "eligibility projected"
        );

        EligibilityVerdict {
            exam_type: exam.exam_type.clone(),
            exam_start_date: exam.start_date,
            status,
            detail: format!("{detail} (Projection: {})", method.description()),
            projection_method: method,
            total_projected_classes: total_projected,
            classes_remaining_to_be_conducted: classes_remaining,
            min_required_classes: min_required,
            classes_to_attend_for_eligibility: classes_to_attend,
            classes_can_miss,
            current_percentage: totals.current_percentage(),
            projected_percentage_if_all_attended: projected_percentage,
        }
    }

    /// Total classes expected from session start up to the day before the exam,
    /// before clamping to the classes already conducted.
    fn estimate_total_classes(
        &self,
        policy: &SubjectPolicy,
        totals: &AttendanceTotals,
        bounds: &SessionBounds,
        holidays: &HashSet<NaiveDate>,
        exam: &Exam,
        today: NaiveDate,
    ) -> (i64, ProjectionMethod) {
        let cutoff = exam.eligibility_cutoff();
        if cutoff < bounds.start_date {
            return (0, ProjectionMethod::ExamBeforeSession);
        }

        let days_to_cutoff = working_day_count(bounds.start_date, cutoff, holidays);
        let days_elapsed = working_day_count(bounds.start_date, today, holidays);

        let has_history =
            totals.total_conducted >= u64::from(self.config.min_historical_threshold);
        if has_history && days_elapsed > 0 {
            let rate = totals.total_conducted as f64 / days_elapsed as f64;
            debug!(rate, days_elapsed, days_to_cutoff, "using historical class rate");
            (
                round_half_even(rate * days_to_cutoff as f64),
                ProjectionMethod::HistoricalRate,
            )
        } else {
            let weeks = days_to_cutoff as f64 / self.config.average_working_days_per_week;
            debug!(weeks, days_to_cutoff, "using theoretical weekly schedule");
            (
                round_half_even(weeks * f64::from(policy.classes_per_week)),
                ProjectionMethod::TheoreticalSchedule,
            )
        }
    }
}

/// Project eligibility for one exam with the default projection settings.
pub fn project_eligibility(
    policy: &SubjectPolicy,
    totals: &AttendanceTotals,
    bounds: &SessionBounds,
    holidays: &HashSet<NaiveDate>,
    exam: &Exam,
    today: NaiveDate,
) -> EligibilityVerdict {
    Projector::default().project_with_holidays(policy, totals, bounds, holidays, exam, today)
}

fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}
