use attendance_tool::{
    AttendanceTotals, EligibilityStatus, Exam, ProjectionConfig, ProjectionMethod, Projector,
    SessionBounds, SessionCalendar, SubjectPolicy, project_eligibility,
};
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn spring_2025() -> SessionBounds {
    SessionBounds::new(d(2025, 1, 1), d(2025, 5, 31)).unwrap()
}

fn five_a_week() -> SubjectPolicy {
    SubjectPolicy::new("Operating Systems", 5).with_minimum_percentage(75.0)
}

fn no_holidays() -> HashSet<NaiveDate> {
    HashSet::new()
}

#[test]
fn strong_history_far_from_exam_still_needs_classes() {
    // 40 conducted over 48 class days; 70 class days until the day before the exam.
    let verdict = project_eligibility(
        &five_a_week(),
        &AttendanceTotals::new(40, 35),
        &spring_2025(),
        &no_holidays(),
        &Exam::new("Mid Term", d(2025, 4, 1)),
        d(2025, 3, 1),
    );

    assert_eq!(verdict.projection_method, ProjectionMethod::HistoricalRate);
    assert_eq!(verdict.total_projected_classes, 58);
    assert_eq!(verdict.classes_remaining_to_be_conducted, 18);
    assert_eq!(verdict.min_required_classes, 44);
    assert_eq!(verdict.status, EligibilityStatus::NeedsAttention);
    assert_eq!(verdict.classes_to_attend_for_eligibility, 9);
    assert_eq!(verdict.classes_can_miss, 9);
    assert!(verdict.classes_can_miss > 0);
    assert!((verdict.current_percentage - 87.5).abs() < 1e-9);
}

#[test]
fn half_attendance_cannot_recover_before_exam() {
    let verdict = project_eligibility(
        &five_a_week(),
        &AttendanceTotals::new(40, 20),
        &spring_2025(),
        &no_holidays(),
        &Exam::new("Mid Term", d(2025, 4, 1)),
        d(2025, 3, 1),
    );

    assert_eq!(verdict.status, EligibilityStatus::Ineligible);
    assert_eq!(verdict.classes_to_attend_for_eligibility, 18);
    assert_eq!(verdict.classes_can_miss, 0);
    assert!(verdict.projected_percentage_if_all_attended < 75.0);
    assert!(verdict.detail.starts_with("You cannot reach 75.00% attendance"));
}

#[test]
fn thirty_of_forty_needs_attention() {
    let verdict = project_eligibility(
        &five_a_week(),
        &AttendanceTotals::new(40, 30),
        &spring_2025(),
        &no_holidays(),
        &Exam::new("Mid Term", d(2025, 4, 1)),
        d(2025, 3, 1),
    );

    assert_eq!(verdict.status, EligibilityStatus::NeedsAttention);
    assert_eq!(verdict.classes_to_attend_for_eligibility, 14);
    assert_eq!(verdict.classes_can_miss, 4);
}

#[test]
fn exam_close_at_hand_with_good_history_is_good() {
    let verdict = project_eligibility(
        &five_a_week(),
        &AttendanceTotals::new(40, 35),
        &spring_2025(),
        &no_holidays(),
        &Exam::new("Quiz", d(2025, 3, 4)),
        d(2025, 3, 1),
    );

    assert_eq!(verdict.status, EligibilityStatus::Good);
    assert_eq!(verdict.total_projected_classes, 41);
    assert_eq!(verdict.classes_remaining_to_be_conducted, 1);
    assert_eq!(verdict.min_required_classes, 31);
    assert_eq!(verdict.classes_to_attend_for_eligibility, 0);
    assert_eq!(verdict.classes_can_miss, 1);
    assert!(verdict.detail.contains("You can afford to miss up to 1 more classes"));
}

#[test]
fn no_remaining_classes_reports_all_classes_done() {
    // Exam on Sunday 2025-03-02: the cutoff is today, so nothing is left to conduct.
    let verdict = project_eligibility(
        &five_a_week(),
        &AttendanceTotals::new(40, 35),
        &spring_2025(),
        &no_holidays(),
        &Exam::new("Quiz", d(2025, 3, 2)),
        d(2025, 3, 1),
    );

    assert_eq!(verdict.status, EligibilityStatus::GoodAllClassesDone);
    assert_eq!(verdict.total_projected_classes, 40);
    assert_eq!(verdict.classes_remaining_to_be_conducted, 0);
    assert_eq!(verdict.min_required_classes, 30);
    assert_eq!(verdict.classes_can_miss, 0);
}

#[test]
fn past_exam_ignores_projection_inputs() {
    let totals = AttendanceTotals::new(40, 35);
    for policy in [five_a_week(), SubjectPolicy::new("Lab", 1).with_minimum_percentage(100.0)] {
        let verdict = project_eligibility(
            &policy,
            &totals,
            &spring_2025(),
            &no_holidays(),
            &Exam::new("Entrance", d(2025, 1, 1)),
            d(2025, 3, 1),
        );
        assert_eq!(verdict.status, EligibilityStatus::ExamPast);
        assert_eq!(verdict.projection_method, ProjectionMethod::NotProjected);
        assert_eq!(verdict.total_projected_classes, 40);
        assert_eq!(verdict.classes_remaining_to_be_conducted, 0);
        assert_eq!(verdict.min_required_classes, 0);
        assert_eq!(verdict.classes_to_attend_for_eligibility, 0);
        assert_eq!(verdict.classes_can_miss, 0);
        assert_eq!(verdict.detail, "This exam date has already passed.");
    }
}

#[test]
fn exam_starting_today_counts_as_past() {
    let verdict = project_eligibility(
        &five_a_week(),
        &AttendanceTotals::new(10, 10),
        &spring_2025(),
        &no_holidays(),
        &Exam::new("Today", d(2025, 3, 1)),
        d(2025, 3, 1),
    );
    assert_eq!(verdict.status, EligibilityStatus::ExamPast);
}

#[test]
fn sparse_history_falls_back_to_theoretical_schedule() {
    let verdict = project_eligibility(
        &five_a_week(),
        &AttendanceTotals::new(4, 4),
        &spring_2025(),
        &no_holidays(),
        &Exam::new("Mid Term", d(2025, 4, 1)),
        d(2025, 1, 8),
    );

    // 70 class days / 5.5 per week * 5 classes per week = 63.6
    assert_eq!(verdict.projection_method, ProjectionMethod::TheoreticalSchedule);
    assert_eq!(verdict.total_projected_classes, 64);
    assert_eq!(verdict.classes_remaining_to_be_conducted, 60);
    assert_eq!(verdict.min_required_classes, 48);
    assert_eq!(verdict.status, EligibilityStatus::NeedsAttention);
    assert_eq!(verdict.classes_to_attend_for_eligibility, 44);
    assert_eq!(verdict.classes_can_miss, 16);
    assert!(verdict.detail.ends_with(
        "(Projection: Based on theoretical schedule (insufficient historical data).)"
    ));
}

#[test]
fn no_elapsed_class_days_falls_back_to_theoretical_schedule() {
    // Plenty of history but "today" precedes the session start.
    let verdict = project_eligibility(
        &five_a_week(),
        &AttendanceTotals::new(10, 8),
        &spring_2025(),
        &no_holidays(),
        &Exam::new("Mid Term", d(2025, 4, 1)),
        d(2024, 12, 20),
    );
    assert_eq!(verdict.projection_method, ProjectionMethod::TheoreticalSchedule);
    assert_eq!(verdict.total_projected_classes, 64);
    assert_eq!(verdict.status, EligibilityStatus::NeedsAttention);
    assert_eq!(verdict.classes_to_attend_for_eligibility, 40);
    assert_eq!(verdict.classes_can_miss, 14);
}

#[test]
fn holidays_shrink_the_theoretical_projection() {
    let holidays: HashSet<NaiveDate> = [d(2025, 1, 6), d(2025, 1, 7), d(2025, 2, 3), d(2025, 3, 10)]
        .into_iter()
        .collect();
    let verdict = project_eligibility(
        &five_a_week(),
        &AttendanceTotals::new(4, 4),
        &spring_2025(),
        &holidays,
        &Exam::new("Mid Term", d(2025, 4, 1)),
        d(2025, 1, 8),
    );
    // 66 class days / 5.5 * 5 = 60
    assert_eq!(verdict.total_projected_classes, 60);
    assert_eq!(verdict.min_required_classes, 45);
    assert_eq!(verdict.classes_to_attend_for_eligibility, 41);
    assert_eq!(verdict.classes_can_miss, 15);
}

#[test]
fn exam_before_session_start_is_not_applicable() {
    let verdict = project_eligibility(
        &five_a_week(),
        &AttendanceTotals::default(),
        &spring_2025(),
        &no_holidays(),
        &Exam::new("Placement", d(2025, 1, 1)),
        d(2024, 12, 15),
    );
    assert_eq!(verdict.status, EligibilityStatus::NotApplicable);
    assert_eq!(verdict.projection_method, ProjectionMethod::ExamBeforeSession);
    assert_eq!(verdict.total_projected_classes, 0);
    assert_eq!(verdict.projected_percentage_if_all_attended, 0.0);
}

#[test]
fn no_class_days_before_exam_is_not_applicable() {
    // Session opens on a Sunday and the exam is the next day.
    let bounds = SessionBounds::new(d(2025, 1, 5), d(2025, 5, 31)).unwrap();
    let verdict = project_eligibility(
        &five_a_week(),
        &AttendanceTotals::default(),
        &bounds,
        &no_holidays(),
        &Exam::new("Placement", d(2025, 1, 6)),
        d(2025, 1, 1),
    );
    assert_eq!(verdict.status, EligibilityStatus::NotApplicable);
    assert_eq!(verdict.projection_method, ProjectionMethod::TheoreticalSchedule);
}

#[test]
fn minimum_required_rounds_half_to_even() {
    // 27 class days / 5.5 * 1 = 4.9 -> 5 projected; 50% of 5 = 2.5 -> 2
    let policy = SubjectPolicy::new("Seminar", 1).with_minimum_percentage(50.0);
    let verdict = project_eligibility(
        &policy,
        &AttendanceTotals::default(),
        &spring_2025(),
        &no_holidays(),
        &Exam::new("Viva", d(2025, 2, 4)),
        d(2024, 12, 31),
    );
    assert_eq!(verdict.total_projected_classes, 5);
    assert_eq!(verdict.min_required_classes, 2);
    assert_eq!(verdict.classes_to_attend_for_eligibility, 2);
    assert_eq!(verdict.classes_can_miss, 3);
}

#[test]
fn raised_history_threshold_switches_strategy() {
    let projector = Projector::new(ProjectionConfig::default().with_min_historical_threshold(50));
    let verdict = projector.project(
        &five_a_week(),
        &AttendanceTotals::new(40, 35),
        &spring_2025(),
        &SessionCalendar::default(),
        &Exam::new("Mid Term", d(2025, 4, 1)),
        d(2025, 3, 1),
    );
    assert_eq!(verdict.projection_method, ProjectionMethod::TheoreticalSchedule);
    assert_eq!(verdict.total_projected_classes, 64);
    assert_eq!(verdict.classes_to_attend_for_eligibility, 13);
    assert_eq!(verdict.classes_can_miss, 11);
}

#[test]
fn free_function_matches_default_projector() {
    let holidays: HashSet<NaiveDate> = [d(2025, 2, 14)].into_iter().collect();
    let calendar = SessionCalendar::new(holidays.clone());
    let exam = Exam::new("Mid Term", d(2025, 4, 1));
    let totals = AttendanceTotals::new(22, 19);

    let from_fn = project_eligibility(
        &five_a_week(),
        &totals,
        &spring_2025(),
        &holidays,
        &exam,
        d(2025, 2, 20),
    );
    let from_projector = Projector::default().project(
        &five_a_week(),
        &totals,
        &spring_2025(),
        &calendar,
        &exam,
        d(2025, 2, 20),
    );
    assert_eq!(from_fn, from_projector);
}

#[test]
fn projection_is_repeatable() {
    let exam = Exam::new("End Term", d(2025, 5, 20));
    let first = project_eligibility(
        &five_a_week(),
        &AttendanceTotals::new(31, 25),
        &spring_2025(),
        &no_holidays(),
        &exam,
        d(2025, 2, 12),
    );
    let second = project_eligibility(
        &five_a_week(),
        &AttendanceTotals::new(31, 25),
        &spring_2025(),
        &no_holidays(),
        &exam,
        d(2025, 2, 12),
    );
    assert_eq!(first, second);
}

#[test]
fn projected_total_never_below_conducted() {
    let policy = SubjectPolicy::new("Networks", 3).with_minimum_percentage(80.0);
    let exam = Exam::new("Mid Term", d(2025, 3, 15));
    for conducted in [0u64, 3, 5, 20, 60, 120] {
        for offset in (0..120).step_by(7) {
            let today = d(2025, 1, 1) + Duration::days(offset);
            let totals = AttendanceTotals::new(conducted, conducted / 2);
            let verdict = project_eligibility(
                &policy,
                &totals,
                &spring_2025(),
                &no_holidays(),
                &exam,
                today,
            );
            assert!(
                verdict.total_projected_classes >= conducted as i64,
                "conducted={conducted} today={today}: {verdict:?}"
            );
        }
    }
}

#[test]
fn good_verdicts_can_miss_every_remaining_class() {
    // With classes_needed == 0 the miss budget is capped by what remains.
    let exam = Exam::new("End Term", d(2025, 5, 20));
    for attended in 30..=40u64 {
        for offset in [10i64, 30, 59, 80] {
            let today = d(2025, 1, 1) + Duration::days(offset);
            let verdict = project_eligibility(
                &five_a_week(),
                &AttendanceTotals::new(40, attended),
                &spring_2025(),
                &no_holidays(),
                &exam,
                today,
            );
            if verdict.status.is_eligible() {
                assert_eq!(
                    verdict.classes_can_miss,
                    verdict.classes_remaining_to_be_conducted
                );
                assert_ne!(verdict.status, EligibilityStatus::GoodNoMissesLeft);
            }
        }
    }
}

#[test]
fn project_all_orders_by_exam_date() {
    let exams = vec![
        Exam::new("End Term", d(2025, 5, 20)),
        Exam::new("Entrance", d(2025, 1, 2)),
        Exam::new("Mid Term", d(2025, 3, 15)),
    ];
    let verdicts = Projector::default().project_all(
        &five_a_week(),
        &AttendanceTotals::new(12, 12),
        &spring_2025(),
        &SessionCalendar::default(),
        &exams,
        d(2025, 1, 20),
    );
    let order: Vec<&str> = verdicts.iter().map(|v| v.exam_type.as_str()).collect();
    assert_eq!(order, ["Entrance", "Mid Term", "End Term"]);
    assert_eq!(verdicts[0].status, EligibilityStatus::ExamPast);
}

#[test]
fn status_labels_are_human_readable() {
    assert_eq!(EligibilityStatus::NeedsAttention.to_string(), "Needs Attention");
    assert_eq!(
        EligibilityStatus::GoodNoMissesLeft.as_str(),
        "Good (No Misses Left)"
    );
    assert_eq!(
        serde_json::to_string(&EligibilityStatus::GoodAllClassesDone).unwrap(),
        "\"good_all_classes_done\""
    );
}

#[test]
fn minimum_required_scales_percentage_before_total() {
    // 4.4 / 100 * 375 = 16.5 -> 16; scaling the product instead lands just above 16.5
    let policy = SubjectPolicy::new("Elective", 2).with_minimum_percentage(4.4);
    let verdict = project_eligibility(
        &policy,
        &AttendanceTotals::new(375, 375),
        &spring_2025(),
        &no_holidays(),
        &Exam::new("Viva", d(2025, 1, 3)),
        d(2025, 1, 2),
    );
    assert_eq!(verdict.total_projected_classes, 375);
    assert_eq!(verdict.min_required_classes, 16);
    assert_eq!(verdict.status, EligibilityStatus::GoodAllClassesDone);
}
