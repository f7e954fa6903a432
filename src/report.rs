use crate::book::SubjectEligibility;
use crate::eligibility::EligibilityVerdict;
use crate::subject::AttendanceRecord;
use chrono::{Duration, NaiveDate};
use polars::prelude::PlSmallStr;
use polars::prelude::*;

pub fn verdicts_to_dataframe(verdicts: &[EligibilityVerdict]) -> PolarsResult<DataFrame> {
    let exam_types: Vec<&str> = verdicts.iter().map(|v| v.exam_type.as_str()).collect();
    let starts: Vec<i32> = verdicts.iter().map(|v| date_to_i32(v.exam_start_date)).collect();
    let statuses: Vec<&str> = verdicts.iter().map(|v| v.status.as_str()).collect();
    let projected: Vec<i64> = verdicts.iter().map(|v| v.total_projected_classes).collect();
    let remaining: Vec<i64> = verdicts
        .iter()
        .map(|v| v.classes_remaining_to_be_conducted)
        .collect();
    let required: Vec<i64> = verdicts.iter().map(|v| v.min_required_classes).collect();
    let to_attend: Vec<i64> = verdicts
        .iter()
        .map(|v| v.classes_to_attend_for_eligibility)
        .collect();
    let can_miss: Vec<i64> = verdicts.iter().map(|v| v.classes_can_miss).collect();
    let max_pct: Vec<f64> = verdicts
        .iter()
        .map(|v| round2(v.projected_percentage_if_all_attended))
        .collect();

    let columns: Vec<Column> = vec![
        Series::new(PlSmallStr::from_static("exam"), exam_types).into_column(),
        Series::new(PlSmallStr::from_static("starts"), starts)
            .cast(&DataType::Date)?
            .into_column(),
        Series::new(PlSmallStr::from_static("status"), statuses).into_column(),
        Series::new(PlSmallStr::from_static("projected"), projected).into_column(),
        Series::new(PlSmallStr::from_static("remaining"), remaining).into_column(),
        Series::new(PlSmallStr::from_static("min_required"), required).into_column(),
        Series::new(PlSmallStr::from_static("must_attend"), to_attend).into_column(),
        Series::new(PlSmallStr::from_static("can_miss"), can_miss).into_column(),
        Series::new(PlSmallStr::from_static("max_pct"), max_pct).into_column(),
    ];
    DataFrame::new(columns)
}

pub fn records_to_dataframe(records: &[AttendanceRecord]) -> PolarsResult<DataFrame> {
    let dates: Vec<i32> = records.iter().map(|r| date_to_i32(r.date)).collect();
    let conducted: Vec<i64> = records
        .iter()
        .map(|r| i64::from(r.classes_conducted))
        .collect();
    let attended: Vec<i64> = records
        .iter()
        .map(|r| i64::from(r.classes_attended))
        .collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("date"), dates)
            .cast(&DataType::Date)?
            .into_column(),
        Series::new(PlSmallStr::from_static("conducted"), conducted).into_column(),
        Series::new(PlSmallStr::from_static("attended"), attended).into_column(),
    ])
}

/// Heading line plus the verdict table for one subject.
pub fn render_subject_report(summary: &SubjectEligibility) -> PolarsResult<String> {
    let mut out = String::new();
    let code = summary
        .code
        .as_deref()
        .map(|c| format!(" ({c})"))
        .unwrap_or_default();
    out.push_str(&format!(
        "{}{}: attended {}/{} ({:.2}%)\n",
        summary.subject,
        code,
        summary.totals.total_attended,
        summary.totals.total_conducted,
        summary.current_percentage
    ));
    if summary.verdicts.is_empty() {
        out.push_str("No exams scheduled.\n");
        return Ok(out);
    }
    out.push_str(&render_text_table(&verdicts_to_dataframe(&summary.verdicts)?));
    for verdict in &summary.verdicts {
        out.push_str(&format!("  {}: {}\n", verdict.exam_type, verdict.detail));
    }
    Ok(out)
}

fn cell_text(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Float64(v) => format!("{v:.2}"),
        AnyValue::String(s) => s.to_string(),
        AnyValue::Date(days) => date_from_i32(*days).to_string(),
        _ => av.to_string(),
    }
}

pub fn render_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
            .collect();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &cells {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, &col_names, &widths);
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        push_row(&mut out, row, &widths);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn push_row(out: &mut String, values: &[String], widths: &[usize]) {
    out.push('|');
    for (value, width) in values.iter().zip(widths) {
        out.push(' ');
        out.push_str(value);
        out.push_str(&" ".repeat(width.saturating_sub(value.len())));
        out.push_str(" |");
    }
    out.push('\n');
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// NaiveDate's default is 1970-01-01
fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn date_to_i32(date: NaiveDate) -> i32 {
    (date - epoch()).num_days() as i32
}

fn date_from_i32(days: i32) -> NaiveDate {
    epoch() + Duration::days(i64::from(days))
}
