//! Bulk holiday ingestion from pasted text or an uploaded CSV file.
//!
//! Rows are validated one at a time. A bad row is reported and skipped; it
//! never aborts the rows that follow it.

use crate::holiday::Holiday;
use crate::session::SessionBounds;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use tracing::{info, warn};

/// Date formats accepted in CSV uploads, tried in this order.
pub const CSV_DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d"];

const TEXT_DATE_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_TEXT_NAME: &str = "Holiday";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based line or row number in the input
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayImport {
    pub added: Vec<Holiday>,
    pub errors: Vec<RowError>,
}

impl HolidayImport {
    pub fn added_count(&self) -> usize {
        self.added.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Accumulates accepted holidays while enforcing session bounds and date uniqueness.
struct ImportBatch<'a> {
    bounds: &'a SessionBounds,
    seen: HashSet<NaiveDate>,
    result: HolidayImport,
}

impl<'a> ImportBatch<'a> {
    fn new(bounds: &'a SessionBounds, existing: &HashSet<NaiveDate>) -> Self {
        Self {
            bounds,
            seen: existing.clone(),
            result: HolidayImport::default(),
        }
    }

    fn reject(&mut self, row: usize, message: String) {
        warn!(row, %message, "holiday row rejected");
        self.result.errors.push(RowError { row, message });
    }

    fn accept(&mut self, row: usize, date: NaiveDate, name: Option<&str>, raw: &str) {
        if !self.bounds.contains(date) {
            self.reject(
                row,
                format!(
                    "Row {row}: Holiday date {date} is outside the session dates ({} to {}).",
                    self.bounds.start_date, self.bounds.end_date
                ),
            );
            return;
        }
        if !self.seen.insert(date) {
            self.reject(
                row,
                format!("Row {row}: Holiday on {raw} already exists for this session."),
            );
            return;
        }
        let holiday = match name {
            Some(name) => Holiday::named(date, name),
            None => Holiday::new(date),
        };
        self.result.added.push(holiday);
    }

    fn finish(self, source: &str) -> HolidayImport {
        info!(
            source,
            added = self.result.added.len(),
            rejected = self.result.errors.len(),
            "holiday import finished"
        );
        self.result
    }
}

/// Parse pasted text: one `YYYY-MM-DD` or `YYYY-MM-DD - Name` entry per line.
pub fn parse_holiday_text(
    text: &str,
    bounds: &SessionBounds,
    existing: &HashSet<NaiveDate>,
) -> HolidayImport {
    let mut batch = ImportBatch::new(bounds, existing);

    for (idx, line) in text.lines().enumerate() {
        let row = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (date_str, name) = match line.split_once(" - ") {
            Some((date, name)) => (date.trim(), name.trim()),
            None => (line, DEFAULT_TEXT_NAME),
        };
        let name = if name.is_empty() { DEFAULT_TEXT_NAME } else { name };

        match NaiveDate::parse_from_str(date_str, TEXT_DATE_FORMAT) {
            Ok(date) => batch.accept(row, date, Some(name), date_str),
            Err(_) => batch.reject(
                row,
                format!("Row {row}: Invalid date format or entry: '{line}'. Please use YYYY-MM-DD."),
            ),
        }
    }

    batch.finish("text")
}

/// Parse a CSV upload: date in the first column, optional name in the second.
/// A leading header row is detected and skipped.
pub fn parse_holiday_csv<R: Read>(
    reader: R,
    bounds: &SessionBounds,
    existing: &HashSet<NaiveDate>,
) -> HolidayImport {
    let mut batch = ImportBatch::new(bounds, existing);
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    for (idx, record) in csv_reader.records().enumerate() {
        let row = idx + 1;
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                batch.reject(row, format!("Row {row}: Malformed row: {err}"));
                continue;
            }
        };

        let date_str = record.get(0).unwrap_or("").trim();
        if idx == 0 && !looks_like_date(date_str) {
            continue;
        }
        if date_str.is_empty() {
            continue;
        }
        let name = record.get(1).map(str::trim).filter(|n| !n.is_empty());

        match parse_flexible_date(date_str) {
            Some(date) => batch.accept(row, date, name, date_str),
            None => batch.reject(
                row,
                format!(
                    "Row {row}: Invalid date format '{date_str}'. Please use YYYY-MM-DD, \
                     DD-MM-YYYY, MM/DD/YYYY, DD/MM/YYYY, or YYYY/MM/DD."
                ),
            ),
        }
    }

    batch.finish("csv")
}

/// Try each of [`CSV_DATE_FORMATS`] in turn.
pub fn parse_flexible_date(input: &str) -> Option<NaiveDate> {
    CSV_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
}

fn looks_like_date(cell: &str) -> bool {
    let digits: String = cell.chars().filter(|c| *c != '-' && *c != '/').collect();
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}
