use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Saturdays of a month (by occurrence) on which classes are held.
pub const WORKING_SATURDAYS: [u32; 2] = [1, 3];

/// Class-day calendar for one academic session: Monday to Friday, the 1st and
/// 3rd Saturday of every month, minus the session's holidays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionCalendar {
    holidays: HashSet<NaiveDate>,
}

impl SessionCalendar {
    pub fn new(holidays: HashSet<NaiveDate>) -> Self {
        Self { holidays }
    }

    pub fn from_holidays<I>(holidays: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Add a single holiday
    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    /// Add multiple holidays at once
    pub fn add_holidays(&mut self, dates: &[NaiveDate]) {
        self.holidays.extend(dates);
    }

    pub fn remove_holiday(&mut self, date: NaiveDate) -> bool {
        self.holidays.remove(&date)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    /// Holidays in ascending order
    pub fn holidays(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.holidays.iter().copied().collect();
        dates.sort();
        dates
    }

    pub fn holiday_set(&self) -> &HashSet<NaiveDate> {
        &self.holidays
    }

    /// Position of a Saturday among the Saturdays of its month (1-based).
    /// Returns `None` for any other weekday.
    pub fn saturday_ordinal(date: NaiveDate) -> Option<u32> {
        if date.weekday() != Weekday::Sat {
            return None;
        }
        let mut current = date.with_day(1)?;
        let mut count = 0;
        while current <= date {
            if current.weekday() == Weekday::Sat {
                count += 1;
            }
            current = current + Duration::days(1);
        }
        Some(count)
    }

    /// Whether the weekly pattern allows a class on this date, ignoring holidays
    pub fn is_class_weekday(date: NaiveDate) -> bool {
        match date.weekday() {
            Weekday::Sun => false,
            Weekday::Sat => Self::saturday_ordinal(date)
                .is_some_and(|ordinal| WORKING_SATURDAYS.contains(&ordinal)),
            _ => true,
        }
    }

    /// Check if classes can be held on a date
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        Self::is_class_weekday(date) && !self.holidays.contains(&date)
    }

    /// Find the next working day strictly after a given date
    pub fn next_working_day(&self, from: NaiveDate) -> NaiveDate {
        let mut current = from + Duration::days(1);
        while !self.is_working_day(current) {
            current = current + Duration::days(1);
        }
        current
    }

    /// Get all working days in an inclusive date range
    pub fn working_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = start;

        while current <= end {
            if self.is_working_day(current) {
                days.push(current);
            }
            current = current + Duration::days(1);
        }
        days
    }

    /// Count working days in an inclusive date range; 0 when `start > end`
    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        let mut count = 0;
        let mut current = start;

        while current <= end {
            if self.is_working_day(current) {
                count += 1;
            }
            current = current + Duration::days(1);
        }
        count
    }
}

/// Number of class days in `[start, end]` given a session's holidays.
pub fn working_day_count(start: NaiveDate, end: NaiveDate, holidays: &HashSet<NaiveDate>) -> i64 {
    let mut count = 0;
    let mut current = start;

    while current <= end {
        if SessionCalendar::is_class_weekday(current) && !holidays.contains(&current) {
            count += 1;
        }
        current = current + Duration::days(1);
    }
    count
}
