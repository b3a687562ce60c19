// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of ElCalc.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Workday / non-workday classification used to pick the tax rate

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;

/// Decides whether a calendar day is billed at the night rate all day
pub trait DayTypeClassifier {
    fn is_non_workday(&self, date: NaiveDate) -> bool;
}

impl<F> DayTypeClassifier for F
where
    F: Fn(NaiveDate) -> bool,
{
    fn is_non_workday(&self, date: NaiveDate) -> bool {
        self(date)
    }
}

/// Saturdays and Sundays only
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendCalendar;

impl DayTypeClassifier for WeekendCalendar {
    fn is_non_workday(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// Weekends plus an explicit list of public holidays
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }
}

impl DayTypeClassifier for HolidayCalendar {
    fn is_non_workday(&self, date: NaiveDate) -> bool {
        WeekendCalendar.is_non_workday(date) || self.is_holiday(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekend_calendar() {
        // 2025-05-16 is a Friday
        assert!(!WeekendCalendar.is_non_workday(date(2025, 5, 16)));
        assert!(WeekendCalendar.is_non_workday(date(2025, 5, 17)));
        assert!(WeekendCalendar.is_non_workday(date(2025, 5, 18)));
    }

    #[test]
    fn test_holiday_calendar_includes_weekends() {
        let calendar = HolidayCalendar::new([date(2025, 5, 1), date(2025, 5, 29)]);

        assert_eq!(calendar.len(), 2);
        assert!(calendar.is_non_workday(date(2025, 5, 1)));
        assert!(calendar.is_non_workday(date(2025, 5, 17)));
        assert!(!calendar.is_non_workday(date(2025, 5, 2)));
    }

    #[test]
    fn test_closure_classifier() {
        let every_day_off = |_: NaiveDate| true;
        assert!(every_day_off.is_non_workday(date(2025, 5, 14)));
    }
}
