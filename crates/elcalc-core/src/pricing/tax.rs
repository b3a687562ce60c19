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

//! Grid tax and power support adjustment of raw provider prices
//!
//! The effective price of a point is
//! `raw + tax + additional_tax - power_support`, rounded to three decimals,
//! where `tax` is the night rate before 06:00, from 22:00 and on non-workdays,
//! and the day rate otherwise. Power support refunds a share of the raw price
//! above a threshold.

use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;
use elcalc_types::{PricePoint, TaxConfig};

use super::calendar::DayTypeClassifier;

const NIGHT_ENDS_HOUR: u32 = 6;
const NIGHT_STARTS_HOUR: u32 = 22;

/// Round a price to three decimals
pub fn round_price(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Whether a point is billed at the night rate
///
/// Both boundaries are evaluated on the calendar day the point starts on:
/// a point ending exactly at 06:00 is a night point, one starting at 05:59
/// and ending after 06:00 is not.
pub fn is_night_rate(start: &DateTime<Tz>, end: &DateTime<Tz>, non_workday: bool) -> bool {
    if non_workday {
        return true;
    }

    let ends_before_morning = start
        .date_naive()
        .and_hms_opt(NIGHT_ENDS_HOUR, 0, 0)
        .is_some_and(|night_ends| end.naive_local() <= night_ends);

    ends_before_morning || start.hour() >= NIGHT_STARTS_HOUR
}

/// Subsidy deducted from a raw price
pub fn power_support(value: f64, tax: &TaxConfig) -> f64 {
    if value > tax.power_support_threshold {
        (value - tax.power_support_threshold) * tax.power_support_rate
    } else {
        0.0
    }
}

/// Effective price of one raw point
pub fn adjusted_price(value: f64, night: bool, month: u32, tax: &TaxConfig) -> f64 {
    let rate = if night {
        tax.night_tax.for_month(month)
    } else {
        tax.day_tax.for_month(month)
    };

    round_price(value + rate + tax.additional_tax - power_support(value, tax))
}

/// Apply taxes to one day's raw points
///
/// Day type and tax month are resolved per point from its local start date,
/// so today's and tomorrow's lists can be passed through independently.
pub(crate) fn apply_taxes(
    raw: &[PricePoint],
    tz: Tz,
    tax: &TaxConfig,
    calendar: &dyn DayTypeClassifier,
) -> Vec<PricePoint> {
    raw.iter()
        .map(|point| {
            let start = point.start.with_timezone(&tz);
            let end = point.end.with_timezone(&tz);
            let non_workday = calendar.is_non_workday(start.date_naive());
            let night = is_night_rate(&start, &end, non_workday);

            PricePoint {
                start: start.fixed_offset(),
                end: end.fixed_offset(),
                value: adjusted_price(point.value, night, start.month(), tax),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::calendar::WeekendCalendar;
    use chrono::{TimeDelta, TimeZone};
    use chrono_tz::Europe::Oslo;
    use elcalc_types::MonthlyRate;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        Oslo.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn test_tax() -> TaxConfig {
        TaxConfig {
            day_tax: MonthlyRate::Flat(0.5),
            night_tax: MonthlyRate::Flat(0.2),
            additional_tax: 0.1,
            power_support_threshold: 0.9,
            power_support_rate: 0.9,
        }
    }

    #[test]
    fn test_point_ending_at_six_is_night() {
        // Wednesday
        let start = local(2025, 1, 15, 5, 0);
        let end = local(2025, 1, 15, 6, 0);
        assert!(is_night_rate(&start, &end, false));
    }

    #[test]
    fn test_point_starting_at_five_fifty_nine_is_day() {
        let start = local(2025, 1, 15, 5, 59);
        let end = start + TimeDelta::minutes(15);
        assert!(!is_night_rate(&start, &end, false));
    }

    #[test]
    fn test_evening_boundary() {
        let before = local(2025, 1, 15, 21, 0);
        assert!(!is_night_rate(&before, &(before + TimeDelta::hours(1)), false));

        let at = local(2025, 1, 15, 22, 0);
        assert!(is_night_rate(&at, &(at + TimeDelta::hours(1)), false));

        // Last hour of the day ends at the next day's midnight
        let last = local(2025, 1, 15, 23, 0);
        assert!(is_night_rate(&last, &(last + TimeDelta::hours(1)), false));
    }

    #[test]
    fn test_non_workday_is_night_all_day() {
        let noon = local(2025, 1, 18, 12, 0);
        assert!(is_night_rate(&noon, &(noon + TimeDelta::hours(1)), true));
    }

    #[test]
    fn test_power_support_only_above_threshold() {
        let tax = test_tax();
        assert_eq!(power_support(0.5, &tax), 0.0);
        assert!((power_support(1.9, &tax) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_adjusted_price_rounding() {
        let tax = test_tax();
        // 0.3333 + 0.5 + 0.1 = 0.9333 -> 0.933
        assert_eq!(adjusted_price(0.3333, false, 1, &tax), 0.933);
        // 1.9 + 0.2 + 0.1 - 0.9 = 1.3
        assert_eq!(adjusted_price(1.9, true, 1, &tax), 1.3);
    }

    #[test]
    fn test_monthly_tax_uses_point_month() {
        let mut rates = [0.0; 12];
        rates[6] = 0.7;
        let tax = TaxConfig {
            day_tax: MonthlyRate::Monthly(rates),
            ..TaxConfig::default()
        };

        let start = local(2025, 7, 16, 12, 0);
        let raw = vec![PricePoint::new(
            start.fixed_offset(),
            (start + TimeDelta::hours(1)).fixed_offset(),
            1.0,
        )];

        let adjusted = apply_taxes(&raw, Oslo, &tax, &WeekendCalendar);
        assert_eq!(adjusted[0].value, 1.7);
    }
}
