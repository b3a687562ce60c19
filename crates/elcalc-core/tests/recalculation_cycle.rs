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

//! End-to-end recalculation cycles over two days of quarter-hour prices
//!
//! Tuesday 2025-01-14 and Wednesday 2025-01-15 in Europe/Oslo, with a
//! morning peak 07:00-09:00 and an evening peak 17:00-20:00.

use chrono::{NaiveDate, TimeDelta, TimeZone};
use chrono_tz::Europe::Oslo;
use elcalc_core::{
    FixedPriceSchedule, HolidayCalendar, Interval, MonthlyRate, PricePoint, PriceSeries,
    SavingsParams, SpendParams, TaxConfig, Timestamp, WeekendCalendar, WindowParams,
    find_cheapest_window, find_savings_intervals, find_spend_intervals, fixed_price_points,
};

fn at(day: u32, hour: u32, minute: u32) -> Timestamp {
    Oslo.with_ymd_and_hms(2025, 1, day, hour, minute, 0)
        .unwrap()
        .fixed_offset()
}

fn raw_price(hour: u32) -> f64 {
    match hour {
        0..=5 => 0.5,
        7..=8 => 3.0,
        17..=19 => 4.0,
        _ => 1.5,
    }
}

fn raw_day(day: u32) -> Vec<PricePoint> {
    (0..96)
        .map(|quarter: u32| {
            let start = at(day, quarter / 4, (quarter % 4) * 15);
            PricePoint::new(start, start + TimeDelta::minutes(15), raw_price(quarter / 4))
        })
        .collect()
}

fn tax() -> TaxConfig {
    TaxConfig {
        day_tax: MonthlyRate::Flat(0.4),
        night_tax: MonthlyRate::Flat(0.2),
        additional_tax: 0.05,
        ..TaxConfig::default()
    }
}

fn two_days() -> PriceSeries {
    PriceSeries::from_raw(Oslo, &raw_day(14), &raw_day(15), &tax(), &WeekendCalendar).unwrap()
}

fn assert_well_formed(intervals: &[Interval]) {
    assert!(intervals.iter().all(|iv| iv.end > iv.start));
    assert!(intervals.windows(2).all(|w| w[0].end < w[1].start));
}

#[test]
fn test_series_is_tax_adjusted() {
    let series = two_days();

    assert_eq!(series.len(), 192);
    assert_eq!(series.today_len(), 96);
    assert_eq!(series.point_hours(), 0.25);

    // 00:00 night, 07:30 day, 22:00 night again
    assert_eq!(series.value(0), Some(0.75));
    assert_eq!(series.value(30), Some(3.45));
    assert_eq!(series.value(80), Some(1.95));
    assert_eq!(series.value(88), Some(1.75));

    let stats = series.stats_tomorrow().unwrap();
    assert_eq!(stats.min, 0.75);
    assert_eq!(stats.max, 4.45);
}

#[test]
fn test_cheapest_window_after_publication() {
    let series = two_days();
    let params = WindowParams {
        duration_hours: 2.0,
        deadline_hour: 7,
        ..WindowParams::default()
    };

    let result = find_cheapest_window(&series, at(14, 14, 0), &params);
    let window = result.window().unwrap();

    assert_eq!(window.start, at(15, 0, 0));
    assert_eq!(window.adjusted_start, at(15, 0, 0));
    assert_eq!(window.avg_price, 0.75);
    // Night prices hold until 06:00
    assert_eq!(window.final_end, at(15, 6, 0));
}

#[test]
fn test_savings_and_spend_at_afternoon() {
    let series = two_days();
    let params = SavingsParams::default();

    let outcome = find_savings_intervals(&series, at(14, 14, 0), &params, &[]);
    assert_well_formed(&outcome.intervals);
    assert!(
        outcome
            .intervals
            .iter()
            .all(|iv| iv.hours() <= params.max_continuous_hours)
    );

    assert_eq!(
        outcome.intervals,
        vec![
            Interval::new(at(14, 17, 0), at(14, 19, 0)),
            Interval::new(at(15, 7, 0), at(15, 9, 0)),
            Interval::new(at(15, 17, 0), at(15, 19, 0)),
        ]
    );
    assert_eq!(outcome.longest_off, TimeDelta::hours(2));
    assert_eq!(outcome.turn_on_at, Some(at(14, 19, 0)));

    let spend = find_spend_intervals(&series, at(14, 14, 0), &SpendParams::default());
    // Last cheap half hour before the morning rise, the earlier point via the two-step rule
    assert_eq!(spend, vec![Interval::new(at(15, 5, 30), at(15, 6, 0))]);
}

#[test]
fn test_recalculation_keeps_started_off_run() {
    let series = two_days();
    let params = SavingsParams::default();

    let afternoon = find_savings_intervals(&series, at(14, 14, 0), &params, &[]);

    // An hour into the evening off run
    let evening = find_savings_intervals(&series, at(14, 18, 0), &params, &afternoon.intervals);
    assert_eq!(evening.continuity_budget, 1.0);
    assert_eq!(evening.intervals, afternoon.intervals);
    assert_eq!(evening.turn_on_at, Some(at(14, 19, 0)));
    assert!(
        evening
            .intervals
            .iter()
            .all(|iv| iv.hours() <= params.max_continuous_hours)
    );

    let again = find_savings_intervals(&series, at(14, 18, 0), &params, &evening.intervals);
    assert_eq!(again, evening);
}

#[test]
fn test_fixed_schedule_series() {
    let schedule = FixedPriceSchedule::Flat(1.0);
    let today = fixed_price_points(
        &schedule,
        NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(),
        Oslo,
        60,
    );
    let tomorrow = fixed_price_points(
        &schedule,
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        Oslo,
        60,
    );

    let series =
        PriceSeries::from_raw(Oslo, &today, &tomorrow, &TaxConfig::default(), &WeekendCalendar)
            .unwrap();
    let now = at(14, 2, 0);

    let outcome = find_savings_intervals(&series, now, &SavingsParams::default(), &[]);
    assert!(outcome.intervals.is_empty());
    assert!(find_spend_intervals(&series, now, &SpendParams::default()).is_empty());

    let result = find_cheapest_window(&series, now, &WindowParams::default());
    let window = result.window().unwrap();
    assert_eq!(window.start, at(14, 2, 0));
    assert_eq!(window.avg_price, 1.0);
    assert_eq!(window.final_end, at(16, 0, 0));
}

#[test]
fn test_holiday_billed_at_night_rate() {
    let holidays = HolidayCalendar::new([NaiveDate::from_ymd_opt(2025, 1, 14).unwrap()]);
    let series = PriceSeries::from_raw(Oslo, &raw_day(14), &[], &tax(), &holidays).unwrap();

    // 07:30 on a holiday: 3.0 + 0.2 + 0.05
    assert_eq!(series.value(30), Some(3.25));
}

#[test]
fn test_invalid_raw_prices_rejected() {
    let mut today = raw_day(14);
    today[10].value = f64::INFINITY;

    let result = PriceSeries::from_raw(Oslo, &today, &[], &tax(), &WeekendCalendar);
    assert!(result.is_err());
}
