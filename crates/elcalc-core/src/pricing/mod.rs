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

//! Tax-adjusted price series shared read-only by every detector
//!
//! A [`PriceSeries`] is built once per recomputation from today's points and,
//! once published, tomorrow's. Construction normalizes timestamps to the
//! series time zone, checks ordering and contiguity, and builds the per-day
//! ascending value indexes used by the percentile helper.

mod calendar;
mod fixed;
mod tax;

pub use calendar::{DayTypeClassifier, HolidayCalendar, WeekendCalendar};
pub use fixed::fixed_price_points;
pub use tax::{adjusted_price, is_night_rate, power_support, round_price};

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use elcalc_types::{PricePoint, PriceStats, TaxConfig, Timestamp};
use tracing::{info, warn};

use crate::error::{Day, Result, SeriesError};

/// Immutable, validated price points for today and (optionally) tomorrow
#[derive(Debug, Clone)]
pub struct PriceSeries {
    tz: Tz,
    points: Vec<PricePoint>,
    starts: Vec<Timestamp>,
    ends: Vec<Timestamp>,
    today_len: usize,
    sorted_today: Vec<f64>,
    sorted_tomorrow: Vec<f64>,
}

impl PriceSeries {
    /// Build a series from already tax-adjusted points
    ///
    /// A `tomorrow` list that starts at the same instant as `today` is a
    /// republished copy of today and is dropped with a warning.
    pub fn new(tz: Tz, today: Vec<PricePoint>, tomorrow: Vec<PricePoint>) -> Result<Self> {
        let today = normalize(today, tz);
        let mut tomorrow = normalize(tomorrow, tz);

        if today.is_empty() && !tomorrow.is_empty() {
            return Err(SeriesError::TomorrowWithoutToday);
        }

        let stale_start = match (today.first(), tomorrow.first()) {
            (Some(first_today), Some(first_tomorrow))
                if first_today.start == first_tomorrow.start =>
            {
                Some(first_tomorrow.start)
            }
            _ => None,
        };
        if let Some(start) = stale_start {
            warn!(
                %start,
                "Tomorrow's prices start at the same time as today's, ignoring them"
            );
            tomorrow.clear();
        }

        validate_day(&today, Day::Today)?;
        validate_day(&tomorrow, Day::Tomorrow)?;

        if let (Some(last_today), Some(first_tomorrow)) = (today.last(), tomorrow.first()) {
            if first_tomorrow.start != last_today.end {
                return Err(SeriesError::NotContiguous {
                    day: Day::Tomorrow,
                    index: 0,
                    start: first_tomorrow.start,
                    previous_end: last_today.end,
                });
            }
        }

        let sorted_today = sorted_values(&today);
        let sorted_tomorrow = sorted_values(&tomorrow);
        let today_len = today.len();

        let mut points = today;
        points.extend(tomorrow);

        let starts = points.iter().map(|p| p.start).collect();
        let ends = points.iter().map(|p| p.end).collect();

        let series = Self {
            tz,
            points,
            starts,
            ends,
            today_len,
            sorted_today,
            sorted_tomorrow,
        };

        info!(
            tz = %series.tz,
            today = series.today_len,
            tomorrow = series.tomorrow().len(),
            point_minutes = series.point_minutes(),
            "Price series built"
        );

        Ok(series)
    }

    /// Build a series from raw provider points, applying taxes first
    pub fn from_raw(
        tz: Tz,
        raw_today: &[PricePoint],
        raw_tomorrow: &[PricePoint],
        tax: &TaxConfig,
        calendar: &dyn DayTypeClassifier,
    ) -> Result<Self> {
        let today = tax::apply_taxes(raw_today, tz, tax, calendar);
        let tomorrow = tax::apply_taxes(raw_tomorrow, tz, tax, calendar);
        Self::new(tz, today, tomorrow)
    }

    // ============= Inspection =============

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Today's points followed by tomorrow's
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn today(&self) -> &[PricePoint] {
        &self.points[..self.today_len]
    }

    pub fn tomorrow(&self) -> &[PricePoint] {
        &self.points[self.today_len..]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of today's points; the unit for converting hours to point counts
    pub fn today_len(&self) -> usize {
        self.today_len
    }

    pub fn has_tomorrow(&self) -> bool {
        self.points.len() > self.today_len
    }

    pub fn value(&self, index: usize) -> Option<f64> {
        self.points.get(index).map(|p| p.value)
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    /// Length of one of today's points in hours (1.0 for an empty series)
    pub fn point_hours(&self) -> f64 {
        self.points.first().map_or(1.0, PricePoint::hours)
    }

    fn point_minutes(&self) -> i64 {
        self.points.first().map_or(0, |p| p.duration().num_minutes())
    }

    pub fn sorted_today(&self) -> &[f64] {
        &self.sorted_today
    }

    pub fn sorted_tomorrow(&self) -> &[f64] {
        &self.sorted_tomorrow
    }

    pub fn stats_today(&self) -> Option<PriceStats> {
        PriceStats::from_sorted(&self.sorted_today)
    }

    pub fn stats_tomorrow(&self) -> Option<PriceStats> {
        PriceStats::from_sorted(&self.sorted_tomorrow)
    }

    // ============= Time lookups =============

    /// Index of the point containing `now`
    ///
    /// Returns 0 when `now` precedes the series and `len()` when it is at or
    /// past the end of the last point.
    pub fn index_at(&self, now: Timestamp) -> usize {
        match (self.starts.first(), self.ends.last()) {
            (Some(first), Some(last)) => {
                if now >= *last {
                    self.len()
                } else if now < *first {
                    0
                } else {
                    self.starts.partition_point(|start| *start <= now) - 1
                }
            }
            _ => 0,
        }
    }

    /// Number of points that end at or before `instant`
    pub fn count_ending_by(&self, instant: Timestamp) -> usize {
        self.ends.partition_point(|end| *end <= instant)
    }

    /// Instant in the series time zone
    pub fn local(&self, instant: Timestamp) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }

    /// Local calendar date an instant falls on
    pub fn local_date(&self, instant: Timestamp) -> NaiveDate {
        self.local(instant).date_naive()
    }

    /// `hour:00` local time on `date`; the earlier instant when the hour is
    /// ambiguous, `None` when it does not exist
    pub fn local_time_on(&self, date: NaiveDate, hour: u32) -> Option<Timestamp> {
        let naive = date.and_hms_opt(hour, 0, 0)?;
        naive
            .and_local_timezone(self.tz)
            .earliest()
            .map(|dt| dt.fixed_offset())
    }
}

fn normalize(points: Vec<PricePoint>, tz: Tz) -> Vec<PricePoint> {
    points
        .into_iter()
        .map(|p| PricePoint {
            start: p.start.with_timezone(&tz).fixed_offset(),
            end: p.end.with_timezone(&tz).fixed_offset(),
            value: p.value,
        })
        .collect()
}

fn validate_day(points: &[PricePoint], day: Day) -> Result<()> {
    let Some(first) = points.first() else {
        return Ok(());
    };
    let expected = first.duration();

    for (index, point) in points.iter().enumerate() {
        if !point.value.is_finite() {
            return Err(SeriesError::NonFiniteValue { day, index });
        }

        if point.end <= point.start {
            return Err(SeriesError::EmptyPoint {
                day,
                index,
                start: point.start,
                end: point.end,
            });
        }

        if index > 0 {
            let previous_end = points[index - 1].end;
            if point.start != previous_end {
                return Err(SeriesError::NotContiguous {
                    day,
                    index,
                    start: point.start,
                    previous_end,
                });
            }
        }

        if point.duration() != expected {
            return Err(SeriesError::MixedGranularity {
                day,
                index,
                expected_minutes: expected.num_minutes(),
                found_minutes: point.duration().num_minutes(),
            });
        }
    }

    Ok(())
}

fn sorted_values(points: &[PricePoint]) -> Vec<f64> {
    let mut values: Vec<f64> = points.iter().map(|p| p.value).collect();
    values.sort_by(f64::total_cmp);
    values
}
