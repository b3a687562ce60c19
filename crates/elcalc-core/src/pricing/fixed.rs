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

//! Price points for contracts with a fixed (flat or hourly) tariff

use chrono::{NaiveDate, TimeDelta, TimeZone, Timelike};
use chrono_tz::Tz;
use elcalc_types::{FixedPriceSchedule, PricePoint};
use tracing::warn;

/// Build one local day of points from a fixed schedule
///
/// The day runs from local midnight to the next local midnight, so DST
/// transition days yield 23 or 25 hours of points. `granularity_minutes` must
/// divide an hour evenly; anything else yields no points.
pub fn fixed_price_points(
    schedule: &FixedPriceSchedule,
    date: NaiveDate,
    tz: Tz,
    granularity_minutes: u32,
) -> Vec<PricePoint> {
    if granularity_minutes == 0 || 60 % granularity_minutes != 0 {
        warn!(
            granularity_minutes,
            "Fixed price granularity must divide an hour, no points generated"
        );
        return Vec::new();
    }

    let midnight = |day: NaiveDate| {
        day.and_hms_opt(0, 0, 0)
            .and_then(|naive| tz.from_local_datetime(&naive).earliest())
    };

    let (Some(day_start), Some(day_end)) = (midnight(date), date.succ_opt().and_then(midnight))
    else {
        warn!(%date, "No local midnight for fixed price day");
        return Vec::new();
    };

    let step = TimeDelta::minutes(i64::from(granularity_minutes));
    let mut points = Vec::new();
    let mut cursor = day_start;

    while cursor < day_end {
        let next = (cursor + step).min(day_end);
        points.push(PricePoint::new(
            cursor.fixed_offset(),
            next.fixed_offset(),
            schedule.price_at(cursor.hour()),
        ));
        cursor = next;
    }

    points
}
