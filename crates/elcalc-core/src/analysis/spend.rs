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

//! Spend detection: "turn on" intervals before price rises

use std::collections::BTreeSet;

use elcalc_types::{Interval, SpendParams, Timestamp};
use tracing::debug;

use super::{PRICE_EPSILON, merger::merge_indices};
use crate::pricing::PriceSeries;

/// Hours of the day's cheapest prices a point must fall within
const CHEAP_WINDOW_HOURS: f64 = 3.0;

/// Find cheap points right before a price rise
///
/// A point qualifies when the next one is at least `price_increase_threshold`
/// more expensive and it is among the day's three cheapest hours. A rise spread
/// over two steps also qualifies the point before it.
pub fn find_spend_intervals(
    series: &PriceSeries,
    now: Timestamp,
    params: &SpendParams,
) -> Vec<Interval> {
    let len = series.len();
    let index_now = series.index_at(now);
    if len < 2 || index_now >= len {
        return Vec::new();
    }

    let values: Vec<f64> = series.values().collect();
    let increase = params.price_increase_threshold;
    let mut marked = BTreeSet::new();

    for i in index_now..len - 1 {
        let Some(threshold) = series.lowest_price_threshold(i, CHEAP_WINDOW_HOURS, None) else {
            continue;
        };
        let rise = values[i + 1] - values[i];

        if rise >= increase - PRICE_EPSILON && values[i] <= threshold + PRICE_EPSILON {
            marked.insert(i);
        }

        if i > index_now
            && rise >= 0.6 * increase - PRICE_EPSILON
            && values[i + 1] - values[i - 1] >= 1.4 * increase - PRICE_EPSILON
            && values[i - 1] <= threshold + PRICE_EPSILON
        {
            marked.insert(i - 1);
        }
    }

    debug!(marked = marked.len(), index_now, "Spend points found");
    merge_indices(series, &marked)
}
