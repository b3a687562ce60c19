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

//! Cheapest continuous window before a deadline

use chrono::{TimeDelta, Timelike};
use elcalc_types::{Timestamp, WindowParams};
use serde::Serialize;
use tracing::debug;

use super::PRICE_EPSILON;
use crate::pricing::{PriceSeries, round_price};

/// Tomorrow's prices are treated as published from this local hour
const PUBLICATION_HOUR: u32 = 13;

/// Local hours during which a window is only estimated while tomorrow is unknown
const ESTIMATE_FROM_HOUR: u32 = 6;
const ESTIMATE_UNTIL_HOUR: u32 = 15;

/// How many points the start may be deferred past the cheapest window
const MAX_DEFERRAL_STEPS: usize = 4;

/// A committed run window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledWindow {
    /// Start of the minimum-sum window
    pub start: Timestamp,

    /// Start after sensitivity adjustment
    pub adjusted_start: Timestamp,

    /// End of the run when started at `adjusted_start`
    pub estimated_end: Timestamp,

    /// Latest end after extending over cheap trailing points
    pub final_end: Timestamp,

    /// Mean price of the minimum-sum window, before any adjustment
    pub avg_price: f64,
}

/// Result of a cheapest window search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CheapestWindow {
    Window(ScheduledWindow),

    /// Tomorrow's prices are not known yet; only the expected average price
    Estimate { avg_price: f64 },

    /// No point left to schedule in
    Unavailable,
}

impl CheapestWindow {
    pub fn avg_price(&self) -> Option<f64> {
        match self {
            CheapestWindow::Window(window) => Some(window.avg_price),
            CheapestWindow::Estimate { avg_price } => Some(*avg_price),
            CheapestWindow::Unavailable => None,
        }
    }

    pub fn window(&self) -> Option<&ScheduledWindow> {
        match self {
            CheapestWindow::Window(window) => Some(window),
            _ => None,
        }
    }
}

/// Find the cheapest run of `duration_hours` that finishes by the deadline
///
/// Ties between windows of equal cost resolve to the earliest one. When fewer
/// points than needed remain before the deadline, the window starting at `now`
/// is returned even if it runs past the deadline.
pub fn find_cheapest_window(
    series: &PriceSeries,
    now: Timestamp,
    params: &WindowParams,
) -> CheapestWindow {
    let today_len = series.today_len();
    if today_len == 0 {
        return CheapestWindow::Unavailable;
    }

    let count = ((params.duration_hours / 24.0 * today_len as f64).ceil() as usize)
        .clamp(1, series.len());

    let now_local = series.local(now);
    let today = now_local.date_naive();
    let deadline_on = |date| {
        series
            .local_time_on(date, params.deadline_hour)
            .or_else(|| series.local_time_on(date, params.deadline_hour + 1))
    };

    let Some(mut finish_at) = deadline_on(today) else {
        return CheapestWindow::Unavailable;
    };

    let hour = now_local.hour();
    if (hour >= PUBLICATION_HOUR && series.has_tomorrow()) || finish_at < now {
        finish_at = today
            .succ_opt()
            .and_then(deadline_on)
            .unwrap_or(finish_at + TimeDelta::days(1));
    } else if (ESTIMATE_FROM_HOUR..ESTIMATE_UNTIL_HOUR).contains(&hour)
        && !series.has_tomorrow()
        && !params.allow_next_day_data
    {
        return match series.cheapest_today_at(count) {
            Some(avg_price) => CheapestWindow::Estimate { avg_price },
            None => CheapestWindow::Unavailable,
        };
    }

    let start_index = series.index_at(now);
    if start_index >= series.len() {
        return CheapestWindow::Unavailable;
    }

    let values: Vec<f64> = series.values().collect();
    let end_count = series.count_ending_by(finish_at);

    let (best, window_len, best_sum) = if start_index + count <= end_count {
        let mut best = start_index;
        let mut best_sum = f64::INFINITY;
        for candidate in start_index..=end_count - count {
            let sum: f64 = values[candidate..candidate + count].iter().sum();
            if sum < best_sum - PRICE_EPSILON {
                best = candidate;
                best_sum = sum;
            }
        }
        (best, count, best_sum)
    } else {
        let end = (start_index + count).min(values.len());
        let sum: f64 = values[start_index..end].iter().sum();
        (start_index, end - start_index, sum)
    };

    let avg_price = round_price(best_sum / window_len as f64);
    debug!(
        start_index,
        end_count,
        count,
        best,
        avg_price,
        "Cheapest window located"
    );

    let (adjusted, final_end_index) = extend_window(&values, start_index, best, window_len, params);

    let points = series.points();
    let start = points[best].start;
    let adjusted_start = points[adjusted].start;
    let final_end = points[final_end_index - 1].end;

    // A deferred start is already covered by `final_end`
    let estimated_end = (final_end - (start - adjusted_start)).min(final_end);

    CheapestWindow::Window(ScheduledWindow {
        start,
        adjusted_start,
        estimated_end,
        final_end,
        avg_price,
    })
}

/// Widen a chosen window over points priced close to it
///
/// Returns the adjusted start index and the exclusive final end index.
fn extend_window(
    values: &[f64],
    earliest: usize,
    best: usize,
    window_len: usize,
    params: &WindowParams,
) -> (usize, usize) {
    let stop = params.stop_sensitivity;
    let start_sensitivity = params.start_sensitivity;

    let highest = values[best..best + window_len]
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let mut final_end = best + window_len;
    while final_end < values.len() && values[final_end] <= highest + stop + PRICE_EPSILON {
        final_end += 1;
    }

    // Defer while dropping the first point for the next one is clearly cheaper
    let mut adjusted = best;
    for _ in 0..MAX_DEFERRAL_STEPS {
        let next_in = adjusted + window_len;
        if next_in >= values.len() {
            break;
        }
        let saving = values[adjusted] - values[next_in];
        let step_down = values[adjusted] - values[adjusted + 1];
        if saving > 1.5 * stop + PRICE_EPSILON && step_down > 1.3 * stop + PRICE_EPSILON {
            adjusted += 1;
        } else {
            break;
        }
    }

    if adjusted > best {
        return (adjusted, final_end.max(adjusted + window_len));
    }

    let start_price = values[best];
    while adjusted > earliest {
        let previous = values[adjusted - 1];
        if previous <= start_price + start_sensitivity + PRICE_EPSILON
            && previous <= highest + 2.0 * start_sensitivity + PRICE_EPSILON
        {
            adjusted -= 1;
        } else {
            break;
        }
    }

    (adjusted, final_end)
}
