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

//! Savings detection: "turn off" intervals around price peaks
//!
//! Four passes over the series from `now` onwards:
//!
//! 1. carry forward points of the previous result that already started,
//!    accumulating the continuity budget (off hours already spent)
//! 2. seed points that precede a price drop
//! 3. prune seeds that are too cheap or not worth delaying
//! 4. consolidate runs backwards, extending them over points still priced
//!    above the post-peak level and trimming them to `max_continuous_hours`

use std::collections::BTreeSet;

use chrono::TimeDelta;
use elcalc_types::{Interval, SavingsParams, Timestamp};
use tracing::debug;

use super::{PRICE_EPSILON, merger::merge_indices};
use crate::pricing::PriceSeries;

/// Two-point drops must be this much larger than the single-step threshold
const TWO_STEP_DROP_FACTOR: f64 = 1.3;

/// Result of a savings calculation
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsOutcome {
    /// Disjoint off intervals sorted by start
    pub intervals: Vec<Interval>,

    /// Off hours already spent before `now`, rounded up to whole hours
    pub continuity_budget: f64,

    /// Longest off interval today that has not ended yet, capped at the maximum
    pub longest_off: TimeDelta,

    /// When equipment switched off for `longest_off` turns back on
    pub turn_on_at: Option<Timestamp>,
}

impl SavingsOutcome {
    fn empty() -> Self {
        Self {
            intervals: Vec::new(),
            continuity_budget: 0.0,
            longest_off: TimeDelta::zero(),
            turn_on_at: None,
        }
    }
}

/// Find intervals where equipment should be off because prices peak
///
/// `previous` is the interval list of the last calculation. Its points that
/// already started are kept as-is once tomorrow's prices are known, and
/// count against `max_continuous_hours` for an off run reaching `now`.
pub fn find_savings_intervals(
    series: &PriceSeries,
    now: Timestamp,
    params: &SavingsParams,
    previous: &[Interval],
) -> SavingsOutcome {
    let len = series.len();
    let index_now = series.index_at(now);
    if len < 2 || index_now >= len {
        return SavingsOutcome::empty();
    }

    let values: Vec<f64> = series.values().collect();
    let mut marked = BTreeSet::new();

    let continuity_budget = if !previous.is_empty() && series.has_tomorrow() {
        carry_forward(series, index_now, params, previous, &mut marked)
    } else {
        0.0
    };

    seed_drops(&values, index_now, params.price_drop_threshold, &mut marked);
    debug!(seeds = marked.len(), index_now, "Savings seeds found");

    prune(series, &values, index_now, params, &mut marked);
    consolidate(series, &values, index_now, continuity_budget, params, &mut marked);

    let intervals = merge_indices(series, &marked);
    let (longest_off, turn_on_at) = longest_pending(series, now, &intervals, params);

    debug!(
        intervals = intervals.len(),
        continuity_budget,
        longest_off_minutes = longest_off.num_minutes(),
        "Savings intervals calculated"
    );

    SavingsOutcome {
        intervals,
        continuity_budget,
        longest_off,
        turn_on_at,
    }
}

// ============= Pass 1: carry forward =============

/// Re-mark already started points of the previous result and return the
/// continuity budget in whole hours
///
/// Every completed run adds its length to the budget. Between runs the budget
/// recovers by `(max - last_run) / min_on` per elapsed hour, never below zero.
/// A run still going at `now` is added in full. On a reset that run is not
/// replayed, so the off period starting at `now` begins from scratch.
fn carry_forward(
    series: &PriceSeries,
    index_now: usize,
    params: &SavingsParams,
    previous: &[Interval],
    marked: &mut BTreeSet<usize>,
) -> f64 {
    let points = series.points();
    let mut budget: f64 = 0.0;
    let mut run_start: Option<(usize, Timestamp)> = None;
    let mut last_run_hours: f64 = 0.0;

    for (index, point) in points.iter().enumerate().take(index_now) {
        if previous.iter().any(|interval| interval.contains(point.start)) {
            marked.insert(index);
            run_start.get_or_insert((index, point.start));
        } else if let Some((_, start)) = run_start.take() {
            last_run_hours = hours_between(start, point.start);
            budget += last_run_hours;
        } else if last_run_hours > 0.0 && budget > 0.0 {
            let recovery = (params.max_continuous_hours - last_run_hours) / params.min_on_hours
                * point.hours();
            budget = (budget - recovery.max(0.0)).max(0.0);
        } else {
            budget = 0.0;
        }
    }

    if let Some((first, start)) = run_start {
        if params.reset_continuity {
            marked.retain(|&index| index < first);
        } else {
            budget += hours_between(start, points[index_now].start);
        }
    }

    debug!(
        replayed = marked.len(),
        budget,
        reset = params.reset_continuity,
        "Carried forward previous savings"
    );

    if params.reset_continuity {
        0.0
    } else {
        (budget - PRICE_EPSILON).ceil().max(0.0)
    }
}

fn hours_between(start: Timestamp, end: Timestamp) -> f64 {
    (end - start).num_seconds() as f64 / 3600.0
}

// ============= Pass 2: seeds =============

fn seed_drops(values: &[f64], index_now: usize, drop: f64, marked: &mut BTreeSet<usize>) {
    for i in index_now..values.len().saturating_sub(1) {
        if values[i] - values[i + 1] >= drop - PRICE_EPSILON {
            marked.insert(i);
        } else if i > index_now
            && values[i - 1] - values[i + 1] >= TWO_STEP_DROP_FACTOR * drop - PRICE_EPSILON
        {
            marked.insert(i - 1);
        }
    }
}

// ============= Pass 3: pruning =============

fn prune(
    series: &PriceSeries,
    values: &[f64],
    index_now: usize,
    params: &SavingsParams,
    marked: &mut BTreeSet<usize>,
) {
    let removals: Vec<usize> = marked
        .range(index_now..)
        .copied()
        .filter(|&i| {
            let too_cheap = series
                .lowest_price_threshold(i, params.min_on_hours, Some(params.price_drop_threshold))
                .is_some_and(|threshold| values[i] < threshold - PRICE_EPSILON);
            let rising_through = i > 0 && i + 1 < values.len() && values[i - 1] < values[i + 1];
            too_cheap || rising_through
        })
        .collect();

    for i in &removals {
        marked.remove(i);
    }

    debug!(removed = removals.len(), "Pruned savings seeds");
}

// ============= Pass 4: consolidation =============

/// An off run being built while scanning backwards
#[derive(Debug)]
struct Run {
    first: usize,
    /// Exclusive
    end: usize,
    /// Price right after the run, the level the peak is measured against
    after_price: f64,
}

fn consolidate(
    series: &PriceSeries,
    values: &[f64],
    index_now: usize,
    continuity_budget: f64,
    params: &SavingsParams,
    marked: &mut BTreeSet<usize>,
) {
    let Some(&last_marked) = marked.iter().next_back() else {
        return;
    };
    if last_marked < index_now {
        return;
    }

    let drop = params.price_drop_threshold;
    let growth = params.price_drop_growth_factor.powf(series.point_hours());
    let mut peak_diff = drop;
    let mut run: Option<Run> = None;

    for i in (index_now..=last_marked).rev() {
        if marked.contains(&i) {
            match run.as_mut() {
                Some(open) => open.first = i,
                None => {
                    run = Some(Run {
                        first: i,
                        end: i + 1,
                        after_price: values.get(i + 1).copied().unwrap_or(values[i]),
                    });
                }
            }
            continue;
        }

        match run.take() {
            Some(mut open) if values[i] > open.after_price + peak_diff + PRICE_EPSILON => {
                marked.insert(i);
                open.first = i;
                peak_diff *= growth;
                run = Some(open);
            }
            Some(closed) => {
                enforce_max(series, values, &closed, 0.0, params, growth, marked);
                peak_diff = drop;
            }
            None => {}
        }
    }

    // Only a run reaching `now` can continue an earlier off period
    if let Some(open) = run {
        enforce_max(series, values, &open, continuity_budget, params, growth, marked);
    }
}

/// Remove points from a run until it plus `budget` fits the maximum
///
/// Cheap interior dips go first since skipping them saves least. The rest is
/// trimmed from whichever end has the lower opportunity cost.
fn enforce_max(
    series: &PriceSeries,
    values: &[f64],
    run: &Run,
    budget: f64,
    params: &SavingsParams,
    growth: f64,
    marked: &mut BTreeSet<usize>,
) {
    let points = series.points();
    let run_hours: f64 = (run.first..run.end)
        .filter(|i| marked.contains(i))
        .map(|i| points[i].hours())
        .sum();

    let excess = run_hours + budget - params.max_continuous_hours;
    if excess <= PRICE_EPSILON {
        return;
    }

    let point_hours = points[run.first].hours();
    let mut to_remove = (excess / point_hours - PRICE_EPSILON).ceil() as usize;
    debug!(
        first = run.first,
        end = run.end,
        run_hours,
        budget,
        to_remove,
        "Off run exceeds maximum"
    );

    // Interior dips below both boundary prices, cheapest first. Runs built by
    // the backward scan price every point above `after_price` and have none.
    let boundary = values[run.first].min(run.after_price);
    let mut dips: Vec<usize> = (run.first + 1..run.end)
        .filter(|&i| values[i] < boundary)
        .collect();
    dips.sort_by(|a, b| values[*a].total_cmp(&values[*b]));

    for i in dips.into_iter().take(to_remove) {
        marked.remove(&i);
        to_remove -= 1;
        debug!(index = i, price = values[i], "Removed dip from off run");
    }

    let drop = params.price_drop_threshold;
    let mut start = run.first;
    let mut end = run.end - 1;

    while to_remove > 0 && start <= end {
        if !marked.contains(&start) {
            start += 1;
            continue;
        }
        if !marked.contains(&end) {
            match end.checked_sub(1) {
                Some(previous) => end = previous,
                None => break,
            }
            continue;
        }

        let steps = i32::try_from(end - start).unwrap_or(i32::MAX);
        let start_cost = values[start] + drop * growth.powi(steps);
        let end_cost = values[end] + drop;

        let removed = if start_cost > end_cost {
            let removed = end;
            match end.checked_sub(1) {
                Some(previous) => end = previous,
                None => start += 1,
            }
            removed
        } else {
            let removed = start;
            start += 1;
            removed
        };

        marked.remove(&removed);
        to_remove -= 1;
        debug!(index = removed, start_cost, end_cost, "Trimmed off run edge");
    }
}

// ============= Outcome =============

/// Longest off interval starting today that has not ended at `now`
fn longest_pending(
    series: &PriceSeries,
    now: Timestamp,
    intervals: &[Interval],
    params: &SavingsParams,
) -> (TimeDelta, Option<Timestamp>) {
    let today = series.local_date(now);
    let cap = TimeDelta::seconds((params.max_continuous_hours * 3600.0) as i64);

    let mut longest = TimeDelta::zero();
    let mut turn_on_at = None;

    for interval in intervals
        .iter()
        .filter(|iv| iv.end > now && series.local_date(iv.start) <= today)
    {
        let duration = interval.duration.min(cap);
        if duration > longest {
            longest = duration;
            turn_on_at = Some(interval.end);
        }
    }

    (longest, turn_on_at)
}
