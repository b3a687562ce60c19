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

use std::collections::BTreeSet;

use elcalc_types::{Interval, Timestamp};

use crate::pricing::PriceSeries;

/// Collapse marked point starts into contiguous intervals
///
/// Starts that do not match any point of the series are ignored.
pub fn merge(series: &PriceSeries, marked: &BTreeSet<Timestamp>) -> Vec<Interval> {
    collect_runs(series, |index| marked.contains(&series.points()[index].start))
}

/// Collapse marked point indices into contiguous intervals
pub fn merge_indices(series: &PriceSeries, marked: &BTreeSet<usize>) -> Vec<Interval> {
    collect_runs(series, |index| marked.contains(&index))
}

fn collect_runs(series: &PriceSeries, is_marked: impl Fn(usize) -> bool) -> Vec<Interval> {
    let points = series.points();
    let mut intervals = Vec::new();
    let mut open: Option<Timestamp> = None;

    for (index, point) in points.iter().enumerate() {
        match (is_marked(index), open) {
            (true, None) => open = Some(point.start),
            (false, Some(start)) => {
                intervals.push(Interval::new(start, point.start));
                open = None;
            }
            _ => {}
        }
    }

    // A run reaching the end of the series closes at the last point's end
    if let (Some(start), Some(last)) = (open, points.last()) {
        intervals.push(Interval::new(start, last.end));
    }

    intervals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use chrono_tz::Europe::Oslo;
    use elcalc_types::PricePoint;

    fn series(count: usize) -> PriceSeries {
        let start = Oslo.with_ymd_and_hms(2025, 4, 8, 0, 0, 0).unwrap();
        let points = (0..count)
            .map(|i| {
                let s = start + TimeDelta::minutes(15 * i as i64);
                PricePoint::new(s.fixed_offset(), (s + TimeDelta::minutes(15)).fixed_offset(), 1.0)
            })
            .collect();
        PriceSeries::new(Oslo, points, Vec::new()).unwrap()
    }

    #[test]
    fn test_runs_are_split_on_gaps() {
        let series = series(8);
        let marked: BTreeSet<usize> = [1, 2, 3, 5, 7].into_iter().collect();

        let intervals = merge_indices(&series, &marked);
        assert_eq!(intervals.len(), 3);

        assert_eq!(intervals[0].start, series.points()[1].start);
        assert_eq!(intervals[0].end, series.points()[4].start);
        assert_eq!(intervals[0].duration, TimeDelta::minutes(45));

        assert_eq!(intervals[1].duration, TimeDelta::minutes(15));

        // Last point closes at the series end
        assert_eq!(intervals[2].end, series.points()[7].end);
    }

    #[test]
    fn test_merge_by_timestamp_matches_indices() {
        let series = series(6);
        let indices: BTreeSet<usize> = [0, 1, 4].into_iter().collect();
        let starts: BTreeSet<Timestamp> =
            indices.iter().map(|&i| series.points()[i].start).collect();

        assert_eq!(merge(&series, &starts), merge_indices(&series, &indices));
    }

    #[test]
    fn test_point_union_equals_marked_set() {
        let series = series(12);
        let marked: BTreeSet<usize> = [0, 2, 3, 4, 8, 9, 11].into_iter().collect();
        let intervals = merge_indices(&series, &marked);

        assert!(intervals.windows(2).all(|w| w[0].end < w[1].start));

        let covered: BTreeSet<usize> = series
            .points()
            .iter()
            .enumerate()
            .filter(|(_, p)| intervals.iter().any(|iv| iv.contains(p.start)))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(covered, marked);
    }

    #[test]
    fn test_empty_inputs() {
        let series = series(4);
        assert!(merge_indices(&series, &BTreeSet::new()).is_empty());

        let empty = PriceSeries::new(Oslo, Vec::new(), Vec::new()).unwrap();
        assert!(merge(&empty, &BTreeSet::new()).is_empty());
    }
}
