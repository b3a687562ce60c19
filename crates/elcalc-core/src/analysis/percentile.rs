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

//! Percentile thresholds over a day's sorted prices

use crate::pricing::PriceSeries;

impl PriceSeries {
    /// Sorted values of the day a point index belongs to
    ///
    /// Indices past today resolve to tomorrow once it is published, otherwise
    /// they fall back to today.
    fn sorted_for(&self, index: usize) -> &[f64] {
        if index < self.today_len() || self.sorted_tomorrow().is_empty() {
            self.sorted_today()
        } else {
            self.sorted_tomorrow()
        }
    }

    /// Price under which a point counts among the day's cheapest `window_hours`
    ///
    /// The rank is `round(window_hours / 24 * points_in_day)`, clamped to the
    /// day. With `min_delta`, the threshold is never closer to the day's
    /// minimum than `min_delta`. `None` for an empty series.
    pub fn lowest_price_threshold(
        &self,
        index: usize,
        window_hours: f64,
        min_delta: Option<f64>,
    ) -> Option<f64> {
        let sorted = self.sorted_for(index);
        let cheapest = *sorted.first()?;
        let at_rank = sorted[hours_to_rank(window_hours, sorted.len())];

        Some(match min_delta {
            Some(delta) if at_rank < cheapest + delta => cheapest + delta,
            _ => at_rank,
        })
    }

    /// Today's price at a rank of the ascending index, clamped to the last one
    pub fn cheapest_today_at(&self, rank: usize) -> Option<f64> {
        let sorted = self.sorted_today();
        sorted.get(rank.min(sorted.len().checked_sub(1)?)).copied()
    }
}

fn hours_to_rank(hours: f64, day_len: usize) -> usize {
    let rank = (hours / 24.0 * day_len as f64).round().max(0.0) as usize;
    rank.min(day_len.saturating_sub(1))
}
