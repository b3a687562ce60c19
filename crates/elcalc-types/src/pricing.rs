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

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};

/// Instant with the offset the provider reported it in
pub type Timestamp = DateTime<FixedOffset>;

// ============= Pricing Types =============

/// A single price interval as delivered by a provider or after tax adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Start of the interval (inclusive)
    pub start: Timestamp,

    /// End of the interval (exclusive)
    pub end: Timestamp,

    /// Price in currency per kWh
    pub value: f64,
}

impl PricePoint {
    pub fn new(start: Timestamp, end: Timestamp, value: f64) -> Self {
        Self { start, end, value }
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Interval length in fractional hours
    pub fn hours(&self) -> f64 {
        self.duration().num_seconds() as f64 / 3600.0
    }

    pub fn contains(&self, instant: Timestamp) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Price statistics for one day of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub median: f64,
}

impl PriceStats {
    /// Statistics over an ascending slice of values; `None` when empty
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        let avg = sorted.iter().sum::<f64>() / sorted.len() as f64;
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Some(Self {
            min,
            max,
            avg,
            median,
        })
    }
}
