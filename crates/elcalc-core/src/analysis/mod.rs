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

//! Price schedule analysis: cheapest window, savings and spend detection
//!
//! Every entry point takes an immutable [`PriceSeries`](crate::PriceSeries)
//! and the current instant, and degrades to empty results instead of failing.

mod merger;
mod percentile;
mod savings;
mod spend;
mod window;

pub use merger::{merge, merge_indices};
pub use savings::{SavingsOutcome, find_savings_intervals};
pub use spend::find_spend_intervals;
pub use window::{CheapestWindow, ScheduledWindow, find_cheapest_window};

/// Slack for price comparisons on values rounded to three decimals
pub(crate) const PRICE_EPSILON: f64 = 1e-9;
