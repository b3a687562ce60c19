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

pub mod analysis;
pub mod error;
pub mod pricing;

pub use analysis::{
    CheapestWindow, SavingsOutcome, ScheduledWindow, find_cheapest_window,
    find_savings_intervals, find_spend_intervals, merge, merge_indices,
};
pub use error::{Day, SeriesError};
pub use pricing::{
    DayTypeClassifier, HolidayCalendar, PriceSeries, WeekendCalendar, fixed_price_points,
};

// Re-export the shared data types so hosts only need this crate
pub use elcalc_types::{
    ConfigError, FixedPriceSchedule, Interval, MonthlyRate, PricePoint, PriceStats,
    SavingsParams, SpendParams, TaxConfig, Timestamp, WindowParams,
};
