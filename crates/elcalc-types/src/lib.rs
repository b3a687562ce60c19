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

pub mod config;
pub mod intervals;
pub mod pricing;

// Re-export common types for convenience
pub use config::{
    ConfigError, FixedPriceSchedule, MonthlyRate, SavingsParams, SpendParams, TaxConfig,
    WindowParams,
};
pub use intervals::Interval;
pub use pricing::{PricePoint, PriceStats, Timestamp};
