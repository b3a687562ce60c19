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

//! CLI module for the elcalc host binary.

pub mod args;
pub mod config;
pub mod data_loaders;
pub mod formatters;

pub use args::{Cli, OutputFormat};
pub use config::{CalendarSection, ElCalcConfig, FixedSection, SeriesSection};
pub use data_loaders::{FixedScheduleLoader, JsonPriceLoader, PriceData, PriceLoader};
pub use formatters::{Report, TableFormatter};
