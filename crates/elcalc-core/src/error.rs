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

//! Error types for the price analysis engine

use elcalc_types::Timestamp;
use thiserror::Error;

/// A price series that breaks the ordering or contiguity rules
///
/// This is the only failure the engine reports. Once a `PriceSeries` exists,
/// every detector call succeeds and degrades to empty results instead.
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("{day} point {index} has a non-finite price")]
    NonFiniteValue { day: Day, index: usize },

    #[error("{day} point {index} ends at {end} which is not after its start {start}")]
    EmptyPoint {
        day: Day,
        index: usize,
        start: Timestamp,
        end: Timestamp,
    },

    #[error("{day} point {index} starts at {start} but the previous point ends at {previous_end}")]
    NotContiguous {
        day: Day,
        index: usize,
        start: Timestamp,
        previous_end: Timestamp,
    },

    #[error("{day} point {index} lasts {found_minutes} min, expected {expected_minutes} min")]
    MixedGranularity {
        day: Day,
        index: usize,
        expected_minutes: i64,
        found_minutes: i64,
    },

    #[error("tomorrow's prices were supplied without any prices for today")]
    TomorrowWithoutToday,
}

/// Which half of the series a point came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Day {
    Today,
    Tomorrow,
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Day::Today => write!(f, "today"),
            Day::Tomorrow => write!(f, "tomorrow"),
        }
    }
}

pub type Result<T> = std::result::Result<T, SeriesError>;
