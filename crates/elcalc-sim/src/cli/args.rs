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

//! CLI argument definitions using clap.

use std::path::PathBuf;

use chrono::DateTime;
use clap::{Parser, ValueEnum};
use elcalc_core::Timestamp;

#[derive(Debug, Parser)]
#[command(name = "elcalc")]
#[command(author, version, about = "ElCalc electricity price schedule analysis")]
#[command(
    long_about = "Finds the cheapest run window before a deadline and the intervals where\n\
    equipment should be turned off (price peaks) or on (cheap points before a rise).\n\
    \nRun it repeatedly with --state to carry off-time already spent across calculations.\n\
    \nExamples:\n  \
    elcalc --prices prices.json\n  \
    elcalc --config heater.toml --prices prices.json --now 2025-01-14T18:00:00+01:00\n  \
    elcalc --prices prices.json --state state.json --output json"
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, short, value_name = "PATH", default_value = "elcalc.toml")]
    pub config: PathBuf,

    /// JSON price file with `today` and optional `tomorrow` point lists
    #[arg(
        long,
        value_name = "PATH",
        long_help = "Price file with raw provider prices:\n  \
          {\"today\": [{\"start\": ..., \"end\": ..., \"value\": ...}], \"tomorrow\": [...]}\n\
          \nWhen omitted, prices are generated from the [fixed] config section."
    )]
    pub prices: Option<PathBuf>,

    /// Instant to calculate at (RFC 3339), defaults to the current time
    #[arg(long, value_name = "RFC3339", value_parser = parse_timestamp)]
    pub now: Option<Timestamp>,

    /// JSON file holding the previous savings result
    #[arg(long, value_name = "PATH")]
    pub state: Option<PathBuf>,

    /// Ignore off time already spent in earlier calculations
    #[arg(long, default_value_t = false)]
    pub reset_continuity: bool,

    /// How to display results
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Log engine diagnostics (overridden by RUST_LOG)
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

fn parse_timestamp(value: &str) -> Result<Timestamp, String> {
    DateTime::parse_from_rfc3339(value).map_err(|e| format!("invalid RFC 3339 time '{value}': {e}"))
}
