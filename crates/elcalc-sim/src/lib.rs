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

//! Command line host for the price schedule engine
//!
//! Loads configuration and prices, runs the cheapest window, savings and
//! spend detectors at a given instant, and keeps the previous savings result
//! in a state file between runs.

pub mod cli;
pub mod state;

use anyhow::{Context, Result};
use chrono::Utc;
use elcalc_core::{
    HolidayCalendar, PriceSeries, find_cheapest_window, find_savings_intervals,
    find_spend_intervals,
};
use tracing::{info, warn};

use crate::cli::{
    Cli, ElCalcConfig, FixedScheduleLoader, JsonPriceLoader, OutputFormat, PriceLoader, Report,
    TableFormatter,
};
use crate::state::HostState;

/// Run one recalculation and render it
pub fn run(cli: &Cli) -> Result<String> {
    let config = ElCalcConfig::from_file(&cli.config)?;
    let tz = config.series.tz()?;
    let now = cli
        .now
        .unwrap_or_else(|| Utc::now().with_timezone(&tz).fixed_offset());

    let loader: Box<dyn PriceLoader> = match (&cli.prices, &config.fixed) {
        (Some(path), _) => Box::new(JsonPriceLoader::new(path.clone())),
        (None, Some(fixed)) => Box::new(FixedScheduleLoader::new(
            fixed.schedule.clone(),
            fixed.granularity_minutes,
            series_date(now, tz),
        )),
        (None, None) => anyhow::bail!("No price source: pass --prices or configure [fixed]"),
    };

    let prices = loader.load(tz)?;
    let calendar = HolidayCalendar::new(config.calendar.holidays.iter().copied());
    let series = PriceSeries::from_raw(tz, &prices.today, &prices.tomorrow, &config.tax, &calendar)
        .context("Price data is not a valid series")?;

    let previous = match &cli.state {
        Some(path) => HostState::load(path)?
            .map(|state| state.savings)
            .unwrap_or_default(),
        None => Vec::new(),
    };

    let mut savings_params = config.savings.clone();
    savings_params.reset_continuity |= cli.reset_continuity;

    let window = find_cheapest_window(&series, now, &config.window);
    let savings = find_savings_intervals(&series, now, &savings_params, &previous);
    let spend = find_spend_intervals(&series, now, &config.spend);

    info!(
        savings = savings.intervals.len(),
        spend = spend.len(),
        continuity_budget = savings.continuity_budget,
        "Recalculated price schedule"
    );

    if let Some(path) = &cli.state {
        let state = HostState {
            generated_at: now,
            savings: savings.intervals.clone(),
            continuity_budget: savings.continuity_budget,
        };
        if let Err(e) = state.save(path) {
            warn!("Failed to save state to {}: {e:#}", path.display());
        }
    }

    let report = Report {
        now,
        series: &series,
        window: &window,
        savings: &savings,
        spend: &spend,
    };

    match cli.output {
        OutputFormat::Table => Ok(TableFormatter::format_report(&report)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&report.to_json()).context("Failed to render JSON report")
        }
    }
}

fn series_date(now: elcalc_core::Timestamp, tz: chrono_tz::Tz) -> chrono::NaiveDate {
    now.with_timezone(&tz).date_naive()
}
