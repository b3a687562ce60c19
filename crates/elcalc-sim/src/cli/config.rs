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

//! TOML configuration for the elcalc host.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use elcalc_types::{FixedPriceSchedule, SavingsParams, SpendParams, TaxConfig, WindowParams};
use serde::{Deserialize, Serialize};

/// Root configuration; every section is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElCalcConfig {
    #[serde(default)]
    pub series: SeriesSection,

    #[serde(default)]
    pub tax: TaxConfig,

    #[serde(default)]
    pub calendar: CalendarSection,

    /// Generate prices from a fixed tariff when no price file is given
    #[serde(default)]
    pub fixed: Option<FixedSection>,

    #[serde(default)]
    pub window: WindowParams,

    #[serde(default)]
    pub savings: SavingsParams,

    #[serde(default)]
    pub spend: SpendParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesSection {
    /// IANA time zone the prices are evaluated in
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "Europe/Oslo".to_owned()
}

impl Default for SeriesSection {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl SeriesSection {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid series.timezone '{}': {e}", self.timezone))
    }
}

/// Public holidays billed at the night rate; weekends always are
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarSection {
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedSection {
    pub schedule: FixedPriceSchedule,

    /// Point length in minutes (15 or 60)
    #[serde(default = "default_granularity_minutes")]
    pub granularity_minutes: u32,
}

fn default_granularity_minutes() -> u32 {
    60
}

impl ElCalcConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.series.tz()?;
        self.tax.validate().context("Invalid [tax] section")?;
        self.window.validate().context("Invalid [window] section")?;
        self.savings.validate().context("Invalid [savings] section")?;
        self.spend.validate().context("Invalid [spend] section")?;

        if let Some(fixed) = &self.fixed {
            fixed.schedule.validate().context("Invalid [fixed] schedule")?;
            if !matches!(fixed.granularity_minutes, 15 | 60) {
                anyhow::bail!(
                    "fixed.granularity_minutes must be 15 or 60, got {}",
                    fixed.granularity_minutes
                );
            }
        }

        Ok(())
    }
}
