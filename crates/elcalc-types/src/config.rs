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

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected detector or tax parameters
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("{name} must be greater than zero, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("price_drop_growth_factor must be at least 1.0, got {0}")]
    GrowthBelowOne(f64),

    #[error("deadline_hour must be in 0..=23, got {0}")]
    DeadlineHour(u32),

    #[error("hourly fixed price schedule needs 24 values, got {0}")]
    HourlyScheduleLength(usize),
}

fn check_finite(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NotFinite { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if check_finite(name, value)? < 0.0 {
        return Err(ConfigError::Negative { name, value });
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if check_finite(name, value)? <= 0.0 {
        return Err(ConfigError::NotPositive { name, value });
    }
    Ok(())
}

// ============= Tax Configuration =============

/// Tax value that is either constant or varies by calendar month
///
/// Monthly tables hold twelve values, January first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MonthlyRate {
    Flat(f64),
    Monthly([f64; 12]),
}

impl MonthlyRate {
    /// Rate for a calendar month (1-12)
    pub fn for_month(&self, month: u32) -> f64 {
        match self {
            MonthlyRate::Flat(rate) => *rate,
            MonthlyRate::Monthly(rates) => {
                let idx = (month.clamp(1, 12) - 1) as usize;
                rates[idx]
            }
        }
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        match self {
            MonthlyRate::Flat(rate) => check_finite(name, *rate).map(|_| ()),
            MonthlyRate::Monthly(rates) => rates
                .iter()
                .try_for_each(|rate| check_finite(name, *rate).map(|_| ())),
        }
    }
}

impl Default for MonthlyRate {
    fn default() -> Self {
        MonthlyRate::Flat(0.0)
    }
}

/// Grid tax and subsidy settings applied to raw provider prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxConfig {
    /// Tax added on workdays between 06:00 and 22:00
    #[serde(default)]
    pub day_tax: MonthlyRate,

    /// Tax added at night and on non-workdays
    #[serde(default)]
    pub night_tax: MonthlyRate,

    /// Flat tax added to every point
    #[serde(default)]
    pub additional_tax: f64,

    /// Raw price above which the power support subsidy kicks in
    #[serde(default = "default_power_support_threshold")]
    pub power_support_threshold: f64,

    /// Share of the price above the threshold that is refunded (0.0-1.0)
    #[serde(default)]
    pub power_support_rate: f64,
}

fn default_power_support_threshold() -> f64 {
    10.0
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            day_tax: MonthlyRate::default(),
            night_tax: MonthlyRate::default(),
            additional_tax: 0.0,
            power_support_threshold: default_power_support_threshold(),
            power_support_rate: 0.0,
        }
    }
}

impl TaxConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.day_tax.validate("day_tax")?;
        self.night_tax.validate("night_tax")?;
        check_finite("additional_tax", self.additional_tax)?;
        check_finite("power_support_threshold", self.power_support_threshold)?;
        check_non_negative("power_support_rate", self.power_support_rate)?;
        Ok(())
    }
}

/// Schedule for fixed prices (flat or hourly)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixedPriceSchedule {
    Flat(f64),
    Hourly(Vec<f64>),
}

impl FixedPriceSchedule {
    /// Get price for a specific hour (0-23)
    pub fn price_at(&self, hour: u32) -> f64 {
        match self {
            FixedPriceSchedule::Flat(price) => *price,
            FixedPriceSchedule::Hourly(prices) => {
                if prices.is_empty() {
                    return 0.0;
                }
                prices[hour as usize % prices.len()]
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            FixedPriceSchedule::Flat(price) => check_finite("fixed price", *price).map(|_| ()),
            FixedPriceSchedule::Hourly(prices) => {
                if prices.len() != 24 {
                    return Err(ConfigError::HourlyScheduleLength(prices.len()));
                }
                prices
                    .iter()
                    .try_for_each(|price| check_finite("fixed price", *price).map(|_| ()))
            }
        }
    }
}

impl Default for FixedPriceSchedule {
    fn default() -> Self {
        FixedPriceSchedule::Flat(0.0)
    }
}

// ============= Detector Parameters =============

/// Request for the cheapest continuous window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowParams {
    /// Run time needed, in hours
    #[serde(default = "default_duration_hours")]
    pub duration_hours: f64,

    /// Local hour (0-23) the run must be finished by
    #[serde(default = "default_deadline_hour")]
    pub deadline_hour: u32,

    /// Commit to a window even when tomorrow's prices are not published yet
    #[serde(default)]
    pub allow_next_day_data: bool,

    /// Price slack for starting earlier than the cheapest window
    #[serde(default = "default_sensitivity")]
    pub start_sensitivity: f64,

    /// Price slack for running past the cheapest window, and for deferring its start
    #[serde(default = "default_sensitivity")]
    pub stop_sensitivity: f64,
}

fn default_duration_hours() -> f64 {
    3.0
}
fn default_deadline_hour() -> u32 {
    7
}
fn default_sensitivity() -> f64 {
    0.05
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            duration_hours: default_duration_hours(),
            deadline_hour: default_deadline_hour(),
            allow_next_day_data: false,
            start_sensitivity: default_sensitivity(),
            stop_sensitivity: default_sensitivity(),
        }
    }
}

impl WindowParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("duration_hours", self.duration_hours)?;
        if self.deadline_hour > 23 {
            return Err(ConfigError::DeadlineHour(self.deadline_hour));
        }
        check_non_negative("start_sensitivity", self.start_sensitivity)?;
        check_non_negative("stop_sensitivity", self.stop_sensitivity)?;
        Ok(())
    }
}

/// Parameters for finding "turn off" windows around price peaks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsParams {
    /// Minimum price fall that makes the point before it worth skipping
    #[serde(default = "default_price_drop_threshold")]
    pub price_drop_threshold: f64,

    /// Longest time equipment may stay off in one stretch
    #[serde(default = "default_max_continuous_hours")]
    pub max_continuous_hours: f64,

    /// Hours of cheap prices per day the equipment should run; also scales
    /// how fast the carried off-time budget recovers
    #[serde(default = "default_min_on_hours")]
    pub min_on_hours: f64,

    /// Hourly growth of the price gap needed to keep extending an off run
    #[serde(default = "default_price_drop_growth_factor")]
    pub price_drop_growth_factor: f64,

    /// Ignore off-time already spent in earlier calculations
    #[serde(default)]
    pub reset_continuity: bool,
}

fn default_price_drop_threshold() -> f64 {
    0.3
}
fn default_max_continuous_hours() -> f64 {
    2.0
}
fn default_min_on_hours() -> f64 {
    6.0
}
fn default_price_drop_growth_factor() -> f64 {
    1.2
}

impl Default for SavingsParams {
    fn default() -> Self {
        Self {
            price_drop_threshold: default_price_drop_threshold(),
            max_continuous_hours: default_max_continuous_hours(),
            min_on_hours: default_min_on_hours(),
            price_drop_growth_factor: default_price_drop_growth_factor(),
            reset_continuity: false,
        }
    }
}

impl SavingsParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("price_drop_threshold", self.price_drop_threshold)?;
        check_positive("max_continuous_hours", self.max_continuous_hours)?;
        check_positive("min_on_hours", self.min_on_hours)?;
        if check_finite("price_drop_growth_factor", self.price_drop_growth_factor)? < 1.0 {
            return Err(ConfigError::GrowthBelowOne(self.price_drop_growth_factor));
        }
        Ok(())
    }
}

/// Parameters for finding "turn on" windows before price rises
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendParams {
    /// Minimum price rise that makes the point before it worth using
    #[serde(default = "default_price_increase_threshold")]
    pub price_increase_threshold: f64,
}

fn default_price_increase_threshold() -> f64 {
    0.3
}

impl Default for SpendParams {
    fn default() -> Self {
        Self {
            price_increase_threshold: default_price_increase_threshold(),
        }
    }
}

impl SpendParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("price_increase_threshold", self.price_increase_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct TaxFile {
        tax: TaxConfig,
    }

    #[test]
    fn test_monthly_rate_from_toml() {
        let parsed: TaxFile = toml::from_str(
            r#"
            [tax]
            day_tax = [0.5, 0.5, 0.5, 0.4, 0.4, 0.4, 0.3, 0.3, 0.4, 0.4, 0.5, 0.6]
            night_tax = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(parsed.tax.day_tax.for_month(1), 0.5);
        assert_eq!(parsed.tax.day_tax.for_month(12), 0.6);
        assert_eq!(parsed.tax.night_tax.for_month(7), 0.2);
        assert_eq!(parsed.tax.power_support_threshold, 10.0);
        assert_eq!(parsed.tax.power_support_rate, 0.0);
    }

    #[test]
    fn test_monthly_rate_wrong_arity_rejected() {
        let parsed: Result<TaxFile, _> = toml::from_str(
            r#"
            [tax]
            day_tax = [0.5, 0.5, 0.5]
            "#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_fixed_schedule_price_at() {
        let flat = FixedPriceSchedule::Flat(1.5);
        assert_eq!(flat.price_at(13), 1.5);

        let hourly = FixedPriceSchedule::Hourly((0..24).map(f64::from).collect());
        assert_eq!(hourly.price_at(5), 5.0);
        assert!(hourly.validate().is_ok());

        let short = FixedPriceSchedule::Hourly(vec![1.0; 12]);
        assert_eq!(short.validate(), Err(ConfigError::HourlyScheduleLength(12)));
    }

    #[test]
    fn test_savings_params_validation() {
        assert!(SavingsParams::default().validate().is_ok());

        let params = SavingsParams {
            price_drop_growth_factor: 0.9,
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(ConfigError::GrowthBelowOne(0.9)));

        let params = SavingsParams {
            min_on_hours: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::NotPositive {
                name: "min_on_hours",
                ..
            })
        ));
    }

    #[test]
    fn test_window_params_deadline_range() {
        let params = WindowParams {
            deadline_hour: 24,
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(ConfigError::DeadlineHour(24)));
    }
}
