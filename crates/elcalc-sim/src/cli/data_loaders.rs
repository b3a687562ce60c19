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

//! Price sources for the host: JSON price files and fixed tariffs.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use elcalc_core::fixed_price_points;
use elcalc_types::{FixedPriceSchedule, PricePoint};
use serde::Deserialize;
use tracing::debug;

/// Raw provider prices for today and, once published, tomorrow
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceData {
    pub today: Vec<PricePoint>,

    #[serde(default)]
    pub tomorrow: Vec<PricePoint>,
}

/// Trait for loading raw prices from various sources
pub trait PriceLoader {
    fn load(&self, tz: Tz) -> Result<PriceData>;
}

/// Loader for JSON price files
#[derive(Debug)]
pub struct JsonPriceLoader {
    path: PathBuf,
}

impl JsonPriceLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PriceLoader for JsonPriceLoader {
    fn load(&self, _tz: Tz) -> Result<PriceData> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read price file: {}", self.path.display()))?;
        let data: PriceData = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse price file: {}", self.path.display()))?;

        debug!(
            today = data.today.len(),
            tomorrow = data.tomorrow.len(),
            "Loaded price file"
        );
        Ok(data)
    }
}

/// Loader generating today's and tomorrow's points from a fixed tariff
#[derive(Debug)]
pub struct FixedScheduleLoader {
    schedule: FixedPriceSchedule,
    granularity_minutes: u32,
    date: NaiveDate,
}

impl FixedScheduleLoader {
    pub fn new(schedule: FixedPriceSchedule, granularity_minutes: u32, date: NaiveDate) -> Self {
        Self {
            schedule,
            granularity_minutes,
            date,
        }
    }
}

impl PriceLoader for FixedScheduleLoader {
    fn load(&self, tz: Tz) -> Result<PriceData> {
        let tomorrow = self
            .date
            .succ_opt()
            .with_context(|| format!("No day after {}", self.date))?;

        let data = PriceData {
            today: fixed_price_points(&self.schedule, self.date, tz, self.granularity_minutes),
            tomorrow: fixed_price_points(&self.schedule, tomorrow, tz, self.granularity_minutes),
        };

        if data.today.is_empty() {
            anyhow::bail!("Fixed schedule produced no prices for {}", self.date);
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_json_loader() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "today": [
                    {{"start": "2025-01-14T00:00:00+01:00", "end": "2025-01-14T01:00:00+01:00", "value": 0.42}},
                    {{"start": "2025-01-14T01:00:00+01:00", "end": "2025-01-14T02:00:00+01:00", "value": 0.40}}
                ]
            }}"#
        )
        .unwrap();

        let data = JsonPriceLoader::new(file.path().to_path_buf())
            .load(chrono_tz::Europe::Oslo)
            .unwrap();
        assert_eq!(data.today.len(), 2);
        assert!(data.tomorrow.is_empty());
        assert_eq!(data.today[1].value, 0.40);
    }

    #[test]
    fn test_json_loader_reports_path() {
        let loader = JsonPriceLoader::new(PathBuf::from("/nonexistent/prices.json"));
        let err = loader.load(chrono_tz::Europe::Oslo).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/prices.json"));
    }

    #[test]
    fn test_fixed_loader_two_days() {
        let loader = FixedScheduleLoader::new(
            FixedPriceSchedule::Flat(1.2),
            15,
            NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(),
        );

        let data = loader.load(chrono_tz::Europe::Oslo).unwrap();
        assert_eq!(data.today.len(), 96);
        assert_eq!(data.tomorrow.len(), 96);
        assert_eq!(data.today.last().unwrap().end, data.tomorrow[0].start);
    }
}
