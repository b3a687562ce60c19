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

//! State persistence between recalculations

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use elcalc_core::{Interval, Timestamp};
use serde::{Deserialize, Serialize};

/// Savings result kept for the next run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostState {
    /// The `now` the result was calculated at
    pub generated_at: Timestamp,

    /// Off intervals, re-supplied as the previous result
    pub savings: Vec<Interval>,

    /// Off hours already spent, for display only
    pub continuity_budget: f64,
}

impl HostState {
    /// Read the state file; `None` when it does not exist yet
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;
        let state = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;
        Ok(Some(state))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let temp_path = path.with_extension("tmp");
        let content = serde_json::to_string_pretty(self).context("Failed to serialize state")?;

        // Atomic write
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta};
    use tempfile::TempDir;

    #[test]
    fn test_missing_state_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(HostState::load(&dir.path().join("state.json")).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let now = DateTime::parse_from_rfc3339("2025-01-14T18:00:00+01:00").unwrap();
        let state = HostState {
            generated_at: now,
            savings: vec![Interval::new(now, now + TimeDelta::hours(1))],
            continuity_budget: 1.0,
        };

        state.save(&path).unwrap();
        assert!(!path.with_extension("tmp").exists());

        let loaded = HostState::load(&path).unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_corrupt_state_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json").unwrap();

        let err = HostState::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse state file"));
    }
}
