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

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::pricing::Timestamp;

/// Contiguous run of marked price points
///
/// Produced by the savings and spend detectors. Intervals in one result set
/// are disjoint and sorted by `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: Timestamp,
    pub end: Timestamp,

    /// `end - start`, stored as whole minutes when serialized
    #[serde(with = "duration_minutes")]
    pub duration: TimeDelta,
}

impl Interval {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start,
            end,
            duration: end - start,
        }
    }

    pub fn hours(&self) -> f64 {
        self.duration.num_seconds() as f64 / 3600.0
    }

    pub fn contains(&self, instant: Timestamp) -> bool {
        self.start <= instant && instant < self.end
    }
}

mod duration_minutes {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        value: &TimeDelta,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_minutes())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<TimeDelta, D::Error> {
        let minutes = i64::deserialize(deserializer)?;
        Ok(TimeDelta::minutes(minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_interval_json_shape() {
        let offset = FixedOffset::east_opt(7200).unwrap();
        let start = offset.with_ymd_and_hms(2025, 6, 1, 17, 0, 0).unwrap();
        let interval = Interval::new(start, start + TimeDelta::minutes(90));

        let json = serde_json::to_value(&interval).unwrap();
        assert_eq!(json["duration"], 90);
        assert_eq!(json["start"], "2025-06-01T17:00:00+02:00");

        let back: Interval = serde_json::from_value(json).unwrap();
        assert_eq!(back, interval);
        assert!((back.hours() - 1.5).abs() < f64::EPSILON);
    }
}
