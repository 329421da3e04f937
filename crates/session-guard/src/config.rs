//! Booking rules shared by every surface (minimum duration, opening hours).

use std::path::Path;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};
use crate::interval::{clock, TimeInterval};
use crate::session::parse_time_of_day;

/// Default minimum session length enforced by the booking forms.
pub const DEFAULT_MIN_DURATION_MINUTES: u32 = 30;

const DEFAULT_DAY_START: NaiveTime = clock(8, 0);
const DEFAULT_DAY_END: NaiveTime = clock(22, 0);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Shortest session a candidate may request.
    pub min_duration_minutes: u32,
    /// Opening of the bookable day, used for free-slot suggestions.
    #[serde(deserialize_with = "time_field")]
    pub day_start: NaiveTime,
    /// Close of the bookable day.
    #[serde(deserialize_with = "time_field")]
    pub day_end: NaiveTime,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            min_duration_minutes: DEFAULT_MIN_DURATION_MINUTES,
            day_start: DEFAULT_DAY_START,
            day_end: DEFAULT_DAY_END,
        }
    }
}

impl GuardConfig {
    /// Parse and validate a JSON config document. Missing keys take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GuardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GuardError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_duration_minutes == 0 {
            return Err(GuardError::InvalidConfig(
                "min_duration_minutes must be greater than zero".to_string(),
            ));
        }
        if self.day_start >= self.day_end {
            return Err(GuardError::InvalidConfig(format!(
                "day_start {} must be before day_end {}",
                self.day_start, self.day_end
            )));
        }
        Ok(())
    }

    /// The bookable window of a day.
    pub fn opening_hours(&self) -> Result<TimeInterval> {
        TimeInterval::new(self.day_start, self.day_end).ok_or_else(|| {
            GuardError::InvalidConfig(format!(
                "day_start {} must be before day_end {}",
                self.day_start, self.day_end
            ))
        })
    }
}

fn time_field<'de, D: serde::Deserializer<'de>>(
    d: D,
) -> std::result::Result<NaiveTime, D::Error> {
    let raw = String::deserialize(d)?;
    parse_time_of_day(&raw).map_err(serde::de::Error::custom)
}
