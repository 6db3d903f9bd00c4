//! Completed focus sessions and the energy rating attached to them.

use chrono::{DateTime, Local, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Self-reported alertness rating, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct EnergyLevel(u8);

impl EnergyLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::EnergyOutOfRange { value })
        }
    }

    /// Parse user input strictly: surrounding whitespace is ignored, anything
    /// other than a whole number in range is rejected (`"4.5"`, `"4abc"`, `"  "`).
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let value: i64 = trimmed
            .parse()
            .map_err(|_| ValidationError::MalformedEnergy {
                input: trimmed.to_string(),
            })?;
        Self::new(value)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for EnergyLevel {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EnergyLevel> for u8 {
    fn from(level: EnergyLevel) -> Self {
        level.0
    }
}

impl std::fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One completed focus session. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// When the focus phase ended.
    pub date: DateTime<Utc>,
    /// Focus length in minutes.
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<EnergyLevel>,
    /// Local hour of `date` (0-23), fixed at creation.
    pub time_of_day: u8,
}

impl Session {
    /// Build a session completed at `completed_at`, taking the hour in that
    /// timestamp's own zone.
    pub fn new<Tz: TimeZone>(
        completed_at: &DateTime<Tz>,
        duration: u32,
        energy_level: Option<EnergyLevel>,
    ) -> Self {
        Self {
            date: completed_at.with_timezone(&Utc),
            duration,
            energy_level,
            time_of_day: completed_at.hour() as u8,
        }
    }

    pub fn completed_now(duration: u32, energy_level: Option<EnergyLevel>) -> Self {
        Self::new(&Local::now(), duration, energy_level)
    }

    pub fn is_rated(&self) -> bool {
        self.energy_level.is_some()
    }
}
