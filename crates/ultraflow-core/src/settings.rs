//! The single per-user settings record.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timer::Phase;

pub const FOCUS_RANGE: RangeInclusive<u32> = 30..=120;
pub const BREAK_RANGE: RangeInclusive<u32> = 5..=30;
pub const DURATION_STEP: u32 = 5;

/// Timer preferences. Replaced wholesale on every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Focus length in minutes.
    #[serde(default = "default_focus_duration")]
    pub focus_duration: u32,
    /// Break length in minutes.
    #[serde(default = "default_break_duration")]
    pub break_duration: u32,
    #[serde(default = "default_true")]
    pub enable_notifications: bool,
}

fn default_focus_duration() -> u32 {
    90
}
fn default_break_duration() -> u32 {
    20
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_duration: default_focus_duration(),
            break_duration: default_break_duration(),
            enable_notifications: true,
        }
    }
}

impl Settings {
    /// Field names accepted by [`Settings::set`].
    pub const KEYS: [&'static str; 3] =
        ["focus_duration", "break_duration", "enable_notifications"];

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_duration("focus_duration", self.focus_duration, FOCUS_RANGE)?;
        check_duration("break_duration", self.break_duration, BREAK_RANGE)?;
        Ok(())
    }

    pub fn focus_secs(&self) -> u64 {
        u64::from(self.focus_duration) * 60
    }

    pub fn break_secs(&self) -> u64 {
        u64::from(self.break_duration) * 60
    }

    /// Countdown length for a fresh `phase`.
    pub fn phase_secs(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Focus => self.focus_secs(),
            Phase::Break => self.break_secs(),
        }
    }

    /// Update one field from its string form, validating the result.
    ///
    /// Accepts snake_case keys and the camelCase names used in the stored document.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        let mut next = *self;
        let malformed = || ValidationError::MalformedValue {
            field: key.to_string(),
            input: value.to_string(),
        };
        match key {
            "focus_duration" | "focusDuration" => {
                next.focus_duration = value.trim().parse().map_err(|_| malformed())?;
            }
            "break_duration" | "breakDuration" => {
                next.break_duration = value.trim().parse().map_err(|_| malformed())?;
            }
            "enable_notifications" | "enableNotifications" => {
                next.enable_notifications = value.trim().parse().map_err(|_| malformed())?;
            }
            other => return Err(ValidationError::UnknownField(other.to_string())),
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

fn check_duration(
    field: &'static str,
    value: u32,
    range: RangeInclusive<u32>,
) -> Result<(), ValidationError> {
    if !range.contains(&value) {
        return Err(ValidationError::DurationOutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        });
    }
    if value % DURATION_STEP != 0 {
        return Err(ValidationError::DurationStep {
            field,
            value,
            step: DURATION_STEP,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_ninety_twenty() {
        let s = Settings::default();
        assert_eq!(s.focus_duration, 90);
        assert_eq!(s.break_duration, 20);
        assert!(s.enable_notifications);
        assert!(s.validate().is_ok());
        assert_eq!(s.focus_secs(), 5400);
        assert_eq!(s.phase_secs(Phase::Break), 1200);
    }

    #[test]
    fn validate_rejects_out_of_domain() {
        let s = Settings {
            focus_duration: 125,
            ..Settings::default()
        };
        assert!(matches!(
            s.validate(),
            Err(ValidationError::DurationOutOfRange { field: "focus_duration", .. })
        ));

        let s = Settings {
            break_duration: 4,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_off_step() {
        let s = Settings {
            focus_duration: 47,
            ..Settings::default()
        };
        assert_eq!(
            s.validate(),
            Err(ValidationError::DurationStep {
                field: "focus_duration",
                value: 47,
                step: 5
            })
        );
    }

    #[test]
    fn set_updates_and_validates() {
        let mut s = Settings::default();
        s.set("focus_duration", "60").unwrap();
        s.set("breakDuration", "15").unwrap();
        s.set("enable_notifications", "false").unwrap();
        assert_eq!(
            s,
            Settings {
                focus_duration: 60,
                break_duration: 15,
                enable_notifications: false
            }
        );

        assert!(s.set("focus_duration", "7").is_err());
        assert!(s.set("focus_duration", "abc").is_err());
        assert!(s.set("volume", "3").is_err());
        assert_eq!(s.focus_duration, 60);
    }

    #[test]
    fn partial_document_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{"focusDuration":45}"#).unwrap();
        assert_eq!(s.focus_duration, 45);
        assert_eq!(s.break_duration, 20);
        assert!(s.enable_notifications);
    }
}
