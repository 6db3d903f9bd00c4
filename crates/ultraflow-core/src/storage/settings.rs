//! Persisted user settings.

use std::sync::Arc;

use super::DocumentStore;
use crate::error::{CoreError, StorageError};
use crate::settings::Settings;

/// Document key for the settings record.
pub const SETTINGS_KEY: &str = "ultradianSettings";

#[derive(Clone)]
pub struct SettingsStore {
    docs: Arc<dyn DocumentStore>,
}

impl SettingsStore {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    /// Stored settings, or defaults when nothing usable is stored.
    pub fn load(&self) -> Settings {
        self.load_stored().unwrap_or_default()
    }

    /// Stored settings, `None` when absent or unusable.
    pub fn load_stored(&self) -> Option<Settings> {
        let raw = match self.docs.read(SETTINGS_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(error = %err, "settings unreadable, using defaults");
                return None;
            }
        };
        let settings: Settings = match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(error = %err, "settings corrupt, using defaults");
                return None;
            }
        };
        match settings.validate() {
            Ok(()) => Some(settings),
            Err(err) => {
                tracing::warn!(error = %err, "stored settings out of range, using defaults");
                None
            }
        }
    }

    /// Validate, then replace the whole record.
    pub fn replace(&self, settings: &Settings) -> Result<(), CoreError> {
        settings.validate()?;
        self.store(settings)?;
        tracing::debug!(?settings, "settings replaced");
        Ok(())
    }

    pub(crate) fn store(&self, settings: &Settings) -> Result<(), StorageError> {
        let raw = serde_json::to_string(settings).map_err(|source| StorageError::Encode {
            key: SETTINGS_KEY.to_string(),
            source,
        })?;
        self.docs.write(SETTINGS_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;

    fn store() -> (Arc<MemoryStore>, SettingsStore) {
        let docs = Arc::new(MemoryStore::new());
        (docs.clone(), SettingsStore::new(docs))
    }

    #[test]
    fn defaults_when_absent() {
        let (_, settings) = store();
        assert_eq!(settings.load(), Settings::default());
        assert_eq!(settings.load_stored(), None);
    }

    #[test]
    fn rejects_out_of_range() {
        let (_, settings) = store();
        let bad = Settings {
            break_duration: 40,
            ..Settings::default()
        };
        let err = settings.replace(&bad).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::DurationOutOfRange { .. })
        ));
        assert_eq!(settings.load_stored(), None);
    }

    #[test]
    fn corrupt_record_degrades_to_defaults() {
        let (docs, settings) = store();
        docs.write(SETTINGS_KEY, "not json").unwrap();
        assert_eq!(settings.load(), Settings::default());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let (docs, settings) = store();
        docs.write(SETTINGS_KEY, r#"{"focusDuration":60}"#).unwrap();
        let loaded = settings.load();
        assert_eq!(loaded.focus_duration, 60);
        assert_eq!(loaded.break_duration, 20);
        assert!(loaded.enable_notifications);
    }

    proptest! {
        #[test]
        fn replace_then_load_is_exact(
            focus in (6u32..=24).prop_map(|n| n * 5),
            brk in (1u32..=6).prop_map(|n| n * 5),
            notify in any::<bool>(),
        ) {
            let (_, settings) = store();
            let wanted = Settings { focus_duration: focus, break_duration: brk, enable_notifications: notify };
            settings.replace(&wanted).unwrap();
            prop_assert_eq!(settings.load(), wanted);
        }
    }
}
