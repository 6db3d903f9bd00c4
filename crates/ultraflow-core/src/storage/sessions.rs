//! Append-only local session log.

use std::sync::Arc;

use super::DocumentStore;
use crate::error::StorageError;
use crate::session::Session;

/// Document key for the session log.
pub const SESSIONS_KEY: &str = "ultradianSessions";

/// The local session log, stored as one JSON array.
#[derive(Clone)]
pub struct SessionStore {
    docs: Arc<dyn DocumentStore>,
}

impl SessionStore {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    /// All recorded sessions in insertion order.
    ///
    /// Missing or unreadable data reads as an empty log; entries that no
    /// longer decode (for example an out-of-range rating) are skipped.
    pub fn load(&self) -> Vec<Session> {
        let raw = match self.docs.read(SESSIONS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "session log unreadable, treating as empty");
                return Vec::new();
            }
        };
        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(error = %err, "session log corrupt, treating as empty");
                return Vec::new();
            }
        };
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(session) => Some(session),
                Err(err) => {
                    tracing::warn!(index, error = %err, "skipping invalid session entry");
                    None
                }
            })
            .collect()
    }

    /// Add one session to the end of the log.
    ///
    /// Unlike [`load`](Self::load) this reads strictly: an unreadable or
    /// corrupt log is an error and is left as it is. Entries that do not
    /// decode are carried over untouched.
    pub fn append(&self, session: &Session) -> Result<(), StorageError> {
        let mut entries: Vec<serde_json::Value> = match self.docs.read(SESSIONS_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
                key: SESSIONS_KEY.to_string(),
                source,
            })?,
            None => Vec::new(),
        };
        entries.push(serde_json::to_value(session).map_err(|source| StorageError::Encode {
            key: SESSIONS_KEY.to_string(),
            source,
        })?);
        let raw = serde_json::to_string(&entries).map_err(|source| StorageError::Encode {
            key: SESSIONS_KEY.to_string(),
            source,
        })?;
        self.docs.write(SESSIONS_KEY, &raw)?;
        tracing::info!(
            duration = session.duration,
            rated = session.is_rated(),
            "session recorded"
        );
        Ok(())
    }

    /// Overwrite the whole log.
    pub fn replace_all(&self, sessions: &[Session]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(sessions).map_err(|source| StorageError::Encode {
            key: SESSIONS_KEY.to_string(),
            source,
        })?;
        self.docs.write(SESSIONS_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::EnergyLevel;
    use crate::storage::{Database, MemoryStore};
    use chrono::{TimeZone, Utc};

    fn session(hour: u32, energy: Option<i64>) -> Session {
        let at = Utc.with_ymd_and_hms(2026, 3, 10, hour, 0, 0).unwrap();
        Session::new(&at, 90, energy.map(|e| EnergyLevel::new(e).unwrap()))
    }

    #[test]
    fn empty_store_loads_nothing() {
        let store = SessionStore::new(Arc::new(MemoryStore::new()));
        assert!(store.load().is_empty());
    }

    #[test]
    fn append_preserves_order() {
        let store = SessionStore::new(Arc::new(Database::open_memory().unwrap()));
        store.append(&session(9, Some(4))).unwrap();
        store.append(&session(14, None)).unwrap();
        let loaded = store.load();
        assert_eq!(loaded, vec![session(9, Some(4)), session(14, None)]);
    }

    #[test]
    fn corrupt_document_reads_as_empty() {
        let docs = Arc::new(MemoryStore::new());
        docs.write(SESSIONS_KEY, "{not json").unwrap();
        let store = SessionStore::new(docs);
        assert!(store.load().is_empty());
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let docs = Arc::new(MemoryStore::new());
        docs.write(
            SESSIONS_KEY,
            r#"[
                {"date":"2026-03-10T09:00:00Z","duration":90,"energyLevel":4,"timeOfDay":9},
                {"date":"2026-03-10T10:00:00Z","duration":90,"energyLevel":7,"timeOfDay":10},
                {"date":"2026-03-10T11:00:00Z","duration":60,"timeOfDay":11}
            ]"#,
        )
        .unwrap();
        let loaded = SessionStore::new(docs).load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].time_of_day, 9);
        assert_eq!(loaded[1].energy_level, None);
    }

    #[test]
    fn append_fails_when_log_unreadable() {
        let docs = Arc::new(MemoryStore::new());
        let store = SessionStore::new(docs.clone());
        store.append(&session(8, Some(3))).unwrap();
        store.append(&session(9, Some(4))).unwrap();

        docs.set_fail_reads(true);
        assert!(matches!(
            store.append(&session(10, None)),
            Err(StorageError::Unavailable(_))
        ));
        docs.set_fail_reads(false);

        assert_eq!(store.load(), vec![session(8, Some(3)), session(9, Some(4))]);
    }

    #[test]
    fn append_leaves_corrupt_log_alone() {
        let docs = Arc::new(MemoryStore::new());
        docs.write(SESSIONS_KEY, "{not json").unwrap();
        let store = SessionStore::new(docs.clone());

        assert!(matches!(
            store.append(&session(10, None)),
            Err(StorageError::Corrupt { .. })
        ));
        assert_eq!(docs.read(SESSIONS_KEY).unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn append_keeps_entries_that_do_not_decode() {
        let docs = Arc::new(MemoryStore::new());
        docs.write(
            SESSIONS_KEY,
            r#"[{"date":"2026-03-10T10:00:00Z","duration":90,"energyLevel":7,"timeOfDay":10}]"#,
        )
        .unwrap();
        let store = SessionStore::new(docs.clone());
        store.append(&session(11, Some(2))).unwrap();

        let raw: Vec<serde_json::Value> =
            serde_json::from_str(&docs.read(SESSIONS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0]["energyLevel"], 7);
        assert_eq!(store.load(), vec![session(11, Some(2))]);
    }

    #[test]
    fn failed_write_surfaces() {
        let docs = Arc::new(MemoryStore::new());
        docs.set_fail_writes(true);
        let store = SessionStore::new(docs);
        assert!(store.append(&session(9, None)).is_err());
    }
}
