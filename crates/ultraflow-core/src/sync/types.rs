//! Core types for the remote mirror.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StorageError, ValidationError};
use crate::session::{EnergyLevel, Session};
use crate::settings::Settings;

/// A session as stored remotely, one document per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSession {
    pub id: String,
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<EnergyLevel>,
    pub time_of_day: u8,
    pub created_at: DateTime<Utc>,
}

impl RemoteSession {
    /// Wrap a local session as a fresh remote document.
    pub fn from_session(session: &Session, user_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            date: session.date,
            duration: session.duration,
            energy_level: session.energy_level,
            time_of_day: session.time_of_day,
            created_at: Utc::now(),
        }
    }

    pub fn to_session(&self) -> Session {
        Session {
            date: self.date,
            duration: self.duration,
            energy_level: self.energy_level,
            time_of_day: self.time_of_day,
        }
    }
}

/// The per-user settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSettings {
    pub settings: Settings,
    pub updated_at: DateTime<Utc>,
}

impl RemoteSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            updated_at: Utc::now(),
        }
    }
}

/// Optional bounds on a remote session listing. Both ends inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn since(from: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
    }
}

/// A session the remote refused during push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushFailure {
    /// Position in the local log.
    pub index: usize,
    pub message: String,
}

impl From<PushFailure> for SyncError {
    fn from(f: PushFailure) -> Self {
        SyncError::RemoteWriteFailure {
            index: f.index,
            message: f.message,
        }
    }
}

/// Outcome of a push. Individual failures do not abort the push.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushReport {
    pub attempted: usize,
    pub pushed: usize,
    pub failures: Vec<PushFailure>,
    pub settings_pushed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_error: Option<String>,
}

impl PushReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.settings_error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullReport {
    pub sessions: usize,
    pub settings_applied: bool,
}

/// Sync error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Remote write failed for session {index}: {message}")]
    RemoteWriteFailure { index: usize, message: String },

    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Local storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Remote settings rejected: {0}")]
    InvalidSettings(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid sync endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("Credential store error: {0}")]
    Credential(String),
}
