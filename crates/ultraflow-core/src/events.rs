use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::Session;
use crate::settings::Settings;
use crate::timer::Phase;

/// Every timer state change produces an Event.
/// Front-ends render them; the runner turns some of them into side effects
/// (permission requests, notifications, rating timeouts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A countdown reached zero and the next phase is loaded (paused).
    PhaseCompleted {
        phase: Phase,
        next_phase: Phase,
        next_remaining_secs: u64,
        sessions_completed: u32,
        at: DateTime<Utc>,
    },
    /// Ask the host for notification permission. Emitted at most once.
    NotificationPermissionRequested {
        at: DateTime<Utc>,
    },
    /// User-visible completion signal.
    Notify {
        title: String,
        body: String,
        at: DateTime<Utc>,
    },
    /// Ask the user how their energy was during the focus phase that just ended.
    RatingRequested {
        request_id: Uuid,
        duration_min: u32,
        completed_at: DateTime<Utc>,
    },
    /// The answer could not be used; the session is kept without a rating.
    RatingRejected {
        request_id: Uuid,
        reason: String,
        at: DateTime<Utc>,
    },
    /// Nobody answered in time; the session is kept without a rating.
    RatingExpired {
        request_id: Uuid,
        at: DateTime<Utc>,
    },
    SessionRecorded {
        session: Session,
        at: DateTime<Utc>,
    },
    /// A local write failed. The session is lost unless the caller retries.
    SessionPersistFailed {
        session: Session,
        message: String,
        at: DateTime<Utc>,
    },
    SettingsApplied {
        settings: Settings,
        at: DateTime<Utc>,
    },
}
