//! Energy rating requests.
//!
//! Finishing a focus phase opens a request; the user answers it later (or
//! never). Each request resolves exactly once into the [`Session`] to persist,
//! so late or repeated answers cannot produce duplicate writes.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::session::{EnergyLevel, Session};

/// Ratings nobody answers are dropped after this long.
pub const DEFAULT_RATING_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// A focus phase waiting for its energy rating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingRequest {
    pub id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub time_of_day: u8,
    pub duration_min: u32,
}

impl RatingRequest {
    fn into_session(self, energy_level: Option<EnergyLevel>) -> Session {
        Session {
            date: self.completed_at,
            duration: self.duration_min,
            energy_level,
            time_of_day: self.time_of_day,
        }
    }
}

/// Result of answering a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingOutcome {
    pub session: Session,
    /// Set when the answer was discarded; the session then has no rating.
    pub rejected: Option<ValidationError>,
}

/// Open rating requests in the order they were issued.
#[derive(Debug, Clone)]
pub struct RatingLedger {
    pending: IndexMap<Uuid, RatingRequest>,
    timeout: Duration,
}

impl Default for RatingLedger {
    fn default() -> Self {
        Self::new(DEFAULT_RATING_TIMEOUT)
    }
}

impl RatingLedger {
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: IndexMap::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Register a finished focus phase.
    pub fn open<Tz: TimeZone>(&mut self, completed_at: &DateTime<Tz>, duration_min: u32) -> RatingRequest {
        let draft = Session::new(completed_at, duration_min, None);
        let request = RatingRequest {
            id: Uuid::new_v4(),
            completed_at: draft.date,
            time_of_day: draft.time_of_day,
            duration_min,
        };
        self.pending.insert(request.id, request.clone());
        request
    }

    pub fn get(&self, id: &Uuid) -> Option<&RatingRequest> {
        self.pending.get(id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &RatingRequest> {
        self.pending.values()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Answer a request with raw user input.
    ///
    /// Returns `None` when the request is unknown or already resolved.
    pub fn submit(&mut self, id: &Uuid, raw: &str) -> Option<RatingOutcome> {
        let request = self.pending.shift_remove(id)?;
        let outcome = match EnergyLevel::parse(raw) {
            Ok(level) => RatingOutcome {
                session: request.into_session(Some(level)),
                rejected: None,
            },
            Err(err) => RatingOutcome {
                session: request.into_session(None),
                rejected: Some(err),
            },
        };
        Some(outcome)
    }

    /// Resolve a request without a rating (user skipped or timed out).
    pub fn cancel(&mut self, id: &Uuid) -> Option<Session> {
        self.pending
            .shift_remove(id)
            .map(|request| request.into_session(None))
    }

    /// Resolve every request older than the timeout, oldest first.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Vec<Session> {
        let timeout = chrono::Duration::from_std(self.timeout)
            .unwrap_or_else(|_| chrono::Duration::minutes(10));
        let cutoff = now - timeout;
        let stale: Vec<Uuid> = self
            .pending
            .values()
            .filter(|r| r.completed_at <= cutoff)
            .map(|r| r.id)
            .collect();
        stale.iter().filter_map(|id| self.cancel(id)).collect()
    }
}
