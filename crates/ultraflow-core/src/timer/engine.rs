//! Interval timer engine.
//!
//! A pure state machine over (phase, running). It owns no threads or clocks:
//! the caller invokes `tick()` once per second while running and routes the
//! returned events (see [`super::TimerRunner`] for the async driver).
//!
//! ## State Transitions
//!
//! ```text
//! Focus(paused) <-> Focus(running) --0s--> Break(paused) <-> Break(running) --0s--> Focus(paused)
//!        ^-------------------------- reset (from anywhere) ----------------------------'
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(Settings::default());
//! engine.start();
//! // Once per second:
//! for event in engine.tick() { /* render / persist */ }
//! ```

use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::notify::{Permission, PermissionState};
use super::phase::Phase;
use super::rating::{RatingLedger, RatingOutcome, RatingRequest};
use crate::error::ValidationError;
use crate::events::Event;
use crate::session::Session;
use crate::settings::Settings;

/// Read-only view of the timer for front-ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub running: bool,
    pub sessions_completed: u32,
    /// 0.0 .. 100.0 progress within the current phase.
    pub progress_pct: f64,
    /// `m:ss`
    pub clock: String,
    pub minutes_focused: u64,
    pub hours_total: u64,
    pub pending_ratings: usize,
    pub permission: PermissionState,
}

/// Core timer engine.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    /// Latest applied settings. Only read when a countdown is (re)loaded.
    settings: Settings,
    phase: Phase,
    remaining_secs: u64,
    /// Length of the countdown currently loaded.
    phase_total_secs: u64,
    running: bool,
    sessions_completed: u32,
    permission: PermissionState,
    ratings: RatingLedger,
}

impl TimerEngine {
    /// Create a paused engine at the start of a focus phase.
    pub fn new(settings: Settings) -> Self {
        let total = settings.focus_secs();
        Self {
            settings,
            phase: Phase::Focus,
            remaining_secs: total,
            phase_total_secs: total,
            running: false,
            sessions_completed: 0,
            permission: PermissionState::Unknown,
            ratings: RatingLedger::default(),
        }
    }

    pub fn with_rating_timeout(mut self, timeout: Duration) -> Self {
        self.ratings.set_timeout(timeout);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub fn rating_timeout(&self) -> Duration {
        self.ratings.timeout()
    }

    pub fn pending_ratings(&self) -> impl Iterator<Item = &RatingRequest> {
        self.ratings.pending()
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn phase_progress(&self) -> f64 {
        if self.phase_total_secs == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / self.phase_total_secs as f64)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let sessions = u64::from(self.sessions_completed);
        let cycle_min =
            u64::from(self.settings.focus_duration) + u64::from(self.settings.break_duration);
        TimerSnapshot {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            total_secs: self.phase_total_secs,
            running: self.running,
            sessions_completed: self.sessions_completed,
            progress_pct: self.phase_progress() * 100.0,
            clock: format_clock(self.remaining_secs),
            minutes_focused: sessions * u64::from(self.settings.focus_duration),
            hours_total: sessions * cycle_min / 60,
            pending_ratings: self.ratings.len(),
            permission: self.permission,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Resume the countdown. No-op while already running.
    ///
    /// The first start with notifications enabled also asks for permission;
    /// the answer comes back through [`TimerEngine::set_permission`].
    pub fn start(&mut self) -> Vec<Event> {
        if self.running {
            return Vec::new();
        }
        self.running = true;
        let mut events = vec![Event::TimerStarted {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }];
        if self.settings.enable_notifications && self.permission == PermissionState::Unknown {
            self.permission = PermissionState::Pending;
            events.push(Event::NotificationPermissionRequested { at: Utc::now() });
        }
        events
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(Event::TimerPaused {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn toggle(&mut self) -> Vec<Event> {
        if self.running {
            self.pause().into_iter().collect()
        } else {
            self.start()
        }
    }

    /// Back to a paused focus phase with a full countdown. Any break in
    /// progress is discarded.
    pub fn reset(&mut self) -> Event {
        self.running = false;
        self.load_phase(Phase::Focus);
        Event::TimerReset {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Store new settings. The countdown in progress keeps its length; the
    /// new durations apply the next time a phase is loaded.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<Event, ValidationError> {
        settings.validate()?;
        self.settings = settings;
        Ok(Event::SettingsApplied {
            settings,
            at: Utc::now(),
        })
    }

    pub fn set_permission(&mut self, permission: Permission) {
        self.permission = permission.into();
    }

    /// Advance one second using the local wall clock for completion stamps.
    pub fn tick(&mut self) -> Vec<Event> {
        self.tick_at(&Local::now())
    }

    /// Advance one second; `now` stamps a completed focus session.
    pub fn tick_at<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Vec<Event> {
        if !self.running {
            return Vec::new();
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return self.complete_phase(now);
        }
        Vec::new()
    }

    /// Answer a rating request. `None` if it was already resolved.
    pub fn submit_rating(&mut self, request_id: &Uuid, raw: &str) -> Option<RatingOutcome> {
        self.ratings.submit(request_id, raw)
    }

    /// Skip a rating; the session is kept unrated.
    pub fn cancel_rating(&mut self, request_id: &Uuid) -> Option<Session> {
        self.ratings.cancel(request_id)
    }

    /// Resolve every rating request older than the timeout.
    pub fn expire_ratings(&mut self, now: DateTime<Utc>) -> Vec<Session> {
        self.ratings.expire(now)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_phase<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Vec<Event> {
        self.running = false;
        let finished = self.phase;
        let mut events = Vec::with_capacity(3);

        if self.settings.enable_notifications && self.permission == PermissionState::Granted {
            let (title, body) = finished.completion_message();
            events.push(Event::Notify {
                title: title.to_string(),
                body: body.to_string(),
                at: Utc::now(),
            });
        }

        let rating = match finished {
            Phase::Focus => {
                self.sessions_completed += 1;
                let duration_min = (self.phase_total_secs / 60) as u32;
                Some(self.ratings.open(now, duration_min))
            }
            Phase::Break => None,
        };

        self.load_phase(finished.next());
        events.push(Event::PhaseCompleted {
            phase: finished,
            next_phase: self.phase,
            next_remaining_secs: self.remaining_secs,
            sessions_completed: self.sessions_completed,
            at: Utc::now(),
        });

        if let Some(request) = rating {
            events.push(Event::RatingRequested {
                request_id: request.id,
                duration_min: request.duration_min,
                completed_at: request.completed_at,
            });
        }
        events
    }

    fn load_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.phase_total_secs = self.settings.phase_secs(phase);
        self.remaining_secs = self.phase_total_secs;
    }
}

/// `m:ss`, minutes unbounded.
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
