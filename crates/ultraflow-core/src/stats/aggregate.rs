//! Session aggregation by day and by hour.
//!
//! Everything here is a pure function of the session log. Sums are exact;
//! only the final energy mean is rounded to one decimal.

use chrono::{DateTime, Duration, TimeZone, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::session::Session;

/// Placeholder label when no hour has a rated session.
pub const NO_BEST_HOUR: &str = "N/A";

/// Reporting window measured back from "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    Week,
    Month,
    Days(u32),
}

impl Window {
    pub fn days(self) -> u32 {
        match self {
            Window::Week => 7,
            Window::Month => 30,
            Window::Days(n) => n,
        }
    }
}

/// One calendar day of sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
    /// `YYYY-MM-DD` in the grouping time zone.
    pub date: String,
    pub session_count: u32,
    pub total_minutes: u64,
    /// `None` when no session that day carries a rating.
    pub avg_energy: Option<f64>,
}

/// One hour-of-day bucket across all days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourStats {
    pub hour: u8,
    /// `"{h}:00"`
    pub label: String,
    pub session_count: u32,
    pub total_minutes: u64,
    pub avg_energy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_sessions: u32,
    pub total_minutes: u64,
    /// 0.0 when nothing is rated.
    pub avg_energy: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    count: u32,
    minutes: u64,
    energy_sum: u64,
    rated: u32,
}

impl Tally {
    fn add(&mut self, session: &Session) {
        self.count += 1;
        self.minutes += u64::from(session.duration);
        if let Some(level) = session.energy_level {
            self.energy_sum += u64::from(level.get());
            self.rated += 1;
        }
    }

    fn avg_energy(&self) -> Option<f64> {
        if self.rated == 0 {
            return None;
        }
        Some(round1(self.energy_sum as f64 / f64::from(self.rated)))
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Sessions dated within the last `days` days of `now` (inclusive).
pub fn filter_window(sessions: &[Session], days: u32, now: DateTime<Utc>) -> Vec<Session> {
    let cutoff = now - Duration::days(i64::from(days));
    sessions
        .iter()
        .filter(|s| s.date >= cutoff)
        .cloned()
        .collect()
}

/// Group by calendar day in `tz`, in order of first appearance.
pub fn by_day<Tz: TimeZone>(sessions: &[Session], tz: &Tz) -> Vec<DayStats> {
    let mut days: IndexMap<String, Tally> = IndexMap::new();
    for session in sessions {
        let date = session
            .date
            .with_timezone(tz)
            .date_naive()
            .format("%Y-%m-%d")
            .to_string();
        days.entry(date).or_default().add(session);
    }
    days.into_iter()
        .map(|(date, tally)| DayStats {
            date,
            session_count: tally.count,
            total_minutes: tally.minutes,
            avg_energy: tally.avg_energy(),
        })
        .collect()
}

/// Group by the hour recorded on each session, ascending.
pub fn by_hour(sessions: &[Session]) -> Vec<HourStats> {
    let mut hours: BTreeMap<u8, Tally> = BTreeMap::new();
    for session in sessions {
        hours.entry(session.time_of_day).or_default().add(session);
    }
    hours
        .into_iter()
        .map(|(hour, tally)| HourStats {
            hour,
            label: format!("{hour}:00"),
            session_count: tally.count,
            total_minutes: tally.minutes,
            avg_energy: tally.avg_energy(),
        })
        .collect()
}

pub fn summary(sessions: &[Session]) -> Summary {
    let mut tally = Tally::default();
    for session in sessions {
        tally.add(session);
    }
    Summary {
        total_sessions: tally.count,
        total_minutes: tally.minutes,
        avg_energy: tally.avg_energy().unwrap_or(0.0),
    }
}

/// Label of the highest-energy hour; earliest hour wins ties.
pub fn best_energy_hour(hours: &[HourStats]) -> String {
    let mut best: Option<(&HourStats, f64)> = None;
    for stats in hours {
        let Some(avg) = stats.avg_energy else { continue };
        match best {
            Some((current, best_avg)) if avg < best_avg || (avg == best_avg && stats.hour > current.hour) => {}
            _ => best = Some((stats, avg)),
        }
    }
    best.map(|(stats, _)| stats.label.clone())
        .unwrap_or_else(|| NO_BEST_HOUR.to_string())
}
