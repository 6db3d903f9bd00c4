//! Plain-language insights and the combined report.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::aggregate::{
    best_energy_hour, by_day, by_hour, filter_window, summary, DayStats, HourStats, Summary,
    Window,
};
use crate::session::Session;

/// Overall energy trend of the rated sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyNote {
    /// Average rating 4 or above.
    High,
    Steady,
    /// Average rating below 3.
    Low,
}

impl EnergyNote {
    pub fn from_average(avg: f64) -> Self {
        if avg >= 4.0 {
            EnergyNote::High
        } else if avg < 3.0 {
            EnergyNote::Low
        } else {
            EnergyNote::Steady
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            EnergyNote::High => "Great work! Your energy levels are consistently high.",
            EnergyNote::Steady => "Your energy is holding steady across sessions.",
            EnergyNote::Low => {
                "Consider adjusting session length or break times to maintain energy."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub best_energy_hour: String,
    /// Whole minutes; `None` with no sessions.
    pub avg_session_minutes: Option<u64>,
    pub energy_note: Option<EnergyNote>,
    /// `"{h}h {m}m"`
    pub total_focus: String,
}

/// Derive insights from an already windowed log.
pub fn insights(sessions: &[Session]) -> Insights {
    let totals = summary(sessions);
    let hours = by_hour(sessions);
    let avg_session_minutes = (totals.total_sessions > 0)
        .then(|| (totals.total_minutes as f64 / f64::from(totals.total_sessions)).round() as u64);
    let energy_note = sessions
        .iter()
        .any(Session::is_rated)
        .then(|| EnergyNote::from_average(totals.avg_energy));

    Insights {
        best_energy_hour: best_energy_hour(&hours),
        avg_session_minutes,
        energy_note,
        total_focus: format_focus_time(totals.total_minutes),
    }
}

pub fn format_focus_time(minutes: u64) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Every view of one window in a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub window: Window,
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,
    pub daily: Vec<DayStats>,
    pub hourly: Vec<HourStats>,
    pub insights: Insights,
}

impl Report {
    /// Window the log at `now` and aggregate, grouping days in `now`'s zone.
    pub fn build<Tz: TimeZone>(sessions: &[Session], window: Window, now: &DateTime<Tz>) -> Self {
        let generated_at = now.with_timezone(&Utc);
        let recent = filter_window(sessions, window.days(), generated_at);
        Self {
            window,
            generated_at,
            summary: summary(&recent),
            daily: by_day(&recent, &now.timezone()),
            hourly: by_hour(&recent),
            insights: insights(&recent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::EnergyLevel;
    use chrono::Duration;

    fn rated(hour: u32, minutes: u32, energy: i64) -> Session {
        let date = Utc.with_ymd_and_hms(2026, 3, 10, hour, 0, 0).unwrap();
        Session::new(&date, minutes, Some(EnergyLevel::new(energy).unwrap()))
    }

    #[test]
    fn empty_insights() {
        let i = insights(&[]);
        assert_eq!(i.best_energy_hour, "N/A");
        assert_eq!(i.avg_session_minutes, None);
        assert_eq!(i.energy_note, None);
        assert_eq!(i.total_focus, "0h 0m");
    }

    #[test]
    fn energy_note_thresholds() {
        assert_eq!(EnergyNote::from_average(4.0), EnergyNote::High);
        assert_eq!(EnergyNote::from_average(3.9), EnergyNote::Steady);
        assert_eq!(EnergyNote::from_average(3.0), EnergyNote::Steady);
        assert_eq!(EnergyNote::from_average(2.9), EnergyNote::Low);
    }

    #[test]
    fn averages_and_totals() {
        let sessions = vec![rated(9, 90, 5), rated(14, 60, 3), rated(16, 45, 3)];
        let i = insights(&sessions);
        assert_eq!(i.best_energy_hour, "9:00");
        assert_eq!(i.avg_session_minutes, Some(65));
        assert_eq!(i.energy_note, Some(EnergyNote::Steady));
        assert_eq!(i.total_focus, "3h 15m");
    }

    #[test]
    fn unrated_log_has_no_energy_note() {
        let date = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        let i = insights(&[Session::new(&date, 90, None)]);
        assert_eq!(i.energy_note, None);
        assert_eq!(i.avg_session_minutes, Some(90));
    }

    #[test]
    fn report_windows_the_log() {
        let now = Utc.with_ymd_and_hms(2026, 3, 20, 12, 0, 0).unwrap();
        let recent = Session::new(&(now - Duration::days(2)), 90, None);
        let stale = Session::new(&(now - Duration::days(12)), 90, None);
        let week = Report::build(&[recent.clone(), stale.clone()], Window::Week, &now);
        assert_eq!(week.summary.total_sessions, 1);
        assert_eq!(week.daily.len(), 1);
        let month = Report::build(&[recent, stale], Window::Month, &now);
        assert_eq!(month.summary.total_sessions, 2);
    }
}
