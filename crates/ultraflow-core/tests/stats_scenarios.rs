use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use ultraflow_core::stats::{self, EnergyNote};
use ultraflow_core::{Database, EnergyLevel, Report, Session, SessionStore, Window};

fn rated(at: chrono::DateTime<Utc>, minutes: u32, energy: i64) -> Session {
    Session::new(&at, minutes, Some(EnergyLevel::new(energy).unwrap()))
}

#[test]
fn stored_log_feeds_every_view() {
    let store = SessionStore::new(Arc::new(Database::open_memory().unwrap()));
    let day1 = Utc.with_ymd_and_hms(2026, 5, 4, 0, 0, 0).unwrap();
    store.append(&rated(day1 + Duration::hours(9), 90, 4)).unwrap();
    store.append(&rated(day1 + Duration::hours(14), 90, 2)).unwrap();

    let log = store.load();
    let summary = stats::summary(&log);
    assert_eq!(summary.total_sessions, 2);
    assert_eq!(summary.total_minutes, 180);
    assert_eq!(summary.avg_energy, 3.0);

    let hours = stats::by_hour(&log);
    assert_eq!(stats::best_energy_hour(&hours), "9:00");

    let insights = stats::insights(&log);
    assert_eq!(insights.avg_session_minutes, Some(90));
    assert_eq!(insights.energy_note, Some(EnergyNote::Steady));
    assert_eq!(insights.total_focus, "3h 0m");
}

#[test]
fn empty_log_reports_placeholders() {
    let now = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();
    let report = Report::build(&[], Window::Month, &now);
    assert_eq!(report.summary.total_sessions, 0);
    assert_eq!(report.summary.total_minutes, 0);
    assert_eq!(report.summary.avg_energy, 0.0);
    assert!(report.daily.is_empty());
    assert!(report.hourly.is_empty());
    assert_eq!(report.insights.best_energy_hour, "N/A");
}

#[test]
fn report_serializes_placeholder_as_null() {
    let now = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();
    let unrated = Session::new(&(now - Duration::hours(3)), 60, None);
    let report = Report::build(&[unrated], Window::Week, &now);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["window"], "week");
    assert!(json["daily"][0]["avgEnergy"].is_null());
    assert_eq!(json["hourly"][0]["label"], "9:00");
    assert_eq!(json["summary"]["totalSessions"], 1);
}
