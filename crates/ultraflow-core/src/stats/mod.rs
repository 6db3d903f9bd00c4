//! Statistics over the session log.
//!
//! Daily and hourly aggregation, window filtering, and the insight summary
//! shown alongside them.

mod aggregate;
mod insights;

pub use aggregate::{
    best_energy_hour, by_day, by_hour, filter_window, summary, DayStats, HourStats, Summary,
    Window, NO_BEST_HOUR,
};

pub use insights::{format_focus_time, insights, EnergyNote, Insights, Report};
