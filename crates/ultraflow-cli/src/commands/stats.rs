use chrono::{Local, Utc};
use clap::{Args, Subcommand, ValueEnum};
use ultraflow_core::{stats, Report, Window};

use super::{open_stores, print_json, CliResult};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum WindowArg {
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
}

impl From<WindowArg> for Window {
    fn from(w: WindowArg) -> Self {
        match w {
            WindowArg::Week => Window::Week,
            WindowArg::Month => Window::Month,
        }
    }
}

#[derive(Args)]
pub struct WindowOpts {
    #[arg(long, value_enum, default_value_t = WindowArg::Week)]
    window: WindowArg,
}

#[derive(Subcommand)]
pub enum StatsAction {
    /// Totals and average energy
    Summary(WindowOpts),
    /// Per-day breakdown
    Daily(WindowOpts),
    /// Per-hour-of-day breakdown
    Hourly(WindowOpts),
    /// Best energy hour, average session length, energy trend
    Insights(WindowOpts),
    /// Everything above in one document
    Report(WindowOpts),
}

pub fn run(action: StatsAction) -> CliResult {
    let (sessions, _) = open_stores()?;
    let log = sessions.load();
    let recent = |opts: &WindowOpts| {
        let window = Window::from(opts.window);
        stats::filter_window(&log, window.days(), Utc::now())
    };

    match action {
        StatsAction::Summary(opts) => print_json(&stats::summary(&recent(&opts))),
        StatsAction::Daily(opts) => print_json(&stats::by_day(&recent(&opts), &Local)),
        StatsAction::Hourly(opts) => print_json(&stats::by_hour(&recent(&opts))),
        StatsAction::Insights(opts) => print_json(&stats::insights(&recent(&opts))),
        StatsAction::Report(opts) => {
            let report = Report::build(&log, opts.window.into(), &Local::now());
            print_json(&report)
        }
    }
}
