use chrono::Utc;
use clap::Subcommand;
use ultraflow_core::stats;

use super::{open_stores, print_json, CliResult};

#[derive(Subcommand)]
pub enum SessionsAction {
    /// List recorded sessions as JSON
    List {
        /// Only sessions from the last N days
        #[arg(long)]
        days: Option<u32>,
    },
}

pub fn run(action: SessionsAction) -> CliResult {
    let (sessions, _) = open_stores()?;
    match action {
        SessionsAction::List { days } => {
            let log = sessions.load();
            let log = match days {
                Some(days) => stats::filter_window(&log, days, Utc::now()),
                None => log,
            };
            print_json(&log)
        }
    }
}
