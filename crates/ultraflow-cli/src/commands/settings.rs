use clap::Subcommand;
use ultraflow_core::Settings;

use super::{open_stores, print_json, CliResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print current settings as JSON
    Show,
    /// Change one setting
    Set {
        /// focus_duration, break_duration or enable_notifications
        key: String,
        /// New value
        value: String,
    },
    /// Restore 90/20 with notifications on
    Reset,
}

pub fn run(action: SettingsAction) -> CliResult {
    let (_, store) = open_stores()?;
    match action {
        SettingsAction::Show => print_json(&store.load()),
        SettingsAction::Set { key, value } => {
            let mut settings = store.load();
            settings.set(&key, &value)?;
            store.replace(&settings)?;
            print_json(&settings)
        }
        SettingsAction::Reset => {
            let settings = Settings::default();
            store.replace(&settings)?;
            print_json(&settings)
        }
    }
}
