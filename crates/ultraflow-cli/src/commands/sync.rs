//! Push the local log to the remote mirror, or pull it back.

use clap::Subcommand;
use ultraflow_core::{Config, HttpRemote, Identity, SyncBridge};

use super::{open_stores, print_json, runtime, CliResult};

#[derive(Subcommand)]
pub enum SyncAction {
    /// Upload every local session and the current settings
    Push,
    /// Replace the local log and settings with the remote copy
    Pull,
}

pub fn run(action: SyncAction) -> CliResult {
    let config = Config::load()?;
    let endpoint = config
        .sync
        .endpoint
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or("sync.endpoint is not configured (ultraflow-cli config set sync.endpoint <url>)")?;

    let remote = HttpRemote::new(endpoint)?;
    let (sessions, settings) = open_stores()?;
    let bridge = SyncBridge::new(remote, Identity::resolve(&config), sessions, settings);

    runtime()?.block_on(execute(&bridge, action))
}

async fn execute(bridge: &SyncBridge<HttpRemote>, action: SyncAction) -> CliResult {
    match action {
        SyncAction::Push => {
            let report = bridge.push().await?;
            print_json(&report)?;
            if let Some(err) = &report.settings_error {
                return Err(format!("settings push failed: {err}").into());
            }
            if !report.is_complete() {
                let failed = report.failures.len();
                return Err(format!("{failed} of {} sessions failed to push", report.attempted).into());
            }
            Ok(())
        }
        SyncAction::Pull => print_json(&bridge.pull().await?),
    }
}
