pub mod auth;
pub mod config;
pub mod sessions;
pub mod settings;
pub mod stats;
pub mod sync;
pub mod timer;

use std::sync::Arc;

use serde::Serialize;
use ultraflow_core::{Database, SessionStore, SettingsStore};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Session and settings stores over the default database.
pub fn open_stores() -> Result<(SessionStore, SettingsStore), Box<dyn std::error::Error>> {
    let db = Arc::new(Database::open()?);
    Ok((SessionStore::new(db.clone()), SettingsStore::new(db)))
}

/// Single-threaded runtime for commands that need async.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
