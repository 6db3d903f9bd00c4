//! # UltraFlow Core Library
//!
//! Core logic for the UltraFlow ultradian focus timer: long focus phases
//! followed by breaks, an energy rating after every focus phase, and
//! statistics that show when during the day energy runs highest. The
//! `ultraflow-cli` binary is a thin front-end over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: A pure state machine driven by `tick()`, plus an async
//!   runner that owns the tick source, notifications and rating prompts
//! - **Storage**: JSON documents in SQLite and TOML-based configuration
//! - **Stats**: Daily and hourly aggregation with energy insights
//! - **Sync**: On-demand push/pull against a remote document store
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerRunner`]: Single-owner async driver for the engine
//! - [`SessionStore`] / [`SettingsStore`]: Local persistence
//! - [`SyncBridge`]: Remote mirror

pub mod error;
pub mod events;
pub mod session;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod sync;
pub mod timer;

pub use error::{ConfigError, CoreError, Result, StorageError, ValidationError};
pub use events::Event;
pub use session::{EnergyLevel, Session};
pub use settings::Settings;
pub use stats::{DayStats, HourStats, Insights, Report, Summary, Window};
pub use storage::{Config, Database, DocumentStore, MemoryStore, SessionStore, SettingsStore};
pub use sync::{HttpRemote, Identity, MemoryRemote, RemoteStore, SyncBridge, SyncError};
pub use timer::{
    IntervalTicks, ManualTicks, Notifier, Permission, Phase, RunnerHandle, SilentNotifier,
    TickSource, TimerEngine, TimerRunner, TimerSnapshot,
};
