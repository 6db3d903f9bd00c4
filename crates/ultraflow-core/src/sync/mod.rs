//! Remote mirror of the session log and settings.
//!
//! Sync is one-directional and on demand: `push` uploads local data,
//! `pull` replaces local data with the remote copy. There is no merge.

mod bridge;
mod http;
mod identity;
mod remote;
mod types;

pub use bridge::SyncBridge;
pub use http::HttpRemote;
pub use identity::{keyring_store, require, token_key, Identity, USER_ID_ENV};
pub use remote::{MemoryRemote, RemoteStore};
pub use types::{
    DateRange, PullReport, PushFailure, PushReport, RemoteSession, RemoteSettings, SyncError,
};
