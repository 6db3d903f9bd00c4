//! Remote document store seam and its in-process implementation.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::identity::Identity;
use super::types::{DateRange, RemoteSession, RemoteSettings, SyncError};

/// Per-user remote storage for sessions and settings.
pub trait RemoteStore: Send + Sync {
    fn append_session(
        &self,
        identity: &Identity,
        session: &RemoteSession,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Sessions for the user, newest first.
    fn list_sessions(
        &self,
        identity: &Identity,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<RemoteSession>, SyncError>> + Send;

    fn replace_settings(
        &self,
        identity: &Identity,
        settings: &RemoteSettings,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    fn get_settings(
        &self,
        identity: &Identity,
    ) -> impl Future<Output = Result<Option<RemoteSettings>, SyncError>> + Send;
}

#[derive(Debug, Default, Clone)]
struct UserDocs {
    sessions: Vec<RemoteSession>,
    settings: Option<RemoteSettings>,
}

/// Remote store kept in memory, with failure injection.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    users: Mutex<HashMap<String, UserDocs>>,
    appends: AtomicUsize,
    failing_appends: Mutex<HashSet<usize>>,
    offline: AtomicBool,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the n-th (0-based) append call from now on.
    pub fn fail_append(&self, call: usize) {
        if let Ok(mut failing) = self.failing_appends.lock() {
            failing.insert(call);
        }
    }

    /// Fail every operation.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn session_count(&self, user_id: &str) -> usize {
        self.users
            .lock()
            .map(|users| users.get(user_id).map_or(0, |u| u.sessions.len()))
            .unwrap_or(0)
    }

    fn check_online(&self) -> Result<(), SyncError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::Remote("remote store unreachable".into()));
        }
        Ok(())
    }

    fn users(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, UserDocs>>, SyncError> {
        self.users
            .lock()
            .map_err(|_| SyncError::Remote("memory remote poisoned".into()))
    }
}

impl RemoteStore for MemoryRemote {
    async fn append_session(&self, identity: &Identity, session: &RemoteSession) -> Result<(), SyncError> {
        self.check_online()?;
        let call = self.appends.fetch_add(1, Ordering::SeqCst);
        let refused = self
            .failing_appends
            .lock()
            .map(|failing| failing.contains(&call))
            .unwrap_or(false);
        if refused {
            return Err(SyncError::Remote(format!("append #{call} refused")));
        }
        self.users()?
            .entry(identity.user_id.clone())
            .or_default()
            .sessions
            .push(session.clone());
        Ok(())
    }

    async fn list_sessions(&self, identity: &Identity, range: DateRange) -> Result<Vec<RemoteSession>, SyncError> {
        self.check_online()?;
        let mut sessions: Vec<RemoteSession> = self
            .users()?
            .get(&identity.user_id)
            .map(|u| {
                u.sessions
                    .iter()
                    .filter(|s| range.contains(s.date))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sessions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(sessions)
    }

    async fn replace_settings(&self, identity: &Identity, settings: &RemoteSettings) -> Result<(), SyncError> {
        self.check_online()?;
        self.users()?
            .entry(identity.user_id.clone())
            .or_default()
            .settings = Some(*settings);
        Ok(())
    }

    async fn get_settings(&self, identity: &Identity) -> Result<Option<RemoteSettings>, SyncError> {
        self.check_online()?;
        Ok(self
            .users()?
            .get(&identity.user_id)
            .and_then(|u| u.settings))
    }
}
