//! On-demand copy between the local stores and a remote mirror.
//!
//! Local storage stays the source of truth for the timer: push never touches
//! local state, and pull only writes once every remote read succeeded.

use super::identity::{require, Identity};
use super::remote::RemoteStore;
use super::types::{DateRange, PullReport, PushFailure, PushReport, RemoteSession, RemoteSettings, SyncError};
use crate::session::Session;
use crate::storage::{SessionStore, SettingsStore};

pub struct SyncBridge<R> {
    remote: R,
    identity: Option<Identity>,
    sessions: SessionStore,
    settings: SettingsStore,
}

impl<R: RemoteStore> SyncBridge<R> {
    pub fn new(
        remote: R,
        identity: Option<Identity>,
        sessions: SessionStore,
        settings: SettingsStore,
    ) -> Self {
        Self {
            remote,
            identity,
            sessions,
            settings,
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn into_remote(self) -> R {
        self.remote
    }

    /// Upload every local session as its own document, then the stored
    /// settings. Pushing twice duplicates sessions remotely.
    pub async fn push(&self) -> Result<PushReport, SyncError> {
        let identity = require(self.identity.as_ref())?;
        let local = self.sessions.load();
        let mut report = PushReport {
            attempted: local.len(),
            ..PushReport::default()
        };

        for (index, session) in local.iter().enumerate() {
            let doc = RemoteSession::from_session(session, &identity.user_id);
            match self.remote.append_session(identity, &doc).await {
                Ok(()) => report.pushed += 1,
                Err(SyncError::AuthenticationRequired) => return Err(SyncError::AuthenticationRequired),
                Err(err) => {
                    tracing::warn!(index, error = %err, "session push failed");
                    report.failures.push(PushFailure {
                        index,
                        message: err.to_string(),
                    });
                }
            }
        }

        if let Some(settings) = self.settings.load_stored() {
            match self
                .remote
                .replace_settings(identity, &RemoteSettings::new(settings))
                .await
            {
                Ok(()) => report.settings_pushed = true,
                Err(err) => {
                    tracing::warn!(error = %err, "settings push failed");
                    report.settings_error = Some(err.to_string());
                }
            }
        }

        tracing::info!(
            user = %identity.user_id,
            pushed = report.pushed,
            failed = report.failures.len(),
            settings = report.settings_pushed,
            "push finished"
        );
        Ok(report)
    }

    /// Replace the local log (and settings, when the remote has them) with
    /// the remote copy.
    ///
    /// Settings are written before the log. If the log write fails after the
    /// settings landed, local settings are already the remote ones.
    pub async fn pull(&self) -> Result<PullReport, SyncError> {
        let identity = require(self.identity.as_ref())?;
        let remote_sessions = self
            .remote
            .list_sessions(identity, DateRange::all())
            .await?;
        let remote_settings = self.remote.get_settings(identity).await?;
        if let Some(doc) = &remote_settings {
            doc.settings.validate()?;
        }

        // Settings go first: if that write fails the log is still untouched.
        let settings_applied = match remote_settings {
            Some(doc) => {
                self.settings.store(&doc.settings)?;
                true
            }
            None => false,
        };

        let mut sessions: Vec<Session> = remote_sessions.iter().map(RemoteSession::to_session).collect();
        sessions.sort_by(|a, b| b.date.cmp(&a.date));
        self.sessions.replace_all(&sessions)?;

        tracing::info!(
            user = %identity.user_id,
            sessions = sessions.len(),
            settings = settings_applied,
            "pull finished"
        );
        Ok(PullReport {
            sessions: sessions.len(),
            settings_applied,
        })
    }
}
