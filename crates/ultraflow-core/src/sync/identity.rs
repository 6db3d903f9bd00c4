//! Who the remote mirror belongs to.

use super::types::SyncError;
use crate::storage::Config;

/// Environment override for the configured user id.
pub const USER_ID_ENV: &str = "ULTRAFLOW_USER_ID";

/// An authenticated remote user.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub token: Option<String>,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Identity from `ULTRAFLOW_USER_ID` or `[identity] user_id`, with its
    /// token from the keyring. `None` when no user is configured.
    pub fn resolve(config: &Config) -> Option<Self> {
        let user_id = std::env::var(USER_ID_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| config.identity.user_id.clone())
            .filter(|v| !v.is_empty())?;

        let token = match keyring_store::get(&token_key(&user_id)) {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(error = %err, "keyring unavailable, continuing without token");
                None
            }
        };
        Some(Self { user_id, token })
    }
}

/// Fail fast when there is nobody to sync as.
pub fn require(identity: Option<&Identity>) -> Result<&Identity, SyncError> {
    identity.ok_or(SyncError::AuthenticationRequired)
}

pub fn token_key(user_id: &str) -> String {
    format!("sync_token:{user_id}")
}

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    use crate::sync::SyncError;

    const SERVICE: &str = "ultraflow";

    pub fn get(key: &str) -> Result<Option<String>, SyncError> {
        let entry = keyring::Entry::new(SERVICE, key).map_err(credential)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(credential(e)),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), SyncError> {
        let entry = keyring::Entry::new(SERVICE, key).map_err(credential)?;
        entry.set_password(value).map_err(credential)
    }

    pub fn delete(key: &str) -> Result<(), SyncError> {
        let entry = keyring::Entry::new(SERVICE, key).map_err(credential)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(credential(e)),
        }
    }

    fn credential(err: keyring::Error) -> SyncError {
        SyncError::Credential(err.to_string())
    }
}
