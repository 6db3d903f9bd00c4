//! Notification collaborator.
//!
//! Hosts without notifications (or users who deny them) must never affect the
//! timer: every failure here is logged and absorbed by the runner.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Host answer to a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    Unsupported,
}

/// What the engine knows about notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// Never asked.
    #[default]
    Unknown,
    /// Asked, answer not back yet.
    Pending,
    Granted,
    Denied,
    Unsupported,
}

impl From<Permission> for PermissionState {
    fn from(p: Permission) -> Self {
        match p {
            Permission::Granted => PermissionState::Granted,
            Permission::Denied => PermissionState::Denied,
            Permission::Unsupported => PermissionState::Unsupported,
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifications are not supported on this host")]
    Unsupported,

    #[error("notification failed: {0}")]
    Failed(String),
}

/// Capability to ask for permission once and show titled messages.
pub trait Notifier: Send + Sync + 'static {
    fn request_permission(&self) -> impl Future<Output = Result<Permission, NotifyError>> + Send;

    fn notify(&self, title: &str, body: &str) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Notifier for hosts with no notification capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    async fn request_permission(&self) -> Result<Permission, NotifyError> {
        Ok(Permission::Unsupported)
    }

    async fn notify(&self, _title: &str, _body: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Unsupported)
    }
}
