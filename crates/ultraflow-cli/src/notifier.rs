//! Terminal bell notifications.

use std::io::Write;

use ultraflow_core::timer::{Notifier, NotifyError, Permission};

/// A terminal can always ring its bell; no prompt needed.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    async fn request_permission(&self) -> Result<Permission, NotifyError> {
        Ok(Permission::Granted)
    }

    async fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        writeln!(std::io::stderr(), "\x07\n{title} {body}").map_err(|e| NotifyError::Failed(e.to_string()))
    }
}
