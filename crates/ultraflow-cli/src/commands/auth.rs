use clap::Subcommand;
use ultraflow_core::sync::{keyring_store, token_key};
use ultraflow_core::{Config, Identity};

use super::CliResult;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Remember the account used for sync
    Login {
        /// Remote user id
        #[arg(long)]
        user: String,
        /// Bearer token for the sync endpoint (stored in the OS keyring)
        #[arg(long)]
        token: Option<String>,
    },
    /// Forget the account and its stored token
    Logout,
    /// Show which account sync would use
    Status,
}

pub fn run(action: AuthAction) -> CliResult {
    match action {
        AuthAction::Login { user, token } => {
            if user.trim().is_empty() {
                return Err("user id must not be empty".into());
            }
            let mut config = Config::load()?;
            config.set("identity.user_id", &user)?;
            if let Some(token) = token {
                keyring_store::set(&token_key(&user), &token)?;
            }
            println!("logged in as {user}");
        }
        AuthAction::Logout => {
            let mut config = Config::load()?;
            if let Some(user) = config.identity.user_id.clone() {
                keyring_store::delete(&token_key(&user))?;
            }
            config.set("identity.user_id", "")?;
            println!("logged out");
        }
        AuthAction::Status => {
            let config = Config::load()?;
            match Identity::resolve(&config) {
                Some(identity) => {
                    let token = if identity.token.is_some() { "stored" } else { "none" };
                    println!("user: {}", identity.user_id);
                    println!("token: {token}");
                }
                None => println!("not logged in"),
            }
        }
    }
    Ok(())
}
