//! Login, logout and status commands.

use crate::cli::prompt_line;
use crate::config::AppConfig;
use crate::core::session::{Session, SessionFile, login, logout};
use crate::errors::{Error, Result};
use crate::store::DocumentStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::error;

const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Checks the credential pair and starts a session.
pub fn login_command(
    config: &AppConfig,
    file: &SessionFile,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => prompt_line("Username")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt_line("Password")?,
    };

    match login(
        &config.auth.credentials(),
        &username,
        &password,
        config.auth.session_ttl_hours,
        file,
        Utc::now(),
    ) {
        Ok(session) => {
            println!(
                "Logged in until {}.",
                session.expires_at.format(EXPIRY_FORMAT)
            );
            Ok(())
        }
        Err(err @ Error::InvalidCredentials) => {
            println!("Invalid username or password.");
            Err(err)
        }
        Err(err) => Err(err),
    }
}

/// Ends the current session.
pub fn logout_command(file: &SessionFile) -> Result<()> {
    logout(file)?;
    println!("Logged out.");
    Ok(())
}

/// Dashboard: session expiry plus the size of each collection.
pub async fn status_command<S: DocumentStore>(
    store: Arc<S>,
    config: &AppConfig,
    session: &Session,
) -> Result<()> {
    println!(
        "Session valid until {}.",
        session.expires_at.format(EXPIRY_FORMAT)
    );
    let collections = &config.remote.collections;
    let pages = [
        ("Sunday school", &collections.attendance),
        ("Mass", &collections.mass),
        ("Children", &collections.children),
    ];
    for (label, collection) in pages {
        match store.list_all(collection).await {
            Ok(documents) => println!("  {label}: {} records", documents.len()),
            Err(err) => {
                error!(%collection, "status fetch failed: {err}");
                println!("  {label}: unavailable ({err})");
            }
        }
    }
    Ok(())
}
