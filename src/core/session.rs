//! Login, session persistence and the route guard.
//!
//! Login is an exact match against the configured admin credential pair -
//! there is no hashing and no token issuance, by design. What the session
//! gate adds over the source data's durable boolean is an explicit session
//! object with an expiry: the gate stores issued-at/expires-at as a JSON
//! state file and every gated command checks it before running.

use crate::errors::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Session TTL applied when the configuration does not override it.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 12;

/// The admin credential pair, exactly as configured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    /// Expected username
    pub username: String,
    /// Expected password
    pub password: String,
}

/// An authenticated session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// When the session was created
    pub issued_at: DateTime<Utc>,
    /// When the session stops being honored
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Starts a session at `now` lasting `ttl_hours`.
    #[must_use]
    pub fn start(now: DateTime<Utc>, ttl_hours: i64) -> Self {
        Self {
            issued_at: now,
            expires_at: now + Duration::hours(ttl_hours.max(1)),
        }
    }

    /// Whether the session has expired as of `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// The durable session state file.
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    /// Uses an explicit path (tests).
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The per-user default location under the platform data directory.
    pub fn default_location() -> Result<Self> {
        let base = dirs::data_local_dir().ok_or_else(|| Error::Config {
            message: "no local data directory available for the session file".to_string(),
        })?;
        Ok(Self::new(base.join("attendance-buddy").join("session.json")))
    }

    /// Reads the stored session. A missing or unreadable file reads as
    /// "not logged in" rather than an error.
    #[must_use]
    pub fn load(&self) -> Option<Session> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                warn!(path = %self.path.display(), "discarding unreadable session file: {err}");
                None
            }
        }
    }

    /// Persists a session.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    /// Removes the stored session, if any.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Attempts a login. On an exact credential match a session is started and
/// persisted; anything else is [`Error::InvalidCredentials`].
pub fn login(
    expected: &Credentials,
    username: &str,
    password: &str,
    ttl_hours: i64,
    file: &SessionFile,
    now: DateTime<Utc>,
) -> Result<Session> {
    if username != expected.username || password != expected.password {
        warn!("rejected login attempt for {username:?}");
        return Err(Error::InvalidCredentials);
    }
    let session = Session::start(now, ttl_hours);
    file.save(&session)?;
    info!(expires_at = %session.expires_at, "login succeeded");
    Ok(session)
}

/// Route guard: returns the current session or the reason there is none.
pub fn guard(file: &SessionFile, now: DateTime<Utc>) -> Result<Session> {
    let session = file.load().ok_or(Error::NotLoggedIn)?;
    if session.is_expired_at(now) {
        return Err(Error::SessionExpired {
            expired_at: session.expires_at,
        });
    }
    Ok(session)
}

/// Ends the session.
pub fn logout(file: &SessionFile) -> Result<()> {
    file.clear()?;
    info!("logged out");
    Ok(())
}
