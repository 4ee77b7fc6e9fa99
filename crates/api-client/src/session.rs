//! Persisted session state
//!
//! The session lives in local storage under three keys:
//! - `session`: JSON `{ access_token, role, organization }`
//! - `expireDate`: RFC 3339 expiry timestamp (epoch milliseconds are also read)
//! - `token`: legacy raw bearer token
//!
//! Any read that finds an expiry in the past clears all three keys.

use crate::error::ApiResult;
use chrono::{DateTime, TimeZone, Utc};
use medrec_core::storage::{MemoryStorage, Storage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Storage key holding the session JSON
pub const SESSION_KEY: &str = "session";
/// Storage key holding the session expiry
pub const EXPIRE_DATE_KEY: &str = "expireDate";
/// Legacy storage key holding the bare token
pub const LEGACY_TOKEN_KEY: &str = "token";

/// Client-held credential bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token
    pub access_token: String,
    /// Role granted by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Organization the user belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

/// Reads and writes session state with expiry enforcement
#[derive(Clone)]
pub struct SessionManager {
    storage: Arc<dyn Storage>,
    ttl: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a manager over the given storage
    pub fn new(storage: Arc<dyn Storage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    /// Create a manager backed by process memory
    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryStorage::new()), ttl)
    }

    /// Lifetime given to newly saved sessions
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Underlying storage
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Persist a session expiring after the configured lifetime
    pub fn save(&self, session: &Session) -> ApiResult<DateTime<Utc>> {
        let ttl = chrono::Duration::from_std(self.ttl)
            .unwrap_or_else(|_| chrono::Duration::days(36_500));
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.save_until(session, expires_at)?;
        Ok(expires_at)
    }

    /// Persist a session with an explicit expiry
    pub fn save_until(&self, session: &Session, expires_at: DateTime<Utc>) -> ApiResult<()> {
        let json = serde_json::to_string(session)?;
        self.storage.set(SESSION_KEY, &json)?;
        self.storage.set(LEGACY_TOKEN_KEY, &session.access_token)?;
        self.storage.set(EXPIRE_DATE_KEY, &expires_at.to_rfc3339())?;
        info!(
            role = session.role.as_deref().unwrap_or("-"),
            expires_at = %expires_at,
            "Session saved"
        );
        Ok(())
    }

    /// Remove all session keys
    pub fn clear(&self) -> ApiResult<()> {
        for key in [SESSION_KEY, LEGACY_TOKEN_KEY, EXPIRE_DATE_KEY] {
            self.storage.remove(key)?;
        }
        debug!("Session cleared");
        Ok(())
    }

    /// Stored expiry, if any
    ///
    /// An unreadable timestamp is reported as the earliest representable time
    /// so that it counts as expired.
    pub fn expires_at(&self) -> ApiResult<Option<DateTime<Utc>>> {
        Ok(self
            .storage
            .get(EXPIRE_DATE_KEY)?
            .map(|raw| parse_expiry(&raw).unwrap_or(DateTime::<Utc>::MIN_UTC)))
    }

    /// The stored session if it has not expired
    ///
    /// A legacy bare token is promoted to a session without role or
    /// organization. Expired state is cleared.
    pub fn current(&self) -> ApiResult<Option<Session>> {
        if self.clear_if_expired()? {
            return Ok(None);
        }

        if let Some(raw) = self.storage.get(SESSION_KEY)? {
            match serde_json::from_str::<Session>(&raw) {
                Ok(session) if !session.access_token.is_empty() => return Ok(Some(session)),
                Ok(_) => {}
                Err(e) => debug!(error = %e, "Ignoring unreadable session entry"),
            }
        }

        Ok(self
            .storage
            .get(LEGACY_TOKEN_KEY)?
            .filter(|token| !token.is_empty())
            .map(|access_token| Session {
                access_token,
                role: None,
                organization: None,
            }))
    }

    /// The bearer token if the session is still valid
    pub fn get_token(&self) -> ApiResult<Option<String>> {
        Ok(self.current()?.map(|session| session.access_token))
    }

    /// Whether a valid token is stored. Storage failures count as invalid.
    pub fn is_token_valid(&self) -> bool {
        matches!(self.get_token(), Ok(Some(_)))
    }

    fn clear_if_expired(&self) -> ApiResult<bool> {
        match self.expires_at()? {
            Some(expires_at) if expires_at <= Utc::now() => {
                info!(expired_at = %expires_at, "Session expired, clearing local storage");
                self.clear()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim().trim_matches('"');
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
}
