use chrono::{DateTime, Duration, Utc};
use log::debug;
use tokio::sync::Mutex;

use crate::auth::{Credentials, TokenAcquirer, TokenResponse};
use crate::error::Result;

/// Lifetime used when the provider's `expires_in` cannot be read.
pub const FALLBACK_LIFETIME_SECS: i64 = 3600;

/// A bearer token together with the instant it stops being valid.
///
/// Sessions are replaced as a whole on every acquisition; nothing mutates one
/// in place.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
    pub id_token: String,
    /// Raw lifetime as sent by the provider. Advisory only.
    pub expires_in: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Build a session from a token payload received at `issued_at`.
    ///
    /// `expires_in` is read as whole seconds. Anything unparseable, or a value
    /// that would overflow the calendar, yields a lifetime of
    /// [`FALLBACK_LIFETIME_SECS`].
    pub fn from_token_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        let expires_at = response
            .expires_in
            .parse::<i64>()
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .unwrap_or_else(|| issued_at + Duration::seconds(FALLBACK_LIFETIME_SECS));

        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            refresh_token: response.refresh_token,
            id_token: response.id_token,
            expires_in: response.expires_in,
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// True from `expires_at` onwards, false strictly before it.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// Tokens stay out of logs and panic messages.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("refresh_token", &"[REDACTED]")
            .field("id_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Owns the cached session and decides when a new one is needed.
///
/// The lock is held across acquisition, so concurrent callers on the same
/// client trigger at most one password grant and all see its result.
pub struct SessionManager {
    credentials: Credentials,
    acquirer: Box<dyn TokenAcquirer>,
    session: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(credentials: Credentials, acquirer: Box<dyn TokenAcquirer>) -> Self {
        Self {
            credentials,
            acquirer,
            session: Mutex::new(None),
        }
    }

    /// Return a usable access token, acquiring a new session only when there
    /// is none yet or the cached one has expired.
    ///
    /// On failure the cached session, if any, is left as it was.
    pub async fn ensure_valid_token(&self) -> Result<String> {
        let mut guard = self.session.lock().await;

        if let Some(session) = guard.as_ref() {
            if !session.is_expired() {
                return Ok(session.access_token.clone());
            }
            debug!("Cached token expired at {}, re-authenticating", session.expires_at);
        } else {
            debug!("No cached token, authenticating");
        }

        let session = self.acquirer.acquire(&self.credentials).await?;
        debug!("New token valid until {}", session.expires_at);
        let token = session.access_token.clone();
        *guard = Some(session);
        Ok(token)
    }

    pub async fn current(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }

    pub async fn clear(&self) {
        *self.session.lock().await = None;
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }
}
