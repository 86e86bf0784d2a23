//! Session and credential lifecycle.
//!
//! One [`SessionManager`] instance is shared by the data coordinator and
//! the action gateway. The session lives behind a single async mutex, so
//! while one caller is logging in, concurrent callers wait on the lock and
//! then reuse the fresh session instead of issuing their own login.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::ApiError;
use crate::http::HttpClient;
use crate::wire::{Envelope, LoginData, UserData};

/// Consecutive login rejections before the manager reports that operator
/// attention is required.
const MAX_AUTH_FAILURES: u32 = 3;

/// Login endpoint path.
const LOGIN_PATH: &str = "/services/frontend-service/login";

// ============================================================================
// Credentials & Session
// ============================================================================

/// Login credentials, immutable once constructed.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Login email.
    pub email: String,
    password: String,
}

impl Credentials {
    /// Creates credentials from an email/password pair.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Profile of the logged-in user, taken from the login envelope.
    pub user: UserData,
    /// Default delivery address id, absent when the account has none.
    pub address_id: Option<i64>,
    /// When the session was established.
    pub obtained_at: DateTime<Utc>,
}

// ============================================================================
// Session Manager
// ============================================================================

/// Owns credentials and the current session; performs login on demand.
///
/// `session()` returns the held session when one exists and logs in
/// otherwise. `invalidate()` clears the session, matched by token, so
/// the next call re-authenticates. Exactly one login request is in
/// flight at a time.
pub struct SessionManager {
    credentials: Credentials,
    base_url: String,
    http: HttpClient,
    session: Mutex<Option<Session>>,
    auth_failures: AtomicU32,
}

impl SessionManager {
    /// Creates a manager for the given shop front.
    pub fn new(credentials: Credentials, base_url: impl Into<String>, http: HttpClient) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            credentials,
            base_url,
            http,
            session: Mutex::new(None),
            auth_failures: AtomicU32::new(0),
        }
    }

    /// Base URL of the shop front this manager authenticates against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// HTTP client shared with the API layer.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Returns a currently valid session, logging in if none is held.
    ///
    /// Callers arriving while a login is in progress block on the session
    /// lock and receive the session that login produced.
    pub async fn session(&self) -> Result<Session, ApiError> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_ref() {
            return Ok(session.clone());
        }

        let session = self.login().await?;
        *guard = Some(session.clone());
        Ok(session)
    }

    /// Performs a fresh login and replaces the held session.
    ///
    /// The login envelope is the only source of profile and credit data,
    /// so callers that need current values go through here rather than
    /// reusing a session obtained earlier.
    pub async fn refresh_session(&self) -> Result<Session, ApiError> {
        let mut guard = self.session.lock().await;
        let session = self.login().await?;
        *guard = Some(session.clone());
        Ok(session)
    }

    /// Discards the held session if it still carries the rejected token.
    ///
    /// A caller whose 401 arrives after another caller has already
    /// re-logged-in finds a different token in the slot and leaves it
    /// untouched, so the fresh session is reused instead of triggering
    /// another login.
    pub async fn invalidate(&self, rejected_token: &str) {
        let mut guard = self.session.lock().await;
        match guard.as_ref() {
            Some(session) if session.token == rejected_token => {
                *guard = None;
                debug!("Session invalidated");
            }
            Some(_) => debug!("Ignoring stale invalidation, session already replaced"),
            None => {}
        }
    }

    /// True after repeated consecutive login rejections; the operator
    /// needs to supply new credentials.
    pub fn needs_reconfiguration(&self) -> bool {
        self.auth_failures.load(Ordering::Relaxed) >= MAX_AUTH_FAILURES
    }

    /// Performs the login request and classifies the envelope.
    #[instrument(skip(self), fields(email = %self.credentials.email))]
    async fn login(&self) -> Result<Session, ApiError> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        let body = json!({
            "email": self.credentials.email,
            "password": self.credentials.password,
            "name": "",
        });

        debug!(url = %url, "Logging in");

        let response = self.http.send(self.http.inner().post(&url).json(&body)).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope<LoginData> = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        // The service reports auth results inside the envelope, not via
        // the HTTP status line.
        if envelope.status == 401 {
            let failures = self.auth_failures.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(failures, "Login rejected");
            return Err(ApiError::Authentication(envelope.first_message().to_string()));
        }
        if envelope.status != 200 {
            return Err(ApiError::Upstream {
                status: envelope.status,
                body: envelope.first_message().to_string(),
            });
        }

        let data = envelope
            .data
            .ok_or_else(|| ApiError::Decode("login envelope missing data".to_string()))?;

        self.auth_failures.store(0, Ordering::Relaxed);
        info!(user_id = data.user.id, "Login succeeded");

        Ok(Session {
            token: data.session_token,
            user: data.user,
            address_id: data.address.map(|a| a.id),
            obtained_at: Utc::now(),
        })
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("email", &self.credentials.email)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
