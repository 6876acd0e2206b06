// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bearer-token lifecycle.
//!
//! The vendor issues opaque tokens without an expiry, so each token is
//! stamped locally with its issue time and an assumed lifetime. A token is
//! replaced as a whole on every login and never mutated.
//!
//! Renewal is single-flight: when several callers notice an expired token at
//! once, the first one logs in and the others wait for and reuse its result.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use serde_json::json;
use tokio::sync::Mutex;

use crate::error::AuthError;
use crate::protocol::http::HttpClient;
use crate::response::LoginData;

const LOGIN_PATH: &str = "/auth/login";

/// Account credentials for the vendor cloud.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Creates credentials from an email and password.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns the account email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An issued bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    value: String,
    issued_at: DateTime<Utc>,
    ttl: Duration,
}

impl AuthToken {
    /// Creates a token issued at `issued_at` and living for `ttl`.
    #[must_use]
    pub fn new(value: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            value: value.into(),
            issued_at,
            ttl,
        }
    }

    /// Returns the bearer value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns when the token was obtained.
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Returns the assumed lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns `true` while `now < issued_at + ttl`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let Ok(ttl) = TimeDelta::from_std(self.ttl) else {
            return true;
        };
        self.issued_at
            .checked_add_signed(ttl)
            .is_none_or(|expires_at| now < expires_at)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("value", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Holds the current token for one account and renews it on demand.
pub struct AuthSession {
    http: HttpClient,
    credentials: Credentials,
    ttl: Duration,
    token: RwLock<Option<Arc<AuthToken>>>,
    renewal: Mutex<()>,
}

impl AuthSession {
    /// Creates a session without a token.
    #[must_use]
    pub fn new(http: HttpClient, credentials: Credentials, ttl: Duration) -> Self {
        Self {
            http,
            credentials,
            ttl,
            token: RwLock::new(None),
            renewal: Mutex::new(()),
        }
    }

    /// Returns the account email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.credentials.email()
    }

    /// Returns the current token, valid or not.
    #[must_use]
    pub fn token(&self) -> Option<Arc<AuthToken>> {
        self.token.read().clone()
    }

    /// Returns `true` if a token is held and has not expired.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Like [`is_valid`](Self::is_valid) against an explicit clock.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.token.read().as_ref().is_some_and(|t| t.is_valid_at(now))
    }

    /// Drops the current token so the next request logs in again.
    ///
    /// Used when the vendor rejects a token before its assumed expiry.
    pub fn invalidate(&self) {
        self.token.write().take();
    }

    fn valid_token(&self) -> Option<Arc<AuthToken>> {
        let now = Utc::now();
        self.token
            .read()
            .as_ref()
            .filter(|t| t.is_valid_at(now))
            .cloned()
    }

    /// Logs in unconditionally and stores the new token.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] on transport failure, a non-200 response or
    /// a missing token. The previously held token is left untouched.
    pub async fn login(&self) -> Result<Arc<AuthToken>, AuthError> {
        let _guard = self.renewal.lock().await;
        self.login_locked().await
    }

    /// Returns a valid token, logging in first if needed.
    ///
    /// Concurrent callers that all find the token expired share a single
    /// login request.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if a required login fails.
    pub async fn ensure_valid(&self) -> Result<Arc<AuthToken>, AuthError> {
        if let Some(token) = self.valid_token() {
            return Ok(token);
        }

        let _guard = self.renewal.lock().await;

        // Another caller may have renewed while we waited.
        if let Some(token) = self.valid_token() {
            tracing::trace!("Reusing token renewed by a concurrent caller");
            return Ok(token);
        }

        self.login_locked().await
    }

    async fn login_locked(&self) -> Result<Arc<AuthToken>, AuthError> {
        tracing::debug!(email = %self.credentials.email, "Logging in");

        let body = json!({
            "email": self.credentials.email,
            "password": self.credentials.password,
        });
        let response = self
            .http
            .post(LOGIN_PATH, &body, None)
            .await
            .map_err(|e| AuthError::Transport(e.message))?;

        if response.status() != 200 {
            tracing::warn!(status = response.status(), "Login rejected");
            return Err(AuthError::Rejected {
                status: response.status(),
            });
        }

        let data: LoginData = response
            .into_data()
            .map_err(|_| AuthError::MissingToken)?;
        let value = data.token().ok_or(AuthError::MissingToken)?;

        let token = Arc::new(AuthToken::new(value, Utc::now(), self.ttl));
        *self.token.write() = Some(Arc::clone(&token));

        tracing::info!(email = %self.credentials.email, "Logged in");
        Ok(token)
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("credentials", &self.credentials)
            .field("ttl", &self.ttl)
            .field("has_token", &self.token.read().is_some())
            .finish_non_exhaustive()
    }
}
