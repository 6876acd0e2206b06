// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Authenticated client for one spa account.
//!
//! Every call follows the same shape: make sure the session holds a valid
//! token, send the request, and accept only a 200 with the expected body.
//! Commands add one more step: after the vendor accepts them the client
//! waits for the configured settle delay and fetches the dashboard again,
//! because the backend applies writes asynchronously and the command
//! response says nothing about the new state.
//!
//! No call is retried here. The poll loop is the retry mechanism.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::Value;

use crate::command::{Command, SpaCommand, SwitchableComponent};
use crate::error::{ApiError, Result};
use crate::protocol::{AuthSession, AuthToken, Credentials, HttpClient, HttpConfig, HttpResponse};
use crate::response::{ProfileData, RawSpaPayload, UserInfo};
use crate::types::{FilterInterval, LocalClock, TempRange, TimeOfDay};

const PROFILE_PATH: &str = "/user-management/profile";

/// Client for the vendor's query and command endpoints.
///
/// # Examples
///
/// ```no_run
/// use cmspa_lib::SpaCommandClient;
/// use cmspa_lib::protocol::{Credentials, HttpConfig};
///
/// # async fn example() -> cmspa_lib::Result<()> {
/// let client = SpaCommandClient::new(
///     HttpConfig::new(),
///     Credentials::new("owner@example.com", "secret"),
/// )?;
///
/// // Resolves the spa id on first use
/// let raw = client.fetch_state().await?;
/// println!("serial: {:?}", raw.serial_number());
///
/// // Waits for the backend to settle, then returns the refetched dashboard
/// let raw = client.set_panel_lock(true).await?;
/// # let _ = raw;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SpaCommandClient {
    http: HttpClient,
    session: AuthSession,
    settle_delay: Duration,
    spa_id: RwLock<Option<String>>,
    profile: RwLock<Option<UserInfo>>,
}

impl SpaCommandClient {
    /// Creates a client for one account.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: HttpConfig, credentials: Credentials) -> Result<Self> {
        let ttl = config.token_ttl();
        let settle_delay = config.settle_delay();
        let http = config.into_client()?;
        let session = AuthSession::new(http.clone(), credentials, ttl);

        Ok(Self {
            http,
            session,
            settle_delay,
            spa_id: RwLock::new(None),
            profile: RwLock::new(None),
        })
    }

    /// Pins the spa id so that no profile lookup is needed.
    #[must_use]
    pub fn with_spa_id(self, spa_id: impl Into<String>) -> Self {
        *self.spa_id.write() = Some(spa_id.into());
        self
    }

    /// Returns the authentication session.
    #[must_use]
    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Returns the spa id, if already known.
    #[must_use]
    pub fn cached_spa_id(&self) -> Option<String> {
        self.spa_id.read().clone()
    }

    /// Returns the last fetched profile.
    #[must_use]
    pub fn profile(&self) -> Option<UserInfo> {
        self.profile.read().clone()
    }

    /// Logs in, replacing any held token.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the vendor rejects the credentials.
    pub async fn login(&self) -> Result<Arc<AuthToken>> {
        Ok(self.session.login().await?)
    }

    /// Fetches the account profile and remembers its spa id.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails, the request fails, or the
    /// body has no `user` member.
    pub async fn fetch_profile(&self) -> Result<UserInfo> {
        let response = self.get(PROFILE_PATH).await?;
        let data: ProfileData = response.into_data().inspect_err(|e| {
            tracing::warn!(error = %e, "Profile fetch failed");
        })?;
        let user = data
            .user
            .ok_or_else(|| ApiError::malformed(200, "profile response has no user"))?;

        if let Some(spa_id) = user.spa_id.as_deref().filter(|id| !id.is_empty()) {
            tracing::debug!(spa_id = %spa_id, "Resolved spa id from profile");
            *self.spa_id.write() = Some(spa_id.to_string());
        }
        *self.profile.write() = Some(user.clone());

        Ok(user)
    }

    /// Returns the spa id, fetching the profile on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be fetched or names no spa.
    pub async fn spa_id(&self) -> Result<String> {
        if let Some(id) = self.cached_spa_id() {
            return Ok(id);
        }
        let user = self.fetch_profile().await?;
        user.spa_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::malformed(200, "profile has no spa id").into())
    }

    /// Fetches the raw dashboard of the spa.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails, the request fails, or the
    /// body has no `data` member.
    pub async fn fetch_state(&self) -> Result<RawSpaPayload> {
        let spa_id = self.spa_id().await?;
        let path = format!("/spas/{}/dashboard", urlencoding::encode(&spa_id));
        let response = self.get(&path).await?;
        let data: Value = response.into_data().inspect_err(|e| {
            tracing::warn!(spa_id = %spa_id, error = %e, "Dashboard fetch failed");
        })?;
        Ok(RawSpaPayload::new(data))
    }

    /// Sends a command, waits for the backend to settle and refetches state.
    ///
    /// Parameters are validated before anything goes on the wire.
    ///
    /// # Errors
    ///
    /// Returns a validation error for rejected parameters, or the first
    /// failure among login, command post and refetch.
    pub async fn send_command<C: Command + Sync>(&self, command: &C) -> Result<RawSpaPayload> {
        command.validate().inspect_err(|e| {
            tracing::warn!(command = command.name(), error = %e, "Command rejected locally");
        })?;

        let spa_id = self.spa_id().await?;
        let token = self.session.ensure_valid().await?;
        let body = command.body(&spa_id);

        tracing::debug!(command = command.name(), path = command.path(), "Sending command");
        let response = self
            .http
            .post(command.path(), &body, Some(token.value()))
            .await?;
        self.check_authorized(&response);
        response.ensure_ok().inspect_err(|e| {
            tracing::warn!(command = command.name(), error = %e, "Command failed");
        })?;

        if !self.settle_delay.is_zero() {
            tracing::debug!(delay = ?self.settle_delay, "Waiting for backend to settle");
            tokio::time::sleep(self.settle_delay).await;
        }

        self.fetch_state().await
    }

    // ========== Convenience Commands ==========

    /// Sets the target temperature in Celsius.
    ///
    /// # Errors
    ///
    /// See [`send_command`](Self::send_command).
    pub async fn set_temperature(&self, celsius: f64) -> Result<RawSpaPayload> {
        self.send_command(&SpaCommand::temperature_celsius(celsius))
            .await
    }

    /// Selects the high or low temperature range.
    ///
    /// # Errors
    ///
    /// See [`send_command`](Self::send_command).
    pub async fn set_temperature_range(&self, range: TempRange) -> Result<RawSpaPayload> {
        self.send_command(&SpaCommand::SetTemperatureRange(range))
            .await
    }

    /// Locks or unlocks the control panel.
    ///
    /// # Errors
    ///
    /// See [`send_command`](Self::send_command).
    pub async fn set_panel_lock(&self, locked: bool) -> Result<RawSpaPayload> {
        self.send_command(&SpaCommand::SetPanelLock { locked })
            .await
    }

    /// Switches a light, jet or blower.
    ///
    /// # Errors
    ///
    /// See [`send_command`](Self::send_command).
    pub async fn set_component_state(
        &self,
        component: SwitchableComponent,
        device_number: u8,
        on: bool,
    ) -> Result<RawSpaPayload> {
        self.send_command(&SpaCommand::component(component, device_number, on))
            .await
    }

    /// Sets the heater mode from its vendor token (`READY` or `REST`).
    ///
    /// # Errors
    ///
    /// Returns a validation error, without sending anything, for any other
    /// token. Otherwise see [`send_command`](Self::send_command).
    pub async fn set_heater_mode(&self, mode: &str) -> Result<RawSpaPayload> {
        let command = SpaCommand::heater_mode(mode)?;
        self.send_command(&command).await
    }

    /// Schedules a filter cycle.
    ///
    /// # Errors
    ///
    /// Returns a validation error when asked to disable the primary filter.
    /// Otherwise see [`send_command`](Self::send_command).
    pub async fn set_filter_cycle(
        &self,
        device_number: u8,
        interval: FilterInterval,
        start: TimeOfDay,
    ) -> Result<RawSpaPayload> {
        self.send_command(&SpaCommand::SetFilterCycle {
            device_number,
            interval,
            start,
        })
        .await
    }

    /// Sets the spa clock.
    ///
    /// # Errors
    ///
    /// See [`send_command`](Self::send_command).
    pub async fn set_time(&self, clock: LocalClock, military: bool) -> Result<RawSpaPayload> {
        self.send_command(&SpaCommand::SetTime { clock, military })
            .await
    }

    // ========== Transport Helpers ==========

    async fn get(&self, path: &str) -> Result<HttpResponse> {
        let token = self.session.ensure_valid().await?;
        let response = self.http.get(path, Some(token.value())).await?;
        self.check_authorized(&response);
        Ok(response)
    }

    /// Drops a token the vendor no longer accepts so the next call logs in.
    fn check_authorized(&self, response: &HttpResponse) {
        if response.status() == 401 {
            tracing::warn!("Token rejected before expiry, forcing login on next call");
            self.session.invalidate();
        }
    }
}
