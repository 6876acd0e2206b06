// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Setup-time account check and spa listing.

use crate::client::SpaCommandClient;
use crate::error::Result;
use crate::protocol::{Credentials, HttpConfig};
use crate::response::RawSpaPayload;

/// A spa offered to the user while pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Vendor spa id, stable across sessions.
    pub id: String,
    /// Display label: the controller serial number, or the id.
    pub label: String,
}

impl DeviceDescriptor {
    fn from_dashboard(spa_id: &str, raw: &RawSpaPayload) -> Self {
        let id = raw.spa_id().unwrap_or(spa_id).to_string();
        let label = raw
            .serial_number()
            .filter(|s| !s.is_empty())
            .map_or_else(|| id.clone(), str::to_string);
        Self { id, label }
    }
}

/// Pairing flow: check credentials, then list the account's spas.
///
/// # Examples
///
/// ```no_run
/// use cmspa_lib::pairing::PairingSession;
/// use cmspa_lib::protocol::HttpConfig;
///
/// # async fn example() {
/// let mut pairing = PairingSession::new(HttpConfig::new());
/// if pairing.login("owner@example.com", "secret").await {
///     for spa in pairing.list_devices() {
///         println!("{} ({})", spa.label, spa.id);
///     }
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct PairingSession {
    config: HttpConfig,
    devices: Vec<DeviceDescriptor>,
}

impl PairingSession {
    /// Creates a pairing session.
    #[must_use]
    pub fn new(config: HttpConfig) -> Self {
        Self {
            config,
            devices: Vec::new(),
        }
    }

    /// Logs in and looks up the account's spa.
    ///
    /// Returns `false` if the credentials are rejected or the vendor cannot
    /// be reached; the reason is logged.
    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        self.devices.clear();
        match self.discover(Credentials::new(email, password)).await {
            Ok(device) => {
                tracing::info!(email = %email, spa_id = %device.id, "Pairing login succeeded");
                self.devices.push(device);
                true
            }
            Err(e) => {
                tracing::warn!(email = %email, error = %e, "Pairing login failed");
                false
            }
        }
    }

    /// Returns the spas found by the last successful [`login`](Self::login).
    #[must_use]
    pub fn list_devices(&self) -> Vec<DeviceDescriptor> {
        self.devices.clone()
    }

    async fn discover(&self, credentials: Credentials) -> Result<DeviceDescriptor> {
        let client = SpaCommandClient::new(self.config.clone(), credentials)?;
        client.login().await?;
        let spa_id = client.spa_id().await?;
        let raw = client.fetch_state().await?;
        Ok(DeviceDescriptor::from_dashboard(&spa_id, &raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn label_is_the_serial_number() {
        let raw = RawSpaPayload::new(json!({"_id": "spa-1", "serialNumber": "SN42"}));
        assert_eq!(
            DeviceDescriptor::from_dashboard("spa-1", &raw),
            DeviceDescriptor {
                id: "spa-1".to_string(),
                label: "SN42".to_string(),
            }
        );
    }

    #[test]
    fn label_falls_back_to_id() {
        let raw = RawSpaPayload::new(json!({"serialNumber": ""}));
        let device = DeviceDescriptor::from_dashboard("spa-9", &raw);
        assert_eq!(device.id, "spa-9");
        assert_eq!(device.label, "spa-9");
    }

    #[tokio::test]
    async fn unreachable_vendor_fails_login() {
        let mut pairing = PairingSession::new(HttpConfig::new().with_base_url("http://127.0.0.1:1"));
        assert!(!pairing.login("a@b.c", "p").await);
        assert!(pairing.list_devices().is_empty());
    }
}
