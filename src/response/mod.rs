// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vendor response bodies.
//!
//! Every vendor endpoint wraps its payload in an envelope of the form
//! `{"message": "...", "data": {...}}`. Only the `data` member carries state;
//! a 200 response without it is treated as malformed.

mod dashboard;
mod login;
mod profile;

pub use dashboard::RawSpaPayload;
pub use login::LoginData;
pub use profile::{ProfileData, UserInfo};

use serde::Deserialize;
use serde::de::DeserializeOwned;

/// The outer `{message, data}` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Free-form status message from the vendor.
    #[serde(default)]
    pub message: Option<String>,
    /// The payload, absent on some failures.
    pub data: Option<T>,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Parses an envelope from a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the underlying JSON error if the body does not match.
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_with_data() {
        let env: Envelope<serde_json::Value> =
            Envelope::from_body(r#"{"message":"ok","data":{"a":1}}"#).unwrap();
        assert_eq!(env.message.as_deref(), Some("ok"));
        assert_eq!(env.data.unwrap()["a"], 1);
    }

    #[test]
    fn envelope_without_data() {
        let env: Envelope<serde_json::Value> =
            Envelope::from_body(r#"{"message":"accepted"}"#).unwrap();
        assert!(env.data.is_none());
    }
}
