// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Login response parsing.

use serde::Deserialize;

/// `data` member of a successful `/auth/login` response.
///
/// The vendor does not return an expiry; see
/// [`HttpConfig::with_token_ttl`](crate::protocol::HttpConfig::with_token_ttl).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    /// Bearer token for subsequent calls.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl LoginData {
    /// Returns the token if it is present and non-empty.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_access_token() {
        let data: LoginData = serde_json::from_str(r#"{"accessToken":"abc"}"#).unwrap();
        assert_eq!(data.token(), Some("abc"));
    }

    #[test]
    fn empty_token_is_absent() {
        let data: LoginData = serde_json::from_str(r#"{"accessToken":""}"#).unwrap();
        assert_eq!(data.token(), None);
        let data: LoginData = serde_json::from_str("{}").unwrap();
        assert_eq!(data.token(), None);
    }
}
