// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User profile response parsing.

use serde::Deserialize;

/// `data` member of `/user-management/profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileData {
    /// The logged-in user, absent on malformed responses.
    #[serde(default)]
    pub user: Option<UserInfo>,
}

/// The account the client is logged in as.
///
/// The interesting field is [`spa_id`](Self::spa_id): the spa controlled by
/// this account, used in every dashboard and command call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// Vendor user id.
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    /// Account email.
    #[serde(default)]
    pub email: Option<String>,
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Identifier of the spa linked to this account.
    #[serde(default)]
    pub spa_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_profile() {
        let json = r#"{"user":{"_id":"u1","email":"a@b.c","firstName":"Ann","spaId":"spa-9"}}"#;
        let data: ProfileData = serde_json::from_str(json).unwrap();
        let user = data.user.unwrap();
        assert_eq!(user.id.as_deref(), Some("u1"));
        assert_eq!(user.first_name.as_deref(), Some("Ann"));
        assert_eq!(user.spa_id.as_deref(), Some("spa-9"));
        assert_eq!(user.last_name, None);
    }
}
