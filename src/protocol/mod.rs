// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport and session handling for the vendor cloud API.
//!
//! - [`HttpClient`]: TLS transport adding the vendor's standard headers
//! - [`AuthSession`]: bearer-token lifecycle with single-flight renewal

mod auth;
mod http;

pub use auth::{AuthSession, AuthToken, Credentials};
pub use http::{HttpClient, HttpConfig, HttpResponse};
