// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical spa state and its normalization from vendor payloads.
//!
//! [`normalize`] is a pure function: it reads a
//! [`RawSpaPayload`](crate::response::RawSpaPayload) and returns a fresh
//! [`SpaState`]. States are never mutated; each fetch supersedes the last.

mod normalizer;
mod spa_state;

pub use normalizer::normalize;
pub use spa_state::SpaState;
