// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heater mode type.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Heater mode of the spa.
///
/// The vendor only accepts `READY` (keep water at the set point) and `REST`
/// (heat only during filter cycles). Any other value is rejected before a
/// request is built.
///
/// # Examples
///
/// ```
/// use cmspa_lib::types::HeaterMode;
///
/// let mode: HeaterMode = "READY".parse().unwrap();
/// assert_eq!(mode, HeaterMode::Ready);
/// assert!("ECO".parse::<HeaterMode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeaterMode {
    /// Heater keeps the water at the desired temperature.
    #[default]
    Ready,
    /// Heater only runs during filter cycles.
    Rest,
}

impl HeaterMode {
    /// Returns the vendor wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Rest => "REST",
        }
    }

    /// Maps the host's boolean "heater ready" capability to a mode.
    #[must_use]
    pub const fn from_ready(ready: bool) -> Self {
        if ready { Self::Ready } else { Self::Rest }
    }

    /// Returns `true` for [`HeaterMode::Ready`].
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for HeaterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaterMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READY" => Ok(Self::Ready),
            "REST" => Ok(Self::Rest),
            other => Err(ValidationError::InvalidHeaterMode(other.to_string())),
        }
    }
}
