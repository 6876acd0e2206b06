// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User-configurable device settings.

use std::time::Duration;

use chrono_tz::Tz;

use crate::error::ValidationError;

/// Settings the host exposes to the user for one spa.
///
/// # Examples
///
/// ```
/// use cmspa_lib::DeviceSettings;
/// use std::time::Duration;
///
/// let settings = DeviceSettings::new()
///     .with_poll_interval(Duration::from_secs(30))
///     .with_clock_sync(true)
///     .with_time_zone(chrono_tz::Europe::Helsinki);
/// assert!(settings.validate().is_ok());
///
/// let bad = DeviceSettings::new().with_poll_interval(Duration::ZERO);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
// Independent user toggles; they do not form a state machine.
#[allow(clippy::struct_excessive_bools)]
pub struct DeviceSettings {
    /// Time between two polls.
    pub poll_interval: Duration,
    /// Push the operator's wall clock to the spa when it drifts.
    pub clock_sync_enabled: bool,
    /// Clock format the spa panel should use.
    pub use_24_hour_format: bool,
    /// Round temperatures to whole degrees.
    pub round_temperature: bool,
    /// Operator's time zone, used for clock sync.
    pub time_zone: Tz,
}

impl DeviceSettings {
    /// Default poll interval.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
    /// Shortest accepted poll interval.
    pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

    /// Creates settings with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            clock_sync_enabled: false,
            use_24_hour_format: true,
            round_temperature: false,
            time_zone: chrono_tz::UTC,
        }
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Enables or disables clock sync.
    #[must_use]
    pub fn with_clock_sync(mut self, enabled: bool) -> Self {
        self.clock_sync_enabled = enabled;
        self
    }

    /// Selects the 24-hour (`true`) or 12-hour panel clock.
    #[must_use]
    pub fn with_24_hour_format(mut self, enabled: bool) -> Self {
        self.use_24_hour_format = enabled;
        self
    }

    /// Enables or disables temperature rounding.
    #[must_use]
    pub fn with_round_temperature(mut self, enabled: bool) -> Self {
        self.round_temperature = enabled;
        self
    }

    /// Sets the operator's time zone.
    #[must_use]
    pub fn with_time_zone(mut self, zone: Tz) -> Self {
        self.time_zone = zone;
        self
    }

    /// Parses and sets the time zone from an IANA name.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidSetting` for an unknown zone.
    pub fn with_time_zone_name(self, name: &str) -> Result<Self, ValidationError> {
        let zone = name
            .parse::<Tz>()
            .map_err(|_| ValidationError::InvalidSetting(format!("unknown time zone {name}")))?;
        Ok(self.with_time_zone(zone))
    }

    /// Checks the settings.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidSetting` if the poll interval is
    /// shorter than one second.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.poll_interval < Self::MIN_POLL_INTERVAL {
            return Err(ValidationError::InvalidSetting(format!(
                "poll interval {:?} is shorter than {:?}",
                self.poll_interval,
                Self::MIN_POLL_INTERVAL
            )));
        }
        Ok(())
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self::new()
    }
}
