// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! When to push the operator's clock to the spa.

use std::fmt;

use crate::config::DeviceSettings;
use crate::types::{LocalClock, SpaClock};

/// Why a clock sync is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSyncReason {
    /// The spa reports no time, or one that cannot be read.
    TimeNotSet,
    /// The panel uses the other 12/24-hour format.
    FormatMismatch,
    /// The clocks differ by this many minutes.
    Drift(u32),
}

impl fmt::Display for ClockSyncReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeNotSet => f.write_str("spa clock not set"),
            Self::FormatMismatch => f.write_str("clock format differs"),
            Self::Drift(minutes) => write!(f, "clock drifted {minutes} min"),
        }
    }
}

/// Decides whether the spa clock needs a set-time command.
///
/// # Examples
///
/// ```
/// use cmspa_lib::reconcile::{ClockSyncPolicy, ClockSyncReason};
/// use cmspa_lib::types::{LocalClock, SpaClock, TimeOfDay};
/// use chrono::NaiveDate;
///
/// let policy = ClockSyncPolicy::new(true, true);
/// let local = LocalClock {
///     date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
///     time: TimeOfDay::new(12, 0).unwrap(),
/// };
/// let remote = SpaClock {
///     time: Some(TimeOfDay::new(12, 6).unwrap()),
///     time_not_set: false,
///     military: true,
/// };
/// assert_eq!(policy.evaluate(true, &remote, &local), Some(ClockSyncReason::Drift(6)));
/// assert_eq!(policy.evaluate(false, &remote, &local), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSyncPolicy {
    enabled: bool,
    use_24_hour_format: bool,
}

impl ClockSyncPolicy {
    /// Largest drift, in minutes, that is tolerated.
    pub const DRIFT_TOLERANCE_MINUTES: u32 = 5;

    /// Creates a policy.
    #[must_use]
    pub const fn new(enabled: bool, use_24_hour_format: bool) -> Self {
        Self {
            enabled,
            use_24_hour_format,
        }
    }

    /// Creates a policy from device settings.
    #[must_use]
    pub const fn from_settings(settings: &DeviceSettings) -> Self {
        Self::new(settings.clock_sync_enabled, settings.use_24_hour_format)
    }

    /// Returns `true` if clock sync is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the panel format to request.
    #[must_use]
    pub const fn use_24_hour_format(&self) -> bool {
        self.use_24_hour_format
    }

    /// Returns why the clock should be set, or `None` to leave it alone.
    ///
    /// Nothing is pushed to an offline spa or when sync is disabled. Drift is
    /// the plain difference of minutes since midnight; a pair of clocks on
    /// either side of midnight counts as far apart.
    #[must_use]
    pub fn evaluate(
        &self,
        online: bool,
        remote: &SpaClock,
        local: &LocalClock,
    ) -> Option<ClockSyncReason> {
        if !online || !self.enabled {
            return None;
        }
        let Some(remote_time) = remote.time.filter(|_| !remote.time_not_set) else {
            return Some(ClockSyncReason::TimeNotSet);
        };
        if remote.military != self.use_24_hour_format {
            return Some(ClockSyncReason::FormatMismatch);
        }

        let drift = (remote_time.minutes_since_midnight() - local.time.minutes_since_midnight())
            .unsigned_abs();
        (drift > Self::DRIFT_TOLERANCE_MINUTES).then_some(ClockSyncReason::Drift(drift))
    }

    /// Returns `true` if [`evaluate`](Self::evaluate) asks for a sync.
    #[must_use]
    pub fn should_sync(&self, online: bool, remote: &SpaClock, local: &LocalClock) -> bool {
        self.evaluate(online, remote, local).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeOfDay;
    use chrono::NaiveDate;

    fn local(hour: u8, minute: u8) -> LocalClock {
        LocalClock {
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            time: TimeOfDay::new(hour, minute).unwrap(),
        }
    }

    fn remote(hour: u8, minute: u8, military: bool) -> SpaClock {
        SpaClock {
            time: Some(TimeOfDay::new(hour, minute).unwrap()),
            time_not_set: false,
            military,
        }
    }

    #[test]
    fn drift_of_five_minutes_is_tolerated() {
        let policy = ClockSyncPolicy::new(true, true);
        assert!(!policy.should_sync(true, &remote(10, 5, true), &local(10, 0)));
        assert!(!policy.should_sync(true, &remote(9, 55, true), &local(10, 0)));
    }

    #[test]
    fn drift_of_six_minutes_triggers() {
        let policy = ClockSyncPolicy::new(true, true);
        assert_eq!(
            policy.evaluate(true, &remote(10, 6, true), &local(10, 0)),
            Some(ClockSyncReason::Drift(6))
        );
        assert_eq!(
            policy.evaluate(true, &remote(9, 54, true), &local(10, 0)),
            Some(ClockSyncReason::Drift(6))
        );
    }

    #[test]
    fn unset_clock_triggers_regardless_of_drift() {
        let policy = ClockSyncPolicy::new(true, true);
        let unset = SpaClock {
            time: None,
            time_not_set: true,
            military: true,
        };
        assert_eq!(
            policy.evaluate(true, &unset, &local(10, 0)),
            Some(ClockSyncReason::TimeNotSet)
        );

        // Flagged unset even though a stale time is still around
        let flagged = SpaClock {
            time_not_set: true,
            ..remote(10, 0, true)
        };
        assert!(policy.should_sync(true, &flagged, &local(10, 0)));
    }

    #[test]
    fn unreadable_time_counts_as_unset() {
        let policy = ClockSyncPolicy::new(true, true);
        let unreadable = SpaClock {
            time: None,
            time_not_set: false,
            military: true,
        };
        assert_eq!(
            policy.evaluate(true, &unreadable, &local(10, 0)),
            Some(ClockSyncReason::TimeNotSet)
        );
    }

    #[test]
    fn format_mismatch_triggers() {
        let policy = ClockSyncPolicy::new(true, false);
        assert_eq!(
            policy.evaluate(true, &remote(10, 0, true), &local(10, 0)),
            Some(ClockSyncReason::FormatMismatch)
        );
    }

    #[test]
    fn disabled_or_offline_never_syncs() {
        let unset = SpaClock {
            time_not_set: true,
            ..SpaClock::default()
        };
        assert!(!ClockSyncPolicy::new(false, true).should_sync(true, &unset, &local(1, 0)));
        assert!(!ClockSyncPolicy::new(true, true).should_sync(false, &unset, &local(1, 0)));
    }

    #[test]
    fn midnight_is_not_wrapped() {
        let policy = ClockSyncPolicy::new(true, true);
        assert_eq!(
            policy.evaluate(true, &remote(23, 58, true), &local(0, 1)),
            Some(ClockSyncReason::Drift(1437))
        );
    }
}
