// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Filter cycle schedule types.

use std::fmt;
use std::time::Duration;

use crate::error::ValidationError;

/// Length of a filter cycle, as the vendor's interval index.
///
/// Index `0` disables the cycle; each further step adds 15 minutes, up to
/// index `96` (24 hours).
///
/// # Examples
///
/// ```
/// use cmspa_lib::types::FilterInterval;
/// use std::time::Duration;
///
/// let two_hours = FilterInterval::new(8).unwrap();
/// assert_eq!(two_hours.duration(), Duration::from_secs(2 * 3600));
///
/// assert!(FilterInterval::new(97).is_err());
/// assert!(FilterInterval::DISABLED.is_disabled());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilterInterval(u8);

impl FilterInterval {
    /// Minutes per interval step.
    pub const STEP_MINUTES: u32 = 15;

    /// Disabled cycle.
    pub const DISABLED: Self = Self(0);

    /// Full-day cycle.
    pub const MAX: Self = Self(96);

    /// Creates an interval from the vendor index.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::OutOfRange` if the index exceeds 96.
    pub fn new(index: u8) -> Result<Self, ValidationError> {
        if index > Self::MAX.0 {
            return Err(ValidationError::OutOfRange {
                min: 0,
                max: u32::from(Self::MAX.0),
                actual: u32::from(index),
            });
        }
        Ok(Self(index))
    }

    /// Creates an interval from a duration that is a multiple of 15 minutes.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::OutOfRange` when the duration is longer than
    /// a day or not aligned to a 15 minute step.
    pub fn from_duration(duration: Duration) -> Result<Self, ValidationError> {
        let minutes = duration.as_secs() / 60;
        let step = u64::from(Self::STEP_MINUTES);
        let aligned = duration.as_secs() % (step * 60) == 0;
        match u8::try_from(minutes / step) {
            Ok(index) if aligned => Self::new(index),
            _ => Err(ValidationError::OutOfRange {
                min: 0,
                max: 24 * 60,
                actual: u32::try_from(minutes).unwrap_or(u32::MAX),
            }),
        }
    }

    /// Returns the vendor index.
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.0
    }

    /// Returns `true` if this interval disables the cycle.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.0 == 0
    }

    /// Returns the cycle length.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.0) * u64::from(Self::STEP_MINUTES) * 60)
    }
}

impl fmt::Display for FilterInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_disabled() {
            return f.write_str("disabled");
        }
        let minutes = u32::from(self.0) * Self::STEP_MINUTES;
        write!(f, "{}h{:02}m", minutes / 60, minutes % 60)
    }
}

impl TryFrom<u8> for FilterInterval {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_indices() {
        for index in 0..=96 {
            assert_eq!(FilterInterval::new(index).unwrap().index(), index);
        }
        assert!(FilterInterval::new(97).is_err());
    }

    #[test]
    fn from_duration_aligned() {
        let interval = FilterInterval::from_duration(Duration::from_secs(45 * 60)).unwrap();
        assert_eq!(interval.index(), 3);
        assert_eq!(
            FilterInterval::from_duration(Duration::from_secs(24 * 3600)).unwrap(),
            FilterInterval::MAX
        );
    }

    #[test]
    fn from_duration_rejects_misaligned_or_long() {
        assert!(FilterInterval::from_duration(Duration::from_secs(20 * 60)).is_err());
        assert!(FilterInterval::from_duration(Duration::from_secs(25 * 3600)).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(FilterInterval::DISABLED.to_string(), "disabled");
        assert_eq!(FilterInterval::new(5).unwrap().to_string(), "1h15m");
        assert_eq!(FilterInterval::MAX.to_string(), "24h00m");
    }
}
