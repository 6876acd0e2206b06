// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Time-of-day types for the spa clock and the operator's wall clock.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::ValidationError;

/// A wall-clock time of day with minute resolution.
///
/// Parsed from and rendered as `HH:MM` (24-hour), the format used by the
/// vendor for both the spa clock and filter cycle start times.
///
/// # Examples
///
/// ```
/// use cmspa_lib::types::TimeOfDay;
///
/// let t: TimeOfDay = "07:45".parse().unwrap();
/// assert_eq!(t.minutes_since_midnight(), 7 * 60 + 45);
/// assert_eq!(t.to_string(), "07:45");
/// assert!("24:00".parse::<TimeOfDay>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Creates a time of day.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidTime` if hour > 23 or minute > 59.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ValidationError::InvalidTime(format!("{hour}:{minute}")));
        }
        Ok(Self { hour, minute })
    }

    /// Returns the hour (0-23).
    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    /// Returns the minute (0-59).
    #[must_use]
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    /// Returns minutes elapsed since midnight.
    #[must_use]
    pub fn minutes_since_midnight(&self) -> i32 {
        i32::from(self.hour) * 60 + i32::from(self.minute)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour = hour.trim().parse::<u8>().map_err(|_| invalid())?;
        let minute = minute.trim().parse::<u8>().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

/// Clock fields reported by the spa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpaClock {
    /// Time shown on the spa panel, if the clock has been set.
    pub time: Option<TimeOfDay>,
    /// `true` when the payload carried no time at all.
    pub time_not_set: bool,
    /// `true` when the panel uses a 24-hour display.
    pub military: bool,
}

impl SpaClock {
    /// Hour on the spa clock.
    #[must_use]
    pub fn hour(&self) -> Option<u8> {
        self.time.map(|t| t.hour())
    }

    /// Minute on the spa clock.
    #[must_use]
    pub fn minute(&self) -> Option<u8> {
        self.time.map(|t| t.minute())
    }
}

/// The operator's wall clock, resolved in their configured time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
    /// Calendar date in the operator's zone.
    pub date: NaiveDate,
    /// Time of day in the operator's zone.
    pub time: TimeOfDay,
}

impl LocalClock {
    /// Reads the current wall clock in the given zone.
    #[must_use]
    pub fn now_in(zone: Tz) -> Self {
        Self::at(Utc::now(), zone)
    }

    /// Resolves an instant in the given zone.
    #[must_use]
    pub fn at(instant: DateTime<Utc>, zone: Tz) -> Self {
        let local = zone.from_utc_datetime(&instant.naive_utc());
        // chrono guarantees hour < 24 and minute < 60
        #[allow(clippy::cast_possible_truncation)]
        let time = TimeOfDay {
            hour: local.hour() as u8,
            minute: local.minute() as u8,
        };
        Self {
            date: local.date_naive(),
            time,
        }
    }

    /// Date formatted the way the vendor expects it (`MM/DD/YYYY`).
    #[must_use]
    pub fn vendor_date(&self) -> String {
        self.date.format("%m/%d/%Y").to_string()
    }
}
