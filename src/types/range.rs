// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature range selection and its bounds.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Which of the two set-point ranges the spa is operating in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TempRange {
    /// High range (normal soaking temperatures).
    #[default]
    High,
    /// Low range (economy / holiday temperatures).
    Low,
}

impl TempRange {
    /// Returns the vendor wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Low => "LOW",
        }
    }

    /// Maps the host's boolean "high range" capability to a range.
    #[must_use]
    pub const fn from_high(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }

    /// Returns `true` for [`TempRange::High`].
    #[must_use]
    pub const fn is_high(&self) -> bool {
        matches!(self, Self::High)
    }
}

impl fmt::Display for TempRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TempRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HIGH" => Ok(Self::High),
            "LOW" => Ok(Self::Low),
            other => Err(ValidationError::InvalidSetting(format!(
                "unknown temperature range {other}"
            ))),
        }
    }
}

/// Set-point bounds of both ranges, in vendor units (Fahrenheit).
///
/// Missing limits are `None`; a range whose bounds are unknown is never
/// applied to the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RangeLimits {
    /// Lowest set point in the high range.
    pub high_low: Option<f64>,
    /// Highest set point in the high range.
    pub high_high: Option<f64>,
    /// Lowest set point in the low range.
    pub low_low: Option<f64>,
    /// Highest set point in the low range.
    pub low_high: Option<f64>,
}

impl RangeLimits {
    /// Returns `(min, max)` for the given range, if both bounds are known.
    #[must_use]
    pub fn bounds(&self, range: TempRange) -> Option<(f64, f64)> {
        match range {
            TempRange::High => self.high_low.zip(self.high_high),
            TempRange::Low => self.low_low.zip(self.low_high),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_tokens() {
        assert_eq!("HIGH".parse::<TempRange>().unwrap(), TempRange::High);
        assert_eq!("LOW".parse::<TempRange>().unwrap(), TempRange::Low);
        assert!("MEDIUM".parse::<TempRange>().is_err());
        assert_eq!(TempRange::from_high(false).as_str(), "LOW");
    }

    #[test]
    fn bounds_per_range() {
        let limits = RangeLimits {
            high_low: Some(80.0),
            high_high: Some(104.0),
            low_low: Some(50.0),
            low_high: Some(99.0),
        };
        assert_eq!(limits.bounds(TempRange::High), Some((80.0, 104.0)));
        assert_eq!(limits.bounds(TempRange::Low), Some((50.0, 99.0)));
    }

    #[test]
    fn bounds_missing_half() {
        let limits = RangeLimits {
            high_low: Some(80.0),
            ..RangeLimits::default()
        };
        assert_eq!(limits.bounds(TempRange::High), None);
    }
}
