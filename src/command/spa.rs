// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The vendor's command surface as a single enum.

use serde_json::{Value, json};

use crate::command::Command;
use crate::command::component::{SwitchState, SwitchableComponent};
use crate::error::ValidationError;
use crate::types::{
    FilterInterval, HeaterMode, LocalClock, SET_POINT_OFFSET_F, TempRange, TimeOfDay,
    celsius_to_fahrenheit,
};

/// Channel reported to the vendor for every command.
const VIA: &str = "MOBILE";

/// A control command for one spa.
///
/// # Examples
///
/// ```
/// use cmspa_lib::command::{Command, SpaCommand, SwitchState, SwitchableComponent};
///
/// let cmd = SpaCommand::SetComponentState {
///     component: SwitchableComponent::Jet,
///     device_number: 1,
///     state: SwitchState::High,
/// };
/// assert_eq!(cmd.path(), "/spa-commands/component-state");
///
/// let body = cmd.body("spa-1");
/// assert_eq!(body["componentType"], "jet");
/// assert_eq!(body["state"], "HIGH");
/// assert_eq!(body["via"], "MOBILE");
///
/// // Heater modes are checked before anything is sent
/// assert!(SpaCommand::heater_mode("ECO").is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SpaCommand {
    /// Set the target temperature, in the vendor's write-path Fahrenheit.
    SetTemperature {
        /// Value sent as-is in the `value` field.
        fahrenheit: f64,
    },
    /// Switch between the high and low temperature ranges.
    SetTemperatureRange(TempRange),
    /// Lock or unlock the physical control panel.
    SetPanelLock {
        /// `true` to lock.
        locked: bool,
    },
    /// Switch a light, jet or blower.
    SetComponentState {
        /// Which kind of component.
        component: SwitchableComponent,
        /// Zero-based device index among components of that kind.
        device_number: u8,
        /// Requested state.
        state: SwitchState,
    },
    /// Set the heater mode.
    SetHeaterMode(HeaterMode),
    /// Schedule a filter cycle.
    SetFilterCycle {
        /// Zero-based filter index; 0 is the primary filter.
        device_number: u8,
        /// Cycle length.
        interval: FilterInterval,
        /// Start time.
        start: TimeOfDay,
    },
    /// Set the spa clock.
    SetTime {
        /// Date and time to set.
        clock: LocalClock,
        /// `true` for a 24-hour panel display.
        military: bool,
    },
}

impl SpaCommand {
    /// Builds a temperature command from a Celsius set point.
    ///
    /// The value is converted to Fahrenheit and offset by
    /// [`SET_POINT_OFFSET_F`], the same shift the vendor's own app applies on
    /// the write path. The result is kept to one decimal.
    #[must_use]
    pub fn temperature_celsius(celsius: f64) -> Self {
        let fahrenheit = celsius_to_fahrenheit(celsius) + SET_POINT_OFFSET_F;
        Self::SetTemperature {
            fahrenheit: (fahrenheit * 10.0).round() / 10.0,
        }
    }

    /// Builds a heater-mode command from its vendor token.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidHeaterMode`] for anything other than
    /// `READY` or `REST`.
    pub fn heater_mode(mode: &str) -> Result<Self, ValidationError> {
        Ok(Self::SetHeaterMode(mode.parse()?))
    }

    /// Builds a component-state command.
    #[must_use]
    pub fn component(component: SwitchableComponent, device_number: u8, on: bool) -> Self {
        Self::SetComponentState {
            component,
            device_number,
            state: SwitchState::from(on),
        }
    }
}

impl Command for SpaCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::SetTemperature { .. } => "set-temperature",
            Self::SetTemperatureRange(_) => "set-temperature-range",
            Self::SetPanelLock { .. } => "set-panel-lock",
            Self::SetComponentState { .. } => "set-component-state",
            Self::SetHeaterMode(_) => "set-heater-mode",
            Self::SetFilterCycle { .. } => "set-filter-cycle",
            Self::SetTime { .. } => "set-time",
        }
    }

    fn path(&self) -> &'static str {
        match self {
            Self::SetTemperature { .. } => "/spa-commands/temperature/value",
            Self::SetTemperatureRange(_) => "/spa-commands/temperature/range",
            Self::SetPanelLock { .. } => "/spa-commands/panel/state",
            Self::SetComponentState { .. } => "/spa-commands/component-state",
            Self::SetHeaterMode(_) => "/spa-commands/temperature/heater-mode",
            Self::SetFilterCycle { .. } => "/spa-commands/filter-cycles/schedule",
            Self::SetTime { .. } => "/spa-commands/time",
        }
    }

    fn body(&self, spa_id: &str) -> Value {
        let mut body = match self {
            Self::SetTemperature { fahrenheit } => json!({ "value": fahrenheit }),
            Self::SetTemperatureRange(range) => json!({ "range": range.as_str() }),
            Self::SetPanelLock { locked } => json!({
                "state": if *locked { "LOCK_PANEL" } else { "UNLOCK_PANEL" },
            }),
            Self::SetComponentState {
                component,
                device_number,
                state,
            } => json!({
                "deviceNumber": device_number,
                "state": state.as_str(),
                "componentType": component.as_str(),
            }),
            Self::SetHeaterMode(mode) => json!({ "mode": mode.as_str() }),
            Self::SetFilterCycle {
                device_number,
                interval,
                start,
            } => json!({
                "deviceNumber": device_number,
                "numOfIntervals": interval.index(),
                "time": start.to_string(),
            }),
            Self::SetTime { clock, military } => json!({
                "date": clock.vendor_date(),
                "time": clock.time.to_string(),
                "isMilitaryFormat": military,
            }),
        };

        if let Value::Object(map) = &mut body {
            map.insert("spaId".to_string(), Value::String(spa_id.to_string()));
            map.insert("via".to_string(), Value::String(VIA.to_string()));
        }
        body
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::SetFilterCycle {
                device_number: 0,
                interval,
                ..
            } if interval.is_disabled() => Err(ValidationError::PrimaryFilterDisabled),
            Self::SetTemperature { fahrenheit } if !fahrenheit.is_finite() => Err(
                ValidationError::InvalidSetting(format!("temperature {fahrenheit} is not finite")),
            ),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn temperature_offsets_write_path() {
        let cmd = SpaCommand::temperature_celsius(38.0);
        assert_eq!(cmd, SpaCommand::SetTemperature { fahrenheit: 100.8 });
        let body = cmd.body("abc");
        assert_eq!(body["value"], 100.8);
        assert_eq!(body["spaId"], "abc");
        assert_eq!(body["via"], "MOBILE");
    }

    #[test]
    fn range_and_lock_bodies() {
        let range = SpaCommand::SetTemperatureRange(TempRange::Low);
        assert_eq!(range.path(), "/spa-commands/temperature/range");
        assert_eq!(range.body("s")["range"], "LOW");

        let lock = SpaCommand::SetPanelLock { locked: true };
        assert_eq!(lock.path(), "/spa-commands/panel/state");
        assert_eq!(lock.body("s")["state"], "LOCK_PANEL");
        let unlock = SpaCommand::SetPanelLock { locked: false };
        assert_eq!(unlock.body("s")["state"], "UNLOCK_PANEL");
    }

    #[test]
    fn component_body() {
        let cmd = SpaCommand::component(SwitchableComponent::Blower, 2, false);
        let body = cmd.body("s");
        assert_eq!(body["deviceNumber"], 2);
        assert_eq!(body["state"], "OFF");
        assert_eq!(body["componentType"], "blower");
    }

    #[test]
    fn heater_mode_rejects_unknown_token() {
        assert_eq!(
            SpaCommand::heater_mode("REST").unwrap(),
            SpaCommand::SetHeaterMode(HeaterMode::Rest)
        );
        assert!(matches!(
            SpaCommand::heater_mode("ECO"),
            Err(ValidationError::InvalidHeaterMode(_))
        ));
        assert!(SpaCommand::heater_mode("ready").is_err());
    }

    #[test]
    fn primary_filter_cannot_be_disabled() {
        let cmd = SpaCommand::SetFilterCycle {
            device_number: 0,
            interval: FilterInterval::DISABLED,
            start: TimeOfDay::new(8, 0).unwrap(),
        };
        assert_eq!(cmd.validate(), Err(ValidationError::PrimaryFilterDisabled));
    }

    #[test]
    fn secondary_filter_can_be_disabled() {
        let cmd = SpaCommand::SetFilterCycle {
            device_number: 1,
            interval: FilterInterval::DISABLED,
            start: TimeOfDay::new(20, 30).unwrap(),
        };
        assert!(cmd.validate().is_ok());
        let body = cmd.body("s");
        assert_eq!(body["numOfIntervals"], 0);
        assert_eq!(body["time"], "20:30");
    }

    #[test]
    fn primary_filter_with_interval_is_valid() {
        let cmd = SpaCommand::SetFilterCycle {
            device_number: 0,
            interval: FilterInterval::new(8).unwrap(),
            start: TimeOfDay::new(2, 0).unwrap(),
        };
        assert!(cmd.validate().is_ok());
        assert_eq!(cmd.body("s")["numOfIntervals"], 8);
    }

    #[test]
    fn set_time_body() {
        let cmd = SpaCommand::SetTime {
            clock: LocalClock {
                date: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
                time: TimeOfDay::new(6, 5).unwrap(),
            },
            military: true,
        };
        let body = cmd.body("s");
        assert_eq!(body["date"], "03/07/2025");
        assert_eq!(body["time"], "06:05");
        assert_eq!(body["isMilitaryFormat"], true);
        assert_eq!(cmd.path(), "/spa-commands/time");
    }

    #[test]
    fn non_finite_temperature_is_rejected() {
        let cmd = SpaCommand::SetTemperature {
            fahrenheit: f64::NAN,
        };
        assert!(cmd.validate().is_err());
    }
}
