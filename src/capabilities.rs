// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-visible capabilities of a spa.
//!
//! A capability is a property the host exposes to the user, identified by a
//! string key. Some of them only make sense when the spa has the matching
//! physical component (a third jet pump, an ozone generator); those are
//! bound to a component type and port and are advertised only when the
//! dashboard reports that component.
//!
//! Boolean capabilities have a change trigger named after the key, with
//! dots replaced by underscores (`action_pump_state.1` fires
//! `action_pump_state_1_changed`).

use std::fmt;
use std::str::FromStr;

use crate::command::SwitchableComponent;
use crate::error::ValidationError;
use crate::types::{ComponentType, same_temperature};

/// Kind of value a capability holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `true` / `false`.
    Bool,
    /// A number, in Celsius for temperatures.
    Number,
    /// A vendor token such as `READY` or `HIGH`.
    Text,
}

/// A capability value.
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityValue {
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
}

impl CapabilityValue {
    /// Returns the boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number, if this is one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text, if this is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Compares two values, treating numbers within float noise as equal.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => same_temperature(*a, *b),
            _ => self == other,
        }
    }

    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Number(_) => ValueKind::Number,
            Self::Text(_) => ValueKind::Text,
        }
    }
}

impl fmt::Display for CapabilityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for CapabilityValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for CapabilityValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for CapabilityValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CapabilityValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// The physical component a capability depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentBinding {
    /// Component type to look for.
    pub component_type: ComponentType,
    /// Required port, or `None` to accept any.
    pub port: Option<&'static str>,
}

/// A capability exposed to the host.
///
/// # Examples
///
/// ```
/// use cmspa_lib::Capability;
///
/// let cap: Capability = "action_pump_state.1".parse().unwrap();
/// assert_eq!(cap, Capability::Pump1);
/// assert_eq!(cap.trigger_id().as_deref(), Some("action_pump_state_1_changed"));
/// assert!(cap.binding().is_some());
///
/// assert!(Capability::TargetTemperature.is_roundable());
/// assert!(Capability::TargetTemperature.trigger_id().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Target water temperature (°C).
    TargetTemperature,
    /// Current water temperature (°C).
    MeasureTemperature,
    /// Control panel locked.
    Locked,
    /// First jet pump running.
    Pump0,
    /// Second jet pump running.
    Pump1,
    /// Third jet pump running.
    Pump2,
    /// First blower running.
    Blower0,
    /// Second blower running.
    Blower1,
    /// Third blower running.
    Blower2,
    /// Light on.
    Light,
    /// Heater mode is `READY` (as opposed to `REST`).
    HeaterReady,
    /// Temperature range is `HIGH` (as opposed to `LOW`).
    TempRangeHigh,
    /// Temperature range token.
    TempRange,
    /// Heater mode token.
    HeaterMode,
    /// Spa connected to the vendor cloud.
    Online,
    /// Heater component state token.
    Heater,
    /// Circulation pump state token.
    CirculationPump,
    /// Ozone generator state token.
    Ozone,
}

impl Capability {
    /// Every capability, in application order.
    pub const ALL: [Self; 18] = [
        Self::Pump0,
        Self::Pump1,
        Self::Pump2,
        Self::Blower0,
        Self::Blower1,
        Self::Blower2,
        Self::Heater,
        Self::CirculationPump,
        Self::Ozone,
        Self::Locked,
        Self::Light,
        Self::HeaterReady,
        Self::TempRangeHigh,
        Self::TempRange,
        Self::HeaterMode,
        Self::Online,
        Self::MeasureTemperature,
        Self::TargetTemperature,
    ];

    /// Returns the host key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::TargetTemperature => "target_temperature",
            Self::MeasureTemperature => "measure_temperature",
            Self::Locked => "locked",
            Self::Pump0 => "action_pump_state",
            Self::Pump1 => "action_pump_state.1",
            Self::Pump2 => "action_pump_state.2",
            Self::Blower0 => "action_blower_state",
            Self::Blower1 => "action_blower_state.1",
            Self::Blower2 => "action_blower_state.2",
            Self::Light => "action_light_state",
            Self::HeaterReady => "action_heater_mode",
            Self::TempRangeHigh => "action_temp_range",
            Self::TempRange => "measure_temperature_range",
            Self::HeaterMode => "measure_heater_mode",
            Self::Online => "measure_online",
            Self::Heater => "measure_heater",
            Self::CirculationPump => "measure_circulation_pump",
            Self::Ozone => "measure_ozone",
        }
    }

    /// Looks a capability up by its host key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Returns the kind of value this capability holds.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::TargetTemperature | Self::MeasureTemperature => ValueKind::Number,
            Self::TempRange
            | Self::HeaterMode
            | Self::Heater
            | Self::CirculationPump
            | Self::Ozone => ValueKind::Text,
            _ => ValueKind::Bool,
        }
    }

    /// Returns the component this capability depends on, if any.
    #[must_use]
    pub fn binding(&self) -> Option<ComponentBinding> {
        let (component_type, port) = match self {
            Self::Pump0 => (ComponentType::Pump, Some("0")),
            Self::Pump1 => (ComponentType::Pump, Some("1")),
            Self::Pump2 => (ComponentType::Pump, Some("2")),
            Self::Blower0 => (ComponentType::Blower, Some("0")),
            Self::Blower1 => (ComponentType::Blower, Some("1")),
            Self::Blower2 => (ComponentType::Blower, Some("2")),
            Self::Heater => (ComponentType::Heater, None),
            Self::CirculationPump => (ComponentType::CirculationPump, None),
            Self::Ozone => (ComponentType::Ozone, None),
            _ => return None,
        };
        Some(ComponentBinding {
            component_type,
            port,
        })
    }

    /// Returns the component command target behind a switch capability.
    #[must_use]
    pub const fn switch_target(&self) -> Option<(SwitchableComponent, u8)> {
        match self {
            Self::Pump0 => Some((SwitchableComponent::Jet, 0)),
            Self::Pump1 => Some((SwitchableComponent::Jet, 1)),
            Self::Pump2 => Some((SwitchableComponent::Jet, 2)),
            Self::Blower0 => Some((SwitchableComponent::Blower, 0)),
            Self::Blower1 => Some((SwitchableComponent::Blower, 1)),
            Self::Blower2 => Some((SwitchableComponent::Blower, 2)),
            Self::Light => Some((SwitchableComponent::Light, 0)),
            _ => None,
        }
    }

    /// Returns `true` if value changes fire a trigger.
    #[must_use]
    pub const fn has_change_trigger(&self) -> bool {
        matches!(self.kind(), ValueKind::Bool)
    }

    /// Returns the trigger id fired on change, e.g. `locked_changed`.
    #[must_use]
    pub fn trigger_id(&self) -> Option<String> {
        self.has_change_trigger()
            .then(|| format!("{}_changed", self.key().replace('.', "_")))
    }

    /// Returns `true` if the value is rounded when rounding is enabled.
    #[must_use]
    pub const fn is_roundable(&self) -> bool {
        matches!(self, Self::TargetTemperature | Self::MeasureTemperature)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Capability {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| ValidationError::NotControllable(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique_and_round_trip() {
        let keys: HashSet<_> = Capability::ALL.iter().map(Capability::key).collect();
        assert_eq!(keys.len(), Capability::ALL.len());
        for cap in Capability::ALL {
            assert_eq!(Capability::from_key(cap.key()), Some(cap));
        }
        assert!(Capability::from_key("onoff").is_none());
    }

    #[test]
    fn pumps_bind_to_ports() {
        let binding = Capability::Pump2.binding().unwrap();
        assert_eq!(binding.component_type, ComponentType::Pump);
        assert_eq!(binding.port, Some("2"));

        let binding = Capability::Ozone.binding().unwrap();
        assert_eq!(binding.port, None);

        assert!(Capability::Locked.binding().is_none());
        assert!(Capability::Light.binding().is_none());
    }

    #[test]
    fn only_booleans_have_triggers() {
        assert_eq!(
            Capability::Blower1.trigger_id().as_deref(),
            Some("action_blower_state_1_changed")
        );
        assert_eq!(
            Capability::Locked.trigger_id().as_deref(),
            Some("locked_changed")
        );
        assert!(Capability::HeaterMode.trigger_id().is_none());
        assert!(Capability::MeasureTemperature.trigger_id().is_none());
    }

    #[test]
    fn switch_targets() {
        assert_eq!(
            Capability::Pump1.switch_target(),
            Some((SwitchableComponent::Jet, 1))
        );
        assert_eq!(
            Capability::Light.switch_target(),
            Some((SwitchableComponent::Light, 0))
        );
        assert!(Capability::Locked.switch_target().is_none());
    }

    #[test]
    fn value_comparison_tolerates_float_noise() {
        let a = CapabilityValue::Number(37.8);
        let b = CapabilityValue::Number(37.800_000_000_000_004);
        assert!(a.same_as(&b));
        assert!(!a.same_as(&CapabilityValue::Number(37.9)));
        assert!(!CapabilityValue::Bool(true).same_as(&CapabilityValue::Text("true".into())));
    }

    #[test]
    fn unknown_key_parse_error() {
        assert!(matches!(
            "action_update_data".parse::<Capability>(),
            Err(ValidationError::NotControllable(_))
        ));
    }
}
