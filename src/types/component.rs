// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Physical spa components as reported in the dashboard payload.

use std::fmt;

/// Kind of physical sub-device.
///
/// Unknown kinds are preserved verbatim so that a firmware reporting new
/// component types does not break normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// Jet pump.
    Pump,
    /// Air blower.
    Blower,
    /// Light.
    Light,
    /// Circulation pump.
    CirculationPump,
    /// Heater.
    Heater,
    /// Ozone generator.
    Ozone,
    /// Filter cycle entry.
    Filter,
    /// Any type this library does not model.
    Other(String),
}

impl ComponentType {
    /// Parses the vendor `componentType` token.
    #[must_use]
    pub fn from_vendor(token: &str) -> Self {
        match token {
            "PUMP" => Self::Pump,
            "BLOWER" => Self::Blower,
            "LIGHT" => Self::Light,
            "CIRCULATION_PUMP" => Self::CirculationPump,
            "HEATER" => Self::Heater,
            "OZONE" => Self::Ozone,
            "FILTER" => Self::Filter,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the vendor token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pump => "PUMP",
            Self::Blower => "BLOWER",
            Self::Light => "LIGHT",
            Self::CirculationPump => "CIRCULATION_PUMP",
            Self::Heater => "HEATER",
            Self::Ozone => "OZONE",
            Self::Filter => "FILTER",
            Self::Other(token) => token,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the component list.
///
/// Components form an unordered list and a given `(type, port)` pair may be
/// absent on a particular unit, so lookups go through [`find_component`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Component kind.
    pub component_type: ComponentType,
    /// Port address, when the unit has several of the same kind.
    pub port: Option<String>,
    /// State token such as `"HIGH"`, `"LOW"`, `"ON"` or `"OFF"`.
    pub value: Option<String>,
}

impl Component {
    /// Creates a component entry.
    #[must_use]
    pub fn new(component_type: ComponentType, port: Option<&str>, value: Option<&str>) -> Self {
        Self {
            component_type,
            port: port.map(str::to_string),
            value: value.map(str::to_string),
        }
    }

    /// Returns `true` if the state token means "running".
    #[must_use]
    pub fn is_active(&self) -> bool {
        is_active_token(self.value.as_deref())
    }
}

/// Coerces a vendor state token to a boolean.
///
/// `"HIGH"` and `"ON"` are active; everything else, including a missing
/// token, is inactive.
#[must_use]
pub fn is_active_token(token: Option<&str>) -> bool {
    matches!(token, Some("HIGH" | "ON"))
}

/// Finds a component by type and, optionally, port.
///
/// With `port == None` the first component of the given type matches,
/// whatever its port.
#[must_use]
pub fn find_component<'a>(
    components: &'a [Component],
    component_type: &ComponentType,
    port: Option<&str>,
) -> Option<&'a Component> {
    components.iter().find(|c| {
        &c.component_type == component_type
            && port.is_none_or(|p| c.port.as_deref() == Some(p))
    })
}
