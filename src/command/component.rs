// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switchable component kinds and their on/off tokens.

use std::fmt;

use crate::types::ComponentType;

/// A component that accepts the generic component-state command.
///
/// # Examples
///
/// ```
/// use cmspa_lib::command::SwitchableComponent;
/// use cmspa_lib::types::ComponentType;
///
/// assert_eq!(SwitchableComponent::Jet.as_str(), "jet");
/// assert_eq!(SwitchableComponent::Jet.component_type(), ComponentType::Pump);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchableComponent {
    /// Light.
    Light,
    /// Jet pump.
    Jet,
    /// Air blower.
    Blower,
}

impl SwitchableComponent {
    /// Returns the `componentType` token used in command bodies.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Jet => "jet",
            Self::Blower => "blower",
        }
    }

    /// Returns the component type reported for it in the dashboard.
    #[must_use]
    pub const fn component_type(&self) -> ComponentType {
        match self {
            Self::Light => ComponentType::Light,
            Self::Jet => ComponentType::Pump,
            Self::Blower => ComponentType::Blower,
        }
    }
}

impl fmt::Display for SwitchableComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested state of a switchable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SwitchState {
    /// On, at the highest speed the component supports.
    High,
    /// Off.
    #[default]
    Off,
}

impl SwitchState {
    /// Returns the vendor token.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Off => "OFF",
        }
    }

    /// Returns `true` for [`SwitchState::High`].
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::High)
    }
}

impl From<bool> for SwitchState {
    fn from(on: bool) -> Self {
        if on { Self::High } else { Self::Off }
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
