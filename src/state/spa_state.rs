// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical spa state.

use crate::types::{
    Component, ComponentType, HeaterMode, RangeLimits, SpaClock, TempRange, find_component,
};

/// Immutable snapshot of the spa, produced fresh from every dashboard fetch.
///
/// Temperatures are in vendor units (Fahrenheit). Every field tolerates a
/// missing or malformed source value: numbers become `None`, flags become
/// `false`, the component list becomes empty.
///
/// # Examples
///
/// ```
/// use cmspa_lib::response::RawSpaPayload;
/// use cmspa_lib::state::normalize;
///
/// let raw = RawSpaPayload::new(serde_json::json!({
///     "currentTemp": "99,5",
///     "isOnline": true,
/// }));
/// let state = normalize(&raw);
/// assert_eq!(state.current_temp, Some(99.5));
/// assert!(state.online);
/// assert!(state.clock.time_not_set);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpaState {
    /// Set point as reported on the read path.
    pub desired_temp: Option<f64>,
    /// Set point as last written (carries the +0.4 °F write offset).
    pub target_desired_temp: Option<f64>,
    /// Measured water temperature.
    pub current_temp: Option<f64>,
    /// Whether the topside panel is locked.
    pub panel_locked: bool,
    /// Heater mode, if the reported token is one of the known modes.
    pub heater_mode: Option<HeaterMode>,
    /// Active set-point range.
    pub temp_range: Option<TempRange>,
    /// Whether the controller is connected to the vendor cloud.
    pub online: bool,
    /// Unordered list of physical components, passed through unfiltered.
    pub components: Vec<Component>,
    /// Bounds of both set-point ranges.
    pub range_limits: RangeLimits,
    /// Spa clock fields.
    pub clock: SpaClock,
}

impl SpaState {
    /// Finds a component by type and optional port.
    #[must_use]
    pub fn component(
        &self,
        component_type: &ComponentType,
        port: Option<&str>,
    ) -> Option<&Component> {
        find_component(&self.components, component_type, port)
    }

    /// Returns `true` if the first light component is on.
    #[must_use]
    pub fn light_on(&self) -> bool {
        self.component(&ComponentType::Light, None)
            .is_some_and(Component::is_active)
    }

    /// Bounds of the active range, if both the range and its limits are known.
    #[must_use]
    pub fn active_range_bounds(&self) -> Option<(f64, f64)> {
        self.temp_range.and_then(|r| self.range_limits.bounds(r))
    }
}
