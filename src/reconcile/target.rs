// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Displayed set point.
//!
//! The dashboard reports the set point twice: `desiredTemp` on the read path
//! and `targetDesiredTemp`, which carries the +0.4 °F offset of the write
//! path. The backend updates them independently, so right after a write one
//! of them may still hold the old value.

use crate::state::SpaState;
use crate::types::{SET_POINT_OFFSET_F, same_temperature};

/// Picks the set point to display, in vendor units (Fahrenheit).
///
/// `desiredTemp` is trusted when `targetDesiredTemp` agrees with it (equal
/// to it plus the write offset) or sits on the top of the high range or the
/// bottom of the low range, which happens while a range switch propagates.
/// Otherwise the write-path value minus the offset is used.
///
/// A dashboard without `targetDesiredTemp` falls back to `desiredTemp`.
///
/// # Examples
///
/// ```
/// use cmspa_lib::reconcile::derive_target_temperature;
/// use cmspa_lib::state::SpaState;
///
/// let state = SpaState {
///     desired_temp: Some(100.0),
///     target_desired_temp: Some(100.4),
///     ..SpaState::default()
/// };
/// assert_eq!(derive_target_temperature(&state), Some(100.0));
///
/// // The read path has not caught up with a write yet
/// let state = SpaState {
///     desired_temp: Some(100.0),
///     target_desired_temp: Some(102.4),
///     ..SpaState::default()
/// };
/// let target = derive_target_temperature(&state).unwrap();
/// assert!((target - 102.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn derive_target_temperature(state: &SpaState) -> Option<f64> {
    let Some(target) = state.target_desired_temp else {
        return state.desired_temp;
    };

    if let Some(desired) = state.desired_temp {
        let limits = &state.range_limits;
        let agrees = same_temperature(target, desired + SET_POINT_OFFSET_F);
        let on_range_edge = [limits.high_high, limits.low_low]
            .into_iter()
            .flatten()
            .any(|edge| same_temperature(target, edge));

        if agrees || on_range_edge {
            return Some(desired);
        }
    }

    Some(target - SET_POINT_OFFSET_F)
}
