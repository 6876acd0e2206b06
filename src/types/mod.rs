// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by commands, normalized state and reconciliation.

mod clock;
mod component;
mod filter;
mod heater;
mod range;
mod temperature;

pub use clock::{LocalClock, SpaClock, TimeOfDay};
pub use component::{Component, ComponentType, find_component, is_active_token};
pub use filter::FilterInterval;
pub use heater::HeaterMode;
pub use range::{RangeLimits, TempRange};
pub use temperature::{
    SET_POINT_OFFSET_F, celsius_to_fahrenheit, decimal_from_json, fahrenheit_to_celsius,
    parse_decimal, same_temperature,
};
