// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spa control commands.
//!
//! Every command is a JSON `POST` to a fixed path under `/spa-commands`,
//! carrying the spa id and a `via` marker alongside its own fields.
//!
//! # Available Commands
//!
//! | Variant | Path | Fields |
//! |---------|------|--------|
//! | [`SpaCommand::SetTemperature`] | `temperature/value` | `value` |
//! | [`SpaCommand::SetTemperatureRange`] | `temperature/range` | `range` |
//! | [`SpaCommand::SetPanelLock`] | `panel/state` | `state` |
//! | [`SpaCommand::SetComponentState`] | `component-state` | `deviceNumber`, `state`, `componentType` |
//! | [`SpaCommand::SetHeaterMode`] | `temperature/heater-mode` | `mode` |
//! | [`SpaCommand::SetFilterCycle`] | `filter-cycles/schedule` | `deviceNumber`, `numOfIntervals`, `time` |
//! | [`SpaCommand::SetTime`] | `time` | `date`, `time`, `isMilitaryFormat` |
//!
//! # Examples
//!
//! ```
//! use cmspa_lib::command::{Command, SpaCommand};
//! use cmspa_lib::types::TempRange;
//!
//! let cmd = SpaCommand::SetTemperatureRange(TempRange::High);
//! assert_eq!(cmd.name(), "set-temperature-range");
//! assert_eq!(cmd.body("spa-1")["range"], "HIGH");
//! ```

mod component;
mod spa;

pub use component::{SwitchState, SwitchableComponent};
pub use spa::SpaCommand;

use serde_json::Value;

use crate::error::ValidationError;

/// A command that can be posted to the vendor API.
pub trait Command {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// API path, relative to the host.
    fn path(&self) -> &'static str;

    /// JSON body for the given spa.
    fn body(&self, spa_id: &str) -> Value;

    /// Checks parameters that the vendor must never receive.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the rejected parameter.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}
