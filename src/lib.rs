// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `CmSpa` Lib - A Rust library to control Balboa spas through ControlMySpa.
//!
//! The vendor only offers a cloud API: the spa controller reports to the
//! vendor backend, and commands are posted to the same backend, which applies
//! them asynchronously. This library polls that API and keeps a set of host
//! capabilities (target temperature, panel lock, pumps, blowers, light, ...)
//! in sync with it.
//!
//! # Supported Features
//!
//! - **Session handling**: Login with automatic renewal before token expiry
//! - **State**: Dashboard fetch and normalization of the vendor's loose JSON
//! - **Commands**: Temperature, range, panel lock, jets, blowers, light,
//!   heater mode, filter cycles and clock
//! - **Reconciliation**: Change detection with per-capability triggers
//! - **Clock sync**: Pushes the operator's wall clock when the spa drifts
//!
//! # Quick Start
//!
//! ## Direct Commands
//!
//! ```no_run
//! use cmspa_lib::SpaCommandClient;
//! use cmspa_lib::protocol::{Credentials, HttpConfig};
//!
//! #[tokio::main]
//! async fn main() -> cmspa_lib::Result<()> {
//!     let client = SpaCommandClient::new(
//!         HttpConfig::new(),
//!         Credentials::new("owner@example.com", "secret"),
//!     )?;
//!
//!     // Returns the dashboard refetched once the backend has settled
//!     let dashboard = client.set_temperature(38.0).await?;
//!     let state = cmspa_lib::state::normalize(&dashboard);
//!     println!("water: {:?} °F", state.current_temp);
//!     Ok(())
//! }
//! ```
//!
//! ## Capability Sync
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use cmspa_lib::protocol::{Credentials, HttpConfig};
//! use cmspa_lib::{Capability, DeviceSettings, MemorySink, SpaCommandClient, SpaDevice};
//!
//! #[tokio::main]
//! async fn main() -> cmspa_lib::Result<()> {
//!     let client = SpaCommandClient::new(
//!         HttpConfig::new(),
//!         Credentials::new("owner@example.com", "secret"),
//!     )?;
//!     let sink = Arc::new(MemorySink::with_all_capabilities());
//!     let settings = DeviceSettings::new()
//!         .with_poll_interval(Duration::from_secs(30))
//!         .with_clock_sync(true)
//!         .with_time_zone_name("Europe/Amsterdam")?;
//!
//!     let device = SpaDevice::new(client, sink.clone(), settings)?;
//!     device.init().await?;
//!
//!     device.set_locked(true).await?;
//!     for note in sink.take_notifications() {
//!         println!("{} -> {}", note.trigger_id, note.value);
//!     }
//!     println!("target: {:?}", sink.value(Capability::TargetTemperature));
//!
//!     device.shutdown().await;
//!     Ok(())
//! }
//! ```

mod capabilities;
mod client;
pub mod command;
mod config;
mod device;
pub mod error;
pub mod pairing;
pub mod protocol;
pub mod reconcile;
pub mod response;
mod scheduler;
mod sink;
pub mod state;
pub mod types;

pub use capabilities::{Capability, CapabilityValue, ComponentBinding, ValueKind};
pub use client::SpaCommandClient;
pub use command::{Command, SpaCommand, SwitchState, SwitchableComponent};
pub use config::DeviceSettings;
pub use device::SpaDevice;
pub use error::{ApiError, ApiErrorKind, AuthError, Error, Result, SinkError, ValidationError};
pub use pairing::{DeviceDescriptor, PairingSession};
pub use protocol::{AuthSession, Credentials, HttpConfig};
pub use reconcile::{ReconcileReport, Reconciler};
pub use scheduler::PollScheduler;
pub use sink::{CapabilitySink, MemorySink, Notification};
pub use state::SpaState;
pub use types::{FilterInterval, HeaterMode, TempRange, TimeOfDay};
