// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The host side of capability synchronization.
//!
//! The library never owns the capability model; it pushes values into
//! whatever the host provides through [`CapabilitySink`]. Calls are
//! synchronous and expected to be cheap (typically a map update or a message
//! on a channel). They are never made while an HTTP request is in flight.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::Mutex;

use crate::capabilities::{Capability, CapabilityValue};
use crate::error::SinkError;

/// Receiver of capability changes, implemented by the host.
pub trait CapabilitySink: Send + Sync {
    /// Returns `true` if the host currently exposes the capability.
    fn has_capability(&self, capability: Capability) -> bool;

    /// Returns the value the host currently shows, if any.
    fn capability_value(&self, capability: Capability) -> Option<CapabilityValue>;

    /// Stores a new value.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the host rejects the value.
    fn set_capability_value(
        &self,
        capability: Capability,
        value: CapabilityValue,
    ) -> Result<(), SinkError>;

    /// Starts exposing a capability.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the host cannot add it.
    fn add_capability(&self, capability: Capability) -> Result<(), SinkError>;

    /// Stops exposing a capability.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the host cannot remove it.
    fn remove_capability(&self, capability: Capability) -> Result<(), SinkError>;

    /// Restricts the valid range of a numeric capability.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the host rejects the range.
    fn set_capability_range(
        &self,
        capability: Capability,
        min: f64,
        max: f64,
    ) -> Result<(), SinkError>;

    /// Fires the change trigger of a capability.
    fn notify_change(&self, capability: Capability, trigger_id: &str, value: &CapabilityValue);

    /// Marks the device available, or unavailable with a reason.
    fn set_available(&self, available: bool, reason: Option<&str>);
}

/// A fired change trigger, as recorded by [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// The capability that changed.
    pub capability: Capability,
    /// Trigger id, e.g. `locked_changed`.
    pub trigger_id: String,
    /// The new value.
    pub value: CapabilityValue,
}

#[derive(Debug, Default)]
struct MemoryState {
    capabilities: BTreeSet<Capability>,
    values: BTreeMap<Capability, CapabilityValue>,
    ranges: BTreeMap<Capability, (f64, f64)>,
    notifications: Vec<Notification>,
    available: bool,
    unavailable_reason: Option<String>,
}

/// In-memory [`CapabilitySink`] for headless use and tests.
///
/// # Examples
///
/// ```
/// use cmspa_lib::{Capability, CapabilitySink, MemorySink};
///
/// let sink = MemorySink::with_capabilities([Capability::Locked]);
/// assert!(sink.has_capability(Capability::Locked));
/// sink.set_capability_value(Capability::Locked, true.into()).unwrap();
/// assert_eq!(sink.value(Capability::Locked), Some(true.into()));
///
/// // Writing a capability the host does not expose fails
/// assert!(sink.set_capability_value(Capability::Pump2, true.into()).is_err());
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    state: Mutex<MemoryState>,
}

impl MemorySink {
    /// Creates a sink exposing no capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink exposing the given capabilities.
    #[must_use]
    pub fn with_capabilities(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        let sink = Self::new();
        sink.state.lock().capabilities.extend(capabilities);
        sink
    }

    /// Creates a sink exposing every known capability.
    #[must_use]
    pub fn with_all_capabilities() -> Self {
        Self::with_capabilities(Capability::ALL)
    }

    /// Returns the exposed capabilities.
    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        self.state.lock().capabilities.iter().copied().collect()
    }

    /// Returns the stored value of a capability.
    #[must_use]
    pub fn value(&self, capability: Capability) -> Option<CapabilityValue> {
        self.state.lock().values.get(&capability).cloned()
    }

    /// Returns the range applied to a capability.
    #[must_use]
    pub fn range(&self, capability: Capability) -> Option<(f64, f64)> {
        self.state.lock().ranges.get(&capability).copied()
    }

    /// Returns all triggers fired so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.state.lock().notifications.clone()
    }

    /// Returns and clears the fired triggers.
    pub fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut self.state.lock().notifications)
    }

    /// Returns `true` if the device is marked available.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state.lock().available
    }

    /// Returns the reason given when last marked unavailable.
    #[must_use]
    pub fn unavailable_reason(&self) -> Option<String> {
        self.state.lock().unavailable_reason.clone()
    }
}

impl CapabilitySink for MemorySink {
    fn has_capability(&self, capability: Capability) -> bool {
        self.state.lock().capabilities.contains(&capability)
    }

    fn capability_value(&self, capability: Capability) -> Option<CapabilityValue> {
        self.value(capability)
    }

    fn set_capability_value(
        &self,
        capability: Capability,
        value: CapabilityValue,
    ) -> Result<(), SinkError> {
        let mut state = self.state.lock();
        if !state.capabilities.contains(&capability) {
            return Err(SinkError::new(capability.key(), "capability not exposed"));
        }
        if value.kind() != capability.kind() {
            return Err(SinkError::new(
                capability.key(),
                format!("expected {:?} value, got {value:?}", capability.kind()),
            ));
        }
        state.values.insert(capability, value);
        Ok(())
    }

    fn add_capability(&self, capability: Capability) -> Result<(), SinkError> {
        self.state.lock().capabilities.insert(capability);
        Ok(())
    }

    fn remove_capability(&self, capability: Capability) -> Result<(), SinkError> {
        let mut state = self.state.lock();
        state.capabilities.remove(&capability);
        state.values.remove(&capability);
        state.ranges.remove(&capability);
        Ok(())
    }

    fn set_capability_range(
        &self,
        capability: Capability,
        min: f64,
        max: f64,
    ) -> Result<(), SinkError> {
        if min > max {
            return Err(SinkError::new(
                capability.key(),
                format!("empty range [{min}, {max}]"),
            ));
        }
        self.state.lock().ranges.insert(capability, (min, max));
        Ok(())
    }

    fn notify_change(&self, capability: Capability, trigger_id: &str, value: &CapabilityValue) {
        self.state.lock().notifications.push(Notification {
            capability,
            trigger_id: trigger_id.to_string(),
            value: value.clone(),
        });
    }

    fn set_available(&self, available: bool, reason: Option<&str>) {
        let mut state = self.state.lock();
        state.available = available;
        state.unavailable_reason = if available {
            None
        } else {
            reason.map(str::to_string)
        };
    }
}
