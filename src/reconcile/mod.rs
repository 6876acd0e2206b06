// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Diffing normalized spa state against the host's capabilities.
//!
//! Each dashboard fetch yields a fresh [`SpaState`]. The [`Reconciler`]
//! derives one value per capability from it, compares each value with the
//! one it applied last time, and pushes only the differences to the
//! [`CapabilitySink`]. Boolean capabilities fire their change trigger when
//! they flip.
//!
//! The first pass after (re)initialization is the baseline: it decides which
//! component-bound capabilities exist at all and applies every value without
//! firing triggers, since nothing has changed from the user's point of view.
//!
//! Temperatures arrive in Fahrenheit and leave in Celsius.
//!
//! [`ClockSyncPolicy`] is only a decision; `SpaDevice` evaluates it after
//! applying every fetched dashboard and pushes the clock itself.

mod clock_sync;
mod target;

pub use clock_sync::{ClockSyncPolicy, ClockSyncReason};
pub use target::derive_target_temperature;

use std::collections::BTreeMap;

use crate::capabilities::{Capability, CapabilityValue};
use crate::sink::CapabilitySink;
use crate::state::SpaState;
use crate::types::{HeaterMode, TempRange, fahrenheit_to_celsius, same_temperature};

/// Values last applied to the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilitySnapshot {
    values: BTreeMap<Capability, CapabilityValue>,
    target_range: Option<(f64, f64)>,
}

impl CapabilitySnapshot {
    /// Returns the last applied value of a capability.
    #[must_use]
    pub fn get(&self, capability: Capability) -> Option<&CapabilityValue> {
        self.values.get(&capability)
    }

    /// Returns the last applied target-temperature range, in Celsius.
    #[must_use]
    pub fn target_range(&self) -> Option<(f64, f64)> {
        self.target_range
    }

    /// Returns the number of recorded values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing has been applied yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.target_range.is_none()
    }

    fn record(&mut self, capability: Capability, value: CapabilityValue) {
        self.values.insert(capability, value);
    }

    fn forget(&mut self, capability: Capability) {
        self.values.remove(&capability);
    }

    fn clear(&mut self) {
        self.values.clear();
        self.target_range = None;
    }
}

/// What one reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// `true` if this was the baseline pass.
    pub baseline: bool,
    /// Capabilities added to the host.
    pub added: Vec<Capability>,
    /// Capabilities removed from the host.
    pub removed: Vec<Capability>,
    /// Capabilities whose value was written.
    pub applied: Vec<Capability>,
    /// Capabilities whose change trigger fired.
    pub notified: Vec<Capability>,
    /// Target-temperature range applied, in Celsius.
    pub range_applied: Option<(f64, f64)>,
    /// Capabilities the host refused to update.
    pub failed: Vec<Capability>,
}

impl ReconcileReport {
    /// Returns `true` if nothing reached the host.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.applied.is_empty()
            && self.range_applied.is_none()
    }
}

/// The diff engine, owning the snapshot of applied values.
///
/// # Examples
///
/// ```
/// use cmspa_lib::reconcile::Reconciler;
/// use cmspa_lib::response::RawSpaPayload;
/// use cmspa_lib::state::normalize;
/// use cmspa_lib::{Capability, MemorySink};
///
/// let sink = MemorySink::with_capabilities([Capability::Locked]);
/// let mut reconciler = Reconciler::new(false);
///
/// let locked = normalize(&RawSpaPayload::new(serde_json::json!({"isPanelLocked": true})));
/// let unlocked = normalize(&RawSpaPayload::new(serde_json::json!({"isPanelLocked": false})));
///
/// // Baseline: value applied, no trigger
/// reconciler.reconcile(&locked, &sink);
/// assert!(sink.notifications().is_empty());
///
/// // Unchanged: nothing happens
/// assert!(reconciler.reconcile(&locked, &sink).is_noop());
///
/// // Flipped: applied and triggered
/// let report = reconciler.reconcile(&unlocked, &sink);
/// assert_eq!(report.notified, vec![Capability::Locked]);
/// assert_eq!(sink.notifications()[0].trigger_id, "locked_changed");
/// ```
#[derive(Debug, Clone)]
pub struct Reconciler {
    snapshot: CapabilitySnapshot,
    baseline_pending: bool,
    round_temperature: bool,
}

impl Reconciler {
    /// Creates a reconciler whose next pass is the baseline.
    #[must_use]
    pub fn new(round_temperature: bool) -> Self {
        Self {
            snapshot: CapabilitySnapshot::default(),
            baseline_pending: true,
            round_temperature,
        }
    }

    /// Forgets applied values so that the next pass is a baseline again.
    pub fn reset(&mut self) {
        self.snapshot.clear();
        self.baseline_pending = true;
    }

    /// Enables or disables rounding of temperatures.
    pub fn set_round_temperature(&mut self, enabled: bool) {
        self.round_temperature = enabled;
    }

    /// Returns `true` if the next pass is a baseline.
    #[must_use]
    pub fn is_baseline_pending(&self) -> bool {
        self.baseline_pending
    }

    /// Returns the values applied so far.
    #[must_use]
    pub fn snapshot(&self) -> &CapabilitySnapshot {
        &self.snapshot
    }

    /// Derives the value of a capability from a state, in host units.
    ///
    /// Returns `None` when the state does not carry enough information, in
    /// which case the capability is left untouched.
    #[must_use]
    pub fn derive_value(
        &self,
        capability: Capability,
        state: &SpaState,
    ) -> Option<CapabilityValue> {
        let value = match capability {
            Capability::TargetTemperature => {
                CapabilityValue::Number(fahrenheit_to_celsius(derive_target_temperature(state)?))
            }
            Capability::MeasureTemperature => {
                CapabilityValue::Number(fahrenheit_to_celsius(state.current_temp?))
            }
            Capability::Locked => CapabilityValue::Bool(state.panel_locked),
            Capability::Light => CapabilityValue::Bool(state.light_on()),
            Capability::HeaterReady => {
                CapabilityValue::Bool(state.heater_mode == Some(HeaterMode::Ready))
            }
            Capability::TempRangeHigh => {
                CapabilityValue::Bool(state.temp_range == Some(TempRange::High))
            }
            Capability::TempRange => CapabilityValue::from(state.temp_range?.as_str()),
            Capability::HeaterMode => CapabilityValue::from(state.heater_mode?.as_str()),
            Capability::Online => CapabilityValue::Bool(state.online),
            Capability::Pump0
            | Capability::Pump1
            | Capability::Pump2
            | Capability::Blower0
            | Capability::Blower1
            | Capability::Blower2 => {
                let binding = capability.binding()?;
                let component = state.component(&binding.component_type, binding.port)?;
                CapabilityValue::Bool(component.is_active())
            }
            Capability::Heater | Capability::CirculationPump | Capability::Ozone => {
                let binding = capability.binding()?;
                let component = state.component(&binding.component_type, binding.port)?;
                CapabilityValue::from(component.value.clone()?)
            }
        };

        Some(match value {
            CapabilityValue::Number(n) if self.round_temperature && capability.is_roundable() => {
                CapabilityValue::Number(n.round())
            }
            other => other,
        })
    }

    /// Runs one pass against the host.
    ///
    /// Host failures are logged and reported but never abort the pass; a
    /// value the host refused is not recorded and will be retried next time.
    pub fn reconcile(&mut self, state: &SpaState, sink: &dyn CapabilitySink) -> ReconcileReport {
        let baseline = self.baseline_pending;
        let mut report = ReconcileReport {
            baseline,
            ..ReconcileReport::default()
        };

        self.apply_range(state, sink, &mut report);

        for capability in Capability::ALL {
            if !self.ensure_exposed(capability, state, sink, &mut report) {
                continue;
            }
            if let Some(value) = self.derive_value(capability, state) {
                self.apply_value(capability, value, sink, &mut report);
            }
        }

        self.baseline_pending = false;

        tracing::debug!(
            baseline,
            applied = report.applied.len(),
            notified = report.notified.len(),
            added = report.added.len(),
            removed = report.removed.len(),
            "Reconciled spa state"
        );
        report
    }

    /// Adds or removes component-bound capabilities and tells whether the
    /// capability may be written.
    fn ensure_exposed(
        &mut self,
        capability: Capability,
        state: &SpaState,
        sink: &dyn CapabilitySink,
        report: &mut ReconcileReport,
    ) -> bool {
        let Some(binding) = capability.binding() else {
            return sink.has_capability(capability);
        };

        let present = state
            .component(&binding.component_type, binding.port)
            .is_some();
        let exposed = sink.has_capability(capability);

        match (present, exposed) {
            (true, true) => true,
            (true, false) => match sink.add_capability(capability) {
                Ok(()) => {
                    tracing::debug!(capability = %capability, "Added capability");
                    report.added.push(capability);
                    true
                }
                Err(e) => {
                    tracing::warn!(capability = %capability, error = %e, "Host refused capability");
                    report.failed.push(capability);
                    false
                }
            },
            (false, true) if report.baseline => {
                match sink.remove_capability(capability) {
                    Ok(()) => {
                        tracing::debug!(capability = %capability, "Removed capability");
                        self.snapshot.forget(capability);
                        report.removed.push(capability);
                    }
                    Err(e) => {
                        tracing::warn!(
                            capability = %capability,
                            error = %e,
                            "Host refused removal"
                        );
                        report.failed.push(capability);
                    }
                }
                false
            }
            (false, _) => false,
        }
    }

    fn apply_value(
        &mut self,
        capability: Capability,
        value: CapabilityValue,
        sink: &dyn CapabilitySink,
        report: &mut ReconcileReport,
    ) {
        let previous = self
            .snapshot
            .get(capability)
            .cloned()
            .or_else(|| sink.capability_value(capability));

        if previous.as_ref().is_some_and(|p| p.same_as(&value)) {
            self.snapshot.record(capability, value);
            return;
        }

        if let Err(e) = sink.set_capability_value(capability, value.clone()) {
            tracing::warn!(capability = %capability, error = %e, "Host refused value");
            report.failed.push(capability);
            return;
        }

        tracing::debug!(capability = %capability, value = %value, "Applied capability value");
        report.applied.push(capability);

        // A first value is not a change, even outside the baseline
        if !report.baseline
            && previous.is_some()
            && let Some(trigger_id) = capability.trigger_id()
        {
            sink.notify_change(capability, &trigger_id, &value);
            report.notified.push(capability);
        }
        self.snapshot.record(capability, value);
    }

    fn apply_range(
        &mut self,
        state: &SpaState,
        sink: &dyn CapabilitySink,
        report: &mut ReconcileReport,
    ) {
        let Some((low, high)) = state.active_range_bounds() else {
            return;
        };
        if !sink.has_capability(Capability::TargetTemperature) {
            return;
        }

        let range = (fahrenheit_to_celsius(low), fahrenheit_to_celsius(high));
        let unchanged = self.snapshot.target_range.is_some_and(|(min, max)| {
            same_temperature(min, range.0) && same_temperature(max, range.1)
        });
        if unchanged {
            return;
        }

        match sink.set_capability_range(Capability::TargetTemperature, range.0, range.1) {
            Ok(()) => {
                tracing::debug!(min = range.0, max = range.1, "Applied target temperature range");
                self.snapshot.target_range = Some(range);
                report.range_applied = Some(range);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Host refused target temperature range");
                report.failed.push(Capability::TargetTemperature);
            }
        }
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::RawSpaPayload;
    use crate::sink::MemorySink;
    use crate::state::normalize;
    use serde_json::{Value, json};

    fn dashboard(overrides: &Value) -> SpaState {
        let mut base = json!({
            "desiredTemp": "100.0",
            "targetDesiredTemp": "100.4",
            "currentTemp": "98,6",
            "isPanelLocked": false,
            "heaterMode": "READY",
            "tempRange": "HIGH",
            "isOnline": true,
            "time": "12:00",
            "isMilitaryTime": true,
            "rangeLimits": {
                "highRangeLow": 80,
                "highRangeHigh": 104,
                "lowRangeLow": 50,
                "lowRangeHigh": 99
            },
            "components": [
                {"componentType": "PUMP", "port": "0", "value": "OFF"},
                {"componentType": "PUMP", "port": "1", "value": "HIGH"},
                {"componentType": "BLOWER", "port": "0", "value": "OFF"},
                {"componentType": "LIGHT", "port": "0", "value": "OFF"},
                {"componentType": "HEATER", "port": "0", "value": "OFF"},
                {"componentType": "OZONE", "port": "0", "value": "ON"}
            ]
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        normalize(&RawSpaPayload::new(base))
    }

    fn host_sink() -> MemorySink {
        MemorySink::with_capabilities([
            Capability::TargetTemperature,
            Capability::MeasureTemperature,
            Capability::Locked,
            Capability::Light,
            Capability::HeaterReady,
            Capability::TempRangeHigh,
            Capability::TempRange,
            Capability::HeaterMode,
            Capability::Online,
        ])
    }

    // ========================================================================
    // Baseline
    // ========================================================================

    #[test]
    fn baseline_applies_without_notifications() {
        let sink = host_sink();
        let mut reconciler = Reconciler::new(false);

        let report = reconciler.reconcile(&dashboard(&json!({})), &sink);

        assert!(report.baseline);
        assert!(report.notified.is_empty());
        assert!(sink.notifications().is_empty());
        assert_eq!(sink.value(Capability::Locked), Some(false.into()));
        assert_eq!(sink.value(Capability::HeaterMode), Some("READY".into()));
        let target = sink
            .value(Capability::TargetTemperature)
            .and_then(|v| v.as_number())
            .unwrap();
        assert_eq!(target.round(), 38.0);
        assert!(!reconciler.is_baseline_pending());
    }

    #[test]
    fn baseline_adds_present_and_removes_absent_components() {
        let sink = host_sink();
        sink.add_capability(Capability::Blower2).unwrap();
        let mut reconciler = Reconciler::new(false);

        let report = reconciler.reconcile(&dashboard(&json!({})), &sink);

        for cap in [
            Capability::Pump0,
            Capability::Pump1,
            Capability::Blower0,
            Capability::Heater,
            Capability::Ozone,
        ] {
            assert!(sink.has_capability(cap), "{cap} should be exposed");
            assert!(report.added.contains(&cap));
        }
        assert_eq!(report.removed, vec![Capability::Blower2]);
        assert!(!sink.has_capability(Capability::Pump2));
        assert!(!sink.has_capability(Capability::CirculationPump));
        assert_eq!(sink.value(Capability::Pump1), Some(true.into()));
        assert_eq!(sink.value(Capability::Ozone), Some("ON".into()));
    }

    #[test]
    fn baseline_applies_range_in_celsius() {
        let sink = host_sink();
        let mut reconciler = Reconciler::new(false);

        let report = reconciler.reconcile(&dashboard(&json!({})), &sink);

        let (min, max) = report.range_applied.unwrap();
        assert!(same_temperature(min, fahrenheit_to_celsius(80.0)));
        assert!(same_temperature(max, 40.0));
        assert_eq!(sink.range(Capability::TargetTemperature), Some((min, max)));
    }

    // ========================================================================
    // Subsequent polls
    // ========================================================================

    #[test]
    fn unchanged_poll_is_noop() {
        let sink = host_sink();
        let mut reconciler = Reconciler::new(false);
        reconciler.reconcile(&dashboard(&json!({})), &sink);

        let report = reconciler.reconcile(&dashboard(&json!({})), &sink);

        assert!(!report.baseline);
        assert!(report.is_noop(), "{report:?}");
        assert!(sink.notifications().is_empty());
    }

    #[test]
    fn flipped_booleans_notify() {
        let sink = host_sink();
        let mut reconciler = Reconciler::new(false);
        reconciler.reconcile(&dashboard(&json!({})), &sink);

        let report = reconciler.reconcile(
            &dashboard(&json!({"isPanelLocked": true, "heaterMode": "REST"})),
            &sink,
        );

        assert!(report.notified.contains(&Capability::Locked));
        assert!(report.notified.contains(&Capability::HeaterReady));
        // Text capabilities change silently
        assert!(report.applied.contains(&Capability::HeaterMode));
        assert!(!report.notified.contains(&Capability::HeaterMode));

        let triggers: Vec<_> = sink
            .notifications()
            .into_iter()
            .map(|n| n.trigger_id)
            .collect();
        assert!(triggers.contains(&"locked_changed".to_string()));
        assert!(triggers.contains(&"action_heater_mode_changed".to_string()));
    }

    #[test]
    fn component_changes_notify_with_port_trigger() {
        let sink = host_sink();
        let mut reconciler = Reconciler::new(false);
        reconciler.reconcile(&dashboard(&json!({})), &sink);

        let report = reconciler.reconcile(
            &dashboard(&json!({"components": [
                {"componentType": "PUMP", "port": "0", "value": "OFF"},
                {"componentType": "PUMP", "port": "1", "value": "OFF"},
                {"componentType": "BLOWER", "port": "0", "value": "OFF"},
                {"componentType": "LIGHT", "port": "0", "value": "ON"},
                {"componentType": "HEATER", "port": "0", "value": "OFF"},
                {"componentType": "OZONE", "port": "0", "value": "ON"}
            ]})),
            &sink,
        );

        assert_eq!(report.notified, vec![Capability::Pump1, Capability::Light]);
        let notes = sink.notifications();
        assert_eq!(notes[0].trigger_id, "action_pump_state_1_changed");
        assert_eq!(notes[0].value, false.into());
        assert_eq!(notes[1].trigger_id, "action_light_state_changed");
    }

    #[test]
    fn absent_component_is_never_written_after_baseline() {
        let sink = host_sink();
        let mut reconciler = Reconciler::new(false);
        reconciler.reconcile(&dashboard(&json!({})), &sink);

        // Blower disappears from the payload but stays exposed on the host
        let report = reconciler.reconcile(
            &dashboard(&json!({"components": [
                {"componentType": "PUMP", "port": "0", "value": "OFF"},
                {"componentType": "PUMP", "port": "1", "value": "HIGH"},
                {"componentType": "LIGHT", "port": "0", "value": "OFF"},
                {"componentType": "HEATER", "port": "0", "value": "OFF"},
                {"componentType": "OZONE", "port": "0", "value": "ON"}
            ]})),
            &sink,
        );

        assert!(sink.has_capability(Capability::Blower0));
        assert!(!report.applied.contains(&Capability::Blower0));
        assert!(report.removed.is_empty());
    }

    #[test]
    fn component_appearing_later_is_added() {
        let sink = host_sink();
        let mut reconciler = Reconciler::new(false);
        reconciler.reconcile(&dashboard(&json!({})), &sink);

        let report = reconciler.reconcile(
            &dashboard(&json!({"components": [
                {"componentType": "PUMP", "port": "0", "value": "OFF"},
                {"componentType": "PUMP", "port": "1", "value": "HIGH"},
                {"componentType": "BLOWER", "port": "0", "value": "OFF"},
                {"componentType": "CIRCULATION_PUMP", "value": "ON"}
            ]})),
            &sink,
        );

        assert_eq!(report.added, vec![Capability::CirculationPump]);
        assert_eq!(sink.value(Capability::CirculationPump), Some("ON".into()));
    }

    #[test]
    fn component_appearing_later_does_not_notify() {
        let sink = host_sink();
        let mut reconciler = Reconciler::new(false);
        reconciler.reconcile(&dashboard(&json!({"components": []})), &sink);
        assert!(!sink.has_capability(Capability::Pump2));

        let report = reconciler.reconcile(
            &dashboard(&json!({"components": [
                {"componentType": "PUMP", "port": "2", "value": "OFF"}
            ]})),
            &sink,
        );

        assert_eq!(report.added, vec![Capability::Pump2]);
        assert!(report.applied.contains(&Capability::Pump2));
        assert!(report.notified.is_empty());
        assert!(sink.notifications().is_empty());

        let flipped = reconciler.reconcile(
            &dashboard(&json!({"components": [
                {"componentType": "PUMP", "port": "2", "value": "HIGH"}
            ]})),
            &sink,
        );
        assert_eq!(flipped.notified, vec![Capability::Pump2]);
    }

    #[test]
    fn range_reapplied_only_on_change() {
        let sink = host_sink();
        let mut reconciler = Reconciler::new(false);
        reconciler.reconcile(&dashboard(&json!({})), &sink);

        let same = reconciler.reconcile(&dashboard(&json!({})), &sink);
        assert!(same.range_applied.is_none());

        let switched = reconciler.reconcile(&dashboard(&json!({"tempRange": "LOW"})), &sink);
        let (min, max) = switched.range_applied.unwrap();
        assert!(same_temperature(min, 10.0));
        assert!(same_temperature(max, fahrenheit_to_celsius(99.0)));
        assert!(switched.notified.contains(&Capability::TempRangeHigh));
    }

    #[test]
    fn non_component_capability_missing_on_host_is_skipped() {
        let sink = MemorySink::with_capabilities([Capability::Locked]);
        let mut reconciler = Reconciler::new(false);

        let report = reconciler.reconcile(&dashboard(&json!({})), &sink);

        assert!(!sink.has_capability(Capability::Online));
        assert!(!report.failed.contains(&Capability::Online));
        assert!(report.range_applied.is_none());
    }

    // ========================================================================
    // Temperatures
    // ========================================================================

    #[test]
    fn rounding_applies_before_comparison() {
        let sink = host_sink();
        let mut reconciler = Reconciler::new(true);
        reconciler.reconcile(&dashboard(&json!({"currentTemp": "98.6"})), &sink);
        assert_eq!(
            sink.value(Capability::MeasureTemperature),
            Some(CapabilityValue::Number(37.0))
        );

        // 98.8 °F is 37.1 °C, still 37 once rounded
        let report = reconciler.reconcile(&dashboard(&json!({"currentTemp": "98.8"})), &sink);
        assert!(!report.applied.contains(&Capability::MeasureTemperature));
    }

    #[test]
    fn missing_current_temperature_leaves_value_untouched() {
        let sink = host_sink();
        let mut reconciler = Reconciler::new(false);
        reconciler.reconcile(&dashboard(&json!({})), &sink);
        let before = sink.value(Capability::MeasureTemperature);

        let report = reconciler.reconcile(&dashboard(&json!({"currentTemp": null})), &sink);

        assert!(!report.applied.contains(&Capability::MeasureTemperature));
        assert_eq!(sink.value(Capability::MeasureTemperature), before);
    }

    // ========================================================================
    // Reset
    // ========================================================================

    #[test]
    fn reset_restores_baseline_semantics() {
        let sink = host_sink();
        let mut reconciler = Reconciler::new(false);
        reconciler.reconcile(&dashboard(&json!({})), &sink);

        reconciler.reset();
        assert!(reconciler.is_baseline_pending());
        assert!(reconciler.snapshot().is_empty());

        let report = reconciler.reconcile(&dashboard(&json!({"isPanelLocked": true})), &sink);
        assert!(report.baseline);
        assert!(report.applied.contains(&Capability::Locked));
        assert!(sink.notifications().is_empty());
    }

    #[test]
    fn host_value_counts_as_previous_after_reset() {
        let sink = host_sink();
        sink.set_capability_value(Capability::Locked, true.into())
            .unwrap();
        let mut reconciler = Reconciler::new(false);

        let report = reconciler.reconcile(&dashboard(&json!({"isPanelLocked": true})), &sink);

        assert!(!report.applied.contains(&Capability::Locked));
        assert_eq!(
            reconciler.snapshot().get(Capability::Locked),
            Some(&CapabilityValue::Bool(true))
        );
    }
}
