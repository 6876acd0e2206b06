// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One spa, wired to the host.
//!
//! [`SpaDevice`] ties the vendor client, the reconciler, the host's
//! capability sink and the poll timer together. Every vendor round-trip,
//! whether started by the timer or by a host capability write, holds the
//! same gate, so two of them never overlap and the capability snapshot is
//! only ever touched by one of them at a time.
//!
//! ```no_run
//! use std::sync::Arc;
//! use cmspa_lib::protocol::{Credentials, HttpConfig};
//! use cmspa_lib::{Capability, DeviceSettings, MemorySink, SpaCommandClient, SpaDevice};
//!
//! # async fn example() -> cmspa_lib::Result<()> {
//! let client = SpaCommandClient::new(
//!     HttpConfig::new(),
//!     Credentials::new("owner@example.com", "secret"),
//! )?;
//! let sink = Arc::new(MemorySink::with_all_capabilities());
//! let device = SpaDevice::new(client, sink.clone(), DeviceSettings::default())?;
//!
//! // Baseline reconciliation, then polling every minute
//! device.init().await?;
//!
//! device.set_component(Capability::Pump0, true).await?;
//! println!("pump: {:?}", sink.value(Capability::Pump0));
//!
//! device.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::capabilities::{Capability, CapabilityValue};
use crate::client::SpaCommandClient;
use crate::config::DeviceSettings;
use crate::error::{Result, ValidationError};
use crate::reconcile::{ClockSyncPolicy, ReconcileReport, Reconciler};
use crate::response::RawSpaPayload;
use crate::scheduler::PollScheduler;
use crate::sink::CapabilitySink;
use crate::state::{SpaState, normalize};
use crate::types::{FilterInterval, HeaterMode, LocalClock, TempRange, TimeOfDay};

/// A spa kept in sync with the host's capabilities.
pub struct SpaDevice {
    client: Arc<SpaCommandClient>,
    sink: Arc<dyn CapabilitySink>,
    // Round-trip gate; also owns the snapshot
    reconciler: Mutex<Reconciler>,
    settings: RwLock<DeviceSettings>,
    scheduler: PollScheduler,
}

impl SpaDevice {
    /// Creates a device. Nothing is sent until [`init`](Self::init).
    ///
    /// # Errors
    ///
    /// Returns a validation error if the settings are invalid.
    pub fn new(
        client: SpaCommandClient,
        sink: Arc<dyn CapabilitySink>,
        settings: DeviceSettings,
    ) -> Result<Arc<Self>> {
        settings.validate()?;
        Ok(Arc::new(Self {
            client: Arc::new(client),
            sink,
            reconciler: Mutex::new(Reconciler::new(settings.round_temperature)),
            settings: RwLock::new(settings),
            scheduler: PollScheduler::new(),
        }))
    }

    /// Returns the vendor client.
    #[must_use]
    pub fn client(&self) -> &SpaCommandClient {
        &self.client
    }

    /// Returns the current settings.
    #[must_use]
    pub fn settings(&self) -> DeviceSettings {
        self.settings.read().clone()
    }

    /// Returns `true` while the poll timer is installed.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.scheduler.is_running()
    }

    // ========== Lifecycle ==========

    /// Logs in, resolves the spa, runs the baseline reconciliation and
    /// starts polling.
    ///
    /// The poll timer is started even when the first round-trip fails, so
    /// the device recovers on its own once the vendor is reachable again.
    ///
    /// # Errors
    ///
    /// Returns the first failure among login, profile lookup and dashboard
    /// fetch. The device is then marked unavailable.
    pub async fn init(self: &Arc<Self>) -> Result<ReconcileReport> {
        self.sink.set_available(false, Some("Connecting"));
        let outcome = self.bootstrap().await;
        self.start_timer();
        outcome
    }

    async fn bootstrap(&self) -> Result<ReconcileReport> {
        let mut reconciler = self.reconciler.lock().await;

        let session = async {
            self.client.login().await?;
            self.client.fetch_profile().await
        };
        if let Err(e) = session.await {
            tracing::warn!(error = %e, "Spa initialization failed");
            self.sink.set_available(false, Some(&e.to_string()));
            return Err(e);
        }

        let report = self.cycle(&mut reconciler).await?;
        tracing::info!(
            spa_id = ?self.client.cached_spa_id(),
            capabilities = reconciler.snapshot().len(),
            "Spa initialized"
        );
        Ok(report)
    }

    /// Replaces the settings.
    ///
    /// The poll timer is cancelled, the reconciler forgets its snapshot and
    /// a new baseline reconciliation runs before a fresh timer is started at
    /// the new interval.
    ///
    /// # Errors
    ///
    /// Returns a validation error, leaving everything untouched, if the new
    /// settings are invalid. A failing baseline is returned as well, but the
    /// settings are kept and polling resumes.
    pub async fn apply_settings(
        self: &Arc<Self>,
        settings: DeviceSettings,
    ) -> Result<ReconcileReport> {
        settings.validate()?;

        // Cancel before rescheduling so two timers never coexist. A cycle
        // still running finishes on its own; the gate below waits for it.
        drop(self.scheduler.stop());

        let outcome = {
            let mut reconciler = self.reconciler.lock().await;
            reconciler.reset();
            reconciler.set_round_temperature(settings.round_temperature);
            tracing::info!(
                poll_interval = ?settings.poll_interval,
                clock_sync = settings.clock_sync_enabled,
                round_temperature = settings.round_temperature,
                "Settings changed"
            );
            *self.settings.write() = settings;
            self.cycle(&mut reconciler).await
        };

        self.start_timer();
        outcome
    }

    /// Stops polling and waits for a running cycle to finish.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.scheduler.stop()
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "Poll timer ended abnormally");
        }
    }

    fn start_timer(self: &Arc<Self>) {
        let period = self.settings.read().poll_interval;
        let device = Arc::downgrade(self);
        self.scheduler.start(period, move || {
            let device = device.clone();
            async move {
                if let Some(device) = device.upgrade() {
                    // Failures are logged and reported to the sink by the cycle
                    let _ = device.poll_once().await;
                }
            }
        });
    }

    // ========== Polling ==========

    /// Runs one poll cycle.
    ///
    /// Returns `Ok(None)` without doing anything if another round-trip is
    /// in flight.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure. The snapshot is kept and the device is
    /// marked unavailable until a cycle succeeds.
    pub async fn poll_once(&self) -> Result<Option<ReconcileReport>> {
        let Ok(mut reconciler) = self.reconciler.try_lock() else {
            tracing::warn!("Previous round-trip still in flight, skipping poll");
            return Ok(None);
        };

        self.cycle(&mut reconciler).await.map(Some)
    }

    /// Fetches and reconciles now, waiting for any round-trip in flight.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure. The device is marked unavailable.
    pub async fn refresh(&self) -> Result<ReconcileReport> {
        let mut reconciler = self.reconciler.lock().await;
        self.cycle(&mut reconciler).await
    }

    async fn cycle(&self, reconciler: &mut Reconciler) -> Result<ReconcileReport> {
        let raw = self.fetch(reconciler).await?;
        Ok(self.apply(reconciler, &raw).await)
    }

    async fn fetch(&self, reconciler: &Reconciler) -> Result<RawSpaPayload> {
        self.client.fetch_state().await.inspect_err(|e| {
            tracing::warn!(
                error = %e,
                kept = reconciler.snapshot().len(),
                "Poll cycle failed, keeping last known state"
            );
            self.sink.set_available(false, Some(&e.to_string()));
        })
    }

    /// Reconciles a fetched dashboard, then pushes the clock if it needs it.
    ///
    /// Runs after every fetch: init, polls, manual refreshes, settings
    /// changes and capability writes.
    async fn apply(&self, reconciler: &mut Reconciler, raw: &RawSpaPayload) -> ReconcileReport {
        let state = normalize(raw);
        let report = reconciler.reconcile(&state, self.sink.as_ref());
        self.sink.set_available(true, None);
        self.sync_clock(&state).await;
        report
    }

    async fn sync_clock(&self, state: &SpaState) {
        let settings = self.settings();
        let policy = ClockSyncPolicy::from_settings(&settings);
        let local = LocalClock::now_in(settings.time_zone);
        let Some(reason) = policy.evaluate(state.online, &state.clock, &local) else {
            return;
        };

        tracing::info!(reason = %reason, time = %local.time, "Setting spa clock");
        // The refetched dashboard is picked up by the next cycle
        if let Err(e) = self
            .client
            .set_time(local, policy.use_24_hour_format())
            .await
        {
            tracing::warn!(error = %e, "Clock sync failed");
        }
    }

    // ========== Capability Writes ==========

    /// Dispatches a host capability write to the matching command.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NotControllable` for read-only
    /// capabilities and values of the wrong kind, or the command failure.
    pub async fn set_capability(
        &self,
        capability: Capability,
        value: CapabilityValue,
    ) -> Result<ReconcileReport> {
        let not_controllable = || ValidationError::NotControllable(capability.key().to_string());

        match capability {
            Capability::TargetTemperature => {
                let celsius = value.as_number().ok_or_else(not_controllable)?;
                self.set_target_temperature(celsius).await
            }
            Capability::Locked => {
                let locked = value.as_bool().ok_or_else(not_controllable)?;
                self.set_locked(locked).await
            }
            Capability::HeaterReady => {
                let ready = value.as_bool().ok_or_else(not_controllable)?;
                self.set_heater_ready(ready).await
            }
            Capability::TempRangeHigh => {
                let high = value.as_bool().ok_or_else(not_controllable)?;
                self.set_temp_range_high(high).await
            }
            switch if switch.switch_target().is_some() => {
                let on = value.as_bool().ok_or_else(not_controllable)?;
                self.set_component(switch, on).await
            }
            _ => Err(not_controllable().into()),
        }
    }

    /// Sets the target temperature in Celsius.
    ///
    /// # Errors
    ///
    /// Returns the command failure.
    pub async fn set_target_temperature(&self, celsius: f64) -> Result<ReconcileReport> {
        let mut reconciler = self.reconciler.lock().await;
        let raw = self.client.set_temperature(celsius).await;
        self.settle(&mut reconciler, "target_temperature", raw).await
    }

    /// Locks or unlocks the control panel.
    ///
    /// # Errors
    ///
    /// Returns the command failure.
    pub async fn set_locked(&self, locked: bool) -> Result<ReconcileReport> {
        let mut reconciler = self.reconciler.lock().await;
        let raw = self.client.set_panel_lock(locked).await;
        self.settle(&mut reconciler, "locked", raw).await
    }

    /// Switches the pump, blower or light behind a capability.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NotControllable`, without sending anything,
    /// for capabilities that are not switches. Otherwise returns the command
    /// failure.
    pub async fn set_component(&self, capability: Capability, on: bool) -> Result<ReconcileReport> {
        let (component, device_number) = capability
            .switch_target()
            .ok_or_else(|| ValidationError::NotControllable(capability.key().to_string()))?;

        let mut reconciler = self.reconciler.lock().await;
        let raw = self
            .client
            .set_component_state(component, device_number, on)
            .await;
        self.settle(&mut reconciler, capability.key(), raw).await
    }

    /// Puts the heater in `READY` (`true`) or `REST` mode.
    ///
    /// # Errors
    ///
    /// Returns the command failure.
    pub async fn set_heater_ready(&self, ready: bool) -> Result<ReconcileReport> {
        let mut reconciler = self.reconciler.lock().await;
        let raw = self
            .client
            .set_heater_mode(HeaterMode::from_ready(ready).as_str())
            .await;
        self.settle(&mut reconciler, "heater_mode", raw).await
    }

    /// Selects the high (`true`) or low temperature range.
    ///
    /// # Errors
    ///
    /// Returns the command failure.
    pub async fn set_temp_range_high(&self, high: bool) -> Result<ReconcileReport> {
        let mut reconciler = self.reconciler.lock().await;
        let raw = self
            .client
            .set_temperature_range(TempRange::from_high(high))
            .await;
        self.settle(&mut reconciler, "temp_range", raw).await
    }

    /// Schedules a filter cycle.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::PrimaryFilterDisabled`, without sending
    /// anything, when asked to disable filter 0. Otherwise returns the
    /// command failure.
    pub async fn set_filter_cycle(
        &self,
        filter: u8,
        interval: FilterInterval,
        start: TimeOfDay,
    ) -> Result<ReconcileReport> {
        let mut reconciler = self.reconciler.lock().await;
        let raw = self.client.set_filter_cycle(filter, interval, start).await;
        self.settle(&mut reconciler, "filter_cycle", raw).await
    }

    /// Reconciles the dashboard refetched after a command.
    async fn settle(
        &self,
        reconciler: &mut Reconciler,
        action: &'static str,
        raw: Result<RawSpaPayload>,
    ) -> Result<ReconcileReport> {
        let raw = raw.inspect_err(|e| {
            tracing::warn!(action, error = %e, "Capability write failed");
        })?;
        Ok(self.apply(reconciler, &raw).await)
    }
}

impl std::fmt::Debug for SpaDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaDevice")
            .field("spa_id", &self.client.cached_spa_id())
            .field("settings", &*self.settings.read())
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}
