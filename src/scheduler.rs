// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic poll timer.
//!
//! At most one timer runs per scheduler. Ticks never queue up: a cycle that
//! is still running when the next tick is due makes that tick be skipped.
//! Stopping the timer lets a running cycle finish; it only prevents new
//! ones from starting.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

type Tick = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

struct Running {
    period: Duration,
    tick: Tick,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Single-slot periodic timer.
///
/// # Examples
///
/// ```
/// use cmspa_lib::PollScheduler;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let polls = Arc::new(AtomicUsize::new(0));
/// let scheduler = PollScheduler::new();
///
/// let counter = Arc::clone(&polls);
/// scheduler.start(Duration::from_secs(60), move || {
///     let counter = Arc::clone(&counter);
///     async move {
///         counter.fetch_add(1, Ordering::SeqCst);
///     }
/// });
/// assert!(scheduler.is_running());
///
/// // Change the interval, keeping the same cycle
/// scheduler.restart(Duration::from_secs(30));
/// assert_eq!(scheduler.period(), Some(Duration::from_secs(30)));
///
/// if let Some(handle) = scheduler.stop() {
///     handle.await.ok();
/// }
/// assert!(!scheduler.is_running());
/// # }
/// ```
#[derive(Default)]
pub struct PollScheduler {
    slot: Mutex<Option<Running>>,
}

impl PollScheduler {
    /// Creates a scheduler with no timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts calling `tick` every `period`, the first time one period from
    /// now. A timer that is already running is cancelled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F, Fut>(&self, period: Duration, tick: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let tick: Tick = Arc::new(move || -> Pin<Box<dyn Future<Output = ()> + Send>> {
            Box::pin(tick())
        });
        self.install(period, tick);
    }

    /// Cancels the running timer and starts a new one with another period,
    /// keeping the same cycle.
    ///
    /// Returns `false` if no timer was ever started.
    pub fn restart(&self, period: Duration) -> bool {
        let tick = self.slot.lock().as_ref().map(|r| Arc::clone(&r.tick));
        match tick {
            Some(tick) => {
                self.install(period, tick);
                true
            }
            None => false,
        }
    }

    /// Stops the timer.
    ///
    /// Returns the handle of the timer task, which completes once any
    /// running cycle has finished.
    pub fn stop(&self) -> Option<JoinHandle<()>> {
        let running = self.slot.lock().take()?;
        running.shutdown.send_replace(true);
        tracing::info!(period = ?running.period, "Poll timer stopped");
        Some(running.handle)
    }

    /// Returns `true` if a timer is installed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.slot
            .lock()
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    /// Returns the period of the installed timer.
    #[must_use]
    pub fn period(&self) -> Option<Duration> {
        self.slot.lock().as_ref().map(|r| r.period)
    }

    fn install(&self, period: Duration, tick: Tick) {
        let (shutdown, signal) = watch::channel(false);
        let mut slot = self.slot.lock();

        // Cancel before scheduling so two timers never overlap
        if let Some(previous) = slot.take() {
            previous.shutdown.send_replace(true);
        }

        let handle = tokio::spawn(run_timer(period, Arc::clone(&tick), signal));
        tracing::info!(period = ?period, "Poll timer started");

        *slot = Some(Running {
            period,
            tick,
            shutdown,
            handle,
        });
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        if let Some(running) = self.slot.get_mut().take() {
            running.shutdown.send_replace(true);
        }
    }
}

impl std::fmt::Debug for PollScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollScheduler")
            .field("period", &self.period())
            .finish()
    }
}

async fn run_timer(period: Duration, tick: Tick, mut shutdown: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = interval.tick() => {
                tracing::trace!("Poll tick");
                let started = Instant::now();
                // Not raced against shutdown: a started cycle always completes
                tick().await;
                if started.elapsed() >= period {
                    tracing::debug!(
                        elapsed = ?started.elapsed(),
                        "Poll cycle overran, rescheduling"
                    );
                    interval.reset();
                }
            }
        }
    }
}
