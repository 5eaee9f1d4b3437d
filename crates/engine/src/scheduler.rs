// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler loop
//!
//! Polls the interview store for due launches, registers them, claims the
//! due ones through the registry and hands each claim to a [`Launcher`].
//! The claim is the registry's `scheduled -> launching` transition, so a
//! launch is handed off at most once however often the loop polls.

use crate::error::HandoffError;
use crate::registry::RegistryHandle;
use av_adapters::InterviewStore;
use av_core::{Clock, Event, EventBus, LaunchStatus, ScheduledLaunch};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Receives launches the scheduler has claimed
pub trait Launcher: Clone + Send + Sync + 'static {
    /// Start driving `launch` in the background. Must not block.
    fn dispatch(&self, launch: ScheduledLaunch) -> Result<(), HandoffError>;
}

#[derive(Clone)]
pub struct SchedulerLoop<S: InterviewStore, L: Launcher, C: Clock> {
    store: S,
    launcher: L,
    registry: RegistryHandle,
    bus: EventBus,
    clock: C,
    period: Duration,
}

impl<S: InterviewStore, L: Launcher, C: Clock> SchedulerLoop<S, L, C> {
    pub fn new(
        store: S,
        launcher: L,
        registry: RegistryHandle,
        bus: EventBus,
        clock: C,
        period: Duration,
    ) -> Self {
        Self {
            store,
            launcher,
            registry,
            bus,
            clock,
            period,
        }
    }

    /// One poll. Returns the number of launches handed off.
    pub async fn tick(&self) -> usize {
        let now = self.clock.now();

        match self.store.scheduled_interviews_due(now).await {
            Ok(due) => {
                for launch in due {
                    let id = launch.interview_id.clone();
                    match self.registry.schedule(launch).await {
                        Ok(true) => tracing::debug!(interview_id = %id, "launch registered"),
                        Ok(false) => {}
                        Err(e) => {
                            tracing::error!(error = %e, "registry unavailable");
                            return 0;
                        }
                    }
                }
            }
            // In-process bookings can still be claimed
            Err(e) => tracing::warn!(error = %e, "due-launch query failed"),
        }

        let claimed = match self.registry.claim_due(now).await {
            Ok(claimed) => claimed,
            Err(e) => {
                tracing::error!(error = %e, "registry unavailable");
                return 0;
            }
        };

        let mut handed_off = 0;
        for launch in claimed {
            let id = launch.interview_id.clone();
            tracing::info!(interview_id = %id, launch_time = %launch.launch_time, "launch claimed");
            self.bus.publish(Event::LaunchStarted {
                interview_id: id.clone(),
                timestamp: now,
            });

            match self.launcher.dispatch(launch) {
                Ok(()) => handed_off += 1,
                Err(e) => {
                    tracing::error!(interview_id = %id, error = %e, "hand-off failed");
                    if let Err(e) = self.registry.transition(&id, LaunchStatus::Failed).await {
                        tracing::warn!(interview_id = %id, error = %e, "could not mark launch failed");
                    }
                    if let Err(e) = self.store.persist_interview_status(&id, false).await {
                        tracing::warn!(interview_id = %id, error = %e, "failed to persist interview status");
                    }
                }
            }
        }
        handed_off
    }

    /// Tick every period until `shutdown` flips
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let start = tokio::time::Instant::now() + self.period;
        let mut interval = tokio::time::interval_at(start, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(period_ms = self.period.as_millis() as u64, "scheduler started");

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::info!("scheduler stopped");
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
