// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Health monitoring for active sessions
//!
//! One task per session polls through a read-only probe. The verdict logic
//! is a pure function so thresholds can be tested without a browser.

use crate::diagnose::diagnose;
use crate::error::MonitorTimeout;
use crate::teardown::{EndReason, Teardown};
use av_adapters::{InterviewStore, PageProbe};
use av_core::{Clock, InterviewId, MeetingState, SessionStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorPolicy {
    pub interval: Duration,
    pub max_duration: Duration,
    /// Consecutive unresponsive polls that end the session
    pub max_unresponsive: u32,
}

/// What one poll saw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub elapsed: Duration,
    pub responsive: bool,
    /// Diagnosed state; absent when the browser did not answer
    pub state: Option<MeetingState>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Healthy,
    Degraded(String),
    End(EndReason),
}

/// Judge one observation. `strikes` counts consecutive unresponsive polls.
pub fn evaluate(policy: &MonitorPolicy, observation: &Observation, strikes: &mut u32) -> Verdict {
    if observation.elapsed >= policy.max_duration {
        return Verdict::End(EndReason::MaxDuration(MonitorTimeout {
            limit: policy.max_duration,
            elapsed: observation.elapsed,
        }));
    }

    if !observation.responsive {
        *strikes += 1;
        if *strikes >= policy.max_unresponsive {
            return Verdict::End(EndReason::Unresponsive { checks: *strikes });
        }
        return Verdict::Degraded(format!(
            "unresponsive ({}/{})",
            strikes, policy.max_unresponsive
        ));
    }
    *strikes = 0;

    match observation.state {
        Some(MeetingState::Error(kind)) => Verdict::End(EndReason::MeetingEnded(kind)),
        Some(MeetingState::AlreadyInMeeting) | None => Verdict::Healthy,
        Some(other) => Verdict::Degraded(format!("page shows {other}")),
    }
}

/// Spawns one polling task per active session
#[derive(Clone)]
pub struct HealthMonitor<S: InterviewStore, C: Clock> {
    policy: MonitorPolicy,
    teardown: Teardown<S, C>,
    shutdown: watch::Receiver<bool>,
}

impl<S: InterviewStore, C: Clock> HealthMonitor<S, C> {
    pub fn new(
        policy: MonitorPolicy,
        teardown: Teardown<S, C>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            policy,
            teardown,
            shutdown,
        }
    }

    pub fn spawn(&self, interview_id: InterviewId, probe: Arc<dyn PageProbe>) -> JoinHandle<()> {
        let monitor = self.clone();
        tokio::spawn(async move { monitor.watch(interview_id, probe).await })
    }

    async fn watch(mut self, interview_id: InterviewId, probe: Arc<dyn PageProbe>) {
        let started = Instant::now();
        let mut strikes = 0;
        tracing::debug!(interview_id = %interview_id, "health monitor started");

        loop {
            if *self.shutdown.borrow() {
                return;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.policy.interval) => {}
                // Shutdown cleans sessions up itself
                _ = self.shutdown.changed() => return,
            }

            match self.teardown.registry.session(&interview_id).await {
                Ok(Some(_)) => {}
                _ => {
                    tracing::debug!(interview_id = %interview_id, "session gone, monitor exiting");
                    return;
                }
            }

            let responsive = probe.is_responsive().await;
            let state = if responsive {
                Some(diagnose(probe.as_ref()).await.state)
            } else {
                None
            };
            let observation = Observation {
                elapsed: started.elapsed(),
                responsive,
                state,
            };

            let status = match evaluate(&self.policy, &observation, &mut strikes) {
                Verdict::Healthy => SessionStatus::InMeeting,
                Verdict::Degraded(reason) => {
                    tracing::warn!(interview_id = %interview_id, %reason, "session degraded");
                    SessionStatus::Degraded
                }
                Verdict::End(reason) => {
                    self.teardown.cleanup(&interview_id, reason).await;
                    return;
                }
            };
            if let Err(e) = self.teardown.registry.update_session(&interview_id, status).await {
                tracing::warn!(interview_id = %interview_id, error = %e, "monitor lost the registry");
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
