// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idempotent cleanup of active sessions
//!
//! Both the health monitor and explicit cancel end up here. Removing the
//! session from the registry is the gate: only the caller that gets the
//! session back releases the page, persists the status and emits `ended`.

use crate::delivery::DeliveryQueue;
use crate::error::MonitorTimeout;
use crate::logbook::LaunchLogs;
use crate::registry::RegistryHandle;
use av_adapters::InterviewStore;
use av_core::{Clock, Event, EventBus, InterviewId, MeetingErrorKind};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// The page shows an end-of-meeting or error screen
    MeetingEnded(MeetingErrorKind),
    Unresponsive { checks: u32 },
    MaxDuration(MonitorTimeout),
    Cancelled,
    Shutdown,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::MeetingEnded(kind) => write!(f, "meeting ended ({})", kind.name()),
            EndReason::Unresponsive { checks } => {
                write!(f, "browser unresponsive for {checks} checks")
            }
            EndReason::MaxDuration(timeout) => write!(f, "{timeout}"),
            EndReason::Cancelled => f.write_str("cancelled"),
            EndReason::Shutdown => f.write_str("runtime shutdown"),
        }
    }
}

#[derive(Clone)]
pub struct Teardown<S: InterviewStore, C: Clock> {
    pub(crate) registry: RegistryHandle,
    pub(crate) queue: DeliveryQueue,
    pub(crate) store: S,
    pub(crate) bus: EventBus,
    pub(crate) logs: LaunchLogs<C>,
    pub(crate) clock: C,
}

impl<S: InterviewStore, C: Clock> Teardown<S, C> {
    /// End an active session. Returns false when another caller already did.
    pub async fn cleanup(&self, interview_id: &InterviewId, reason: EndReason) -> bool {
        let session = match self.registry.remove_session(interview_id).await {
            Ok(Some(session)) => session,
            Ok(None) => {
                tracing::debug!(interview_id = %interview_id, %reason, "session already cleaned up");
                return false;
            }
            Err(e) => {
                tracing::warn!(interview_id = %interview_id, error = %e, "cleanup skipped");
                return false;
            }
        };

        let released = self.queue.release(interview_id).await;
        if let Err(e) = self.store.persist_interview_status(interview_id, false).await {
            tracing::warn!(interview_id = %interview_id, error = %e, "failed to persist interview status");
        }

        let ran = self.clock.since(session.started_at);
        self.logs.record(
            interview_id,
            "cleanup",
            true,
            &format!("{reason} after {}s", ran.as_secs()),
        );
        if !released {
            tracing::warn!(interview_id = %interview_id, "no page was bound at cleanup");
        }

        self.bus.publish(Event::AvatarEnded {
            interview_id: interview_id.clone(),
            timestamp: self.clock.now(),
        });
        tracing::info!(interview_id = %interview_id, %reason, "session ended");
        true
    }
}

#[cfg(test)]
#[path = "teardown_tests.rs"]
mod tests;
