// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events published by the avatar runtime

use crate::id::InterviewId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle and delivery notifications. Every variant is keyed by the
/// interview it concerns and stamped with the time it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A due launch was claimed and handed to the controller
    LaunchStarted {
        interview_id: InterviewId,
        timestamp: DateTime<Utc>,
    },

    /// The avatar is inside the meeting and its questions are armed
    AvatarLaunched {
        interview_id: InterviewId,
        timestamp: DateTime<Utc>,
    },

    /// Short, recruiter-safe reason only
    AvatarLaunchFailed {
        interview_id: InterviewId,
        error: String,
        timestamp: DateTime<Utc>,
    },

    AvatarEnded {
        interview_id: InterviewId,
        timestamp: DateTime<Utc>,
    },

    /// A question reached the meeting chat
    AvatarMessage {
        interview_id: InterviewId,
        message: String,
        #[serde(with = "humantime_serde")]
        timing: Duration,
        timestamp: DateTime<Utc>,
    },

    AvatarStatus {
        interview_id: InterviewId,
        questions_sent: usize,
        questions_total: usize,
        #[serde(with = "humantime_serde")]
        elapsed: Duration,
        timestamp: DateTime<Utc>,
    },

    /// A question was dropped; deliveries are never retried
    DeliveryFailed {
        interview_id: InterviewId,
        message: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    /// Routing name matched by `EventPattern`
    pub fn name(&self) -> &'static str {
        match self {
            Event::LaunchStarted { .. } => "avatar:launch_started",
            Event::AvatarLaunched { .. } => "avatar:launched",
            Event::AvatarLaunchFailed { .. } => "avatar:launch_failed",
            Event::AvatarEnded { .. } => "avatar:ended",
            Event::AvatarMessage { .. } => "avatar:message",
            Event::AvatarStatus { .. } => "avatar:status",
            Event::DeliveryFailed { .. } => "avatar:delivery_failed",
        }
    }

    pub fn interview_id(&self) -> &InterviewId {
        match self {
            Event::LaunchStarted { interview_id, .. }
            | Event::AvatarLaunched { interview_id, .. }
            | Event::AvatarLaunchFailed { interview_id, .. }
            | Event::AvatarEnded { interview_id, .. }
            | Event::AvatarMessage { interview_id, .. }
            | Event::AvatarStatus { interview_id, .. }
            | Event::DeliveryFailed { interview_id, .. } => interview_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Event::LaunchStarted { timestamp, .. }
            | Event::AvatarLaunched { timestamp, .. }
            | Event::AvatarLaunchFailed { timestamp, .. }
            | Event::AvatarEnded { timestamp, .. }
            | Event::AvatarMessage { timestamp, .. }
            | Event::AvatarStatus { timestamp, .. }
            | Event::DeliveryFailed { timestamp, .. } => *timestamp,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
