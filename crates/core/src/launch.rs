// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduled avatar launches
//!
//! A launch is created when an interview is booked with a meeting link and
//! only ever moves forward:
//!
//! ```text
//! scheduled ──► launching ──► active
//!     │             │
//!     └─────────────┴───────► failed
//! ```

use crate::id::InterviewId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// How the avatar behaves once it is inside the meeting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingMode {
    /// Deliver the question plan through the meeting chat
    #[default]
    Chat,
    /// Join and stay present without sending questions
    Silent,
}

/// Everything needed to enter one meeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingConfig {
    pub meeting_url: String,
    pub candidate_name: String,
    pub position: String,
    #[serde(default)]
    pub mode: MeetingMode,
}

impl MeetingConfig {
    pub fn new(
        meeting_url: impl Into<String>,
        candidate_name: impl Into<String>,
        position: impl Into<String>,
    ) -> Self {
        Self {
            meeting_url: meeting_url.into(),
            candidate_name: candidate_name.into(),
            position: position.into(),
            mode: MeetingMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: MeetingMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Lifecycle status of a scheduled launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchStatus {
    Scheduled,
    Launching,
    Active,
    Failed,
}

impl LaunchStatus {
    /// Terminal launches leave the scheduling set
    pub fn is_terminal(&self) -> bool {
        matches!(self, LaunchStatus::Active | LaunchStatus::Failed)
    }

    /// Whether moving to `next` is a forward transition
    pub fn can_transition_to(&self, next: LaunchStatus) -> bool {
        matches!(
            (self, next),
            (LaunchStatus::Scheduled, LaunchStatus::Launching)
                | (LaunchStatus::Scheduled, LaunchStatus::Failed)
                | (LaunchStatus::Launching, LaunchStatus::Active)
                | (LaunchStatus::Launching, LaunchStatus::Failed)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            LaunchStatus::Scheduled => "scheduled",
            LaunchStatus::Launching => "launching",
            LaunchStatus::Active => "active",
            LaunchStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for LaunchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Rejected status change
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid launch transition for {interview_id}: {from} -> {to}")]
pub struct InvalidTransition {
    pub interview_id: InterviewId,
    pub from: LaunchStatus,
    pub to: LaunchStatus,
}

/// A meeting the avatar must join at `launch_time`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledLaunch {
    pub interview_id: InterviewId,
    pub launch_time: DateTime<Utc>,
    pub meeting_config: MeetingConfig,
    pub status: LaunchStatus,
}

impl ScheduledLaunch {
    pub fn new(
        interview_id: impl Into<InterviewId>,
        launch_time: DateTime<Utc>,
        meeting_config: MeetingConfig,
    ) -> Self {
        Self {
            interview_id: interview_id.into(),
            launch_time,
            meeting_config,
            status: LaunchStatus::Scheduled,
        }
    }

    /// Book a launch `lead_time` ahead of the interview start
    pub fn book(
        interview_id: impl Into<InterviewId>,
        starts_at: DateTime<Utc>,
        lead_time: Duration,
        meeting_config: MeetingConfig,
    ) -> Self {
        let lead = chrono::Duration::from_std(lead_time).unwrap_or_else(|_| chrono::Duration::zero());
        Self::new(interview_id, starts_at - lead, meeting_config)
    }

    /// Scheduled and past its launch time
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == LaunchStatus::Scheduled && now >= self.launch_time
    }

    /// Move to `next`, rejecting anything that is not a forward step
    pub fn transition(&mut self, next: LaunchStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition {
                interview_id: self.interview_id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
