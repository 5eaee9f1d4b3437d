// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Automation session state machine
//!
//! A session is one attempt at being present in a meeting. The record here
//! is what the registry tracks; the driver handle itself travels separately
//! with whichever task currently owns it (the launching controller, then the
//! delivery consumer).

use crate::id::InterviewId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The state of an automation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Applying a credential or signing in
    Authenticating,
    /// Working through the join flow
    Joining,
    /// Inside the meeting and healthy
    InMeeting,
    /// Inside the meeting but the last health check was not clean
    Degraded,
    /// Torn down; the driver handle has been released
    Ended,
}

impl SessionStatus {
    pub fn name(&self) -> &'static str {
        match self {
            SessionStatus::Authenticating => "authenticating",
            SessionStatus::Joining => "joining",
            SessionStatus::InMeeting => "in_meeting",
            SessionStatus::Degraded => "degraded",
            SessionStatus::Ended => "ended",
        }
    }

    /// Whether moving to `next` is allowed
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        match (self, next) {
            (Ended, _) => false,
            (_, Ended) => true,
            (Authenticating, Joining)
            | (Joining, InMeeting)
            | (InMeeting, Degraded)
            | (Degraded, InMeeting) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Registry-visible record of a running session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationSession {
    pub interview_id: InterviewId,
    pub started_at: DateTime<Utc>,
    pub status: SessionStatus,
}

impl AutomationSession {
    /// Create a new session in the Authenticating state
    pub fn new(interview_id: impl Into<InterviewId>, started_at: DateTime<Utc>) -> Self {
        Self {
            interview_id: interview_id.into(),
            started_at,
            status: SessionStatus::Authenticating,
        }
    }

    /// Apply a status change; returns false (and leaves the status alone)
    /// when the change is not allowed
    pub fn advance(&mut self, next: SessionStatus) -> bool {
        if self.status == next {
            return true;
        }
        if !self.status.can_transition_to(next) {
            tracing::warn!(
                interview_id = %self.interview_id,
                from = %self.status,
                to = %next,
                "ignoring invalid session transition"
            );
            return false;
        }
        self.status = next;
        true
    }

    pub fn is_in_meeting(&self) -> bool {
        matches!(self.status, SessionStatus::InMeeting | SessionStatus::Degraded)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
