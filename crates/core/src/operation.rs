// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations for the write-ahead log

use crate::credential::Credential;
use crate::id::InterviewId;
use crate::launch::ScheduledLaunch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable facts about interviews and credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// An interview was booked with a meeting link; rebooking the same id
    /// replaces the launch
    InterviewBooked { launch: ScheduledLaunch },

    /// The avatar's presence in the interview changed
    InterviewStatus {
        interview_id: InterviewId,
        active: bool,
        at: DateTime<Utc>,
    },

    CredentialSaved { credential: Credential },
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::InterviewBooked { .. } => "interview_booked",
            Operation::InterviewStatus { .. } => "interview_status",
            Operation::CredentialSaved { .. } => "credential_saved",
        }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
