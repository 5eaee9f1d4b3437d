// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

use av_core::{Credential, InterviewId, LaunchStatus, Operation, ScheduledLaunch};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A booked interview and the avatar's last known presence in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewRecord {
    pub launch: ScheduledLaunch,
    /// `None` until the avatar has attempted the interview
    pub active: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct MaterializedState {
    pub interviews: HashMap<InterviewId, InterviewRecord>,
    /// Keyed by bot identity
    pub credentials: HashMap<String, Credential>,
}

impl MaterializedState {
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::InterviewBooked { launch } => {
                self.interviews.insert(
                    launch.interview_id.clone(),
                    InterviewRecord {
                        launch: launch.clone(),
                        active: None,
                        updated_at: None,
                    },
                );
            }

            Operation::InterviewStatus {
                interview_id,
                active,
                at,
            } => {
                if let Some(record) = self.interviews.get_mut(interview_id) {
                    record.active = Some(*active);
                    record.updated_at = Some(*at);
                }
            }

            Operation::CredentialSaved { credential } => {
                self.credentials
                    .insert(credential.identity.clone(), credential.clone());
            }
        }
    }

    /// Booked launches whose time has come and that were never attempted,
    /// earliest first
    pub fn due(&self, now: DateTime<Utc>) -> Vec<ScheduledLaunch> {
        let mut due: Vec<_> = self
            .interviews
            .values()
            .filter(|r| r.active.is_none())
            .filter(|r| r.launch.status == LaunchStatus::Scheduled && r.launch.is_due(now))
            .map(|r| r.launch.clone())
            .collect();
        due.sort_by(|a, b| {
            a.launch_time
                .cmp(&b.launch_time)
                .then_with(|| a.interview_id.cmp(&b.interview_id))
        });
        due
    }

    pub fn interview(&self, id: &InterviewId) -> Option<&InterviewRecord> {
        self.interviews.get(id)
    }

    pub fn credential(&self, identity: &str) -> Option<&Credential> {
        self.credentials.get(identity)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
