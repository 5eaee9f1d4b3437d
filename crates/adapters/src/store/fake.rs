// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake interview/credential store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{CredentialStore, InterviewStore, StoreError};
use async_trait::async_trait;
use av_core::{Credential, InterviewId, ScheduledLaunch};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    DueQuery,
    PersistStatus {
        interview_id: InterviewId,
        active: bool,
    },
    GetCredential {
        identity: String,
    },
    SaveCredential {
        identity: String,
    },
}

#[derive(Default)]
struct State {
    booked: Vec<ScheduledLaunch>,
    statuses: HashMap<InterviewId, bool>,
    credentials: HashMap<String, Credential>,
    calls: Vec<StoreCall>,
    fail_due: Option<String>,
}

/// In-memory store. Due queries return booked launches that have no
/// persisted status yet.
#[derive(Clone, Default)]
pub struct FakeStore {
    state: Arc<Mutex<State>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn book(&self, launch: ScheduledLaunch) {
        self.lock().booked.push(launch);
    }

    pub fn set_credential(&self, credential: Credential) {
        self.lock()
            .credentials
            .insert(credential.identity.clone(), credential);
    }

    pub fn fail_due_queries(&self, reason: Option<String>) {
        self.lock().fail_due = reason;
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn status(&self, interview_id: &InterviewId) -> Option<bool> {
        self.lock().statuses.get(interview_id).copied()
    }

    /// Every persisted status for one interview, in order
    pub fn status_history(&self, interview_id: &InterviewId) -> Vec<bool> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                StoreCall::PersistStatus {
                    interview_id: id,
                    active,
                } if id == interview_id => Some(*active),
                _ => None,
            })
            .collect()
    }

    pub fn credential(&self, identity: &str) -> Option<Credential> {
        self.lock().credentials.get(identity).cloned()
    }
}

#[async_trait]
impl InterviewStore for FakeStore {
    async fn scheduled_interviews_due(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScheduledLaunch>, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::DueQuery);
        if let Some(reason) = &state.fail_due {
            return Err(StoreError::Unavailable(reason.clone()));
        }
        Ok(state
            .booked
            .iter()
            .filter(|l| l.is_due(now) && !state.statuses.contains_key(&l.interview_id))
            .cloned()
            .collect())
    }

    async fn persist_interview_status(
        &self,
        interview_id: &InterviewId,
        active: bool,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::PersistStatus {
            interview_id: interview_id.clone(),
            active,
        });
        state.statuses.insert(interview_id.clone(), active);
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FakeStore {
    async fn reusable_credential(&self, identity: &str) -> Result<Option<Credential>, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::GetCredential {
            identity: identity.to_string(),
        });
        Ok(state.credentials.get(identity).cloned())
    }

    async fn save_credential(
        &self,
        identity: &str,
        credential: Credential,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::SaveCredential {
            identity: identity.to_string(),
        });
        state.credentials.insert(identity.to_string(), credential);
        Ok(())
    }
}
