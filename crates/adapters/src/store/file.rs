// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Journal-backed store

use super::{CredentialStore, InterviewStore, StoreError};
use async_trait::async_trait;
use av_core::{Credential, InterviewId, Operation, ScheduledLaunch};
use av_storage::Journal;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Interview and credential store persisted to a WAL file
#[derive(Clone)]
pub struct FileStore {
    journal: Arc<Mutex<Journal>>,
}

impl FileStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let journal = Journal::open(path).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self {
            journal: Arc::new(Mutex::new(journal)),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Journal> {
        self.journal.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a booking; the scheduler picks it up once due
    pub fn book(&self, launch: ScheduledLaunch) -> Result<(), StoreError> {
        self.lock()
            .record(Operation::InterviewBooked { launch }, Utc::now())?;
        Ok(())
    }

    /// Last recorded presence for an interview
    pub fn interview_active(&self, interview_id: &InterviewId) -> Option<bool> {
        self.lock()
            .state()
            .interview(interview_id)
            .and_then(|r| r.active)
    }
}

#[async_trait]
impl InterviewStore for FileStore {
    async fn scheduled_interviews_due(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScheduledLaunch>, StoreError> {
        Ok(self.lock().state().due(now))
    }

    async fn persist_interview_status(
        &self,
        interview_id: &InterviewId,
        active: bool,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        self.lock().record(
            Operation::InterviewStatus {
                interview_id: interview_id.clone(),
                active,
                at: now,
            },
            now,
        )?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn reusable_credential(&self, identity: &str) -> Result<Option<Credential>, StoreError> {
        Ok(self
            .lock()
            .state()
            .credential(identity)
            .filter(|c| c.is_usable())
            .cloned())
    }

    async fn save_credential(
        &self,
        identity: &str,
        credential: Credential,
    ) -> Result<(), StoreError> {
        let credential = Credential {
            identity: identity.to_string(),
            ..credential
        };
        self.lock()
            .record(Operation::CredentialSaved { credential }, Utc::now())?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
