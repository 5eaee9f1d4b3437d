// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interview and credential persistence
//!
//! The avatar does not own interview records; it reads due launches and
//! writes back presence through these narrow interfaces.

mod file;

pub use file::FileStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeStore, StoreCall};

use async_trait::async_trait;
use av_core::{Credential, InterviewId, ScheduledLaunch};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
}

impl From<av_storage::WalError> for StoreError {
    fn from(e: av_storage::WalError) -> Self {
        StoreError::WriteFailed(e.to_string())
    }
}

#[async_trait]
pub trait InterviewStore: Clone + Send + Sync + 'static {
    /// Booked interviews whose launch time is at or before `now`
    async fn scheduled_interviews_due(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScheduledLaunch>, StoreError>;

    async fn persist_interview_status(
        &self,
        interview_id: &InterviewId,
        active: bool,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CredentialStore: Clone + Send + Sync + 'static {
    async fn reusable_credential(&self, identity: &str) -> Result<Option<Credential>, StoreError>;

    async fn save_credential(
        &self,
        identity: &str,
        credential: Credential,
    ) -> Result<(), StoreError>;
}
