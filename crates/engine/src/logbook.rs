// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-interview launch logs, kept for the life of the process

use av_core::{Clock, InterviewId, LaunchLog, LaunchLogEntry};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Shared set of launch logs. Every entry is mirrored to tracing.
#[derive(Clone)]
pub struct LaunchLogs<C: Clock> {
    logs: Arc<Mutex<HashMap<InterviewId, LaunchLog>>>,
    capacity: usize,
    clock: C,
}

impl<C: Clock> LaunchLogs<C> {
    pub fn new(capacity: usize, clock: C) -> Self {
        Self {
            logs: Arc::new(Mutex::new(HashMap::new())),
            capacity,
            clock,
        }
    }

    /// Writer bound to one interview
    pub fn writer(&self, interview_id: &InterviewId) -> StepLog<C> {
        StepLog {
            logs: self.clone(),
            interview_id: interview_id.clone(),
        }
    }

    pub fn record(&self, interview_id: &InterviewId, step: &str, success: bool, detail: &str) {
        if success {
            tracing::info!(interview_id = %interview_id, step, detail, "launch step");
        } else {
            tracing::warn!(interview_id = %interview_id, step, detail, "launch step failed");
        }
        let now = self.clock.now();
        let mut logs = self.logs.lock().unwrap_or_else(|e| e.into_inner());
        logs.entry(interview_id.clone())
            .or_insert_with(|| LaunchLog::new(self.capacity))
            .append(step, success, detail, now);
    }

    /// Snapshot of one interview's entries, oldest first
    pub fn entries(&self, interview_id: &InterviewId) -> Vec<LaunchLogEntry> {
        let logs = self.logs.lock().unwrap_or_else(|e| e.into_inner());
        logs.get(interview_id).map(LaunchLog::to_vec).unwrap_or_default()
    }
}

/// Launch log handle for a single interview
#[derive(Clone)]
pub struct StepLog<C: Clock> {
    logs: LaunchLogs<C>,
    interview_id: InterviewId,
}

impl<C: Clock> StepLog<C> {
    pub fn ok(&self, step: &str, detail: impl AsRef<str>) {
        self.logs.record(&self.interview_id, step, true, detail.as_ref());
    }

    pub fn failed(&self, step: &str, detail: impl AsRef<str>) {
        self.logs.record(&self.interview_id, step, false, detail.as_ref());
    }

    pub fn interview_id(&self) -> &InterviewId {
        &self.interview_id
    }
}
