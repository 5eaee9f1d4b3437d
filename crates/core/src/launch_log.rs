// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-interview launch log for post-mortem diagnosis

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One recorded step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchLogEntry {
    pub step_name: String,
    pub success: bool,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only, bounded log. Once `capacity` is reached the oldest entries
/// are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchLog {
    entries: VecDeque<LaunchLogEntry>,
    capacity: usize,
    dropped: usize,
}

impl LaunchLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    pub fn append(
        &mut self,
        step_name: impl Into<String>,
        success: bool,
        detail: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(LaunchLogEntry {
            step_name: step_name.into(),
            success,
            detail: detail.into(),
            timestamp,
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &LaunchLogEntry> {
        self.entries.iter()
    }

    /// Entries for one step name, oldest first
    pub fn for_step<'a>(&'a self, step_name: &'a str) -> impl Iterator<Item = &'a LaunchLogEntry> {
        self.entries.iter().filter(move |e| e.step_name == step_name)
    }

    pub fn last(&self) -> Option<&LaunchLogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries evicted because of the capacity bound
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn to_vec(&self) -> Vec<LaunchLogEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
#[path = "launch_log_tests.rs"]
mod tests;
