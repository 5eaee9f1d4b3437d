// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interview identifiers

use serde::{Deserialize, Serialize};

/// Unique key of a booked interview; every launch, session and log is
/// partitioned by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterviewId(pub String);

impl InterviewId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InterviewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InterviewId {
    fn from(s: String) -> Self {
        InterviewId(s)
    }
}

impl From<&str> for InterviewId {
    fn from(s: &str) -> Self {
        InterviewId(s.to_string())
    }
}
