// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the avatar engine

use av_core::{InterviewId, LaunchStatus};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Launch step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchStep {
    Acquire,
    Authenticate,
    Navigate,
    Join,
    Activate,
}

impl LaunchStep {
    pub fn name(&self) -> &'static str {
        match self {
            LaunchStep::Acquire => "acquire",
            LaunchStep::Authenticate => "authenticate",
            LaunchStep::Navigate => "navigate",
            LaunchStep::Join => "join",
            LaunchStep::Activate => "activate",
        }
    }
}

impl fmt::Display for LaunchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure taxonomy. Every kind is fatal for the launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchErrorKind {
    /// No browser session could be started; not retried
    Acquisition,
    /// The meeting demands a sign-in we cannot satisfy
    Authentication,
    /// Navigation or join attempts exhausted
    Join,
    /// Timers or registration could not be set up
    Activation,
    /// Cancelled or shut down before the session went active
    Cancelled,
}

impl LaunchErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            LaunchErrorKind::Acquisition => "acquisition",
            LaunchErrorKind::Authentication => "authentication",
            LaunchErrorKind::Join => "join",
            LaunchErrorKind::Activation => "activation",
            LaunchErrorKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LaunchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error during {step}: {cause}")]
pub struct LaunchError {
    pub step: LaunchStep,
    pub kind: LaunchErrorKind,
    /// Internal detail; never shown to recruiters
    pub cause: String,
    /// Diagnosed page states, oldest first, for join failures
    pub trail: Vec<String>,
}

impl LaunchError {
    fn new(step: LaunchStep, kind: LaunchErrorKind, cause: impl Into<String>) -> Self {
        Self {
            step,
            kind,
            cause: cause.into(),
            trail: Vec::new(),
        }
    }

    pub fn acquisition(cause: impl Into<String>) -> Self {
        Self::new(LaunchStep::Acquire, LaunchErrorKind::Acquisition, cause)
    }

    pub fn authentication(cause: impl Into<String>) -> Self {
        Self::new(LaunchStep::Authenticate, LaunchErrorKind::Authentication, cause)
    }

    /// Navigation failures surface as join failures
    pub fn navigation(cause: impl Into<String>) -> Self {
        Self::new(LaunchStep::Navigate, LaunchErrorKind::Join, cause)
    }

    pub fn join(cause: impl Into<String>, trail: Vec<String>) -> Self {
        Self {
            trail,
            ..Self::new(LaunchStep::Join, LaunchErrorKind::Join, cause)
        }
    }

    pub fn activation(cause: impl Into<String>) -> Self {
        Self::new(LaunchStep::Activate, LaunchErrorKind::Activation, cause)
    }

    pub fn cancelled(step: LaunchStep) -> Self {
        Self::new(step, LaunchErrorKind::Cancelled, "stopped before activation")
    }

    /// Short reason safe to show a recruiter
    pub fn user_reason(&self) -> &'static str {
        match self.kind {
            LaunchErrorKind::Acquisition => "avatar join failed: automation unavailable",
            LaunchErrorKind::Authentication => "avatar join failed: sign-in required",
            LaunchErrorKind::Join | LaunchErrorKind::Activation => "avatar join failed",
            LaunchErrorKind::Cancelled => "avatar launch cancelled",
        }
    }
}

/// Session registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("session registry is shut down")]
    Closed,
    #[error("unknown interview: {0}")]
    UnknownInterview(InterviewId),
    #[error("interview {interview_id} cannot move from {from} to {to}")]
    InvalidTransition {
        interview_id: InterviewId,
        from: LaunchStatus,
        to: LaunchStatus,
    },
    #[error("a session for {0} is already registered")]
    SessionExists(InterviewId),
}

/// A session outlived its maximum duration and was forced down
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("session ran {elapsed:?}, past its {limit:?} limit")]
pub struct MonitorTimeout {
    pub limit: Duration,
    pub elapsed: Duration,
}

/// Hand-off from the scheduler to the controller failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandoffError {
    #[error("runtime is shutting down")]
    ShuttingDown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        acquisition = { LaunchError::acquisition("grid down"), "avatar join failed: automation unavailable" },
        authentication = { LaunchError::authentication("needs_auth"), "avatar join failed: sign-in required" },
        navigation = { LaunchError::navigation("timeout"), "avatar join failed" },
        join = { LaunchError::join("exhausted", vec![]), "avatar join failed" },
        cancelled = { LaunchError::cancelled(LaunchStep::Join), "avatar launch cancelled" },
    )]
    fn user_reason_hides_cause(error: LaunchError, reason: &str) {
        assert_eq!(error.user_reason(), reason);
        assert!(!error.user_reason().contains(&error.cause));
    }

    #[test]
    fn cancelled_cause_is_distinct_from_reason() {
        let error = LaunchError::cancelled(LaunchStep::Navigate);
        assert_eq!(error.cause, "stopped before activation");
        assert_eq!(error.to_string(), "cancelled error during navigate: stopped before activation");
    }

    #[test]
    fn display_names_step_and_kind() {
        let error = LaunchError::navigation("timed out: navigate");
        assert_eq!(error.to_string(), "join error during navigate: timed out: navigate");
    }
}
