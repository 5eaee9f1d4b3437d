// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Point-in-time classification of what a meeting page shows

use serde::{Deserialize, Serialize};

/// How to find an element on a page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "lowercase")]
pub enum Locator {
    /// CSS selector
    Css(String),
    /// Clickable element whose visible text or aria-label contains the
    /// given text (case-insensitive)
    Text(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Locator::Text(text.into())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css:{}", s),
            Locator::Text(t) => write!(f, "text:{}", t),
        }
    }
}

/// A UI action that may move the page towards being in the meeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinAction {
    Click(Locator),
    Shortcut(String),
}

/// A ranked join affordance found on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCandidate {
    /// Human-readable label, used in logs and for de-duplication
    pub label: String,
    pub action: JoinAction,
    /// Higher is more specific to the provider's real join control
    pub specificity: u8,
}

impl JoinCandidate {
    pub fn click(label: impl Into<String>, locator: Locator, specificity: u8) -> Self {
        Self {
            label: label.into(),
            action: JoinAction::Click(locator),
            specificity,
        }
    }
}

/// Sub-classification of an error page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingErrorKind {
    NotFound,
    Ended,
    AccessDenied,
    Full,
    /// Error page without a recognized phrase
    Generic,
}

impl MeetingErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            MeetingErrorKind::NotFound => "not_found",
            MeetingErrorKind::Ended => "ended",
            MeetingErrorKind::AccessDenied => "access_denied",
            MeetingErrorKind::Full => "full",
            MeetingErrorKind::Generic => "generic",
        }
    }
}

/// Discrete page state, listed in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingState {
    Error(MeetingErrorKind),
    NeedsAuth,
    NeedsJoin,
    AlreadyInMeeting,
    Unknown,
}

impl MeetingState {
    /// Lower wins when several signatures are present at once
    pub fn precedence(&self) -> u8 {
        match self {
            MeetingState::Error(_) => 0,
            MeetingState::NeedsAuth => 1,
            MeetingState::NeedsJoin => 2,
            MeetingState::AlreadyInMeeting => 3,
            MeetingState::Unknown => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MeetingState::Error(_) => "error",
            MeetingState::NeedsAuth => "needs_auth",
            MeetingState::NeedsJoin => "needs_join",
            MeetingState::AlreadyInMeeting => "already_in_meeting",
            MeetingState::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for MeetingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeetingState::Error(kind) => write!(f, "error({})", kind.name()),
            other => f.write_str(other.name()),
        }
    }
}

/// Result of diagnosing a page. Never persisted; recomputed on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub state: MeetingState,
    /// Free-form evidence: matched phrase, marker, or a text excerpt
    pub evidence: String,
    /// Join affordances, most specific first
    pub join_candidates: Vec<JoinCandidate>,
    pub url: String,
}

impl DiagnosisResult {
    pub fn new(state: MeetingState, evidence: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            state,
            evidence: evidence.into(),
            join_candidates: Vec::new(),
            url: url.into(),
        }
    }

    /// Attach candidates, ranked by descending specificity (stable for ties)
    pub fn with_candidates(mut self, mut candidates: Vec<JoinCandidate>) -> Self {
        candidates.sort_by(|a, b| b.specificity.cmp(&a.specificity));
        self.join_candidates = candidates;
        self
    }

    pub fn is_in_meeting(&self) -> bool {
        self.state == MeetingState::AlreadyInMeeting
    }

    /// Highest-ranked candidate whose label is not in `tried`
    pub fn best_untried<'a>(&'a self, tried: &[String]) -> Option<&'a JoinCandidate> {
        self.join_candidates
            .iter()
            .find(|c| !tried.iter().any(|t| t == &c.label))
    }
}

#[cfg(test)]
#[path = "diagnosis_tests.rs"]
mod tests;
