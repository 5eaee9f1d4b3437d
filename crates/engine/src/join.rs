// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Join strategy engine
//!
//! A bounded state machine: each diagnosis picks the next step from a small
//! transition table, the step runs, the page settles, and the page is
//! diagnosed again. The engine only touches the page it is given.

use crate::diagnose::{diagnose, first_visible, is_interactable};
use crate::logbook::StepLog;
use crate::ui;
use av_adapters::{DriverError, KeyChord, Page};
use av_core::{Clock, DiagnosisResult, JoinAction, JoinCandidate, Locator, MeetingState};
use std::time::Duration;

pub const JOIN_ATTEMPT: &str = "join_attempt";

/// Result of one join pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    /// Terminal; needs a credential we do not have
    AuthRequired { reason: String },
    Failed { reason: String, trail: Vec<String> },
}

impl JoinOutcome {
    pub fn is_joined(&self) -> bool {
        matches!(self, JoinOutcome::Joined)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Recover,
    Click(JoinCandidate),
    Heuristics,
    Joined,
    AuthRequired(String),
    GiveUp(String),
}

#[derive(Debug, Default)]
struct Progress {
    recovered: bool,
    heuristics_tried: bool,
    name_filled: bool,
    tried: Vec<String>,
}

impl Progress {
    fn acted(&self) -> bool {
        self.recovered || self.heuristics_tried || !self.tried.is_empty()
    }
}

/// Transition table
fn next_step(diagnosis: &DiagnosisResult, progress: &Progress, candidate_limit: usize) -> Step {
    match diagnosis.state {
        MeetingState::AlreadyInMeeting => Step::Joined,
        MeetingState::NeedsAuth => Step::AuthRequired(format!(
            "meeting requires sign-in: {}",
            diagnosis.evidence
        )),
        MeetingState::Error(_) if !progress.recovered => Step::Recover,
        MeetingState::Error(kind) => Step::GiveUp(format!(
            "meeting error ({}) persisted after recovery",
            kind.name()
        )),
        MeetingState::NeedsJoin if progress.tried.len() >= candidate_limit => {
            Step::GiveUp(format!("no entry after {} join clicks", progress.tried.len()))
        }
        MeetingState::NeedsJoin => match diagnosis.best_untried(&progress.tried) {
            Some(candidate) => Step::Click(candidate.clone()),
            None => Step::GiveUp("join candidates exhausted".to_string()),
        },
        MeetingState::Unknown if !progress.heuristics_tried => Step::Heuristics,
        MeetingState::Unknown => Step::GiveUp("page state not recognized".to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct JoinEngine {
    stabilization_delay: Duration,
    candidate_limit: usize,
    guest_name: String,
}

impl JoinEngine {
    pub fn new(
        stabilization_delay: Duration,
        candidate_limit: usize,
        guest_name: impl Into<String>,
    ) -> Self {
        Self {
            stabilization_delay,
            candidate_limit: candidate_limit.max(1),
            guest_name: guest_name.into(),
        }
    }

    /// Drive the page from `diagnosis` towards being in the meeting. Every
    /// action is logged as a join attempt; a sign-in prompt stops the pass
    /// without any.
    pub async fn attempt_join<C: Clock>(
        &self,
        page: &mut dyn Page,
        mut diagnosis: DiagnosisResult,
        meeting_url: &str,
        log: &StepLog<C>,
    ) -> JoinOutcome {
        let mut progress = Progress::default();
        let mut trail = vec![diagnosis.state.to_string()];

        loop {
            match next_step(&diagnosis, &progress, self.candidate_limit) {
                Step::Joined => {
                    if !progress.acted() {
                        log.ok(JOIN_ATTEMPT, format!("already in meeting: {}", diagnosis.evidence));
                    }
                    return JoinOutcome::Joined;
                }
                Step::AuthRequired(reason) => return JoinOutcome::AuthRequired { reason },
                Step::GiveUp(reason) => return JoinOutcome::Failed { reason, trail },
                Step::Recover => {
                    progress.recovered = true;
                    match recover(page, meeting_url).await {
                        Ok(how) => log.ok(JOIN_ATTEMPT, format!("{} recovery: {how}", diagnosis.state)),
                        Err(e) => log.failed(JOIN_ATTEMPT, format!("{} recovery: {e}", diagnosis.state)),
                    }
                }
                Step::Click(candidate) => {
                    progress.tried.push(candidate.label.clone());
                    if !progress.name_filled {
                        progress.name_filled = true;
                        self.fill_guest_name(page).await;
                    }
                    match perform(page, &candidate.action).await {
                        Ok(()) => log.ok(JOIN_ATTEMPT, format!("clicked {}", candidate.label)),
                        Err(e) => log.failed(JOIN_ATTEMPT, format!("{}: {e}", candidate.label)),
                    }
                }
                Step::Heuristics => {
                    progress.heuristics_tried = true;
                    match heuristics(page).await {
                        Some(action) => log.ok(JOIN_ATTEMPT, format!("heuristic: {action}")),
                        None => log.failed(JOIN_ATTEMPT, "heuristic: no join-like affordance"),
                    }
                }
            }

            tokio::time::sleep(self.stabilization_delay).await;
            diagnosis = diagnose(&*page).await;
            tracing::debug!(state = %diagnosis.state, evidence = %diagnosis.evidence, "re-diagnosed");
            trail.push(diagnosis.state.to_string());
        }
    }

    async fn fill_guest_name(&self, page: &mut dyn Page) {
        let Some(selector) = first_visible(&*page, ui::GUEST_NAME_INPUT).await else {
            return;
        };
        if let Err(e) = page
            .type_text(&Locator::css(selector), &self.guest_name)
            .await
        {
            tracing::debug!(error = %e, "could not fill guest name");
        }
    }
}

/// Reload; if that fails, navigate away and back
async fn recover(page: &mut dyn Page, meeting_url: &str) -> Result<&'static str, DriverError> {
    match page.reload().await {
        Ok(()) => Ok("reload"),
        Err(e) => {
            tracing::debug!(error = %e, "reload failed, re-navigating");
            page.navigate("about:blank").await?;
            page.navigate(meeting_url).await?;
            Ok("navigate away and back")
        }
    }
}

async fn perform(page: &mut dyn Page, action: &JoinAction) -> Result<(), DriverError> {
    match action {
        JoinAction::Click(locator) => page.click(locator).await,
        JoinAction::Shortcut(chord) => {
            let chord: KeyChord = chord.parse().map_err(DriverError::Protocol)?;
            page.press_keys(&chord).await
        }
    }
}

/// Any join-like affordance, then known shortcuts. Returns what was done.
async fn heuristics(page: &mut dyn Page) -> Option<String> {
    for label in ui::HEURISTIC_LABELS {
        let locator = Locator::text(*label);
        if is_interactable(&*page, &locator).await && page.click(&locator).await.is_ok() {
            return Some(format!("clicked \"{label}\""));
        }
    }
    for selector in ui::HEURISTIC_SELECTORS {
        let locator = Locator::css(*selector);
        if is_interactable(&*page, &locator).await && page.click(&locator).await.is_ok() {
            return Some(format!("clicked {selector}"));
        }
    }
    for shortcut in ui::JOIN_SHORTCUTS {
        let Ok(chord) = shortcut.parse::<KeyChord>() else {
            continue;
        };
        if page.press_keys(&chord).await.is_ok() {
            return Some(format!("pressed {chord}"));
        }
    }
    None
}

#[cfg(test)]
#[path = "join_tests.rs"]
mod tests;
