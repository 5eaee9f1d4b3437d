// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Meeting state diagnosis
//!
//! Classifies what a page currently shows. Read-only: only `PageProbe`
//! methods are used, so the monitor can diagnose through its probe while
//! the delivery consumer owns the page.

use crate::ui;
use av_adapters::PageProbe;
use av_core::{DiagnosisResult, JoinCandidate, Locator, MeetingErrorKind, MeetingState};

const EXCERPT_CHARS: usize = 160;

/// Classify the page. Never fails; an unreadable page is `unknown`.
///
/// Precedence: error > needs_auth > needs_join > already_in_meeting > unknown.
pub async fn diagnose<P: PageProbe + ?Sized>(page: &P) -> DiagnosisResult {
    let url = page.current_url().await.unwrap_or_default();
    let text = match page.visible_text().await {
        Ok(text) => text.to_lowercase(),
        Err(e) => {
            return DiagnosisResult::new(
                MeetingState::Unknown,
                format!("page unreadable: {e}"),
                url,
            )
        }
    };

    if let Some((kind, evidence)) = classify_error(&text, &url) {
        return DiagnosisResult::new(MeetingState::Error(kind), evidence, url);
    }

    if let Some(evidence) = auth_marker(&text, &url) {
        return DiagnosisResult::new(MeetingState::NeedsAuth, evidence, url);
    }
    if let Some(selector) = first_interactable(page, ui::AUTH_INPUTS).await {
        return DiagnosisResult::new(
            MeetingState::NeedsAuth,
            format!("sign-in field {selector}"),
            url,
        );
    }

    let candidates = join_candidates(page).await;
    if !candidates.is_empty() {
        let labels: Vec<&str> = candidates.iter().map(|c| c.label.as_str()).collect();
        let evidence = format!("join controls: {}", labels.join(", "));
        return DiagnosisResult::new(MeetingState::NeedsJoin, evidence, url)
            .with_candidates(candidates);
    }

    let groups = control_groups(page).await;
    if groups.len() >= 2 {
        return DiagnosisResult::new(
            MeetingState::AlreadyInMeeting,
            format!("meeting controls: {}", groups.join(", ")),
            url,
        );
    }

    DiagnosisResult::new(MeetingState::Unknown, excerpt(&text), url)
}

/// Error phrase or URL marker, with the evidence that matched
pub fn classify_error(text: &str, url: &str) -> Option<(MeetingErrorKind, String)> {
    for (kind, phrases) in ui::ERROR_PHRASES {
        if let Some(phrase) = phrases.iter().find(|p| text.contains(*p)) {
            return Some((*kind, format!("matched \"{phrase}\"")));
        }
    }
    ui::ERROR_URL_MARKERS
        .iter()
        .find(|m| url.contains(*m))
        .map(|m| (MeetingErrorKind::Generic, format!("error url marker {m}")))
}

pub fn auth_marker(text: &str, url: &str) -> Option<String> {
    if let Some(phrase) = ui::AUTH_PHRASES.iter().find(|p| text.contains(*p)) {
        return Some(format!("matched \"{phrase}\""));
    }
    ui::AUTH_URL_MARKERS
        .iter()
        .find(|m| url.contains(*m))
        .map(|m| format!("sign-in url marker {m}"))
}

/// Known join controls that are currently clickable, most specific first
async fn join_candidates<P: PageProbe + ?Sized>(page: &P) -> Vec<JoinCandidate> {
    let mut found = Vec::new();
    for candidate in ui::join_controls() {
        let av_core::JoinAction::Click(locator) = &candidate.action else {
            continue;
        };
        if is_interactable(page, locator).await {
            found.push(candidate);
        }
    }
    found
}

async fn control_groups<P: PageProbe + ?Sized>(page: &P) -> Vec<&'static str> {
    let mut present = Vec::new();
    for (group, selectors) in ui::CONTROL_GROUPS {
        if first_visible(page, selectors).await.is_some() {
            present.push(*group);
        }
    }
    present
}

async fn first_interactable<P: PageProbe + ?Sized>(
    page: &P,
    selectors: &[&'static str],
) -> Option<&'static str> {
    for selector in selectors {
        if is_interactable(page, &Locator::css(*selector)).await {
            return Some(selector);
        }
    }
    None
}

/// First selector with a visible match. Toggles count even when disabled.
pub(crate) async fn first_visible<P: PageProbe + ?Sized>(
    page: &P,
    selectors: &[&'static str],
) -> Option<&'static str> {
    for selector in selectors {
        let found = page
            .find(&Locator::css(*selector))
            .await
            .unwrap_or_default();
        if found.iter().any(|e| e.visible) {
            return Some(selector);
        }
    }
    None
}

pub(crate) async fn is_interactable<P: PageProbe + ?Sized>(page: &P, locator: &Locator) -> bool {
    page.find(locator)
        .await
        .map(|found| found.iter().any(|e| e.is_interactable()))
        .unwrap_or(false)
}

fn excerpt(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return "blank page".to_string();
    }
    match collapsed.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &collapsed[..cut]),
        None => collapsed,
    }
}

#[cfg(test)]
#[path = "diagnose_tests.rs"]
mod tests;
