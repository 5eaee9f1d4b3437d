// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn precedence_orders_error_first() {
    let mut states = [
        MeetingState::Unknown,
        MeetingState::AlreadyInMeeting,
        MeetingState::NeedsJoin,
        MeetingState::Error(MeetingErrorKind::Full),
        MeetingState::NeedsAuth,
    ];
    states.sort_by_key(|s| s.precedence());
    assert_eq!(
        states,
        [
            MeetingState::Error(MeetingErrorKind::Full),
            MeetingState::NeedsAuth,
            MeetingState::NeedsJoin,
            MeetingState::AlreadyInMeeting,
            MeetingState::Unknown,
        ]
    );
}

#[test]
fn candidates_are_ranked_by_specificity() {
    let diagnosis = DiagnosisResult::new(MeetingState::NeedsJoin, "", "u").with_candidates(vec![
        JoinCandidate::click("Join", Locator::text("join"), 10),
        JoinCandidate::click("Join now", Locator::text("join now"), 90),
        JoinCandidate::click("Ask to join", Locator::text("ask to join"), 80),
    ]);
    let labels: Vec<_> = diagnosis.join_candidates.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, ["Join now", "Ask to join", "Join"]);
}

#[test]
fn best_untried_skips_tried_labels() {
    let diagnosis = DiagnosisResult::new(MeetingState::NeedsJoin, "", "u").with_candidates(vec![
        JoinCandidate::click("Join now", Locator::text("join now"), 90),
        JoinCandidate::click("Join", Locator::text("join"), 10),
    ]);
    let tried = vec!["Join now".to_string()];
    assert_eq!(diagnosis.best_untried(&tried).map(|c| c.label.as_str()), Some("Join"));

    let tried = vec!["Join now".to_string(), "Join".to_string()];
    assert!(diagnosis.best_untried(&tried).is_none());
}

#[test]
fn error_state_displays_its_kind() {
    let state = MeetingState::Error(MeetingErrorKind::AccessDenied);
    assert_eq!(state.to_string(), "error(access_denied)");
    assert_eq!(state.name(), "error");
}
