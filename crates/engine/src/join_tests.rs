// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::logbook::LaunchLogs;
use av_adapters::{AutomationDriver, FakeDriver, FakeElement, FakeScreen, PageCall};
use av_core::{FakeClock, InterviewId, MeetingErrorKind};
use yare::parameterized;

const MEET: &str = "https://meet.example.com/abc-defg-hij";

fn meeting() -> FakeScreen {
    FakeScreen::new(MEET)
        .with_element(FakeElement::css(ui::MIC_TOGGLE[0], "Turn off microphone"))
        .with_element(FakeElement::css(ui::CHAT_TOGGLE[0], "Chat with everyone"))
}

fn lobby() -> FakeScreen {
    FakeScreen::new(MEET)
        .with_text("Ready to join?")
        .with_element(FakeElement::button("Join now").leads_to("meeting"))
}

fn engine(limit: usize) -> JoinEngine {
    JoinEngine::new(Duration::from_secs(3), limit, "AI Interviewer")
}

struct Harness {
    driver: FakeDriver,
    logs: LaunchLogs<FakeClock>,
    id: InterviewId,
}

impl Harness {
    fn new(driver: FakeDriver) -> Self {
        Self {
            driver: driver.screen("meeting", meeting()),
            logs: LaunchLogs::new(50, FakeClock::new()),
            id: InterviewId::new("int-1"),
        }
    }

    async fn run(&self, engine: &JoinEngine) -> JoinOutcome {
        let mut page = self.driver.open().await.unwrap();
        let first = diagnose(page.as_ref()).await;
        let log = self.logs.writer(&self.id);
        engine.attempt_join(page.as_mut(), first, MEET, &log).await
    }

    fn attempts(&self) -> Vec<(bool, String)> {
        self.logs
            .entries(&self.id)
            .into_iter()
            .filter(|e| e.step_name == JOIN_ATTEMPT)
            .map(|e| (e.success, e.detail))
            .collect()
    }
}

fn diagnosis(state: MeetingState) -> DiagnosisResult {
    DiagnosisResult::new(state, "evidence", MEET)
}

#[parameterized(
    in_meeting = { MeetingState::AlreadyInMeeting, false, Step::Joined },
    error_first = { MeetingState::Error(MeetingErrorKind::Ended), false, Step::Recover },
    unknown_first = { MeetingState::Unknown, false, Step::Heuristics },
)]
fn first_step_by_state(state: MeetingState, recovered: bool, expected: Step) {
    let mut progress = Progress::default();
    progress.recovered = recovered;
    assert_eq!(next_step(&diagnosis(state), &progress, 4), expected);
}

#[test]
fn needs_auth_is_terminal() {
    let step = next_step(&diagnosis(MeetingState::NeedsAuth), &Progress::default(), 4);
    assert!(matches!(step, Step::AuthRequired(reason) if reason.contains("sign-in")));
}

#[test]
fn error_after_recovery_gives_up() {
    let progress = Progress {
        recovered: true,
        ..Progress::default()
    };
    let step = next_step(&diagnosis(MeetingState::Error(MeetingErrorKind::Full)), &progress, 4);
    assert!(matches!(step, Step::GiveUp(reason) if reason.contains("full")));
}

#[test]
fn unknown_after_heuristics_gives_up() {
    let progress = Progress {
        heuristics_tried: true,
        ..Progress::default()
    };
    let step = next_step(&diagnosis(MeetingState::Unknown), &progress, 4);
    assert!(matches!(step, Step::GiveUp(_)));
}

#[test]
fn needs_join_clicks_best_untried_candidate() {
    let result = diagnosis(MeetingState::NeedsJoin).with_candidates(vec![
        JoinCandidate::click("join", Locator::text("join"), 10),
        JoinCandidate::click("join now", Locator::text("join now"), 90),
    ]);
    let mut progress = Progress::default();

    let first = next_step(&result, &progress, 4);
    assert!(matches!(&first, Step::Click(c) if c.label == "join now"));

    progress.tried.push("join now".to_string());
    let second = next_step(&result, &progress, 4);
    assert!(matches!(&second, Step::Click(c) if c.label == "join"));

    progress.tried.push("join".to_string());
    assert!(matches!(next_step(&result, &progress, 4), Step::GiveUp(_)));
}

#[test]
fn candidate_limit_caps_clicks() {
    let result = diagnosis(MeetingState::NeedsJoin)
        .with_candidates(vec![JoinCandidate::click("join now", Locator::text("join now"), 90)]);
    let progress = Progress {
        tried: vec!["something".to_string()],
        ..Progress::default()
    };
    assert!(matches!(next_step(&result, &progress, 1), Step::GiveUp(_)));
}

#[tokio::test(start_paused = true)]
async fn already_in_meeting_is_a_single_noop_attempt() {
    let h = Harness::new(FakeDriver::new().start_on("meeting"));

    let outcome = h.run(&engine(4)).await;

    assert!(outcome.is_joined());
    let attempts = h.attempts();
    assert_eq!(attempts.len(), 1);
    assert!(attempts[0].1.starts_with("already in meeting"));
    assert!(!h.driver.calls().iter().any(|c| matches!(c, PageCall::Click(_))));
}

#[tokio::test(start_paused = true)]
async fn lobby_click_joins() {
    let h = Harness::new(FakeDriver::new().screen("lobby", lobby()).start_on("lobby"));

    let outcome = h.run(&engine(4)).await;

    assert_eq!(outcome, JoinOutcome::Joined);
    assert_eq!(h.attempts(), [(true, "clicked join now".to_string())]);
    assert_eq!(h.driver.current_screen(), "meeting");
}

#[tokio::test(start_paused = true)]
async fn guest_name_is_typed_before_clicking() {
    let screen = lobby().with_element(FakeElement::css(ui::GUEST_NAME_INPUT[0], ""));
    let h = Harness::new(FakeDriver::new().screen("lobby", screen).start_on("lobby"));

    h.run(&engine(4)).await;

    let calls = h.driver.calls();
    let typed = calls.iter().position(|c| {
        matches!(c, PageCall::TypeText { text, .. } if text == "AI Interviewer")
    });
    let clicked = calls.iter().position(|c| matches!(c, PageCall::Click(_)));
    assert!(typed.unwrap() < clicked.unwrap());
}

#[tokio::test(start_paused = true)]
async fn needs_auth_stops_without_attempts() {
    let screen = FakeScreen::new(MEET)
        .with_text("Sign in to join")
        .with_element(FakeElement::button("Join now"));
    let h = Harness::new(FakeDriver::new().screen("auth", screen).start_on("auth"));

    let outcome = h.run(&engine(4)).await;

    assert!(matches!(outcome, JoinOutcome::AuthRequired { .. }));
    assert!(h.attempts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn error_page_recovers_with_reload() {
    let error = FakeScreen::new(MEET).with_text("Something happened. The meeting has ended");
    let driver = FakeDriver::new()
        .screen("error", error)
        .screen("lobby", lobby())
        .start_on("error")
        .after_reload("lobby");
    let h = Harness::new(driver);

    let outcome = h.run(&engine(4)).await;

    assert!(outcome.is_joined());
    let attempts = h.attempts();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0], (true, "error(ended) recovery: reload".to_string()));
}

#[tokio::test(start_paused = true)]
async fn persistent_error_fails_with_trail() {
    let error = FakeScreen::new(MEET).with_text("This call is full");
    let h = Harness::new(FakeDriver::new().screen("error", error).start_on("error"));

    let outcome = h.run(&engine(4)).await;

    match outcome {
        JoinOutcome::Failed { reason, trail } => {
            assert!(reason.contains("full"));
            assert_eq!(trail, ["error(full)", "error(full)"]);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(h.attempts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn unknown_page_tries_heuristics() {
    let interstitial = FakeScreen::new(MEET)
        .with_text("New: captions are here")
        .with_element(FakeElement::button("Got it").leads_to("lobby"));
    let driver = FakeDriver::new()
        .screen("interstitial", interstitial)
        .screen("lobby", lobby())
        .start_on("interstitial");
    let h = Harness::new(driver);

    let outcome = h.run(&engine(4)).await;

    assert!(outcome.is_joined());
    let attempts = h.attempts();
    assert_eq!(attempts[0], (true, "heuristic: clicked \"got it\"".to_string()));
    assert_eq!(attempts[1], (true, "clicked join now".to_string()));
}

#[tokio::test(start_paused = true)]
async fn join_like_label_is_preferred_over_dismissal() {
    let splash = FakeScreen::new(MEET)
        .with_text("Your meeting is ready")
        .with_element(FakeElement::button("Got it"))
        .with_element(FakeElement::button("Start meeting").leads_to("meeting"));
    let h = Harness::new(FakeDriver::new().screen("splash", splash).start_on("splash"));

    let outcome = h.run(&engine(4)).await;

    assert!(outcome.is_joined());
    assert_eq!(h.attempts()[0], (true, "heuristic: clicked \"start meeting\"".to_string()));
}

#[tokio::test(start_paused = true)]
async fn aria_labelled_join_control_is_clicked() {
    let icon_only = FakeScreen::new(MEET)
        .with_element(FakeElement::css(ui::HEURISTIC_SELECTORS[0], "").leads_to("meeting"));
    let h = Harness::new(FakeDriver::new().screen("icons", icon_only).start_on("icons"));

    let outcome = h.run(&engine(4)).await;

    assert!(outcome.is_joined());
    assert_eq!(
        h.attempts()[0],
        (true, format!("heuristic: clicked {}", ui::HEURISTIC_SELECTORS[0]))
    );
}

#[tokio::test(start_paused = true)]
async fn unknown_page_falls_back_to_shortcut() {
    let blank = FakeScreen::new(MEET).with_text("Please wait");
    let driver = FakeDriver::new()
        .screen("wait", blank)
        .start_on("wait")
        .after_keys("Enter", "meeting");
    let h = Harness::new(driver);

    let outcome = h.run(&engine(4)).await;

    assert!(outcome.is_joined());
    assert_eq!(h.attempts()[0], (true, "heuristic: pressed Enter".to_string()));
}

#[tokio::test(start_paused = true)]
async fn dead_join_button_exhausts_candidates() {
    let stuck = FakeScreen::new(MEET).with_element(FakeElement::button("Join now"));
    let h = Harness::new(FakeDriver::new().screen("stuck", stuck).start_on("stuck"));

    let outcome = h.run(&engine(4)).await;

    match outcome {
        JoinOutcome::Failed { reason, trail } => {
            assert_eq!(reason, "join candidates exhausted");
            assert_eq!(trail.len(), 3);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    // "join now" then the generic "join" match
    assert_eq!(h.attempts().len(), 2);
}
