// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const CHAT_BOX: &str = "textarea[aria-label*='message' i]";

fn lobby_driver() -> FakeDriver {
    FakeDriver::new()
        .screen(
            "lobby",
            FakeScreen::new("https://meet.example.com/abc")
                .with_text("Ready to join?")
                .with_element(FakeElement::button("Join now").leads_to("meeting")),
        )
        .screen(
            "meeting",
            FakeScreen::new("https://meet.example.com/abc")
                .with_element(FakeElement::chat_input(CHAT_BOX)),
        )
        .route("https://meet.example.com/abc", "lobby")
}

#[tokio::test]
async fn navigate_follows_routes_and_click_switches_screens() {
    let driver = lobby_driver();
    let mut page = driver.open().await.unwrap();

    page.navigate("https://meet.example.com/abc").await.unwrap();
    assert!(page.visible_text().await.unwrap().contains("Ready to join?"));

    page.click(&Locator::text("join now")).await.unwrap();
    assert_eq!(driver.current_screen(), "meeting");
}

#[tokio::test]
async fn click_requires_enabled_element() {
    let driver = FakeDriver::new()
        .screen(
            "lobby",
            FakeScreen::new("u").with_element(FakeElement::button("Join now").disabled()),
        )
        .start_on("lobby");
    let mut page = driver.open().await.unwrap();

    let err = page.click(&Locator::text("join now")).await.unwrap_err();
    assert!(matches!(err, DriverError::ElementNotFound(_)));
}

#[tokio::test]
async fn typed_chat_text_is_sent_on_enter() {
    let driver = lobby_driver().start_on("meeting");
    let mut page = driver.open().await.unwrap();

    page.type_text(&Locator::css(CHAT_BOX), "Hello").await.unwrap();
    assert!(driver.sent_texts().is_empty());
    page.press_keys(&KeyChord::enter()).await.unwrap();

    assert_eq!(driver.sent_texts(), ["Hello"]);
}

#[tokio::test]
async fn closed_page_rejects_calls_and_probe_goes_unresponsive() {
    let driver = lobby_driver();
    let mut page = driver.open().await.unwrap();
    let probe = page.probe();
    assert!(probe.is_responsive().await);

    page.close().await.unwrap();
    assert!(matches!(page.close().await, Err(DriverError::SessionGone)));
    assert!(matches!(
        page.reload().await,
        Err(DriverError::SessionGone)
    ));
    assert!(!probe.is_responsive().await);
    assert_eq!(driver.close_calls(), 2);
}

#[tokio::test]
async fn open_failure_is_acquire_error() {
    let driver = FakeDriver::new();
    driver.fail_open("grid unavailable");

    let err = driver.open().await.err().unwrap();
    assert_eq!(err, DriverError::AcquireFailed("grid unavailable".into()));
}

#[tokio::test]
async fn navigation_failures_are_consumed() {
    let driver = lobby_driver();
    driver.fail_navigations(1);
    let mut page = driver.open().await.unwrap();

    assert!(page.navigate("https://meet.example.com/abc").await.is_err());
    assert!(page.navigate("https://meet.example.com/abc").await.is_ok());
}
