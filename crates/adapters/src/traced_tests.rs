// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::driver::{FakeDriver, FakeElement, FakeScreen};
use crate::notify::FakeNotifyAdapter;
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

fn lobby() -> FakeDriver {
    FakeDriver::new()
        .screen(
            "lobby",
            FakeScreen::new("https://meet.example.com/abc")
                .with_element(FakeElement::button("Join now")),
        )
        .route("https://meet.example.com/abc", "lobby")
}

// =============================================================================
// Precondition validation tests
// =============================================================================

#[tokio::test]
async fn traced_page_rejects_relative_urls() {
    let driver = TracedDriver::new(lobby());
    let mut page = driver.open().await.unwrap();

    let err = page.navigate("meet.example.com/abc").await.unwrap_err();
    assert!(
        err.to_string().contains("not an absolute url"),
        "Expected error about url, got: {}",
        err
    );
}

// =============================================================================
// Tracing output verification tests
// =============================================================================

#[test]
fn traced_open_and_navigate_log_spans_and_timing() {
    let (logs, result) = with_tracing(|| async {
        let driver = TracedDriver::new(lobby());
        let mut page = driver.open().await?;
        page.navigate("https://meet.example.com/abc").await
    });

    assert!(result.is_ok(), "navigate should succeed: {:?}", result);
    assert!(logs.contains("driver.open"), "Should log open span. Logs:\n{}", logs);
    assert!(logs.contains("browser session started"), "Logs:\n{}", logs);
    assert!(logs.contains("page.navigate"), "Logs:\n{}", logs);
    assert!(logs.contains("meet.example.com/abc"), "Should log url. Logs:\n{}", logs);
    assert!(logs.contains("elapsed_ms"), "Should log timing. Logs:\n{}", logs);
}

#[test]
fn traced_open_logs_failure() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeDriver::new();
        fake.fail_open("grid unavailable");
        TracedDriver::new(fake).open().await.map(|_| ())
    });

    assert!(result.is_err());
    assert!(logs.contains("open failed"), "Logs:\n{}", logs);
    assert!(logs.contains("grid unavailable"), "Logs:\n{}", logs);
}

#[test]
fn traced_type_text_does_not_log_the_text() {
    let (logs, _) = with_tracing(|| async {
        let driver = TracedDriver::new(
            FakeDriver::new()
                .screen(
                    "form",
                    FakeScreen::new("https://accounts.example.com")
                        .with_element(FakeElement::css("input[type='password']", "")),
                )
                .start_on("form"),
        );
        let mut page = driver.open().await.unwrap();
        page.type_text(&Locator::css("input[type='password']"), "hunter2")
            .await
    });

    assert!(logs.contains("page.type_text"), "Logs:\n{}", logs);
    assert!(logs.contains("text_len=7"), "Logs:\n{}", logs);
    assert!(!logs.contains("hunter2"), "Password leaked. Logs:\n{}", logs);
}

#[test]
fn traced_click_failure_is_logged() {
    let (logs, result) = with_tracing(|| async {
        let driver = TracedDriver::new(lobby().start_on("lobby"));
        let mut page = driver.open().await.unwrap();
        page.click(&Locator::text("ask to join")).await
    });

    assert!(result.is_err());
    assert!(logs.contains("click failed"), "Logs:\n{}", logs);
}

#[test]
fn traced_notify_logs_channel() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeNotifyAdapter::new();
        let traced = TracedNotifyAdapter::new(fake.clone());
        traced.send("recruiter", "avatar join failed").await?;
        Ok::<_, NotifyError>(fake.calls().len())
    });

    assert_eq!(result.unwrap(), 1);
    assert!(logs.contains("notify.send"), "Logs:\n{}", logs);
    assert!(logs.contains("recruiter"), "Logs:\n{}", logs);
}
