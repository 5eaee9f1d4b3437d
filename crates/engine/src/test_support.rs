// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine unit tests
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::delivery::DeliveryQueue;
use crate::logbook::LaunchLogs;
use crate::registry::RegistryHandle;
use crate::teardown::Teardown;
use crate::ui;
use av_adapters::{AutomationDriver, FakeDriver, FakeElement, FakeScreen, FakeStore, Page, PageProbe};
use av_core::{
    AutomationSession, Clock, EventBus, FakeClock, InterviewId, MeetingConfig, QuestionPlan,
    ScheduledLaunch, SessionStatus,
};
use std::sync::Arc;

pub(crate) const MEET: &str = "https://meet.example.com/abc-defg-hij";

/// In-meeting screen with its chat panel open
pub(crate) fn meeting_screen() -> FakeScreen {
    FakeScreen::new(MEET)
        .with_element(FakeElement::css(ui::MIC_TOGGLE[0], "Turn off microphone"))
        .with_element(FakeElement::css(ui::CAMERA_TOGGLE[0], "Turn off camera"))
        .with_element(FakeElement::css(ui::CHAT_TOGGLE[0], "Chat with everyone"))
        .with_element(FakeElement::chat_input(ui::CHAT_INPUT[0]))
}

pub(crate) fn lobby_screen() -> FakeScreen {
    FakeScreen::new(MEET)
        .with_text("Ready to join?")
        .with_element(FakeElement::css(ui::MIC_TOGGLE[0], "Turn off microphone"))
        .with_element(FakeElement::button("Join now").leads_to("meeting"))
}

pub(crate) fn meeting() -> MeetingConfig {
    MeetingConfig::new(MEET, "Ada", "Engineer")
}

pub(crate) struct Active {
    pub teardown: Teardown<FakeStore, FakeClock>,
    pub registry: RegistryHandle,
    pub driver: FakeDriver,
    pub store: FakeStore,
    pub bus: EventBus,
    pub id: InterviewId,
    /// Read-only view of the bound page
    pub probe: Arc<dyn PageProbe>,
}

/// A session that is registered active with its page bound to a queue
pub(crate) async fn active_session(driver: FakeDriver) -> Active {
    let clock = FakeClock::new();
    let bus = EventBus::new();
    let registry = RegistryHandle::spawn();
    let queue = DeliveryQueue::spawn(bus.clone(), clock.clone());
    let store = FakeStore::new();
    let id = InterviewId::new("int-1");

    let launch = ScheduledLaunch::new(
        id.clone(),
        clock.now() - chrono::Duration::seconds(1),
        meeting(),
    );
    registry.schedule(launch).await.unwrap();
    registry.claim_due(clock.now()).await.unwrap();
    let mut session = AutomationSession::new(id.clone(), clock.now());
    session.advance(SessionStatus::Joining);
    session.advance(SessionStatus::InMeeting);
    registry.activate(session).await.unwrap();
    let page = driver.open().await.unwrap();
    let probe = page.probe();
    queue.bind(&id, page, QuestionPlan::default()).unwrap();

    Active {
        teardown: Teardown {
            registry: registry.clone(),
            queue,
            store: store.clone(),
            bus: bus.clone(),
            logs: LaunchLogs::new(20, clock.clone()),
            clock,
        },
        registry,
        driver,
        store,
        bus,
        id,
        probe,
    }
}
