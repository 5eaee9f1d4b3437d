// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::meeting;
use av_adapters::FakeStore;
use av_core::{FakeClock, InterviewId, Subscription};
use std::sync::{Arc, Mutex};

/// Records dispatched launches instead of driving them
#[derive(Clone, Default)]
struct RecordingLauncher {
    dispatched: Arc<Mutex<Vec<InterviewId>>>,
    refuse: bool,
}

impl RecordingLauncher {
    fn dispatched(&self) -> Vec<InterviewId> {
        self.dispatched.lock().unwrap().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn dispatch(&self, launch: ScheduledLaunch) -> Result<(), HandoffError> {
        if self.refuse {
            return Err(HandoffError::ShuttingDown);
        }
        self.dispatched.lock().unwrap().push(launch.interview_id);
        Ok(())
    }
}

fn scheduler(
    store: &FakeStore,
    launcher: &RecordingLauncher,
    clock: &FakeClock,
) -> (SchedulerLoop<FakeStore, RecordingLauncher, FakeClock>, RegistryHandle, EventBus) {
    let registry = RegistryHandle::spawn();
    let bus = EventBus::new();
    let scheduler = SchedulerLoop::new(
        store.clone(),
        launcher.clone(),
        registry.clone(),
        bus.clone(),
        clock.clone(),
        Duration::from_secs(30),
    );
    (scheduler, registry, bus)
}

fn booked(id: &str, clock: &FakeClock, offset_secs: i64) -> ScheduledLaunch {
    ScheduledLaunch::new(
        id,
        clock.now() + chrono::Duration::seconds(offset_secs),
        meeting(),
    )
}

#[tokio::test]
async fn due_launch_is_claimed_and_dispatched_once() {
    let clock = FakeClock::new();
    let store = FakeStore::new();
    store.book(booked("int-1", &clock, -1));
    let launcher = RecordingLauncher::default();
    let (scheduler, registry, bus) = scheduler(&store, &launcher, &clock);
    let mut started = bus.subscribe(Subscription::new("t", vec!["avatar:launch_started".into()]));

    assert_eq!(scheduler.tick().await, 1);
    assert_eq!(scheduler.tick().await, 0);
    assert_eq!(scheduler.tick().await, 0);

    let id = InterviewId::new("int-1");
    assert_eq!(launcher.dispatched(), [id.clone()]);
    assert_eq!(registry.status(&id).await.unwrap(), Some(LaunchStatus::Launching));
    assert!(matches!(started.try_recv(), Ok(Event::LaunchStarted { .. })));
    assert!(started.try_recv().is_err());
}

#[tokio::test]
async fn future_launch_waits_for_its_time() {
    let clock = FakeClock::new();
    let store = FakeStore::new();
    store.book(booked("int-1", &clock, 60));
    let launcher = RecordingLauncher::default();
    let (scheduler, _registry, _bus) = scheduler(&store, &launcher, &clock);

    assert_eq!(scheduler.tick().await, 0);
    clock.advance(Duration::from_secs(61));
    assert_eq!(scheduler.tick().await, 1);
}

#[tokio::test]
async fn refused_hand_off_marks_failed() {
    let clock = FakeClock::new();
    let store = FakeStore::new();
    store.book(booked("int-1", &clock, -1));
    let launcher = RecordingLauncher {
        refuse: true,
        ..RecordingLauncher::default()
    };
    let (scheduler, registry, _bus) = scheduler(&store, &launcher, &clock);

    assert_eq!(scheduler.tick().await, 0);

    let id = InterviewId::new("int-1");
    assert_eq!(registry.status(&id).await.unwrap(), Some(LaunchStatus::Failed));
    assert_eq!(store.status_history(&id), [false]);
    assert_eq!(scheduler.tick().await, 0);
}

#[tokio::test]
async fn store_outage_still_claims_registered_launches() {
    let clock = FakeClock::new();
    let store = FakeStore::new();
    store.fail_due_queries(Some("db down".to_string()));
    let launcher = RecordingLauncher::default();
    let (scheduler, registry, _bus) = scheduler(&store, &launcher, &clock);
    registry.schedule(booked("int-2", &clock, 0)).await.unwrap();

    assert_eq!(scheduler.tick().await, 1);
    assert_eq!(launcher.dispatched(), [InterviewId::new("int-2")]);
}

#[tokio::test(start_paused = true)]
async fn run_ticks_until_shutdown() {
    let clock = FakeClock::new();
    let store = FakeStore::new();
    store.book(booked("int-1", &clock, -1));
    let launcher = RecordingLauncher::default();
    let (scheduler, _registry, _bus) = scheduler(&store, &launcher, &clock);
    let (tx, rx) = watch::channel(false);

    let task = tokio::spawn(scheduler.run(rx));
    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(launcher.dispatched().len(), 1);

    tx.send(true).unwrap();
    task.await.unwrap();
}
