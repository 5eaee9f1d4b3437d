// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::events::EventPattern;
use crate::id::InterviewId;
use chrono::Utc;

fn ended(id: &str) -> Event {
    Event::AvatarEnded {
        interview_id: InterviewId::new(id),
        timestamp: Utc::now(),
    }
}

fn launched(id: &str) -> Event {
    Event::AvatarLaunched {
        interview_id: InterviewId::new(id),
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn publish_reaches_matching_subscribers_only() {
    let bus = EventBus::new();
    let mut ended_rx = bus.subscribe(Subscription::new(
        "ended",
        vec![EventPattern::new("avatar:ended")],
    ));
    let mut all_rx = bus.subscribe(Subscription::new("all", vec![EventPattern::new("avatar:*")]));

    bus.publish(launched("int-1"));
    bus.publish(ended("int-1"));

    assert!(matches!(ended_rx.recv().await, Some(Event::AvatarEnded { .. })));
    assert!(ended_rx.try_recv().is_err());

    assert!(matches!(all_rx.recv().await, Some(Event::AvatarLaunched { .. })));
    assert!(matches!(all_rx.recv().await, Some(Event::AvatarEnded { .. })));
}

#[test]
fn dropped_receivers_are_pruned_on_publish() {
    let bus = EventBus::new();
    let rx = bus.subscribe(Subscription::new("short-lived", vec![EventPattern::new("*")]));
    let _keep = bus.subscribe(Subscription::new("kept", vec![EventPattern::new("*")]));
    assert_eq!(bus.subscriber_count(), 2);

    drop(rx);
    bus.publish(ended("int-1"));

    assert_eq!(bus.subscriber_count(), 1);
}

#[test]
fn unsubscribe_removes_subscriber() {
    let bus = EventBus::new();
    let _rx = bus.subscribe(Subscription::new("sub", vec![EventPattern::new("*")]));

    bus.unsubscribe(&SubscriberId("sub".to_string()));
    assert_eq!(bus.subscriber_count(), 0);
}

#[test]
fn clones_share_subscribers() {
    let bus = EventBus::new();
    let other = bus.clone();
    let mut rx = other.subscribe(Subscription::new("sub", vec![EventPattern::new("*")]));

    bus.publish(ended("int-9"));

    assert_eq!(rx.try_recv().unwrap().interview_id().as_str(), "int-9");
}
