// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use av_core::{Cookie, MeetingConfig};
use chrono::Duration;

fn launch(id: &str, at: DateTime<Utc>) -> ScheduledLaunch {
    ScheduledLaunch::new(
        id,
        at,
        MeetingConfig::new("https://meet.example.com/abc", "Ada", "Engineer"),
    )
}

#[tokio::test]
async fn due_interviews_leave_once_status_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(&dir.path().join("avatar.wal")).unwrap();
    let now = Utc::now();
    store.book(launch("int-1", now - Duration::seconds(5))).unwrap();

    let due = store.scheduled_interviews_due(now).await.unwrap();
    assert_eq!(due.len(), 1);

    store
        .persist_interview_status(&InterviewId::new("int-1"), true)
        .await
        .unwrap();
    assert!(store.scheduled_interviews_due(now).await.unwrap().is_empty());
    assert_eq!(store.interview_active(&InterviewId::new("int-1")), Some(true));
}

#[tokio::test]
async fn credentials_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("avatar.wal");
    {
        let store = FileStore::open(&path).unwrap();
        assert!(store.reusable_credential("bot").await.unwrap().is_none());
        store
            .save_credential(
                "bot",
                Credential::new("ignored", vec![Cookie::new("SID", "x")], Utc::now()),
            )
            .await
            .unwrap();
    }

    let store = FileStore::open(&path).unwrap();
    let credential = store.reusable_credential("bot").await.unwrap().unwrap();
    assert_eq!(credential.identity, "bot");
}

#[tokio::test]
async fn credential_without_cookies_is_not_reusable() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(&dir.path().join("avatar.wal")).unwrap();
    store
        .save_credential("bot", Credential::new("bot", vec![], Utc::now()))
        .await
        .unwrap();

    assert!(store.reusable_credential("bot").await.unwrap().is_none());
}
