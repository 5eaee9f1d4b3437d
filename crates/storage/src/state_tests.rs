// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use av_core::{Cookie, MeetingConfig};
use chrono::Duration;

fn booked(id: &str, launch_time: DateTime<Utc>) -> Operation {
    Operation::InterviewBooked {
        launch: ScheduledLaunch::new(
            id,
            launch_time,
            MeetingConfig::new("https://meet.example.com/x", "Ada", "Engineer"),
        ),
    }
}

#[test]
fn due_lists_unattempted_launches_in_time_order() {
    let now = Utc::now();
    let mut state = MaterializedState::default();
    state.apply(&booked("late", now - Duration::seconds(1)));
    state.apply(&booked("early", now - Duration::seconds(60)));
    state.apply(&booked("future", now + Duration::seconds(60)));

    let ids: Vec<_> = state
        .due(now)
        .into_iter()
        .map(|l| l.interview_id.0)
        .collect();
    assert_eq!(ids, ["early", "late"]);
}

#[test]
fn status_update_removes_interview_from_due_set() {
    let now = Utc::now();
    let mut state = MaterializedState::default();
    state.apply(&booked("int-1", now - Duration::seconds(1)));
    state.apply(&Operation::InterviewStatus {
        interview_id: InterviewId::new("int-1"),
        active: false,
        at: now,
    });

    assert!(state.due(now).is_empty());
    let record = state.interview(&InterviewId::new("int-1")).unwrap();
    assert_eq!(record.active, Some(false));
    assert_eq!(record.updated_at, Some(now));
}

#[test]
fn status_for_unknown_interview_is_ignored() {
    let mut state = MaterializedState::default();
    state.apply(&Operation::InterviewStatus {
        interview_id: InterviewId::new("ghost"),
        active: true,
        at: Utc::now(),
    });
    assert!(state.interviews.is_empty());
}

#[test]
fn latest_credential_wins() {
    let mut state = MaterializedState::default();
    for value in ["old", "new"] {
        state.apply(&Operation::CredentialSaved {
            credential: Credential::new("bot", vec![Cookie::new("SID", value)], Utc::now()),
        });
    }
    assert_eq!(state.credential("bot").unwrap().cookies[0].value, "new");
}
