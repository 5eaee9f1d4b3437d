// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn entries_keep_append_order() {
    let mut log = LaunchLog::new(10);
    let now = Utc::now();
    log.append("acquire", true, "page opened", now);
    log.append("navigate", false, "timeout", now);

    let steps: Vec<_> = log.entries().map(|e| e.step_name.as_str()).collect();
    assert_eq!(steps, ["acquire", "navigate"]);
    assert!(!log.last().unwrap().success);
}

#[test]
fn capacity_evicts_oldest() {
    let mut log = LaunchLog::new(2);
    let now = Utc::now();
    log.append("a", true, "", now);
    log.append("b", true, "", now);
    log.append("c", true, "", now);

    let steps: Vec<_> = log.entries().map(|e| e.step_name.as_str()).collect();
    assert_eq!(steps, ["b", "c"]);
    assert_eq!(log.dropped(), 1);
}

#[test]
fn for_step_filters_by_name() {
    let mut log = LaunchLog::new(10);
    let now = Utc::now();
    log.append("join_attempt", false, "1", now);
    log.append("navigate", true, "", now);
    log.append("join_attempt", true, "2", now);

    let details: Vec<_> = log.for_step("join_attempt").map(|e| e.detail.as_str()).collect();
    assert_eq!(details, ["1", "2"]);
}
