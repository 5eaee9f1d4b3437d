// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    exact_hit = { "avatar:ended", "avatar:ended", true },
    exact_miss = { "avatar:ended", "avatar:launched", false },
    wildcard_hit = { "avatar:*", "avatar:status", true },
    wildcard_one_segment_only = { "avatar:*", "avatar:status:extra", false },
    wildcard_other_prefix = { "avatar:*", "queue:status", false },
    deep_wildcard = { "avatar:**", "avatar:status:extra", true },
    global_star = { "*", "anything:at:all", true },
    empty_matches_nothing = { "", "avatar:ended", false },
    shorter_name = { "avatar:ended", "avatar", false },
)]
fn pattern_matching(pattern: &str, name: &str, expected: bool) {
    assert_eq!(EventPattern::new(pattern).matches(name), expected);
}

#[test]
fn subscription_matches_any_of_its_patterns() {
    let sub = Subscription::new(
        "recruiter-feed",
        vec!["avatar:launched".into(), "avatar:launch_failed".into()],
    );

    assert!(sub.matches("avatar:launched"));
    assert!(sub.matches("avatar:launch_failed"));
    assert!(!sub.matches("avatar:message"));
}
