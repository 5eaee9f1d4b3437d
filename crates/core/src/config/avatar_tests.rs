// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn empty_document_yields_defaults() {
    let config = AvatarConfig::from_toml_str("").unwrap();
    assert_eq!(config, AvatarConfig::default());
    assert_eq!(config.scheduler_interval, Duration::from_secs(30));
    assert_eq!(config.join_lead_time, Duration::from_secs(120));
    assert_eq!(config.join_retry_budget, 3);
    assert_eq!(config.max_session_duration, Duration::from_secs(90 * 60));
    assert_eq!(config.bot_identity, "avatar-interviewer");
    assert!(config.sign_in.is_none());
}

#[test]
fn parses_humantime_durations_and_nested_tables() {
    let config = AvatarConfig::from_toml_str(
        r#"
        scheduler_interval = "5s"
        join_lead_time = "90s"
        max_session_duration = "1h 15m"

        [driver]
        webdriver_url = "http://grid:4444"
        snapshot_dir = "/tmp/snaps"

        [sign_in]
        url = "https://accounts.example.com"
        username = "bot@example.com"
        password = "secret"

        [[questions]]
        offset = "10s"
        text = "Hi {candidate_name}"

        [[questions]]
        offset = "1m 10s"
        text = "Why {position}?"
        "#,
    )
    .unwrap();

    assert_eq!(config.scheduler_interval, Duration::from_secs(5));
    assert_eq!(config.join_lead_time, Duration::from_secs(90));
    assert_eq!(config.max_session_duration, Duration::from_secs(75 * 60));
    assert_eq!(config.driver.webdriver_url, "http://grid:4444");
    assert!(config.driver.headless);
    assert_eq!(config.driver.snapshot_dir, Some(PathBuf::from("/tmp/snaps")));

    let sign_in = config.sign_in.unwrap();
    assert_eq!(sign_in.password_selector, "input[type='password']");

    assert_eq!(config.questions.len(), 2);
    assert_eq!(config.questions[1].offset, Duration::from_secs(70));
}

#[parameterized(
    zero_budget = { "join_retry_budget = 0" },
    zero_candidates = { "join_candidate_limit = 0" },
    zero_interval = { "monitor_interval = \"0s\"" },
    decreasing_questions = { "[[questions]]\noffset = \"2m\"\ntext = \"a\"\n[[questions]]\noffset = \"1m\"\ntext = \"b\"" },
)]
fn rejects_invalid_values(doc: &str) {
    assert!(matches!(
        AvatarConfig::from_toml_str(doc),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    assert!(matches!(
        AvatarConfig::from_toml_str("scheduler_interval = [1,"),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn load_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = AvatarConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, AvatarConfig::default());
}

#[test]
fn load_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("avatar.toml");
    std::fs::write(&path, "bot_identity = \"panel-bot\"\n").unwrap();

    let config = AvatarConfig::load(&path).unwrap();
    assert_eq!(config.bot_identity, "panel-bot");
}

#[test]
fn default_questions_are_monotonic() {
    assert!(AvatarConfig::default().validate().is_ok());
}
