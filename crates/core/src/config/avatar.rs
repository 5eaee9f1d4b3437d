// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime configuration loaded from TOML
//!
//! Every field has a default so an empty or missing file yields a working
//! configuration. Durations use humantime notation (`30s`, `2m`, `1h 30m`).

use super::notify::NotifyRule;
use crate::question::{QuestionPlan, QuestionTemplate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    /// How often the scheduler scans for due launches
    #[serde(with = "humantime_serde")]
    pub scheduler_interval: Duration,
    /// How long before the interview start the avatar joins
    #[serde(with = "humantime_serde")]
    pub join_lead_time: Duration,
    /// Join attempts before the launch fails
    pub join_retry_budget: u32,
    /// Ranked candidates tried per attempt when the page offers a join button
    pub join_candidate_limit: u32,
    /// Pause after each UI action before re-diagnosing
    #[serde(with = "humantime_serde")]
    pub stabilization_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub monitor_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub max_session_duration: Duration,
    /// Consecutive failed liveness probes before a session is torn down
    pub max_unresponsive_checks: u32,
    /// Entries kept per interview launch log
    pub launch_log_capacity: usize,
    /// Identity whose credential is reused across launches
    pub bot_identity: String,
    /// Name typed into guest-name prompts
    pub bot_display_name: String,
    pub driver: DriverConfig,
    pub sign_in: Option<SignInConfig>,
    pub questions: Vec<QuestionTemplate>,
    pub notify: Vec<NotifyRule>,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            scheduler_interval: Duration::from_secs(30),
            join_lead_time: Duration::from_secs(2 * 60),
            join_retry_budget: 3,
            join_candidate_limit: 4,
            stabilization_delay: Duration::from_secs(3),
            monitor_interval: Duration::from_secs(30),
            max_session_duration: Duration::from_secs(90 * 60),
            max_unresponsive_checks: 3,
            launch_log_capacity: 200,
            bot_identity: "avatar-interviewer".to_string(),
            bot_display_name: "AI Interviewer".to_string(),
            driver: DriverConfig::default(),
            sign_in: None,
            questions: default_questions(),
            notify: NotifyRule::defaults(),
        }
    }
}

impl AvatarConfig {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.join_retry_budget == 0 {
            return Err(ConfigError::Invalid(
                "join_retry_budget must be at least 1".into(),
            ));
        }
        if self.join_candidate_limit == 0 {
            return Err(ConfigError::Invalid(
                "join_candidate_limit must be at least 1".into(),
            ));
        }
        if self.scheduler_interval.is_zero() || self.monitor_interval.is_zero() {
            return Err(ConfigError::Invalid("poll intervals must be non-zero".into()));
        }
        // Templates are rendered per launch; check ordering up front
        QuestionPlan::new(
            self.questions
                .iter()
                .map(|q| (q.offset, q.text.clone()))
                .collect(),
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub webdriver_url: String,
    pub headless: bool,
    /// Where failure snapshots are written; none disables them
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://127.0.0.1:4444".to_string(),
            headless: true,
            snapshot_dir: None,
        }
    }
}

/// Interactive sign-in form, used when no reusable credential is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_username_selector")]
    pub username_selector: String,
    #[serde(default = "default_password_selector")]
    pub password_selector: String,
    #[serde(default = "default_submit_selector")]
    pub submit_selector: String,
}

fn default_username_selector() -> String {
    "input[type='email']".to_string()
}

fn default_password_selector() -> String {
    "input[type='password']".to_string()
}

fn default_submit_selector() -> String {
    "button[type='submit']".to_string()
}

fn default_questions() -> Vec<QuestionTemplate> {
    [
        (10, "Hello {candidate_name}, welcome to your interview for the {position} role. Please introduce yourself."),
        (120, "What drew you to the {position} position?"),
        (300, "Describe a recent project you are proud of and your part in it."),
        (600, "Tell me about a time you disagreed with a teammate and how it was resolved."),
        (900, "Thank you {candidate_name}. Do you have any questions for us?"),
    ]
    .into_iter()
    .map(|(secs, text)| QuestionTemplate::new(Duration::from_secs(secs), text))
    .collect()
}

#[cfg(test)]
#[path = "avatar_tests.rs"]
mod tests;
