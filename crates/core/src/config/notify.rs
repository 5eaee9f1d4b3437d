// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification routing
//!
//! Maps avatar events to outbound notifications by pattern. The first rule
//! whose pattern matches decides; a disabled rule suppresses.

use crate::event::Event;
use crate::events::EventPattern;
use serde::{Deserialize, Serialize};

/// Channel that receives recruiter-facing failure reasons
pub const RECRUITER_CHANNEL: &str = "recruiter";

/// A rendered notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyRule {
    pub pattern: String,
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_channel() -> String {
    RECRUITER_CHANNEL.to_string()
}

fn default_enabled() -> bool {
    true
}

impl NotifyRule {
    pub fn new(pattern: impl Into<String>, channel: impl Into<String>, enabled: bool) -> Self {
        Self {
            pattern: pattern.into(),
            channel: channel.into(),
            enabled,
        }
    }

    pub fn defaults() -> Vec<NotifyRule> {
        vec![NotifyRule::new("avatar:launch_failed", RECRUITER_CHANNEL, true)]
    }
}

#[derive(Debug, Clone)]
pub struct NotifyConfig {
    rules: Vec<(EventPattern, NotifyRule)>,
}

impl NotifyConfig {
    pub fn new(rules: &[NotifyRule]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|r| (EventPattern::new(r.pattern.as_str()), r.clone()))
                .collect(),
        }
    }

    /// Channel the event should go to, if any
    pub fn channel_for(&self, event: &Event) -> Option<&str> {
        let name = event.name();
        let (_, rule) = self.rules.iter().find(|(p, _)| p.matches(name))?;
        rule.enabled.then_some(rule.channel.as_str())
    }

    pub fn to_notification(&self, event: &Event) -> Option<Notification> {
        let channel = self.channel_for(event)?;
        Some(Notification {
            channel: channel.to_string(),
            message: render(event),
        })
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self::new(&NotifyRule::defaults())
    }
}

/// Only short reasons ever leave the process; raw diagnostics stay in logs
fn render(event: &Event) -> String {
    match event {
        Event::AvatarLaunchFailed {
            interview_id,
            error,
            ..
        } => format!("Interview {interview_id}: {error}"),
        Event::AvatarLaunched { interview_id, .. } => {
            format!("Interview {interview_id}: avatar joined the meeting")
        }
        Event::AvatarEnded { interview_id, .. } => {
            format!("Interview {interview_id}: avatar left the meeting")
        }
        Event::DeliveryFailed { interview_id, .. } => {
            format!("Interview {interview_id}: a question could not be delivered")
        }
        other => format!("Interview {}: {}", other.interview_id(), other.name()),
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
