// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! av-core: domain types for the avatar interviewer
//!
//! This crate provides:
//! - Launch, session and question-plan state machines
//! - Meeting diagnosis results and join candidates
//! - Events and the in-process event bus
//! - Configuration, credentials and persisted operations

pub mod clock;
pub mod config;
pub mod credential;
pub mod diagnosis;
pub mod event;
pub mod events;
pub mod id;
pub mod launch;
pub mod launch_log;
pub mod operation;
pub mod question;
pub mod session;
pub mod template;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{
    AvatarConfig, ConfigError, DriverConfig, Notification, NotifyConfig, NotifyRule, SignInConfig,
    RECRUITER_CHANNEL,
};
pub use credential::{Cookie, Credential};
pub use diagnosis::{
    DiagnosisResult, JoinAction, JoinCandidate, Locator, MeetingErrorKind, MeetingState,
};
pub use event::Event;
pub use events::{EventBus, EventPattern, EventReceiver, Subscription};
pub use id::InterviewId;
pub use launch::{InvalidTransition, LaunchStatus, MeetingConfig, MeetingMode, ScheduledLaunch};
pub use launch_log::{LaunchLog, LaunchLogEntry};
pub use operation::Operation;
pub use question::{PlanError, Question, QuestionPlan, QuestionTemplate};
pub use session::{AutomationSession, SessionStatus};
