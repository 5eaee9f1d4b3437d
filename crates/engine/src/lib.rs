// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Avatar launch engine
//!
//! Claims due launches, drives each one into its meeting, delivers the
//! question plan through a single chat consumer and tears sessions down
//! when the meeting ends or the browser stops answering.

mod controller;
mod delivery;
mod diagnose;
mod error;
mod join;
mod logbook;
mod monitor;
mod questions;
mod registry;
mod runtime;
mod scheduler;
mod teardown;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use controller::{LaunchPolicy, SessionController};
pub use delivery::{DeliveryError, DeliveryQueue, QueueClosed};
pub use diagnose::{auth_marker, classify_error, diagnose};
pub use error::{
    HandoffError, LaunchError, LaunchErrorKind, LaunchStep, MonitorTimeout, RegistryError,
};
pub use join::{JoinEngine, JoinOutcome, JOIN_ATTEMPT};
pub use logbook::{LaunchLogs, StepLog};
pub use monitor::{evaluate, MonitorPolicy, Observation, Verdict};
pub use questions::QuestionTimerSet;
pub use registry::{Registry, RegistryHandle};
pub use runtime::{AvatarRuntime, RuntimeDeps};
pub use scheduler::{Launcher, SchedulerLoop};
pub use teardown::EndReason;
