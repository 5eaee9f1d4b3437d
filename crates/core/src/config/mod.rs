// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration modules

mod avatar;
mod notify;

pub use avatar::{AvatarConfig, ConfigError, DriverConfig, SignInConfig};
pub use notify::{Notification, NotifyConfig, NotifyRule, RECRUITER_CHANNEL};
