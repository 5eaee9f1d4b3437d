// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process fan-out of avatar events
//!
//! Subscribers register a set of name patterns and receive every matching
//! `Event` on an unbounded channel. Dropping the receiver unsubscribes.

mod bus;
mod subscription;

pub use bus::{EventBus, EventReceiver, EventSender};
pub use subscription::{EventPattern, SubscriberId, Subscription};
