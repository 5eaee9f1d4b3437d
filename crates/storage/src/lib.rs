// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable interview and credential state
//!
//! Every change is appended to a JSONL write-ahead log and applied to an
//! in-memory `MaterializedState`; opening a journal replays the log.

mod journal;
mod state;
mod wal;

pub use journal::Journal;
pub use state::{InterviewRecord, MaterializedState};
pub use wal::{Wal, WalEntry, WalError};
