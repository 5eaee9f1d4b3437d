// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O

pub mod driver;
pub mod notify;
pub mod store;
pub mod traced;

pub use driver::{
    AutomationDriver, DriverError, ElementInfo, KeyChord, Page, PageProbe, WebDriver,
};
pub use notify::{LogNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError};
pub use store::{CredentialStore, FileStore, InterviewStore, StoreError};
pub use traced::{TracedDriver, TracedNotifyAdapter, TracedPage};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use driver::{FakeDriver, FakeElement, FakeScreen, PageCall, SentMessage};
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
#[cfg(any(test, feature = "test-support"))]
pub use store::{FakeStore, StoreCall};
