// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Browser automation adapters
//!
//! A `Page` is one browser session. It has a single owner at a time; the
//! only thing that may be shared is the read-only `PageProbe` it hands out.

mod keys;
mod webdriver;

pub use keys::KeyChord;
pub use webdriver::WebDriver;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeDriver, FakeElement, FakeScreen, PageCall, SentMessage};

use async_trait::async_trait;
use av_core::{Cookie, Locator};
use std::sync::Arc;
use thiserror::Error;

/// Errors from browser automation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("could not start browser session: {0}")]
    AcquireFailed(String),
    #[error("no interactable element for {0}")]
    ElementNotFound(String),
    #[error("browser session is gone")]
    SessionGone,
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("http error: {0}")]
    Http(String),
}

/// What a locator resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
    /// Visible text, falling back to the accessible label
    pub label: String,
    pub visible: bool,
    pub enabled: bool,
}

impl ElementInfo {
    pub fn is_interactable(&self) -> bool {
        self.visible && self.enabled
    }
}

/// Read-only view of a page, safe to hold from another task
#[async_trait]
pub trait PageProbe: Send + Sync {
    /// Whether the browser still answers at all
    async fn is_responsive(&self) -> bool;

    async fn current_url(&self) -> Result<String, DriverError>;

    /// Rendered text of the whole document
    async fn visible_text(&self) -> Result<String, DriverError>;

    async fn find(&self, locator: &Locator) -> Result<Vec<ElementInfo>, DriverError>;
}

/// Exclusive handle to one browser session
#[async_trait]
pub trait Page: PageProbe {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    async fn reload(&mut self) -> Result<(), DriverError>;

    /// Click the first visible, enabled match
    async fn click(&mut self, locator: &Locator) -> Result<(), DriverError>;

    /// Type into the first visible match
    async fn type_text(&mut self, locator: &Locator, text: &str) -> Result<(), DriverError>;

    async fn press_keys(&mut self, chord: &KeyChord) -> Result<(), DriverError>;

    async fn execute_script(
        &mut self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, DriverError>;

    /// PNG screenshot of the viewport
    async fn snapshot(&mut self) -> Result<Vec<u8>, DriverError>;

    async fn cookies(&mut self) -> Result<Vec<Cookie>, DriverError>;

    async fn set_cookies(&mut self, cookies: &[Cookie]) -> Result<(), DriverError>;

    fn probe(&self) -> Arc<dyn PageProbe>;

    /// End the browser session. Further calls fail with `SessionGone`.
    async fn close(&mut self) -> Result<(), DriverError>;
}

/// Source of fresh browser sessions
#[async_trait]
pub trait AutomationDriver: Clone + Send + Sync + 'static {
    async fn open(&self) -> Result<Box<dyn Page>, DriverError>;
}
