// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake browser for testing
//!
//! Pages move between named screens. Clicking an element, navigating to a
//! routed URL, reloading or pressing a chord can switch the current screen.
//! Text typed into a chat input and submitted with Enter is recorded as a
//! sent message.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{AutomationDriver, DriverError, ElementInfo, KeyChord, Page, PageProbe};
use async_trait::async_trait;
use av_core::{Cookie, Locator};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Recorded page call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCall {
    Open,
    Navigate(String),
    Reload,
    Click(Locator),
    TypeText { locator: Locator, text: String },
    PressKeys(String),
    Script(String),
    Snapshot,
    Cookies,
    SetCookies(usize),
    Close,
}

/// A chat message submitted from a page
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub page: usize,
    pub text: String,
    pub at: Instant,
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub css: Vec<String>,
    pub label: String,
    pub visible: bool,
    pub enabled: bool,
    /// Screen shown after a click
    pub leads_to: Option<String>,
    /// Typed text is collected as a chat draft
    pub chat_input: bool,
}

impl FakeElement {
    /// A button found by its label
    pub fn button(label: impl Into<String>) -> Self {
        Self {
            css: Vec::new(),
            label: label.into(),
            visible: true,
            enabled: true,
            leads_to: None,
            chat_input: false,
        }
    }

    /// An element found by CSS selector
    pub fn css(selector: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            css: vec![selector.into()],
            ..Self::button(label)
        }
    }

    /// A chat text box
    pub fn chat_input(selector: impl Into<String>) -> Self {
        Self {
            chat_input: true,
            ..Self::css(selector, "")
        }
    }

    pub fn also_css(mut self, selector: impl Into<String>) -> Self {
        self.css.push(selector.into());
        self
    }

    pub fn leads_to(mut self, screen: impl Into<String>) -> Self {
        self.leads_to = Some(screen.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    fn matches(&self, locator: &Locator) -> bool {
        match locator {
            Locator::Css(selector) => self.css.iter().any(|c| c == selector),
            Locator::Text(text) => {
                !text.is_empty() && self.label.to_lowercase().contains(&text.to_lowercase())
            }
        }
    }

    fn info(&self) -> ElementInfo {
        ElementInfo {
            label: self.label.clone(),
            visible: self.visible,
            enabled: self.enabled,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeScreen {
    pub url: String,
    pub text: String,
    pub elements: Vec<FakeElement>,
}

impl FakeScreen {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_element(mut self, element: FakeElement) -> Self {
        self.elements.push(element);
        self
    }
}

struct State {
    screens: HashMap<String, FakeScreen>,
    current: String,
    last_url: String,
    routes: HashMap<String, String>,
    after_reload: Option<String>,
    after_keys: HashMap<String, String>,
    responsive: bool,
    open_error: Option<String>,
    navigate_failures: usize,
    typing_error: Option<String>,
    typing_delay: Duration,
    opened: usize,
    closed: HashSet<usize>,
    close_calls: usize,
    calls: Vec<(usize, PageCall)>,
    drafts: HashMap<usize, String>,
    sent: Vec<SentMessage>,
    typing_now: usize,
    max_typing: usize,
    browser_cookies: Vec<Cookie>,
    installed_cookies: Vec<Cookie>,
}

impl State {
    fn screen(&self) -> Option<&FakeScreen> {
        self.screens.get(&self.current)
    }

    fn find(&self, locator: &Locator) -> Vec<&FakeElement> {
        self.screen()
            .map(|s| s.elements.iter().filter(|e| e.matches(locator)).collect())
            .unwrap_or_default()
    }

    fn switch_to(&mut self, screen: Option<String>) {
        if let Some(screen) = screen {
            self.current = screen;
        }
    }
}

/// Fake automation driver; clones share one simulated browser
#[derive(Clone)]
pub struct FakeDriver {
    state: Arc<Mutex<State>>,
}

impl Default for FakeDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDriver {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                screens: HashMap::from([(String::from("blank"), FakeScreen::new("about:blank"))]),
                current: "blank".to_string(),
                last_url: "about:blank".to_string(),
                routes: HashMap::new(),
                after_reload: None,
                after_keys: HashMap::new(),
                responsive: true,
                open_error: None,
                navigate_failures: 0,
                typing_error: None,
                typing_delay: Duration::ZERO,
                opened: 0,
                closed: HashSet::new(),
                close_calls: 0,
                calls: Vec::new(),
                drafts: HashMap::new(),
                sent: Vec::new(),
                typing_now: 0,
                max_typing: 0,
                browser_cookies: Vec::new(),
                installed_cookies: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // -- setup --

    pub fn screen(self, name: impl Into<String>, screen: FakeScreen) -> Self {
        self.lock().screens.insert(name.into(), screen);
        self
    }

    /// Navigating to `url` shows `screen`
    pub fn route(self, url: impl Into<String>, screen: impl Into<String>) -> Self {
        self.lock().routes.insert(url.into(), screen.into());
        self
    }

    pub fn start_on(self, screen: impl Into<String>) -> Self {
        self.lock().current = screen.into();
        self
    }

    pub fn after_reload(self, screen: impl Into<String>) -> Self {
        self.lock().after_reload = Some(screen.into());
        self
    }

    pub fn after_keys(self, chord: &str, screen: impl Into<String>) -> Self {
        let key = chord.parse::<KeyChord>().map(|c| c.to_string()).unwrap_or_else(|_| chord.to_string());
        self.lock().after_keys.insert(key, screen.into());
        self
    }

    pub fn with_browser_cookies(self, cookies: Vec<Cookie>) -> Self {
        self.lock().browser_cookies = cookies;
        self
    }

    pub fn with_typing_delay(self, delay: Duration) -> Self {
        self.lock().typing_delay = delay;
        self
    }

    // -- runtime controls --

    pub fn show(&self, screen: impl Into<String>) {
        self.lock().current = screen.into();
    }

    pub fn set_responsive(&self, responsive: bool) {
        self.lock().responsive = responsive;
    }

    pub fn fail_open(&self, reason: impl Into<String>) {
        self.lock().open_error = Some(reason.into());
    }

    /// The next `count` navigations time out
    pub fn fail_navigations(&self, count: usize) {
        self.lock().navigate_failures = count;
    }

    pub fn fail_typing(&self, reason: Option<String>) {
        self.lock().typing_error = reason;
    }

    // -- inspection --

    pub fn calls(&self) -> Vec<PageCall> {
        self.lock().calls.iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn current_screen(&self) -> String {
        self.lock().current.clone()
    }

    pub fn opened(&self) -> usize {
        self.lock().opened
    }

    /// Number of `close()` calls across all pages
    pub fn close_calls(&self) -> usize {
        self.lock().close_calls
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.lock().sent.clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.lock().sent.iter().map(|m| m.text.clone()).collect()
    }

    /// Highest number of pages typing at the same time
    pub fn max_concurrent_typing(&self) -> usize {
        self.lock().max_typing
    }

    pub fn installed_cookies(&self) -> Vec<Cookie> {
        self.lock().installed_cookies.clone()
    }
}

#[async_trait]
impl AutomationDriver for FakeDriver {
    async fn open(&self) -> Result<Box<dyn Page>, DriverError> {
        let mut state = self.lock();
        if let Some(reason) = &state.open_error {
            return Err(DriverError::AcquireFailed(reason.clone()));
        }
        state.opened += 1;
        let index = state.opened;
        state.calls.push((index, PageCall::Open));
        Ok(Box::new(FakePage {
            probe: Arc::new(FakeProbe {
                index,
                state: Arc::clone(&self.state),
            }),
        }))
    }
}

struct FakeProbe {
    index: usize,
    state: Arc<Mutex<State>>,
}

impl FakeProbe {
    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn live(&self) -> Result<std::sync::MutexGuard<'_, State>, DriverError> {
        let state = self.lock();
        if state.closed.contains(&self.index) {
            return Err(DriverError::SessionGone);
        }
        Ok(state)
    }
}

#[async_trait]
impl PageProbe for FakeProbe {
    async fn is_responsive(&self) -> bool {
        let state = self.lock();
        state.responsive && !state.closed.contains(&self.index)
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let state = self.live()?;
        Ok(match state.screen() {
            Some(screen) if !screen.url.is_empty() => screen.url.clone(),
            _ => state.last_url.clone(),
        })
    }

    async fn visible_text(&self) -> Result<String, DriverError> {
        let state = self.live()?;
        let Some(screen) = state.screen() else {
            return Ok(String::new());
        };
        let mut text = screen.text.clone();
        for element in screen.elements.iter().filter(|e| e.visible) {
            if !element.label.is_empty() {
                text.push('\n');
                text.push_str(&element.label);
            }
        }
        Ok(text)
    }

    async fn find(&self, locator: &Locator) -> Result<Vec<ElementInfo>, DriverError> {
        let state = self.live()?;
        Ok(state.find(locator).into_iter().map(FakeElement::info).collect())
    }
}

struct FakePage {
    probe: Arc<FakeProbe>,
}

impl FakePage {
    fn record(&self, call: PageCall) -> Result<std::sync::MutexGuard<'_, State>, DriverError> {
        let mut state = self.probe.live()?;
        state.calls.push((self.probe.index, call));
        Ok(state)
    }
}

#[async_trait]
impl PageProbe for FakePage {
    async fn is_responsive(&self) -> bool {
        self.probe.is_responsive().await
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        self.probe.current_url().await
    }

    async fn visible_text(&self) -> Result<String, DriverError> {
        self.probe.visible_text().await
    }

    async fn find(&self, locator: &Locator) -> Result<Vec<ElementInfo>, DriverError> {
        self.probe.find(locator).await
    }
}

#[async_trait]
impl Page for FakePage {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        let mut state = self.record(PageCall::Navigate(url.to_string()))?;
        if state.navigate_failures > 0 {
            state.navigate_failures -= 1;
            return Err(DriverError::Timeout(format!("navigate {url}")));
        }
        state.last_url = url.to_string();
        let next = state.routes.get(url).cloned();
        state.switch_to(next);
        Ok(())
    }

    async fn reload(&mut self) -> Result<(), DriverError> {
        let mut state = self.record(PageCall::Reload)?;
        let next = state.after_reload.clone();
        state.switch_to(next);
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), DriverError> {
        let mut state = self.record(PageCall::Click(locator.clone()))?;
        let target = state
            .find(locator)
            .into_iter()
            .find(|e| e.visible && e.enabled)
            .map(|e| e.leads_to.clone());
        match target {
            Some(next) => {
                state.switch_to(next);
                Ok(())
            }
            None => Err(DriverError::ElementNotFound(locator.to_string())),
        }
    }

    async fn type_text(&mut self, locator: &Locator, text: &str) -> Result<(), DriverError> {
        let delay = {
            let mut state = self.record(PageCall::TypeText {
                locator: locator.clone(),
                text: text.to_string(),
            })?;
            if let Some(reason) = &state.typing_error {
                return Err(DriverError::Protocol(reason.clone()));
            }
            state.typing_now += 1;
            state.max_typing = state.max_typing.max(state.typing_now);
            state.typing_delay
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.probe.lock();
        state.typing_now -= 1;
        let input = state
            .find(locator)
            .into_iter()
            .find(|e| e.visible)
            .map(|e| e.chat_input);
        match input {
            Some(true) => {
                state
                    .drafts
                    .entry(self.probe.index)
                    .or_default()
                    .push_str(text);
                Ok(())
            }
            Some(false) => Ok(()),
            None => Err(DriverError::ElementNotFound(locator.to_string())),
        }
    }

    async fn press_keys(&mut self, chord: &KeyChord) -> Result<(), DriverError> {
        let name = chord.to_string();
        let mut state = self.record(PageCall::PressKeys(name.clone()))?;
        if *chord == KeyChord::enter() {
            let draft = state.drafts.remove(&self.probe.index).unwrap_or_default();
            if !draft.is_empty() {
                state.sent.push(SentMessage {
                    page: self.probe.index,
                    text: draft,
                    at: Instant::now(),
                });
            }
        }
        let next = state.after_keys.get(&name).cloned();
        state.switch_to(next);
        Ok(())
    }

    async fn execute_script(
        &mut self,
        script: &str,
        _args: Vec<Value>,
    ) -> Result<Value, DriverError> {
        self.record(PageCall::Script(script.to_string()))?;
        Ok(Value::Null)
    }

    async fn snapshot(&mut self) -> Result<Vec<u8>, DriverError> {
        self.record(PageCall::Snapshot)?;
        Ok(b"\x89PNG\r\n\x1a\nfake".to_vec())
    }

    async fn cookies(&mut self) -> Result<Vec<Cookie>, DriverError> {
        let state = self.record(PageCall::Cookies)?;
        Ok(state.browser_cookies.clone())
    }

    async fn set_cookies(&mut self, cookies: &[Cookie]) -> Result<(), DriverError> {
        let mut state = self.record(PageCall::SetCookies(cookies.len()))?;
        state.installed_cookies.extend_from_slice(cookies);
        Ok(())
    }

    fn probe(&self) -> Arc<dyn PageProbe> {
        self.probe.clone()
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        let mut state = self.probe.lock();
        state.close_calls += 1;
        state.calls.push((self.probe.index, PageCall::Close));
        if !state.closed.insert(self.probe.index) {
            return Err(DriverError::SessionGone);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
